// Test-only record builders for `ferryroutes-lib` unit tests
#![allow(dead_code)]

use crate::model::{parse_travel_date, DateVessel, Route, VesselPrice};
use crate::store::RouteStore;

/// Route with placeholder company and times.
pub fn route(id: &str, origin: &str, destination: &str, duration: i64) -> Route {
    Route {
        route_id: id.to_string(),
        company: "Test Lines".to_string(),
        origin_port: origin.to_string(),
        destination_port: destination.to_string(),
        departure_time: "08:00".to_string(),
        arrival_time: "09:00".to_string(),
        duration,
    }
}

pub fn vessel_price(id: i64, route_id: &str, vessel: &str, price: i64) -> VesselPrice {
    VesselPrice {
        id,
        route_id: route_id.to_string(),
        vessel: vessel.to_string(),
        price,
    }
}

pub fn date_vessel(id: i64, route_id: &str, date: &str, vessel: &str) -> DateVessel {
    DateVessel {
        id,
        route_id: route_id.to_string(),
        travel_date: parse_travel_date(date).expect("valid test date"),
        vessel: vessel.to_string(),
    }
}

/// Small Cyclades network shared by query and formatter tests.
///
/// - Piraeus→Naxos twice (R1 fast/expensive, R2 slow/cheap), Naxos→Paros,
///   Piraeus→Syros, Syros→Paros, Paros→Piraeus.
pub fn cyclades_store() -> RouteStore {
    RouteStore::from_records(
        vec![
            route("R1", "Piraeus", "Naxos", 240),
            route("R2", "Piraeus", "Naxos", 330),
            route("R3", "Naxos", "Paros", 45),
            route("R4", "Piraeus", "Syros", 150),
            route("R5", "Syros", "Paros", 90),
            route("R6", "Paros", "Piraeus", 250),
        ],
        vec![
            vessel_price(1, "R1", "Champion Jet", 80),
            vessel_price(2, "R1", "Blue Star Delos", 62),
            vessel_price(3, "R2", "Blue Star Naxos", 45),
            vessel_price(4, "R3", "Naxos Express", 12),
            vessel_price(5, "R4", "Artemis", 45),
            vessel_price(6, "R6", "Blue Star Paros", 80),
        ],
        vec![
            date_vessel(1, "R1", "2024-07-15", "Champion Jet"),
            date_vessel(2, "R1", "2024-07-16", "Blue Star Delos"),
            date_vessel(3, "R2", "2024-07-15", "Blue Star Naxos"),
            date_vessel(4, "R2", "2024-07-16", "Blue Star Naxos"),
            date_vessel(5, "R3", "2024-07-15", "Naxos Express"),
            date_vessel(6, "R4", "2024-07-17", "Artemis"),
        ],
    )
    .expect("fixture records are valid")
}
