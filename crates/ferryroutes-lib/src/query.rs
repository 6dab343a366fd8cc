//! Query operations over a [`RouteStore`].
//!
//! Every operation validates its inputs first and then answers from the
//! store's indices. A query that matches nothing returns an empty or absent
//! result; only malformed input produces an error.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{parse_travel_date, validate_port, validate_route_id, Route, RouteId, VesselPrice};
use crate::output;
use crate::store::RouteStore;

/// Maximum number of entries in each suggestion list.
pub const SUGGESTION_LIMIT: usize = 5;

/// Days either side of a requested date considered for alternatives.
const NEARBY_DAYS: i64 = 2;

/// Shortest scheduled crossing between two ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationResult {
    pub origin: String,
    pub destination: String,
    pub shortest_duration: i64,
    pub route_id: RouteId,
}

/// A route that runs on the requested date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableService {
    pub route_id: RouteId,
    pub company: String,
    pub departure_time: String,
    pub duration: i64,
    pub vessels: Vec<String>,
    pub prices: Vec<VesselPrice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub available_services: Vec<AvailableService>,
}

/// One direct segment of an indirect journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub origin: String,
    pub destination: String,
    pub route_ids: Vec<RouteId>,
}

/// An `origin -> stopover -> destination` journey built from two direct legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndirectRoute {
    pub origin: String,
    pub stopover: String,
    pub destination: String,
    pub first_leg: Leg,
    pub second_leg: Leg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceList {
    pub route_id: RouteId,
    pub prices: Vec<VesselPrice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselList {
    pub route_id: RouteId,
    pub vessels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

/// A departure listed in a port's schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub route_id: RouteId,
    pub company: String,
    pub origin: String,
    pub destination: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
}

/// A single vessel fare, as returned by the extremal price queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub route_id: RouteId,
    pub vessel: String,
    pub price: i64,
}

impl From<&VesselPrice> for PriceQuote {
    fn from(price: &VesselPrice) -> Self {
        Self {
            route_id: price.route_id.clone(),
            vessel: price.vessel.clone(),
            price: price.price,
        }
    }
}

/// Alternatives offered when a query comes back empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Destinations served from ports matching `origin`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub destinations: Vec<String>,
    /// Busiest departure ports, used when no origin was given.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub popular_ports: Vec<String>,
    /// Port names resembling `origin` when nothing matched it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub similar_ports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nearby_dates: Vec<NaiveDate>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
            && self.popular_ports.is_empty()
            && self.similar_ports.is_empty()
            && self.nearby_dates.is_empty()
    }
}

/// Every route in storage order.
pub fn all_routes(store: &RouteStore) -> Vec<Route> {
    store.all_routes().to_vec()
}

/// Routes whose origin and destination match exactly.
pub fn routes_by_ports(store: &RouteStore, origin: &str, destination: &str) -> Result<Vec<Route>> {
    validate_pair(origin, destination)?;
    Ok(store
        .find_by_ports(origin, destination)
        .into_iter()
        .cloned()
        .collect())
}

/// All vessel prices recorded for `route_id`. An empty list means no price data.
pub fn price_lookup(store: &RouteStore, route_id: &str) -> Result<PriceList> {
    validate_route_id(route_id)?;
    Ok(PriceList {
        route_id: route_id.to_string(),
        prices: store.prices_for(route_id).into_iter().cloned().collect(),
    })
}

/// Minimum duration between two ports and the route it belongs to.
///
/// Equal durations resolve to the route stored first.
pub fn shortest_duration(
    store: &RouteStore,
    origin: &str,
    destination: &str,
) -> Result<Option<DurationResult>> {
    validate_pair(origin, destination)?;
    let shortest = store
        .find_by_ports(origin, destination)
        .into_iter()
        .min_by_key(|route| route.duration);

    Ok(shortest.map(|route| DurationResult {
        origin: origin.to_string(),
        destination: destination.to_string(),
        shortest_duration: route.duration,
        route_id: route.route_id.clone(),
    }))
}

/// Routes between two ports with at least one vessel scheduled on `date`.
pub fn availability(
    store: &RouteStore,
    origin: &str,
    destination: &str,
    date: NaiveDate,
) -> Result<Availability> {
    validate_pair(origin, destination)?;

    let available_services = store
        .find_by_ports(origin, destination)
        .into_iter()
        .filter_map(|route| {
            let vessels: Vec<String> = store
                .dates_for(&route.route_id)
                .into_iter()
                .filter(|entry| entry.travel_date == date)
                .map(|entry| entry.vessel.clone())
                .collect();
            if vessels.is_empty() {
                return None;
            }
            Some(AvailableService {
                route_id: route.route_id.clone(),
                company: route.company.clone(),
                departure_time: route.departure_time.clone(),
                duration: route.duration,
                vessels,
                prices: store.prices_for(&route.route_id).into_iter().cloned().collect(),
            })
        })
        .collect();

    Ok(Availability {
        origin: origin.to_string(),
        destination: destination.to_string(),
        date,
        available_services,
    })
}

/// One-stop journeys from `origin` to `destination`.
///
/// Each distinct stopover appears once, in the order its first leg is
/// stored. Stopovers equal to either endpoint are skipped. Journeys are
/// reported whether or not a direct route also exists.
pub fn indirect_routes(
    store: &RouteStore,
    origin: &str,
    destination: &str,
) -> Result<Vec<IndirectRoute>> {
    validate_pair(origin, destination)?;

    let mut seen = HashSet::new();
    let mut journeys = Vec::new();
    for first in store.departures_from(origin) {
        let stop = first.destination_port.as_str();
        if stop == origin || stop == destination || !seen.insert(stop) {
            continue;
        }

        let second_leg = store.find_by_ports(stop, destination);
        if second_leg.is_empty() {
            continue;
        }

        journeys.push(IndirectRoute {
            origin: origin.to_string(),
            stopover: stop.to_string(),
            destination: destination.to_string(),
            first_leg: leg(origin, stop, &store.find_by_ports(origin, stop)),
            second_leg: leg(stop, destination, &second_leg),
        });
    }
    Ok(journeys)
}

fn leg(origin: &str, destination: &str, routes: &[&Route]) -> Leg {
    Leg {
        origin: origin.to_string(),
        destination: destination.to_string(),
        route_ids: routes.iter().map(|route| route.route_id.clone()).collect(),
    }
}

/// Distinct vessels ever scheduled on `route_id`, in first-seen order.
pub fn vessels(store: &RouteStore, route_id: &str) -> Result<VesselList> {
    validate_route_id(route_id)?;
    let mut seen = HashSet::new();
    let vessels = store
        .dates_for(route_id)
        .into_iter()
        .filter(|entry| seen.insert(entry.vessel.as_str()))
        .map(|entry| entry.vessel.clone())
        .collect();
    Ok(VesselList {
        route_id: route_id.to_string(),
        vessels,
    })
}

/// Every departure from `origin`, with the fare range where prices exist.
pub fn schedule(store: &RouteStore, origin: &str) -> Result<Vec<ScheduleEntry>> {
    validate_port("origin", origin)?;
    Ok(store
        .departures_from(origin)
        .into_iter()
        .map(|route| ScheduleEntry {
            route_id: route.route_id.clone(),
            company: route.company.clone(),
            origin: route.origin_port.clone(),
            destination: route.destination_port.clone(),
            departure_time: route.departure_time.clone(),
            arrival_time: route.arrival_time.clone(),
            duration: route.duration,
            price_range: price_range(&store.prices_for(&route.route_id)),
        })
        .collect())
}

fn price_range(prices: &[&VesselPrice]) -> Option<PriceRange> {
    let min = prices.iter().map(|p| p.price).min()?;
    let max = prices.iter().map(|p| p.price).max()?;
    Some(PriceRange { min, max })
}

/// Lowest fare on any route between two ports.
///
/// Prices are scanned in price-table order and the first minimum wins.
pub fn cheapest_route(
    store: &RouteStore,
    origin: &str,
    destination: &str,
) -> Result<Option<PriceQuote>> {
    validate_pair(origin, destination)?;
    let in_scope: HashSet<&str> = store
        .find_by_ports(origin, destination)
        .into_iter()
        .map(|route| route.route_id.as_str())
        .collect();

    Ok(store
        .all_prices()
        .iter()
        .filter(|price| in_scope.contains(price.route_id.as_str()))
        .min_by_key(|price| price.price)
        .map(PriceQuote::from))
}

/// Highest fare in the whole price table; the first maximum wins.
pub fn most_expensive_route(store: &RouteStore) -> Option<PriceQuote> {
    store
        .all_prices()
        .iter()
        .fold(None::<&VesselPrice>, |best, price| match best {
            Some(current) if current.price >= price.price => Some(current),
            _ => Some(price),
        })
        .map(PriceQuote::from)
}

/// Alternatives for a query that found nothing.
///
/// With an origin fragment, lists destinations from ports whose name
/// contains it (case-insensitive), falling back to similarly spelled ports.
/// Without one, lists the busiest departure ports. With a date, lists the
/// nearby dates that have vessels scheduled.
pub fn suggestions(
    store: &RouteStore,
    origin: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<Suggestions> {
    if let Some(origin) = origin {
        validate_port("origin", origin)?;
    }

    let mut result = Suggestions {
        origin: origin.map(str::to_string),
        date,
        ..Suggestions::default()
    };

    match origin {
        Some(fragment) => {
            let needle = fragment.to_lowercase();
            let mut seen = HashSet::new();
            result.destinations = store
                .all_routes()
                .iter()
                .filter(|route| route.origin_port.to_lowercase().contains(&needle))
                .map(|route| route.destination_port.as_str())
                .filter(|destination| seen.insert(*destination))
                .take(SUGGESTION_LIMIT)
                .map(str::to_string)
                .collect();
            if result.destinations.is_empty() {
                result.similar_ports = store.port_suggestions(fragment, SUGGESTION_LIMIT);
            }
        }
        None => result.popular_ports = popular_ports(store),
    }

    if let Some(date) = date {
        result.nearby_dates = nearby_dates(store, origin, date);
    }

    Ok(result)
}

fn popular_ports(store: &RouteStore) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for route in store.all_routes() {
        *counts.entry(route.origin_port.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|(port, _)| port.to_string())
        .collect()
}

fn nearby_dates(store: &RouteStore, origin: Option<&str>, date: NaiveDate) -> Vec<NaiveDate> {
    let needle = origin.map(str::to_lowercase);
    let scheduled: BTreeSet<NaiveDate> = store
        .all_dates()
        .iter()
        .filter(|entry| match (&needle, store.get(&entry.route_id)) {
            (Some(needle), Some(route)) => route.origin_port.to_lowercase().contains(needle),
            (None, _) => true,
            (Some(_), None) => false,
        })
        .map(|entry| entry.travel_date)
        .collect();

    (-NEARBY_DAYS..=NEARBY_DAYS)
        .filter(|offset| *offset != 0)
        .filter_map(|offset| date.checked_add_signed(Duration::days(offset)))
        .filter(|candidate| scheduled.contains(candidate))
        .collect()
}

fn validate_pair(origin: &str, destination: &str) -> Result<()> {
    validate_port("origin", origin)?;
    validate_port("destination", destination)
}

/// A named query operation with its parameters.
///
/// Serialized as `{"operation": "<name>", ...params}`. The schedule,
/// availability, price and duration operations also accept the
/// `get_ferry_schedule`, `check_ferry_availability`, `get_price` and
/// `get_duration` names used by assistant tool calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum QueryRequest {
    AllRoutes,
    RoutesByPorts {
        origin: String,
        destination: String,
    },
    #[serde(alias = "get_price")]
    PriceLookup { route_id: RouteId },
    #[serde(alias = "get_duration")]
    ShortestDuration {
        origin: String,
        destination: String,
    },
    #[serde(alias = "check_ferry_availability")]
    Availability {
        origin: String,
        destination: String,
        date: String,
    },
    IndirectRoute {
        origin: String,
        destination: String,
    },
    Vessels { route_id: RouteId },
    #[serde(alias = "get_ferry_schedule")]
    Schedule { origin: String },
    CheapestRoute {
        origin: String,
        destination: String,
    },
    MostExpensiveRoute,
    Suggestions {
        #[serde(default)]
        origin: Option<String>,
        #[serde(default)]
        date: Option<String>,
    },
}

impl QueryRequest {
    /// Canonical operation name.
    pub fn operation(&self) -> &'static str {
        match self {
            QueryRequest::AllRoutes => "all_routes",
            QueryRequest::RoutesByPorts { .. } => "routes_by_ports",
            QueryRequest::PriceLookup { .. } => "price_lookup",
            QueryRequest::ShortestDuration { .. } => "shortest_duration",
            QueryRequest::Availability { .. } => "availability",
            QueryRequest::IndirectRoute { .. } => "indirect_route",
            QueryRequest::Vessels { .. } => "vessels",
            QueryRequest::Schedule { .. } => "schedule",
            QueryRequest::CheapestRoute { .. } => "cheapest_route",
            QueryRequest::MostExpensiveRoute => "most_expensive_route",
            QueryRequest::Suggestions { .. } => "suggestions",
        }
    }
}

impl fmt::Display for QueryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// Result of [`execute`], tagged with the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", content = "result", rename_all = "snake_case")]
pub enum QueryOutcome {
    AllRoutes(Vec<Route>),
    RoutesByPorts(Vec<Route>),
    PriceLookup(PriceList),
    ShortestDuration {
        origin: String,
        destination: String,
        shortest: Option<DurationResult>,
    },
    Availability(Availability),
    IndirectRoute {
        origin: String,
        destination: String,
        routes: Vec<IndirectRoute>,
    },
    Vessels(VesselList),
    Schedule {
        origin: String,
        departures: Vec<ScheduleEntry>,
    },
    CheapestRoute {
        origin: String,
        destination: String,
        cheapest: Option<PriceQuote>,
    },
    MostExpensiveRoute(Option<PriceQuote>),
    Suggestions(Suggestions),
}

impl QueryOutcome {
    /// Whether the query matched no rows.
    pub fn is_empty(&self) -> bool {
        match self {
            QueryOutcome::AllRoutes(routes) | QueryOutcome::RoutesByPorts(routes) => {
                routes.is_empty()
            }
            QueryOutcome::PriceLookup(list) => list.prices.is_empty(),
            QueryOutcome::ShortestDuration { shortest, .. } => shortest.is_none(),
            QueryOutcome::Availability(availability) => {
                availability.available_services.is_empty()
            }
            QueryOutcome::IndirectRoute { routes, .. } => routes.is_empty(),
            QueryOutcome::Vessels(list) => list.vessels.is_empty(),
            QueryOutcome::Schedule { departures, .. } => departures.is_empty(),
            QueryOutcome::CheapestRoute { cheapest, .. } => cheapest.is_none(),
            QueryOutcome::MostExpensiveRoute(quote) => quote.is_none(),
            QueryOutcome::Suggestions(suggestions) => suggestions.is_empty(),
        }
    }

    /// Render the outcome as human-readable text.
    pub fn render(&self) -> String {
        match self {
            QueryOutcome::AllRoutes(routes) | QueryOutcome::RoutesByPorts(routes) => {
                output::format_routes(routes)
            }
            QueryOutcome::PriceLookup(list) => output::format_prices(list),
            QueryOutcome::ShortestDuration {
                origin,
                destination,
                shortest,
            } => output::format_duration(origin, destination, shortest.as_ref()),
            QueryOutcome::Availability(availability) => output::format_availability(availability),
            QueryOutcome::IndirectRoute {
                origin,
                destination,
                routes,
            } => output::format_indirect_routes(origin, destination, routes),
            QueryOutcome::Vessels(list) => output::format_vessels(list),
            QueryOutcome::Schedule { origin, departures } => {
                output::format_schedule(origin, departures)
            }
            QueryOutcome::CheapestRoute { cheapest, .. } => {
                output::format_price_quote("Cheapest fare", cheapest.as_ref())
            }
            QueryOutcome::MostExpensiveRoute(quote) => {
                output::format_price_quote("Most expensive fare", quote.as_ref())
            }
            QueryOutcome::Suggestions(suggestions) => output::format_suggestions(suggestions),
        }
    }
}

/// Run a [`QueryRequest`] against `store`.
pub fn execute(store: &RouteStore, request: &QueryRequest) -> Result<QueryOutcome> {
    let outcome = match request {
        QueryRequest::AllRoutes => QueryOutcome::AllRoutes(all_routes(store)),
        QueryRequest::RoutesByPorts {
            origin,
            destination,
        } => QueryOutcome::RoutesByPorts(routes_by_ports(store, origin, destination)?),
        QueryRequest::PriceLookup { route_id } => {
            QueryOutcome::PriceLookup(price_lookup(store, route_id)?)
        }
        QueryRequest::ShortestDuration {
            origin,
            destination,
        } => QueryOutcome::ShortestDuration {
            shortest: shortest_duration(store, origin, destination)?,
            origin: origin.clone(),
            destination: destination.clone(),
        },
        QueryRequest::Availability {
            origin,
            destination,
            date,
        } => {
            let date = parse_travel_date(date)?;
            QueryOutcome::Availability(availability(store, origin, destination, date)?)
        }
        QueryRequest::IndirectRoute {
            origin,
            destination,
        } => QueryOutcome::IndirectRoute {
            routes: indirect_routes(store, origin, destination)?,
            origin: origin.clone(),
            destination: destination.clone(),
        },
        QueryRequest::Vessels { route_id } => QueryOutcome::Vessels(vessels(store, route_id)?),
        QueryRequest::Schedule { origin } => QueryOutcome::Schedule {
            departures: schedule(store, origin)?,
            origin: origin.clone(),
        },
        QueryRequest::CheapestRoute {
            origin,
            destination,
        } => QueryOutcome::CheapestRoute {
            cheapest: cheapest_route(store, origin, destination)?,
            origin: origin.clone(),
            destination: destination.clone(),
        },
        QueryRequest::MostExpensiveRoute => {
            QueryOutcome::MostExpensiveRoute(most_expensive_route(store))
        }
        QueryRequest::Suggestions { origin, date } => {
            let date = date.as_deref().map(parse_travel_date).transpose()?;
            QueryOutcome::Suggestions(suggestions(store, origin.as_deref(), date)?)
        }
    };
    Ok(outcome)
}
