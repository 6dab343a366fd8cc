//! Fixed-layout text rendering for query results.
//!
//! Multi-record results render one paragraph per record separated by a blank
//! line. Optional fields (price range, fares) are left out when absent.

use std::fmt::Write;

use crate::model::{Route, DATE_FORMAT};
use crate::query::{
    Availability, DurationResult, IndirectRoute, PriceList, PriceQuote, ScheduleEntry,
    Suggestions, VesselList,
};

const CURRENCY: &str = "€";

pub fn format_routes(routes: &[Route]) -> String {
    if routes.is_empty() {
        return "No routes found.".to_string();
    }

    paragraphs(routes.iter().map(|route| {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "{} Ferry ({})", route.company, route.route_id);
        let _ = writeln!(buffer, "From: {}", route.origin_port);
        let _ = writeln!(buffer, "To: {}", route.destination_port);
        let _ = writeln!(buffer, "Departure: {}", route.departure_time);
        let _ = writeln!(buffer, "Arrival: {}", route.arrival_time);
        let _ = write!(buffer, "Duration: {} min", route.duration);
        buffer
    }))
}

/// Fares for a route, cheapest first.
pub fn format_prices(list: &PriceList) -> String {
    if list.prices.is_empty() {
        return format!("Price data not found for route {}.", list.route_id);
    }

    let mut prices: Vec<_> = list.prices.iter().collect();
    prices.sort_by_key(|price| price.price);

    let mut buffer = format!("Route ID: {}", list.route_id);
    for price in prices {
        let _ = write!(buffer, "\n• {}: {CURRENCY}{}", price.vessel, price.price);
    }
    buffer
}

pub fn format_duration(origin: &str, destination: &str, result: Option<&DurationResult>) -> String {
    match result {
        Some(result) => format!(
            "The shortest duration from {} to {} is {} minutes (route {}).",
            result.origin, result.destination, result.shortest_duration, result.route_id
        ),
        None => format!("No duration data available from {origin} to {destination}."),
    }
}

pub fn format_availability(availability: &Availability) -> String {
    if availability.available_services.is_empty() {
        return format!(
            "No services available on {}",
            availability.date.format(DATE_FORMAT)
        );
    }

    paragraphs(availability.available_services.iter().map(|service| {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "{} Ferry", service.company);
        let _ = writeln!(buffer, "Departure: {}", service.departure_time);
        let _ = writeln!(buffer, "Duration: {} min", service.duration);
        let _ = write!(buffer, "Available Vessels: {}", service.vessels.join(", "));
        if let Some(lowest) = service.prices.iter().map(|p| p.price).min() {
            let _ = write!(buffer, "\nPrices from: {CURRENCY}{lowest}");
        }
        buffer
    }))
}

pub fn format_indirect_routes(origin: &str, destination: &str, routes: &[IndirectRoute]) -> String {
    if routes.is_empty() {
        return format!("No indirect route found from {origin} to {destination}.");
    }

    paragraphs(routes.iter().map(|journey| {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "{} -> {} -> {}",
            journey.origin, journey.stopover, journey.destination
        );
        let _ = writeln!(
            buffer,
            "First leg: {} to {} ({})",
            journey.first_leg.origin,
            journey.first_leg.destination,
            journey.first_leg.route_ids.join(", ")
        );
        let _ = write!(
            buffer,
            "Second leg: {} to {} ({})",
            journey.second_leg.origin,
            journey.second_leg.destination,
            journey.second_leg.route_ids.join(", ")
        );
        buffer
    }))
}

pub fn format_vessels(list: &VesselList) -> String {
    if list.vessels.is_empty() {
        return format!("No vessel found for route {}.", list.route_id);
    }

    let mut buffer = format!("Vessels on route {}:", list.route_id);
    for vessel in &list.vessels {
        let _ = write!(buffer, "\n• {vessel}");
    }
    buffer
}

pub fn format_schedule(origin: &str, departures: &[ScheduleEntry]) -> String {
    if departures.is_empty() {
        return format!("No departures found from {origin}.");
    }

    paragraphs(departures.iter().map(|entry| {
        let mut buffer = String::new();
        let _ = writeln!(buffer, "{} Ferry", entry.company);
        let _ = writeln!(buffer, "From: {}", entry.origin);
        let _ = writeln!(buffer, "To: {}", entry.destination);
        let _ = writeln!(buffer, "Departure: {}", entry.departure_time);
        let _ = writeln!(buffer, "Arrival: {}", entry.arrival_time);
        let _ = write!(buffer, "Duration: {} min", entry.duration);
        if let Some(range) = entry.price_range {
            let _ = write!(
                buffer,
                "\nPrice Range: {CURRENCY}{} - {CURRENCY}{}",
                range.min, range.max
            );
        }
        buffer
    }))
}

/// Single fare with a caller-supplied heading, e.g. "Cheapest fare".
pub fn format_price_quote(label: &str, quote: Option<&PriceQuote>) -> String {
    match quote {
        Some(quote) => format!(
            "{label}: {CURRENCY}{} on route {} ({})",
            quote.price, quote.route_id, quote.vessel
        ),
        None => "No price data available.".to_string(),
    }
}

pub fn format_suggestions(suggestions: &Suggestions) -> String {
    if suggestions.is_empty() {
        return "No alternative suggestions available.".to_string();
    }

    let mut sections = Vec::new();
    if let Some(origin) = &suggestions.origin {
        if !suggestions.destinations.is_empty() {
            sections.push(bulleted(
                &format!("Popular destinations from {origin}:"),
                &suggestions.destinations,
            ));
        }
        if !suggestions.similar_ports.is_empty() {
            sections.push(bulleted("Did you mean:", &suggestions.similar_ports));
        }
    }
    if !suggestions.popular_ports.is_empty() {
        sections.push(bulleted("Popular departure ports:", &suggestions.popular_ports));
    }
    if !suggestions.nearby_dates.is_empty() {
        let dates: Vec<String> = suggestions
            .nearby_dates
            .iter()
            .map(|date| date.format(DATE_FORMAT).to_string())
            .collect();
        sections.push(bulleted("Available dates:", &dates));
    }
    sections.join("\n\n")
}

fn bulleted(heading: &str, items: &[String]) -> String {
    let mut buffer = heading.to_string();
    for item in items {
        let _ = write!(buffer, "\n• {item}");
    }
    buffer
}

fn paragraphs(blocks: impl Iterator<Item = String>) -> String {
    blocks.collect::<Vec<_>>().join("\n\n")
}
