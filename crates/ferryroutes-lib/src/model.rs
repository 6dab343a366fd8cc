//! Plain record types for the ferry dataset and input validation helpers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a scheduled route (e.g. `"R1"`).
pub type RouteId = String;

/// Date format used by the dataset and by every date parameter.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A scheduled origin→destination service operated by a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: RouteId,
    pub company: String,
    pub origin_port: String,
    pub destination_port: String,
    pub departure_time: String,
    pub arrival_time: String,
    /// Duration in minutes.
    pub duration: i64,
}

/// Price charged by one vessel on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselPrice {
    pub id: i64,
    pub route_id: RouteId,
    pub vessel: String,
    pub price: i64,
}

/// Vessel serving a route on a given travel date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateVessel {
    pub id: i64,
    pub route_id: RouteId,
    pub travel_date: NaiveDate,
    pub vessel: String,
}

/// Reject empty, padded, or control-character port names.
pub fn validate_port(field: &str, value: &str) -> Result<()> {
    validate_identifier(field, value)
}

/// Reject empty, padded, or control-character route identifiers.
pub fn validate_route_id(value: &str) -> Result<()> {
    validate_identifier("route_id", value)
}

/// Parse a `YYYY-MM-DD` travel date.
pub fn parse_travel_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::invalid("date", format!("'{value}' is not a YYYY-MM-DD date")))
}

fn validate_identifier(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(field, "must not be empty"));
    }
    if value.trim() != value {
        return Err(Error::invalid(
            field,
            "must not have leading or trailing whitespace",
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(Error::invalid(field, "must not contain control characters"));
    }
    Ok(())
}
