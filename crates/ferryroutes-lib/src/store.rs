//! In-memory, read-only route store with indexed lookups.
//!
//! The store is built once from loaded records and never mutated afterwards,
//! so it can be shared between threads behind an `Arc` without locking.
//! Every lookup preserves storage (load) order, which is what makes the
//! "first encountered" tie-breaks in the query engine deterministic.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{DateVessel, Route, RouteId, VesselPrice};

/// Minimum Jaro-Winkler similarity for a port to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Indexed, immutable collection of routes and their satellite records.
#[derive(Debug, Clone, Default)]
pub struct RouteStore {
    routes: Vec<Route>,
    prices: Vec<VesselPrice>,
    dates: Vec<DateVessel>,
    by_id: HashMap<RouteId, usize>,
    by_origin: HashMap<String, Vec<usize>>,
    by_ports: HashMap<(String, String), Vec<usize>>,
    prices_by_route: HashMap<RouteId, Vec<usize>>,
    dates_by_route: HashMap<RouteId, Vec<usize>>,
}

impl RouteStore {
    /// Build a store from raw records.
    ///
    /// Duplicate route identifiers are rejected. Price and date rows that
    /// reference an unknown route are dropped with a warning so that the
    /// referential invariant holds for every record the store exposes.
    pub fn from_records(
        routes: Vec<Route>,
        prices: Vec<VesselPrice>,
        dates: Vec<DateVessel>,
    ) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(routes.len());
        let mut by_origin: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_ports: HashMap<(String, String), Vec<usize>> = HashMap::new();

        for (index, route) in routes.iter().enumerate() {
            if by_id.insert(route.route_id.clone(), index).is_some() {
                return Err(Error::DuplicateRoute {
                    route_id: route.route_id.clone(),
                });
            }
            by_origin
                .entry(route.origin_port.clone())
                .or_default()
                .push(index);
            by_ports
                .entry((route.origin_port.clone(), route.destination_port.clone()))
                .or_default()
                .push(index);
        }

        let (prices, orphan_prices) = retain_known(prices, &by_id, |p| &p.route_id);
        let (dates, orphan_dates) = retain_known(dates, &by_id, |d| &d.route_id);
        if orphan_prices > 0 || orphan_dates > 0 {
            warn!(
                orphan_prices,
                orphan_dates, "ignored satellite rows referencing unknown routes",
            );
        }

        let prices_by_route = group_by_route(&prices, |p| &p.route_id);
        let dates_by_route = group_by_route(&dates, |d| &d.route_id);

        debug!(
            routes = routes.len(),
            prices = prices.len(),
            dates = dates.len(),
            "route store indexed"
        );

        Ok(Self {
            routes,
            prices,
            dates,
            by_id,
            by_origin,
            by_ports,
            prices_by_route,
            dates_by_route,
        })
    }

    /// All routes in storage order.
    pub fn all_routes(&self) -> &[Route] {
        &self.routes
    }

    /// All price rows in storage order.
    pub fn all_prices(&self) -> &[VesselPrice] {
        &self.prices
    }

    /// All date/vessel rows in storage order.
    pub fn all_dates(&self) -> &[DateVessel] {
        &self.dates
    }

    /// Whether the store holds no routes at all.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Lookup a route by its primary key.
    pub fn find_by_id(&self, route_id: &str) -> Result<&Route> {
        self.get(route_id).ok_or_else(|| Error::RouteNotFound {
            route_id: route_id.to_string(),
        })
    }

    /// Lookup a route by its primary key, returning `None` when absent.
    pub fn get(&self, route_id: &str) -> Option<&Route> {
        self.by_id.get(route_id).map(|&index| &self.routes[index])
    }

    /// Routes whose origin and destination match exactly (case-sensitive).
    pub fn find_by_ports(&self, origin: &str, destination: &str) -> Vec<&Route> {
        self.by_ports
            .get(&(origin.to_string(), destination.to_string()))
            .map(|indices| self.resolve(indices))
            .unwrap_or_default()
    }

    /// Routes departing from `origin` (case-sensitive exact match).
    pub fn departures_from(&self, origin: &str) -> Vec<&Route> {
        self.by_origin
            .get(origin)
            .map(|indices| self.resolve(indices))
            .unwrap_or_default()
    }

    /// Whether at least one route connects `origin` directly to `destination`.
    pub fn has_direct_route(&self, origin: &str, destination: &str) -> bool {
        self.by_ports
            .contains_key(&(origin.to_string(), destination.to_string()))
    }

    /// Price rows recorded against `route_id`.
    pub fn prices_for(&self, route_id: &str) -> Vec<&VesselPrice> {
        self.prices_by_route
            .get(route_id)
            .map(|indices| indices.iter().map(|&i| &self.prices[i]).collect())
            .unwrap_or_default()
    }

    /// Date/vessel rows recorded against `route_id`.
    pub fn dates_for(&self, route_id: &str) -> Vec<&DateVessel> {
        self.dates_by_route
            .get(route_id)
            .map(|indices| indices.iter().map(|&i| &self.dates[i]).collect())
            .unwrap_or_default()
    }

    /// Every distinct port name (origins and destinations), sorted.
    pub fn ports(&self) -> Vec<&str> {
        self.routes
            .iter()
            .flat_map(|route| [route.origin_port.as_str(), route.destination_port.as_str()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Ports whose name contains `fragment`, ignoring case.
    pub fn search_ports(&self, fragment: &str) -> Vec<&str> {
        let needle = fragment.to_lowercase();
        self.ports()
            .into_iter()
            .filter(|port| port.to_lowercase().contains(&needle))
            .collect()
    }

    /// Ports with names similar to `name`, best match first.
    pub fn port_suggestions(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .ports()
            .into_iter()
            .map(|port| (strsim::jaro_winkler(&needle, &port.to_lowercase()), port))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, port)| port.to_string())
            .collect()
    }

    fn resolve(&self, indices: &[usize]) -> Vec<&Route> {
        indices.iter().map(|&index| &self.routes[index]).collect()
    }
}

fn retain_known<T>(
    rows: Vec<T>,
    known: &HashMap<RouteId, usize>,
    route_id: impl Fn(&T) -> &RouteId,
) -> (Vec<T>, usize) {
    let total = rows.len();
    let kept: Vec<T> = rows
        .into_iter()
        .filter(|row| known.contains_key(route_id(row)))
        .collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

fn group_by_route<T>(
    rows: &[T],
    route_id: impl Fn(&T) -> &RouteId,
) -> HashMap<RouteId, Vec<usize>> {
    let mut grouped: HashMap<RouteId, Vec<usize>> = HashMap::new();
    for (index, row) in rows.iter().enumerate() {
        grouped.entry(route_id(row).clone()).or_default().push(index);
    }
    grouped
}
