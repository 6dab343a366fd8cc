//! Dataset location and JSON import.
//!
//! The JSON importer accepts either a bare array of route records or an
//! object carrying routes together with their price and schedule rows, and
//! replaces the contents of the SQLite database in a single transaction.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{create_schema, DATES_TABLE, PRICES_TABLE, ROUTES_TABLE};
use crate::error::{Error, Result};
use crate::model::{
    parse_travel_date, validate_route_id, DateVessel, Route, RouteId, VesselPrice,
};
use crate::store::RouteStore;

/// Default filename for the dataset database.
pub const DATASET_FILENAME: &str = "routes.db";

/// Environment variable overriding the dataset directory or file.
pub const DATA_DIR_ENV: &str = "FERRY_DATA_DIR";

/// Resolve the default dataset location using platform-specific project directories.
pub fn default_dataset_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "ferryroutes", "ferryroutes")
        .ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(DATASET_FILENAME))
}

/// Resolve the dataset database path.
///
/// Resolution order:
/// 1. Explicit `target` argument when provided.
/// 2. `FERRY_DATA_DIR` environment variable.
/// 3. Platform-specific project data directory.
///
/// Directories resolve to `routes.db` inside them.
pub fn resolve_dataset_path(target: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = target {
        return Ok(canonical_dataset_path(explicit));
    }

    if let Some(env_path) = env::var_os(DATA_DIR_ENV) {
        return Ok(canonical_dataset_path(Path::new(&env_path)));
    }

    default_dataset_path()
}

/// Existing directories and extensionless paths hold `routes.db`; anything
/// else names the database file itself.
fn canonical_dataset_path(path: &Path) -> PathBuf {
    if path.is_dir() || path.extension().is_none() {
        return path.join(DATASET_FILENAME);
    }

    path.to_path_buf()
}

/// Price row as it appears in the import file (identifier assigned on import).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub route_id: RouteId,
    pub vessel: String,
    pub price: i64,
}

/// Schedule row as it appears in the import file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    pub route_id: RouteId,
    pub travel_date: String,
    pub vessel: String,
}

/// Parsed contents of a dataset import file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFile {
    pub routes: Vec<Route>,
    #[serde(default)]
    pub vessels_and_prices: Vec<PriceRecord>,
    #[serde(default)]
    pub dates_and_vessels: Vec<DateRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DatasetDocument {
    RoutesOnly(Vec<Route>),
    Full(DatasetFile),
}

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub routes: usize,
    pub prices: usize,
    pub dates: usize,
}

impl DatasetFile {
    /// Parse a dataset document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: DatasetDocument = serde_json::from_str(text)?;
        Ok(match document {
            DatasetDocument::RoutesOnly(routes) => DatasetFile {
                routes,
                ..DatasetFile::default()
            },
            DatasetDocument::Full(file) => file,
        })
    }

    /// Read and parse a dataset document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check identifiers, dates, and route references before anything is written.
    pub fn validate(&self) -> Result<()> {
        let mut known = std::collections::HashSet::new();
        for route in &self.routes {
            validate_route_id(&route.route_id)?;
            if !known.insert(route.route_id.as_str()) {
                return Err(Error::DuplicateRoute {
                    route_id: route.route_id.clone(),
                });
            }
        }

        for price in &self.vessels_and_prices {
            ensure_known(&known, &price.route_id, PRICES_TABLE)?;
        }
        for date in &self.dates_and_vessels {
            ensure_known(&known, &date.route_id, DATES_TABLE)?;
            parse_travel_date(&date.travel_date)?;
        }
        Ok(())
    }

    /// Build an in-memory store, assigning row identifiers in file order.
    pub fn into_store(self) -> Result<RouteStore> {
        self.validate()?;

        let prices = self
            .vessels_and_prices
            .into_iter()
            .zip(1..)
            .map(|(record, id)| VesselPrice {
                id,
                route_id: record.route_id,
                vessel: record.vessel,
                price: record.price,
            })
            .collect();

        let mut dates = Vec::with_capacity(self.dates_and_vessels.len());
        for (record, id) in self.dates_and_vessels.into_iter().zip(1..) {
            dates.push(DateVessel {
                id,
                travel_date: parse_travel_date(&record.travel_date)?,
                route_id: record.route_id,
                vessel: record.vessel,
            });
        }

        RouteStore::from_records(self.routes, prices, dates)
    }
}

fn ensure_known(
    known: &std::collections::HashSet<&str>,
    route_id: &str,
    table: &str,
) -> Result<()> {
    if known.contains(route_id) {
        Ok(())
    } else {
        Err(Error::invalid(
            "route_id",
            format!("{table} row references unknown route '{route_id}'"),
        ))
    }
}

/// Replace the database contents at `db_path` with `dataset`.
///
/// Parent directories are created as needed. The tables are dropped,
/// recreated, and filled inside one transaction so a failed import leaves
/// the previous contents in place.
pub fn import_dataset(dataset: &DatasetFile, db_path: &Path) -> Result<ImportSummary> {
    dataset.validate()?;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut connection = Connection::open(db_path)?;
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    let tx = connection.transaction()?;
    create_schema(&tx)?;

    {
        let mut insert_route = tx.prepare(&format!(
            "INSERT INTO {ROUTES_TABLE} (route_id, company, origin_port, destination_port, \
             departure_time, arrival_time, duration) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
        ))?;
        for route in &dataset.routes {
            insert_route.execute(params![
                route.route_id,
                route.company,
                route.origin_port,
                route.destination_port,
                route.departure_time,
                route.arrival_time,
                route.duration,
            ])?;
        }

        let mut insert_price = tx.prepare(&format!(
            "INSERT INTO {PRICES_TABLE} (route_id, vessel, price) VALUES (?1, ?2, ?3)"
        ))?;
        for price in &dataset.vessels_and_prices {
            insert_price.execute(params![price.route_id, price.vessel, price.price])?;
        }

        let mut insert_date = tx.prepare(&format!(
            "INSERT INTO {DATES_TABLE} (route_id, travel_date, vessel) VALUES (?1, ?2, ?3)"
        ))?;
        for date in &dataset.dates_and_vessels {
            let travel_date = parse_travel_date(&date.travel_date)?;
            insert_date.execute(params![
                date.route_id,
                travel_date.format(crate::model::DATE_FORMAT).to_string(),
                date.vessel,
            ])?;
        }
    }

    tx.commit()?;

    let summary = ImportSummary {
        routes: dataset.routes.len(),
        prices: dataset.vessels_and_prices.len(),
        dates: dataset.dates_and_vessels.len(),
    };
    info!(
        path = %db_path.display(),
        routes = summary.routes,
        prices = summary.prices,
        dates = summary.dates,
        "dataset imported"
    );
    Ok(summary)
}

/// Read a JSON dataset from `json_path` and import it into `db_path`.
pub fn import_json(json_path: &Path, db_path: &Path) -> Result<ImportSummary> {
    let dataset = DatasetFile::from_path(json_path)?;
    import_dataset(&dataset, db_path)
}
