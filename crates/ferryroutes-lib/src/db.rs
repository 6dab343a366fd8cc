use std::path::Path;

use rusqlite::{Connection, OpenFlags, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{parse_travel_date, DateVessel, Route, VesselPrice};
use crate::store::RouteStore;

/// Table holding one row per scheduled route.
pub const ROUTES_TABLE: &str = "routes";
/// Table holding vessel prices keyed by route.
pub const PRICES_TABLE: &str = "vessels_and_prices";
/// Table holding vessels by travel date keyed by route.
pub const DATES_TABLE: &str = "dates_and_vessels";

const ROUTE_COLUMNS: &[&str] = &[
    "route_id",
    "company",
    "origin_port",
    "destination_port",
    "departure_time",
    "arrival_time",
    "duration",
];
const PRICE_COLUMNS: &[&str] = &["id", "route_id", "vessel", "price"];
const DATE_COLUMNS: &[&str] = &["id", "route_id", "travel_date", "vessel"];

const SCHEMA_SQL: &str = r#"
    DROP TABLE IF EXISTS dates_and_vessels;
    DROP TABLE IF EXISTS vessels_and_prices;
    DROP TABLE IF EXISTS routes;
    CREATE TABLE routes (
        route_id TEXT PRIMARY KEY,
        company TEXT NOT NULL,
        origin_port TEXT NOT NULL,
        destination_port TEXT NOT NULL,
        departure_time TEXT NOT NULL,
        arrival_time TEXT NOT NULL,
        duration INTEGER NOT NULL
    );
    CREATE TABLE vessels_and_prices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        route_id TEXT NOT NULL REFERENCES routes(route_id),
        vessel TEXT NOT NULL,
        price INTEGER NOT NULL
    );
    CREATE TABLE dates_and_vessels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        route_id TEXT NOT NULL REFERENCES routes(route_id),
        travel_date TEXT NOT NULL,
        vessel TEXT NOT NULL
    );
    CREATE INDEX idx_routes_ports ON routes (origin_port, destination_port);
    CREATE INDEX idx_prices_route ON vessels_and_prices (route_id);
    CREATE INDEX idx_dates_route ON dates_and_vessels (route_id, travel_date);
"#;

/// Which optional satellite tables a database provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SchemaLayout {
    has_prices: bool,
    has_dates: bool,
}

/// Load routes, prices, and dates from a SQLite database into a [`RouteStore`].
///
/// The database is opened read-only. The `routes` table is required; the
/// satellite tables are optional and load as empty when absent.
pub fn load_store(db_path: &Path) -> Result<RouteStore> {
    if !db_path.exists() {
        return Err(Error::StoreUnavailable {
            path: db_path.to_path_buf(),
        });
    }

    let connection = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    debug!(path = %db_path.display(), "loading route store");
    let store = load_from_connection(&connection)?;
    info!(
        path = %db_path.display(),
        routes = store.all_routes().len(),
        prices = store.all_prices().len(),
        dates = store.all_dates().len(),
        "route store loaded"
    );
    Ok(store)
}

/// Load a [`RouteStore`] from an already-open connection.
pub fn load_from_connection(connection: &Connection) -> Result<RouteStore> {
    let layout = detect_schema(connection)?;

    let routes = load_routes(connection)?;
    let prices = if layout.has_prices {
        load_prices(connection)?
    } else {
        debug!(table = PRICES_TABLE, "table absent, no price data");
        Vec::new()
    };
    let dates = if layout.has_dates {
        load_dates(connection)?
    } else {
        debug!(table = DATES_TABLE, "table absent, no schedule data");
        Vec::new()
    };

    RouteStore::from_records(routes, prices, dates)
}

/// Drop and recreate the three dataset tables.
pub fn create_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

fn detect_schema(connection: &Connection) -> Result<SchemaLayout> {
    if !table_exists(connection, ROUTES_TABLE)? {
        return Err(Error::UnsupportedSchema {
            missing: format!("table '{ROUTES_TABLE}'"),
        });
    }
    require_columns(connection, ROUTES_TABLE, ROUTE_COLUMNS)?;

    let has_prices = table_exists(connection, PRICES_TABLE)?;
    if has_prices {
        require_columns(connection, PRICES_TABLE, PRICE_COLUMNS)?;
    }
    let has_dates = table_exists(connection, DATES_TABLE)?;
    if has_dates {
        require_columns(connection, DATES_TABLE, DATE_COLUMNS)?;
    }

    Ok(SchemaLayout {
        has_prices,
        has_dates,
    })
}

fn load_routes(connection: &Connection) -> Result<Vec<Route>> {
    let sql = format!(
        "SELECT {columns} FROM {ROUTES_TABLE} ORDER BY rowid",
        columns = ROUTE_COLUMNS.join(", ")
    );
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], row_to_route)?;

    let mut routes = Vec::new();
    for entry in rows {
        routes.push(entry?);
    }
    Ok(routes)
}

fn load_prices(connection: &Connection) -> Result<Vec<VesselPrice>> {
    let sql = format!(
        "SELECT {columns} FROM {PRICES_TABLE} ORDER BY id",
        columns = PRICE_COLUMNS.join(", ")
    );
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok(VesselPrice {
            id: row.get(0)?,
            route_id: row.get(1)?,
            vessel: row.get(2)?,
            price: row.get(3)?,
        })
    })?;

    let mut prices = Vec::new();
    for entry in rows {
        prices.push(entry?);
    }
    Ok(prices)
}

fn load_dates(connection: &Connection) -> Result<Vec<DateVessel>> {
    let sql = format!(
        "SELECT {columns} FROM {DATES_TABLE} ORDER BY id",
        columns = DATE_COLUMNS.join(", ")
    );
    let mut stmt = connection.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut dates = Vec::new();
    for entry in rows {
        let (id, route_id, raw_date, vessel) = entry?;
        let travel_date = parse_travel_date(&raw_date).map_err(|_| {
            Error::invalid(
                "travel_date",
                format!("row {id} has malformed date '{raw_date}'"),
            )
        })?;
        dates.push(DateVessel {
            id,
            route_id,
            travel_date,
            vessel,
        });
    }
    Ok(dates)
}

fn row_to_route(row: &Row<'_>) -> rusqlite::Result<Route> {
    Ok(Route {
        route_id: row.get(0)?,
        company: row.get(1)?,
        origin_port: row.get(2)?,
        destination_port: row.get(3)?,
        departure_time: row.get(4)?,
        arrival_time: row.get(5)?,
        duration: row.get(6)?,
    })
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn require_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<()> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|required| {
            !columns
                .iter()
                .any(|column| column.eq_ignore_ascii_case(required))
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::UnsupportedSchema {
            missing: format!("columns {} in '{table}'", missing.join(", ")),
        })
    }
}
