mod common;

use ferryroutes_lib::{
    import_dataset, import_json, load_store, DatasetFile, Error, Result, RouteStore,
};
use rusqlite::Connection;
use tempfile::{NamedTempFile, TempDir};

use common::{fixture_json_path, FixtureDb};

#[test]
fn import_then_load_round_trips_fixture() -> Result<()> {
    let fixture = FixtureDb::new();
    let store = fixture.load();

    let dataset = DatasetFile::from_path(&fixture_json_path())?;
    assert_eq!(store.all_routes(), dataset.routes.as_slice());
    assert_eq!(store.all_prices().len(), dataset.vessels_and_prices.len());
    assert_eq!(store.all_dates().len(), dataset.dates_and_vessels.len());

    let ids: Vec<i64> = store.all_prices().iter().map(|p| p.id).collect();
    assert_eq!(ids, (1..=dataset.vessels_and_prices.len() as i64).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn database_and_in_memory_stores_agree() -> Result<()> {
    let fixture = FixtureDb::new();
    let from_db = fixture.load();
    let in_memory = DatasetFile::from_path(&fixture_json_path())?.into_store()?;

    assert_eq!(from_db.all_routes(), in_memory.all_routes());
    assert_eq!(from_db.all_prices(), in_memory.all_prices());
    assert_eq!(from_db.all_dates(), in_memory.all_dates());
    Ok(())
}

#[test]
fn reimport_replaces_previous_contents() -> Result<()> {
    let fixture = FixtureDb::new();
    let smaller = DatasetFile::from_json(
        r#"[{"route_id": "X1", "company": "Solo", "origin_port": "Ios",
             "destination_port": "Sikinos", "departure_time": "09:00",
             "arrival_time": "09:40", "duration": 40}]"#,
    )?;

    let summary = import_dataset(&smaller, &fixture.path)?;
    assert_eq!((summary.routes, summary.prices, summary.dates), (1, 0, 0));

    let store = load_store(&fixture.path)?;
    assert_eq!(store.all_routes().len(), 1);
    assert!(store.all_prices().is_empty());
    Ok(())
}

#[test]
fn failed_import_keeps_existing_database() -> Result<()> {
    let fixture = FixtureDb::new();
    let broken = DatasetFile::from_json(
        r#"{"routes": [], "dates_and_vessels":
            [{"route_id": "R1", "travel_date": "2024-07-15", "vessel": "Ghost"}]}"#,
    )?;

    let err = import_dataset(&broken, &fixture.path).expect_err("orphan date rejected");
    assert!(matches!(err, Error::InvalidInput { .. }));
    assert!(!load_store(&fixture.path)?.is_empty());
    Ok(())
}

#[test]
fn import_creates_missing_parent_directories() -> Result<()> {
    let dir = TempDir::new()?;
    let target = dir.path().join("nested/data/routes.db");
    import_json(&fixture_json_path(), &target)?;
    assert!(target.exists());
    Ok(())
}

#[test]
fn routes_only_database_loads_with_empty_satellites() -> Result<()> {
    let file = NamedTempFile::new()?;
    let conn = Connection::open(file.path())?;
    conn.execute_batch(
        r#"
        CREATE TABLE routes (
            route_id TEXT PRIMARY KEY,
            company TEXT,
            origin_port TEXT,
            destination_port TEXT,
            departure_time TEXT,
            arrival_time TEXT,
            duration INTEGER
        );
        INSERT INTO routes VALUES ('R1', 'Blue Star Ferries', 'Piraeus', 'Naxos', '07:25', '11:25', 240);
        INSERT INTO routes VALUES ('R2', 'Seajets', 'Piraeus', 'Naxos', '07:00', '10:30', 210);
        "#,
    )?;
    drop(conn);

    let store = load_store(file.path())?;
    assert_eq!(store.all_routes().len(), 2);
    assert!(store.all_prices().is_empty());
    assert!(store.all_dates().is_empty());
    Ok(())
}

#[test]
fn missing_columns_are_reported() -> Result<()> {
    let file = NamedTempFile::new()?;
    let conn = Connection::open(file.path())?;
    conn.execute_batch("CREATE TABLE routes (route_id TEXT PRIMARY KEY, company TEXT);")?;
    drop(conn);

    let err = load_store(file.path()).expect_err("schema rejected");
    match err {
        Error::UnsupportedSchema { missing } => assert!(missing.contains("origin_port")),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn malformed_travel_date_is_invalid_input() -> Result<()> {
    let file = NamedTempFile::new()?;
    let conn = Connection::open(file.path())?;
    ferryroutes_lib::db::create_schema(&conn)?;
    conn.execute_batch(
        r#"
        INSERT INTO routes VALUES ('R1', 'Blue Star Ferries', 'Piraeus', 'Naxos', '07:25', '11:25', 240);
        INSERT INTO dates_and_vessels (route_id, travel_date, vessel) VALUES ('R1', '15/07/2024', 'Delos');
        "#,
    )?;
    drop(conn);

    let err = load_store(file.path()).expect_err("bad date rejected");
    assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "travel_date"));
    Ok(())
}

#[test]
fn missing_file_is_store_unavailable() {
    let dir = TempDir::new().expect("temp dir");
    let err = load_store(&dir.path().join("absent.db")).expect_err("missing database");
    assert!(err.is_store_failure());
}

#[test]
fn store_is_shareable_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RouteStore>();
}
