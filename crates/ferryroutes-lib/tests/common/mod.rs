//! Common test utilities and fixture helpers.

use std::path::PathBuf;

use ferryroutes_lib::{import_json, load_store, RouteStore};
use tempfile::TempDir;

/// Path to fixtures directory shared by the workspace.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture_json_path() -> PathBuf {
    fixtures_dir().join("ferry_routes.json")
}

/// Temporary SQLite database populated from the JSON fixture.
///
/// The directory is removed when the value is dropped.
pub struct FixtureDb {
    pub dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl FixtureDb {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("routes.db");
        import_json(&fixture_json_path(), &path).expect("import fixture dataset");
        Self { dir, path }
    }

    pub fn load(&self) -> RouteStore {
        load_store(&self.path).expect("load fixture store")
    }
}
