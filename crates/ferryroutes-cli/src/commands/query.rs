//! Query command handler shared by every read-only subcommand.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use ferryroutes_lib::{execute, load_store, resolve_dataset_path, QueryRequest, RouteStore};

use crate::output::OutputFormat;

/// Resolve and load the route store, pointing at `import` when it is missing.
pub fn open_store(data_dir: Option<&Path>) -> Result<RouteStore> {
    let database = resolve_dataset_path(data_dir).context("failed to resolve dataset location")?;
    if !database.exists() {
        bail!(
            "no dataset at {}; run `ferryroutes-cli import <json>` first",
            database.display()
        );
    }
    load_store(&database)
        .with_context(|| format!("failed to load dataset from {}", database.display()))
}

/// Run `request` and print the outcome. Empty results are not failures.
pub fn handle_query(
    data_dir: Option<&Path>,
    request: &QueryRequest,
    format: OutputFormat,
) -> Result<()> {
    let store = open_store(data_dir)?;
    tracing::debug!(operation = request.operation(), "running query");
    let outcome = execute(&store, request).with_context(|| format!("{request} query failed"))?;
    format.render_outcome(&outcome)?;
    Ok(())
}

/// Parse a query given inline or as `@path/to/query.json`.
pub fn parse_request(arg: &str) -> Result<QueryRequest> {
    let text = match arg.strip_prefix('@') {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read query file {path}"))?
        }
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("query is not a valid operation object")
}
