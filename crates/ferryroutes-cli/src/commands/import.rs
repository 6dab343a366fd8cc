//! Import command handler: load a JSON dataset into the SQLite store.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use ferryroutes_lib::{import_json, resolve_dataset_path, ImportSummary};

use crate::output::{render_json, OutputFormat};
use crate::terminal::format_with_separators;

/// Output structure for the import command.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutput {
    pub database: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

/// Handle the import subcommand.
///
/// Replaces the contents of the resolved dataset with `json_path`.
pub fn handle_import(json_path: &Path, data_dir: Option<&Path>, format: OutputFormat) -> Result<()> {
    let database = resolve_dataset_path(data_dir).context("failed to resolve dataset location")?;
    let summary = import_json(json_path, &database).with_context(|| {
        format!(
            "failed to import {} into {}",
            json_path.display(),
            database.display()
        )
    })?;

    let output = ImportOutput {
        database: database.display().to_string(),
        summary,
    };
    match format {
        OutputFormat::Text => println!(
            "Imported {} routes, {} prices and {} schedule entries into {}",
            format_with_separators(output.summary.routes),
            format_with_separators(output.summary.prices),
            format_with_separators(output.summary.dates),
            output.database
        ),
        OutputFormat::Json => render_json(&output)?,
    }
    Ok(())
}
