//! Ferry routes library entry points.
//!
//! This crate loads the ferry dataset (routes, vessel prices, and
//! vessel-by-date schedules) into an immutable in-memory store, answers the
//! query operations over it, and renders results as text. Higher-level
//! consumers (CLI, HTTP service) should only depend on the functions exported
//! here instead of reimplementing behavior.

pub mod chat;
pub mod dataset;
pub mod db;
pub mod error;
pub mod model;
pub mod output;
pub mod query;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use chat::{ChatTurn, ConversationContext, Role, DEFAULT_HISTORY_TURNS, PROMPT_INSTRUCTIONS};
pub use dataset::{
    default_dataset_path, import_dataset, import_json, resolve_dataset_path, DatasetFile,
    ImportSummary,
};
pub use db::{load_from_connection, load_store};
pub use error::{Error, Result};
pub use model::{DateVessel, Route, RouteId, VesselPrice};
pub use query::{execute, QueryOutcome, QueryRequest};
pub use store::RouteStore;
