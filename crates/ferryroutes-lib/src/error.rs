use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the ferry routes library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Empty query results are not errors; the only not-found variant is
/// [`Error::RouteNotFound`], raised by single-record lookups on the primary key.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be located or opened at the resolved path.
    #[error("route store unavailable at {path}")]
    StoreUnavailable { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the dataset")]
    ProjectDirsUnavailable,

    /// Raised when the database does not contain the expected tables.
    #[error("unsupported dataset schema; expected a routes table with {missing}")]
    UnsupportedSchema { missing: String },

    /// Raised when a primary-key lookup matched no route.
    #[error("unknown route id: {route_id}")]
    RouteNotFound { route_id: String },

    /// Raised when a caller supplies a malformed identifier, port, or date.
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Raised when two routes in a dataset share the same identifier.
    #[error("duplicate route id in dataset: {route_id}")]
    DuplicateRoute { route_id: String },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::InvalidInput`] for the named field.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the underlying data source could not be used.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::StoreUnavailable { .. }
                | Error::UnsupportedSchema { .. }
                | Error::Sqlite(_)
                | Error::Io(_)
        )
    }
}
