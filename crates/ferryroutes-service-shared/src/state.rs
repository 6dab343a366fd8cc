//! Application state for HTTP services.
//!
//! Holds the route store (immutable after load) and the optional hosted chat
//! model behind a single `Arc`, so cloning the state per request is cheap.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use ferryroutes_lib::{load_store, Error as LibError, RouteStore, DEFAULT_HISTORY_TURNS};

use crate::llm::ChatModel;

/// Error during application state initialization.
#[derive(Debug, Error)]
pub enum AppStateError {
    /// Failed to load the route store.
    #[error("failed to load route store: {0}")]
    StoreLoad(#[from] LibError),

    /// Database file not found.
    #[error("database not found: {0}")]
    DatabaseNotFound(String),
}

/// Shared application state for all axum handlers.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::get, extract::State};
/// use ferryroutes_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let routes = state.store().all_routes();
/// }
///
/// let state = AppState::load("routes.db").unwrap();
/// let app = Router::new()
///     .route("/routes", get(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: RouteStore,
    chat_model: Option<Arc<dyn ChatModel>>,
    history_turns: usize,
}

impl AppState {
    /// Load the route store from a SQLite database file.
    pub fn load(db_path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let db_path = db_path.as_ref();

        if !db_path.exists() {
            return Err(AppStateError::DatabaseNotFound(
                db_path.display().to_string(),
            ));
        }

        tracing::info!(path = %db_path.display(), "loading route store");
        let store = load_store(db_path)?;
        tracing::info!(
            route_count = store.all_routes().len(),
            "route store loaded successfully"
        );

        Ok(Self::from_components(store, None))
    }

    /// Create application state from an already-built store.
    pub fn from_components(store: RouteStore, chat_model: Option<Arc<dyn ChatModel>>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                chat_model,
                history_turns: DEFAULT_HISTORY_TURNS,
            }),
        }
    }

    /// Attach a chat model and history window, replacing any previous ones.
    pub fn with_chat(self, chat_model: Option<Arc<dyn ChatModel>>, history_turns: usize) -> Self {
        let inner = Arc::try_unwrap(self.inner).unwrap_or_else(|shared| AppStateInner {
            store: shared.store.clone(),
            chat_model: shared.chat_model.clone(),
            history_turns: shared.history_turns,
        });
        Self {
            inner: Arc::new(AppStateInner {
                chat_model,
                history_turns,
                ..inner
            }),
        }
    }

    pub fn store(&self) -> &RouteStore {
        &self.inner.store
    }

    pub fn chat_model(&self) -> Option<&Arc<dyn ChatModel>> {
        self.inner.chat_model.as_ref()
    }

    /// Number of conversation turns kept per chat request.
    pub fn history_turns(&self) -> usize {
        self.inner.history_turns
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("route_count", &self.inner.store.all_routes().len())
            .field(
                "chat_model",
                &self.inner.chat_model.as_ref().map(|m| m.model_name()),
            )
            .finish()
    }
}
