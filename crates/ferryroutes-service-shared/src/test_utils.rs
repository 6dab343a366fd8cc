//! Test utilities for service handler testing.
//!
//! Provides a route store built from the shared JSON fixture and a stub
//! chat model that answers without network access.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use ferryroutes_lib::{DatasetFile, RouteStore};

use crate::llm::{ChatError, ChatModel};
use crate::state::AppState;

/// Path to the shared JSON fixture.
pub const TEST_FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../docs/fixtures/ferry_routes.json"
);

static FIXTURE_STORE: OnceLock<RouteStore> = OnceLock::new();

/// Route store built from the JSON fixture, cached after the first call.
///
/// # Panics
///
/// Panics if the fixture cannot be parsed. This indicates a test
/// configuration issue.
pub fn fixture_store() -> RouteStore {
    FIXTURE_STORE
        .get_or_init(|| {
            let path = PathBuf::from(TEST_FIXTURE_PATH);
            DatasetFile::from_path(&path)
                .and_then(DatasetFile::into_store)
                .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e))
        })
        .clone()
}

/// AppState over the fixture store with chat disabled.
pub fn test_state() -> AppState {
    AppState::from_components(fixture_store(), None)
}

/// Known values in the fixture for use in tests.
pub mod fixture_ports {
    pub const PIRAEUS: &str = "Piraeus";
    pub const NAXOS: &str = "Naxos";
    pub const PAROS: &str = "Paros";
    pub const RAFINA: &str = "Rafina";
    pub const MYKONOS: &str = "Mykonos";
    /// Date with sailings on both Piraeus to Naxos routes.
    pub const BUSY_DATE: &str = "2024-07-15";
}

/// Chat model returning a canned reply and recording every prompt it saw.
#[derive(Debug, Default)]
pub struct StubChatModel {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubChatModel {
    /// Stub that answers every prompt with `reply`.
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    /// Stub whose every call fails with [`ChatError::EmptyResponse`].
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatModel for StubChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.reply.clone().ok_or(ChatError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    uuid::Uuid::now_v7().to_string()
}
