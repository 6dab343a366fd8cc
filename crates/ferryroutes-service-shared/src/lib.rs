//! Shared infrastructure for the ferry route HTTP service.
//!
//! - [`AppState`]: route store loaded once at startup, plus the optional chat model
//! - [`health`]: liveness and readiness handlers
//! - [`ProblemDetails`]: RFC 9457 error bodies
//! - [`ServiceResponse`]: wrapper for successful responses with content type
//! - [`llm`]: chat model abstraction and the hosted Groq client
//! - [`metrics`]: Prometheus recorder and business counters
//! - [`logging`]: structured logging setup
//! - [`middleware`]: request ids and HTTP metrics
//!
//! Handlers stay thin: every query is answered by `ferryroutes-lib`, this
//! crate only turns HTTP requests into library calls and results back into
//! responses.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  axum handler                            │
//! │  - extract path / query / JSON body      │
//! │  - validate                              │
//! │  - call ferryroutes-lib                  │
//! │  - ServiceResponse or ProblemDetails     │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Enable the `test-utils` feature to use [`test_utils`] from dependent crates.

mod health;
pub mod llm;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use llm::{ChatConfig, ChatError, ChatModel, GroqChatModel};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_chat_completion, record_query_empty,
    record_query_failed, record_query_served, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    from_chat_error, from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR,
    PROBLEM_INVALID_REQUEST, PROBLEM_NOT_FOUND, PROBLEM_SERVICE_UNAVAILABLE,
    PROBLEM_UPSTREAM_ERROR,
};
pub use request::{
    ChatQueryParams, ChatReply, ChatRequest, FormatParams, ResponseFormat, SuggestionsParams, Validate,
    MAX_CHAT_QUERY_CHARS, MAX_CHAT_TURN_CHARS,
};
pub use response::{ServiceResponse, TextBody};
pub use state::{AppState, AppStateError};
