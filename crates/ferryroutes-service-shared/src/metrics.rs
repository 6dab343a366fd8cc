//! Prometheus metrics for the ferry services.
//!
//! - [`MetricsConfig`] / [`init_metrics`]: install the Prometheus recorder
//! - [`metrics_handler`]: axum handler for `/metrics`
//! - `record_*`: business counters for queries and chat completions
//!
//! ```no_run
//! use ferryroutes_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! init_metrics(&MetricsConfig::default()).expect("failed to initialize metrics");
//! let app: Router = Router::new().route("/metrics", get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Path the exposition endpoint is mounted on.
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Read `METRICS_ENABLED` (default true) and `METRICS_PATH` (default `/metrics`).
    pub fn from_env() -> Self {
        let enabled = std::env::var("METRICS_ENABLED")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);
        let path = std::env::var("METRICS_PATH").unwrap_or_else(|_| "/metrics".to_string());

        Self { enabled, path }
    }
}

/// Install the Prometheus recorder. Must run once, before any metric is recorded.
///
/// # Errors
///
/// Fails when metrics are disabled, when a recorder is already installed, or
/// when the exporter cannot be built.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    Ok(())
}

pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Prometheus exposition text, or a comment line when metrics are off.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

#[derive(Debug, Clone)]
pub enum MetricsError {
    Disabled,
    AlreadyInitialized,
    InstallFailed(String),
}

impl std::fmt::Display for MetricsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricsError::Disabled => write!(f, "metrics are disabled"),
            MetricsError::AlreadyInitialized => write!(f, "metrics recorder already initialized"),
            MetricsError::InstallFailed(e) => {
                write!(f, "failed to install metrics recorder: {}", e)
            }
        }
    }
}

impl std::error::Error for MetricsError {}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Count a query that returned at least one record, and its result size.
pub fn record_query_served(operation: &str, results: usize) {
    metrics::counter!(
        "ferry_queries_served_total",
        "operation" => operation.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "ferry_query_results",
        "operation" => operation.to_string()
    )
    .record(results as f64);
}

/// Count a query that matched nothing (reported to clients as 404).
pub fn record_query_empty(operation: &str) {
    metrics::counter!(
        "ferry_queries_empty_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Count a query rejected or aborted with an error.
///
/// `reason` is one of `invalid_input`, `store_unavailable`, `internal`.
pub fn record_query_failed(operation: &str, reason: &str) {
    metrics::counter!(
        "ferry_queries_failed_total",
        "operation" => operation.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Count a chat completion attempt by outcome (`ok`, `unconfigured`, `upstream_error`).
pub fn record_chat_completion(model: &str, outcome: &str) {
    metrics::counter!(
        "ferry_chat_completions_total",
        "model" => model.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
