//! Health check handlers for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status indicator: "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Number of routes loaded (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes_loaded: Option<usize>,

    /// Whether the chat endpoint has a model configured (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_enabled: Option<bool>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            routes_loaded: None,
            chat_enabled: None,
        }
    }

    pub fn ready(service: &str, version: &str, routes: usize, chat_enabled: bool) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            routes_loaded: Some(routes),
            chat_enabled: Some(chat_enabled),
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            service: service.to_string(),
            version: version.to_string(),
            routes_loaded: None,
            chat_enabled: None,
        }
    }
}

/// Liveness probe handler. Always 200 while the process is serving.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"ferryroutes-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler. 503 until at least one route is loaded.
///
/// ```text
/// GET /health/ready
/// {"status":"ok",...,"routes_loaded":9,"chat_enabled":false}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let route_count = state.store().all_routes().len();
    if route_count == 0 {
        let status = HealthStatus::not_ready(service, version, "no routes loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(service, version, route_count, state.chat_model().is_some());
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;
    use ferryroutes_lib::RouteStore;

    #[test]
    fn test_health_status_ready() {
        let status = HealthStatus::ready("ferry", "1.0.0", 9, false);
        assert_eq!(status.status, "ok");
        assert_eq!(status.routes_loaded, Some(9));
        assert_eq!(status.chat_enabled, Some(false));
    }

    #[test]
    fn test_health_status_serialization_skips_probe_fields() {
        let status = HealthStatus::alive("ferry", "0.1.0");
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("routes_loaded"));
    }

    #[tokio::test]
    async fn test_ready_with_fixture() {
        let response = health_ready(State(test_state())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_ready_without_routes() {
        let state = AppState::from_components(RouteStore::default(), None);
        let response = health_ready(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
