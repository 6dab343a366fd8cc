//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use ferryroutes_lib::Error as LibError;

use crate::llm::ChatError;

/// Problem type URI for queries that matched no data.
pub const PROBLEM_NOT_FOUND: &str = "/problems/not-found";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for service unavailable (store missing, chat unconfigured).
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// Problem type URI for failures of the hosted chat model.
pub const PROBLEM_UPSTREAM_ERROR: &str = "/problems/upstream-error";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use ferryroutes_service_shared::{ProblemDetails, PROBLEM_NOT_FOUND};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND)
///     .with_detail("No routes found.")
///     .with_request_id("req-12345");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (e.g., request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Content type for this response (always "application/problem+json").
    pub content_type: String,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for malformed ports, route ids, dates, or bodies.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for a query that matched nothing.
    pub fn not_found(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND)
            .with_detail(detail)
            .with_request_id(request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 502 Bad Gateway when the hosted model call fails.
    pub fn upstream_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_UPSTREAM_ERROR,
            "Upstream Error",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::InvalidInput { .. } => ProblemDetails::bad_request(error.to_string(), request_id),
        LibError::RouteNotFound { route_id } => {
            ProblemDetails::not_found(format!("Route '{route_id}' not found."), request_id)
        }
        LibError::StoreUnavailable { path } => ProblemDetails::service_unavailable(
            format!("Route store not available at {}", path.display()),
            request_id,
        ),
        err if err.is_store_failure() => {
            ProblemDetails::service_unavailable(err.to_string(), request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

/// Convert chat client errors to ProblemDetails.
///
/// Upstream response bodies stay in the logs; the detail only names the status.
pub fn from_chat_error(error: &ChatError, request_id: &str) -> ProblemDetails {
    match error {
        ChatError::NotConfigured => ProblemDetails::service_unavailable(
            "Chat model is not configured; set GROQ_API_KEY",
            request_id,
        ),
        ChatError::Status { status, .. } => ProblemDetails::upstream_error(
            format!("AI chat error: chat model returned HTTP {status}"),
            request_id,
        ),
        ChatError::Http(_) => {
            ProblemDetails::upstream_error("AI chat error: chat model unreachable", request_id)
        }
        ChatError::EmptyResponse => {
            ProblemDetails::upstream_error(format!("AI chat error: {error}"), request_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_problem_details_new() {
        let problem = ProblemDetails::new(PROBLEM_NOT_FOUND, "Not Found", StatusCode::NOT_FOUND);
        assert_eq!(problem.type_uri, PROBLEM_NOT_FOUND);
        assert_eq!(problem.status, 404);
        assert_eq!(problem.content_type, "application/problem+json");
    }

    #[test]
    fn test_problem_details_serialization() {
        let problem = ProblemDetails::bad_request("Test error", "req-test");
        let json = serde_json::to_string(&problem).unwrap();

        assert!(json.contains("\"type\":\"/problems/invalid-request\""));
        assert!(json.contains("\"title\":\"Invalid Request\""));
        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"detail\":\"Test error\""));
        assert!(json.contains("\"instance\":\"req-test\""));
    }

    #[test]
    fn test_from_lib_error_invalid_input() {
        let error = LibError::invalid("date", "'tomorrow' is not a YYYY-MM-DD date");
        let problem = from_lib_error(&error, "req-lib");

        assert_eq!(problem.status, 400);
        assert!(problem.detail.as_deref().unwrap().contains("tomorrow"));
    }

    #[test]
    fn test_from_lib_error_route_not_found() {
        let error = LibError::RouteNotFound {
            route_id: "R42".to_string(),
        };
        let problem = from_lib_error(&error, "req-route");

        assert_eq!(problem.type_uri, PROBLEM_NOT_FOUND);
        assert!(problem.detail.as_deref().unwrap().contains("R42"));
    }

    #[test]
    fn test_store_failures_are_unavailable() {
        let missing = LibError::StoreUnavailable {
            path: PathBuf::from("/data/routes.db"),
        };
        assert_eq!(from_lib_error(&missing, "r").status, 503);

        let schema = LibError::UnsupportedSchema {
            missing: "table 'routes'".to_string(),
        };
        assert_eq!(from_lib_error(&schema, "r").status, 503);
    }

    #[test]
    fn test_chat_errors_map_to_gateway_statuses() {
        assert_eq!(from_chat_error(&ChatError::NotConfigured, "r").status, 503);
        assert_eq!(from_chat_error(&ChatError::EmptyResponse, "r").status, 502);
        let status = ChatError::Status {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(from_chat_error(&status, "r").status, 502);
    }

    #[test]
    fn test_upstream_body_is_not_returned_to_client() {
        let error = ChatError::Status {
            status: 401,
            body: r#"{"error":"invalid key gsk_live_123"}"#.to_string(),
        };
        let problem = from_chat_error(&error, "req-chat");
        let detail = problem.detail.as_deref().unwrap();

        assert_eq!(detail, "AI chat error: chat model returned HTTP 401");
        assert!(!detail.contains("gsk_live_123"));
    }
}
