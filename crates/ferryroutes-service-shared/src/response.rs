//! Response wrapper for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Wrapper for successful responses with content type metadata.
///
/// The payload is flattened into the top-level object, so `T` must
/// serialize as a map (a struct, not a bare list).
///
/// # Example
///
/// ```
/// use ferryroutes_service_shared::ServiceResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Duration {
///     shortest_duration: i64,
///     route_id: String,
/// }
///
/// let response = ServiceResponse::new(Duration { shortest_duration: 210, route_id: "R2".into() });
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    #[serde(flatten)]
    pub data: T,

    pub content_type: String,
}

/// Rendered text body returned when a caller asks for `format=text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub text: String,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            content_type: "application/json".to_string(),
        }
    }

    pub fn with_content_type(data: T, content_type: impl Into<String>) -> Self {
        Self {
            data,
            content_type: content_type.into(),
        }
    }
}

impl ServiceResponse<TextBody> {
    /// Wrap formatter output, tagged `text/plain`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_content_type(TextBody { text: text.into() }, "text/plain")
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
