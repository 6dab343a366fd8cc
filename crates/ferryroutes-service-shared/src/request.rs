//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use ferryroutes_lib::ChatTurn;

use crate::ProblemDetails;

/// Longest chat query accepted, in characters.
pub const MAX_CHAT_QUERY_CHARS: usize = 4000;

/// Longest history turn accepted, in characters. Replies may run longer than queries.
pub const MAX_CHAT_TURN_CHARS: usize = 2 * MAX_CHAT_QUERY_CHARS;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/v1/chat`.
///
/// `history` is the conversation so far as returned by the previous call;
/// the server keeps no history of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub query: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ChatTurn>,
}

impl Validate for ChatRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.query.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'query' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.query.chars().count() > MAX_CHAT_QUERY_CHARS {
            return Err(Box::new(ProblemDetails::bad_request(
                format!("The 'query' field cannot exceed {MAX_CHAT_QUERY_CHARS} characters"),
                request_id,
            )));
        }

        if let Some(index) = self
            .history
            .iter()
            .position(|turn| turn.content.chars().count() > MAX_CHAT_TURN_CHARS)
        {
            return Err(Box::new(ProblemDetails::bad_request(
                format!("history[{index}] cannot exceed {MAX_CHAT_TURN_CHARS} characters"),
                request_id,
            )));
        }

        Ok(())
    }
}

/// Query string of `GET /chat/?query=...`, a single turn with no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQueryParams {
    #[serde(default)]
    pub query: String,
}

impl From<ChatQueryParams> for ChatRequest {
    fn from(params: ChatQueryParams) -> Self {
        Self {
            query: params.query,
            history: Vec::new(),
        }
    }
}

/// Reply from `POST /api/v1/chat` and `GET /chat/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub history: Vec<ChatTurn>,
}

/// Query string of `GET /suggestions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionsParams {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl Validate for SuggestionsParams {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if matches!(self.origin.as_deref(), Some(origin) if origin.trim().is_empty()) {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'origin' parameter cannot be empty when present",
                request_id,
            )));
        }
        Ok(())
    }
}

/// Output format selected with `?format=`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FormatParams {
    #[serde(default)]
    pub format: ResponseFormat,
}
