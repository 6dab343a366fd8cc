//! Hosted chat model client.
//!
//! The chat endpoint talks to an OpenAI-compatible `/chat/completions` API
//! (Groq by default) through the [`ChatModel`] trait, so handlers can be
//! tested against an in-process stub.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ferryroutes_lib::DEFAULT_HISTORY_TURNS;

/// Default hosted model.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default OpenAI-compatible API base.
pub const DEFAULT_CHAT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default per-request timeout for model calls.
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while obtaining a completion.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No API key configured; the chat endpoint is disabled.
    #[error("chat model is not configured")]
    NotConfigured,

    #[error("request to chat model failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chat model returned no content")]
    EmptyResponse,
}

/// A model that turns a fully rendered prompt into a reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError>;

    /// Model identifier for logs and metrics.
    fn model_name(&self) -> &str;
}

/// Chat configuration read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `GROQ_API_KEY` | unset (chat disabled) |
/// | `CHAT_MODEL` | `llama-3.3-70b-versatile` |
/// | `CHAT_API_BASE` | `https://api.groq.com/openai/v1` |
/// | `CHAT_TIMEOUT_SECS` | `30` |
/// | `CHAT_HISTORY_TURNS` | `20` |
#[derive(Clone)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
    pub history_turns: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            api_base: DEFAULT_CHAT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
            history_turns: DEFAULT_HISTORY_TURNS,
        }
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("history_turns", &self.history_turns)
            .finish()
    }
}

impl ChatConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let model = std::env::var("CHAT_MODEL").unwrap_or(defaults.model);
        let api_base = std::env::var("CHAT_API_BASE").unwrap_or(defaults.api_base);
        let timeout = std::env::var("CHAT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let history_turns = std::env::var("CHAT_HISTORY_TURNS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.history_turns);

        Self {
            api_key,
            model,
            api_base,
            timeout,
            history_turns,
        }
    }

    /// Build the hosted client, or `None` when no API key is configured.
    pub fn build_model(&self) -> Result<Option<Arc<dyn ChatModel>>, ChatError> {
        match &self.api_key {
            Some(key) => {
                let model = GroqChatModel::new(key.clone(), self)?;
                Ok(Some(Arc::new(model)))
            }
            None => Ok(None),
        }
    }
}

/// Client for Groq's OpenAI-compatible chat completions API.
pub struct GroqChatModel {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqChatModel {
    pub fn new(api_key: String, config: &ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            client,
        })
    }
}

#[async_trait]
impl ChatModel for GroqChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                model = %self.model,
                body = %body,
                "chat model call failed"
            );
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ChatError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_model() {
        let config = ChatConfig::default();
        assert_eq!(config.model, DEFAULT_CHAT_MODEL);
        assert!(config.build_model().unwrap().is_none());
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = ChatConfig {
            api_key: Some("gsk_secret".to_string()),
            ..ChatConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn endpoint_joins_api_base() {
        let config = ChatConfig {
            api_base: "http://localhost:9999/v1/".to_string(),
            ..ChatConfig::default()
        };
        let model = GroqChatModel::new("key".to_string(), &config).unwrap();
        assert_eq!(model.endpoint, "http://localhost:9999/v1/chat/completions");
        assert_eq!(model.model_name(), DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn completion_response_parses_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Two ferries daily."}}]}"#;
        let parsed: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Two ferries daily.")
        );
    }
}
