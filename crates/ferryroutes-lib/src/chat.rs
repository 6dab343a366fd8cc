//! Per-request conversation context and the ferry assistant prompt.
//!
//! The history is owned by the caller and passed in with each request, so
//! concurrent conversations never share state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of turns kept when no explicit window is configured.
pub const DEFAULT_HISTORY_TURNS: usize = 20;

/// Fixed instructions sent to the hosted model ahead of every query.
///
/// [`ConversationContext::render_prompt`] appends the history and the current
/// query after these instructions.
pub const PROMPT_INSTRUCTIONS: &str = "\
You are a ferry booking assistant. Your task is to provide concise, accurate, and relevant responses to user queries.

Instructions:
- Context awareness:
  - If the query is related to the previous conversation, use the history to give a precise and relevant answer.
  - If the query is new and unrelated, respond independently without mentioning that it is a new topic.
- Response guidelines:
  - Provide clear and correct answers.
  - If the requested information is unknown, politely apologize and ask if the user would like you to check further.

Ensure all responses are direct, informative, and user-friendly.
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("User"),
            Role::Assistant => f.write_str("Assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Bounded conversation history carried with each chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    turns: Vec<ChatTurn>,
    #[serde(skip, default = "default_window")]
    window: usize,
}

fn default_window() -> usize {
    DEFAULT_HISTORY_TURNS
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_TURNS)
    }
}

impl ConversationContext {
    /// Empty context keeping at most `window` turns.
    ///
    /// The window is rounded down to whole exchanges, with a minimum of one.
    pub fn new(window: usize) -> Self {
        Self {
            turns: Vec::new(),
            window: (window.max(2) / 2) * 2,
        }
    }

    /// Context seeded with prior turns; the oldest turns beyond the window are dropped.
    pub fn from_turns(turns: Vec<ChatTurn>, window: usize) -> Self {
        let mut context = Self::new(window);
        context.turns = turns;
        context.trim();
        context
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn into_turns(self) -> Vec<ChatTurn> {
        self.turns
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// History as `User: ...` / `Assistant: ...` lines.
    pub fn history_text(&self) -> String {
        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.role, turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// [`PROMPT_INSTRUCTIONS`] followed by the current history and `query`.
    ///
    /// History and query text are inserted verbatim.
    pub fn render_prompt(&self, query: &str) -> String {
        format!(
            "{PROMPT_INSTRUCTIONS}\nConversation history:\n{}\n\nCurrent query: {query}\n",
            self.history_text()
        )
    }

    /// Append a completed user/assistant exchange and enforce the window.
    pub fn record_exchange(&mut self, query: impl Into<String>, response: impl Into<String>) {
        self.turns.push(ChatTurn::user(query));
        self.turns.push(ChatTurn::assistant(response));
        self.trim();
    }

    fn trim(&mut self) {
        if self.turns.len() > self.window {
            let excess = self.turns.len() - self.window;
            self.turns.drain(..excess);
        }
        // History never opens with a reply whose question was dropped.
        let orphans = self
            .turns
            .iter()
            .take_while(|turn| turn.role == Role::Assistant)
            .count();
        self.turns.drain(..orphans);
    }
}
