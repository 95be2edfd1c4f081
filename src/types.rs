//! Data model shared by the completion client and its callers.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Conversation participant role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One `{role, content}` entry of the request's input list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Token accounting reported by the completion endpoint.
///
/// Fields the server omitted are zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub cached_prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Accumulated output of one completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionResult {
    /// Concatenated deltas, or the authoritative final text when the server sent one.
    pub text: String,
    /// `None` when no completed event carried a usage block.
    pub usage: Option<Usage>,
    /// Model id the request was sent with.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Stream events
// ---------------------------------------------------------------------------

/// One decoded event from the completion stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// `response.output_text.delta`: an incremental text fragment.
    TextDelta(String),
    /// `response.done` / `response.completed`.
    Completed {
        /// Authoritative `output_text` from the message output items, if present.
        text: Option<String>,
        usage: Option<Usage>,
    },
    /// The `[DONE]` sentinel.
    Done,
    /// Any event type this client does not act on.
    Unrecognized,
}
