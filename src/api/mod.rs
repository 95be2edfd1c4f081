//! HTTP client for the ChatGPT Codex backend.
//!
//! The API layer is split into cohesive modules:
//! - `responses`: `/responses` request body, SSE decoding, event stream
//! - `usage`: `/usage` quota snapshot
//! - `client`: credential-backed request orchestration

use crate::error::ApiError;
use crate::types::{CompletionResult, Message};
use async_trait::async_trait;

mod client;
mod responses;
mod usage;

pub use client::CodexClient;
pub use responses::{ChunkSource, SseEventStream};
pub use usage::{Credits, RateLimit, RateLimitWindow, UsageSnapshot};

/// Base URL of the Codex backend; `/responses` and `/usage` hang off it.
pub const CODEX_BASE_URL: &str = "https://chatgpt.com/backend-api/codex";

/// Live event stream of one completion request.
pub type CompletionStream = SseEventStream<Box<dyn ChunkSource>>;

/// Minimal completion interface.
///
/// Lets callers and tests swap in deterministic doubles while the production
/// path uses [`CodexClient`].
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one request to completion and return the accumulated result.
    async fn complete(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> Result<CompletionResult, ApiError>;

    /// Start one request and hand back its live event stream.
    async fn stream(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> Result<CompletionStream, ApiError>;
}

/// `User-Agent` sent on every request.
pub(crate) fn user_agent() -> String {
    format!(
        "codex-client ({}; {})",
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
