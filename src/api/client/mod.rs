//! Codex API client orchestration.
//!
//! The client facade here stays small:
//! - credential acquisition is delegated to [`CredentialStore`].
//! - request bodies and SSE decoding live in `responses`.
//! - header and status plumbing is delegated to `transport`.

mod transport;

use super::responses::{build_codex_payload, ChunkSource, RequestOptions, SseEventStream};
use super::usage::{parse_usage_snapshot, UsageSnapshot};
use super::{CompletionClient, CompletionStream};
use crate::auth::CredentialStore;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::{CompletionResult, Message};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use transport::{
    build_http_client, endpoint_url, ensure_success, with_identity, BETA_HEADER, BETA_RESPONSES,
};

/// Client for the ChatGPT Codex `/responses` and `/usage` endpoints.
///
/// Every call asks the shared [`CredentialStore`] for a valid credential
/// first, so token refresh happens transparently. Requests are never
/// retried.
pub struct CodexClient {
    http: reqwest::Client,
    usage_http: reqwest::Client,
    credentials: Arc<CredentialStore>,
    base_url: String,
    model: String,
    originator: String,
    verbosity: String,
}

impl CodexClient {
    /// Build a client from resolved API configuration.
    pub fn new(credentials: Arc<CredentialStore>, config: &ApiConfig) -> Self {
        Self {
            http: build_http_client(Duration::from_secs(config.timeout_secs.max(1))),
            usage_http: build_http_client(Duration::from_secs(config.usage_timeout_secs.max(1))),
            credentials,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            originator: config.originator.clone(),
            verbosity: config.verbosity.clone(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one completion request and return its live event stream.
    ///
    /// The call resolves once response headers arrive; the body is pulled
    /// lazily as the stream is consumed. Dropping the stream aborts the
    /// request.
    pub async fn stream(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> Result<CompletionStream, ApiError> {
        let creds = self.credentials.get_valid().await?;
        let payload = build_codex_payload(
            messages,
            system,
            RequestOptions {
                model: &self.model,
                verbosity: &self.verbosity,
            },
        );
        debug!(
            model = %self.model,
            messages = messages.len(),
            "sending completion request"
        );

        let request = self
            .http
            .post(endpoint_url(&self.base_url, "responses"))
            .header(BETA_HEADER, BETA_RESPONSES)
            .header(ACCEPT, "text/event-stream")
            .json(&payload);
        let response = with_identity(request, &creds, &self.originator)
            .send()
            .await
            .map_err(|err| {
                warn!(model = %self.model, error = %err, "completion request failed");
                ApiError::from(err)
            })?;
        let response = ensure_success(response).await.map_err(|err| {
            warn!(model = %self.model, status = ?err.status_code(), "completion request rejected");
            err
        })?;

        let source: Box<dyn ChunkSource> = Box::new(response);
        Ok(SseEventStream::new(source, self.model.clone()))
    }

    /// Buffered mode: consume the whole stream and return the final result.
    pub async fn complete(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> Result<CompletionResult, ApiError> {
        let result = self.stream(messages, system).await?.collect().await?;
        debug!(
            model = %result.model,
            chars = result.text.len(),
            total_tokens = result.usage.map(|usage| usage.total_tokens),
            "completion finished"
        );
        Ok(result)
    }

    /// Live mode with a callback: `on_delta` sees every text delta in wire
    /// order, then the accumulated result (including usage) is returned.
    pub async fn complete_with<F>(
        &self,
        messages: &[Message],
        system: Option<&str>,
        mut on_delta: F,
    ) -> Result<CompletionResult, ApiError>
    where
        F: FnMut(&str) + Send,
    {
        let mut stream = self.stream(messages, system).await?;
        while let Some(delta) = stream.next_delta().await? {
            on_delta(&delta);
        }
        Ok(stream.into_result())
    }

    /// Fetch the account's plan, credit, and rate-limit snapshot.
    pub async fn usage(&self) -> Result<UsageSnapshot, ApiError> {
        let creds = self.credentials.get_valid().await?;
        let request = self
            .usage_http
            .get(endpoint_url(&self.base_url, "usage"))
            .header(ACCEPT, "application/json");
        let response = with_identity(request, &creds, &self.originator)
            .send()
            .await?;
        let response = ensure_success(response).await.map_err(|err| {
            warn!(status = ?err.status_code(), "usage request rejected");
            err
        })?;
        let body = response.text().await?;
        parse_usage_snapshot(&body)
            .map_err(|err| ApiError::InvalidResponse(format!("usage response: {err}")))
    }
}

impl std::fmt::Debug for CodexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodexClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("originator", &self.originator)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CompletionClient for CodexClient {
    async fn complete(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> Result<CompletionResult, ApiError> {
        CodexClient::complete(self, messages, system).await
    }

    async fn stream(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> Result<CompletionStream, ApiError> {
        CodexClient::stream(self, messages, system).await
    }
}
