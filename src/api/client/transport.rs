//! HTTP transport helpers shared by the completion and usage requests.

use crate::api::user_agent;
use crate::auth::Credentials;
use crate::error::ApiError;
use reqwest::RequestBuilder;
use std::time::Duration;

pub(super) const ACCOUNT_ID_HEADER: &str = "chatgpt-account-id";
pub(super) const BETA_HEADER: &str = "OpenAI-Beta";
pub(super) const BETA_RESPONSES: &str = "responses=experimental";
pub(super) const ORIGINATOR_HEADER: &str = "originator";

/// Build an HTTP client with an overall request deadline applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Attach bearer, account, and originator headers common to every call.
pub(super) fn with_identity(
    request: RequestBuilder,
    creds: &Credentials,
    originator: &str,
) -> RequestBuilder {
    request
        .bearer_auth(&creds.access)
        .header(ACCOUNT_ID_HEADER, &creds.account_id)
        .header(ORIGINATOR_HEADER, originator)
}

/// Turn a non-2xx response into `ApiError::Status`, keeping the body for diagnostics.
pub(super) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        code: status.as_u16(),
        body,
    })
}

/// Join a base URL and an endpoint path without doubling slashes.
pub(super) fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
