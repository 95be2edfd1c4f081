//! OpenAI OAuth refresh-token grant.

use serde::Deserialize;
use std::time::Duration;

use super::error::AuthError;
use super::jwt::extract_account_id;
use super::types::{unix_now_millis, Credentials};

/// OAuth token endpoint used for refresh.
pub const OPENAI_OAUTH_TOKEN_URL: &str = "https://auth.openai.com/oauth/token";
/// Public client id the stored Codex login was issued to.
pub const OPENAI_CLIENT_ID: &str = "app_EMoamEEZ73f0CkXaXp7hrann";
/// Overall deadline for one refresh request.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and as whom refresh grants are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoint {
    pub token_url: String,
    pub client_id: String,
}

impl Default for OAuthEndpoint {
    fn default() -> Self {
        Self {
            token_url: OPENAI_OAUTH_TOKEN_URL.to_string(),
            client_id: OPENAI_CLIENT_ID.to_string(),
        }
    }
}

/// OAuth token endpoint response shape.
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: Option<String>,
    /// Omitted when the provider does not rotate refresh tokens.
    refresh_token: Option<String>,
    #[serde(deserialize_with = "deserialize_i64_option", default)]
    expires_in: Option<i64>,
}

/// Build the HTTP client used for refresh grants.
pub(crate) fn build_auth_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(crate::api::user_agent())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Trade the refresh token in `current` for a new credential.
///
/// The account id is re-derived from the new access token.
pub(crate) async fn refresh_credentials(
    client: &reqwest::Client,
    endpoint: &OAuthEndpoint,
    current: &Credentials,
) -> Result<Credentials, AuthError> {
    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", current.refresh.as_str()),
        ("client_id", endpoint.client_id.as_str()),
    ];

    let response = client
        .post(&endpoint.token_url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .form(&form)
        .send()
        .await?;

    if !response.status().is_success() {
        let code = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::refresh_failed(Some(code), body));
    }

    let payload: OAuthTokenResponse = response.json().await.map_err(|err| {
        AuthError::refresh_failed(None, format!("invalid token response body: {err}"))
    })?;
    let access = payload.access_token.unwrap_or_default().trim().to_string();
    if access.is_empty() {
        return Err(AuthError::refresh_failed(
            None,
            "token response did not include access_token",
        ));
    }
    let Some(expires_in) = payload.expires_in else {
        return Err(AuthError::refresh_failed(
            None,
            "token response did not include expires_in",
        ));
    };
    let refresh = payload
        .refresh_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| current.refresh.clone());

    let account_id = extract_account_id(&access)?;
    Ok(Credentials {
        access,
        refresh,
        expires: unix_now_millis().saturating_add(expires_in.saturating_mul(1000)),
        account_id,
    })
}

/// Deserialize optional integer durations encoded as string/number/null.
fn deserialize_i64_option<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(num) => num
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("expires_in must be an integer"))
            .map(Some),
        serde_json::Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|err| serde::de::Error::custom(format!("invalid expires_in: {err}"))),
        _ => Err(serde::de::Error::custom(
            "expires_in must be string, number, or null",
        )),
    }
}
