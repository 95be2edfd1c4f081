//! Claim extraction from unverified JWT access tokens.
//!
//! The signature is never checked here; the token is only read to recover
//! the ChatGPT account id the backend expects in a request header.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

use super::error::AuthError;

/// Claim namespace carrying ChatGPT account metadata.
pub const JWT_AUTH_CLAIM: &str = "https://api.openai.com/auth";
/// Key of the account id inside [`JWT_AUTH_CLAIM`].
pub const JWT_ACCOUNT_ID_CLAIM: &str = "chatgpt_account_id";

/// Decode the payload of `token` and walk `claim_path` through nested objects.
pub fn decode_claim(token: &str, claim_path: &[&str]) -> Result<Value, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 dot-separated segments, found {}",
            segments.len()
        )));
    }

    // Some issuers keep `=` padding on the payload segment.
    let payload = segments[1].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|err| AuthError::MalformedToken(format!("payload is not base64url: {err}")))?;
    let mut value: Value = serde_json::from_slice(&bytes)
        .map_err(|err| AuthError::MalformedToken(format!("payload is not JSON: {err}")))?;
    if !value.is_object() {
        return Err(AuthError::MalformedToken(
            "payload is not a JSON object".to_string(),
        ));
    }

    for key in claim_path {
        value = match value {
            Value::Object(mut map) => map.remove(*key),
            _ => None,
        }
        .ok_or_else(|| {
            AuthError::MalformedToken(format!("claim `{}` is absent", claim_path.join(".")))
        })?;
    }
    Ok(value)
}

/// Derive the ChatGPT account id from an access token.
pub fn extract_account_id(access_token: &str) -> Result<String, AuthError> {
    let claim = decode_claim(access_token, &[JWT_AUTH_CLAIM, JWT_ACCOUNT_ID_CLAIM])?;
    claim
        .as_str()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AuthError::MalformedToken(format!(
                "claim `{JWT_ACCOUNT_ID_CLAIM}` is not a non-empty string"
            ))
        })
}
