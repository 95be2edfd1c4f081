//! Error types shared across the client.
//!
//! Auth-specific failures live in [`crate::auth::AuthError`]; this module
//! holds the configuration and HTTP API layers that wrap them.

use crate::auth::AuthError;
use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from the completion and usage endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// Credential acquisition failed; the store's error is passed through.
    Auth(AuthError),
    /// Network / reqwest-level error, including the overall request deadline.
    Http(reqwest::Error),
    /// Non-2xx status from the API.
    Status { code: u16, body: String },
    /// A successful response whose body could not be decoded.
    InvalidResponse(String),
}

impl ApiError {
    /// True for the "request failed" family: transport errors (including a
    /// token refresh that never got an answer) and non-2xx statuses.
    ///
    /// Callers may retry these at their discretion; this crate never does.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::Auth(AuthError::Http(_))
        )
    }

    /// True when the request, or the token refresh before it, hit its deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Http(inner) => inner.is_timeout(),
            Self::Auth(inner) => inner.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status code for `Status` errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "auth: {e}"),
            Self::Http(e) if e.is_timeout() => write!(f, "request failed: timed out: {e}"),
            Self::Http(e) => write!(f, "request failed: {e}"),
            Self::Status { code, body } => write!(f, "request failed: status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Auth(e) => Some(e),
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}
