//! Configuration data model.
//!
//! Every section deserializes with field-level defaults so a partial (or
//! empty) TOML file yields a complete configuration.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_MODEL_ID, DEFAULT_ORIGINATOR,
    DEFAULT_REFRESH_TIMEOUT_SECS, DEFAULT_USAGE_TIMEOUT_SECS, DEFAULT_VERBOSITY,
    FALLBACK_AUTH_FILE,
};
use crate::auth::{default_auth_file_path, DEFAULT_PROVIDER_KEY, OPENAI_CLIENT_ID, OPENAI_OAUTH_TOKEN_URL};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthConfig,
    pub api: ApiConfig,
}

/// Where credentials live and how they are refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared auth file; a leading `~/` is expanded at load time.
    pub file: PathBuf,
    /// Entry key inside the auth file.
    pub provider: String,
    pub token_url: String,
    pub client_id: String,
    pub refresh_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            file: default_auth_file_path().unwrap_or_else(|| PathBuf::from(FALLBACK_AUTH_FILE)),
            provider: DEFAULT_PROVIDER_KEY.to_string(),
            token_url: OPENAI_OAUTH_TOKEN_URL.to_string(),
            client_id: OPENAI_CLIENT_ID.to_string(),
            refresh_timeout_secs: DEFAULT_REFRESH_TIMEOUT_SECS,
        }
    }
}

/// Codex backend connection settings used by the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub model: String,
    pub originator: String,
    pub verbosity: String,
    pub timeout_secs: u64,
    pub usage_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL_ID.to_string(),
            originator: DEFAULT_ORIGINATOR.to_string(),
            verbosity: DEFAULT_VERBOSITY.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            usage_timeout_secs: DEFAULT_USAGE_TIMEOUT_SECS,
        }
    }
}
