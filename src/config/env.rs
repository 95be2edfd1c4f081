//! Environment overrides.
//!
//! Canonical `CODEX_*` variables take precedence over file values.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::Config;

pub(super) const ENV_AUTH_FILE: &str = "CODEX_AUTH_FILE";
pub(super) const ENV_MODEL: &str = "CODEX_MODEL";
pub(super) const ENV_BASE_URL: &str = "CODEX_BASE_URL";
pub(super) const ENV_API_TIMEOUT_SECS: &str = "CODEX_API_TIMEOUT_SECS";

pub(super) fn apply_runtime_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    if let Some(path) = non_empty(env_lookup, ENV_AUTH_FILE) {
        config.auth.file = PathBuf::from(path);
    }
    if let Some(url) = non_empty(env_lookup, ENV_BASE_URL) {
        config.api.base_url = url;
    }
    if let Some(model) = non_empty(env_lookup, ENV_MODEL) {
        config.api.model = model;
    }
    if let Some(timeout) = non_empty(env_lookup, ENV_API_TIMEOUT_SECS) {
        let parsed = timeout.parse::<u64>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid {ENV_API_TIMEOUT_SECS} value `{timeout}`: expected positive integer seconds"
            ))
        })?;
        // Zero would mean "no deadline" to the HTTP client.
        config.api.timeout_secs = parsed.max(1);
    }
    Ok(())
}

/// Trimmed env value, treating blank as unset.
fn non_empty<FEnv>(env_lookup: &FEnv, name: &str) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    env_lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
