//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

use super::env::apply_runtime_env_overrides;
use super::sources::{config_root_dir, read_config_text_with_sources};
use super::Config;

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from the --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
        dirs::home_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot, FHome>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
    home_dir: FHome,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
    FHome: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    debug!(source = ?source, "resolved config source");
    let mut config: Config = toml::from_str(&config_text)?;
    apply_runtime_env_overrides(&mut config, &env_lookup)?;
    config.auth.file = expand_home(&config.auth.file, &home_dir);
    validate(&mut config)?;
    Ok(config)
}

/// Expand a leading `~` against the home directory.
fn expand_home<FHome>(path: &Path, home_dir: &FHome) -> PathBuf
where
    FHome: Fn() -> Option<PathBuf>,
{
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

fn validate(config: &mut Config) -> Result<(), ConfigError> {
    let required = [
        ("api.base_url", &config.api.base_url),
        ("api.model", &config.api.model),
        ("auth.provider", &config.auth.provider),
        ("auth.token_url", &config.auth.token_url),
        ("auth.client_id", &config.auth.client_id),
    ];
    if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(ConfigError::Invalid(format!("`{name}` must not be empty")));
    }
    if config.auth.file.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("`auth.file` must not be empty".into()));
    }
    config.api.timeout_secs = config.api.timeout_secs.max(1);
    config.api.usage_timeout_secs = config.api.usage_timeout_secs.max(1);
    config.auth.refresh_timeout_secs = config.auth.refresh_timeout_secs.max(1);
    Ok(())
}
