//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`CODEX_AUTH_FILE`, `CODEX_BASE_URL`,
//!    `CODEX_MODEL`, `CODEX_API_TIMEOUT_SECS`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./codex-client.toml in the current directory
//! 4. $XDG_CONFIG_HOME/codex-client/codex-client.toml
//!    (or ~/.config/codex-client/codex-client.toml)
//! 5. Built-in defaults

mod defaults;
mod env;
mod loader;
mod sources;
mod types;

pub use loader::load_config;
pub use sources::config_root_dir;
pub use types::{ApiConfig, AuthConfig, Config};

#[cfg(test)]
mod tests {
    use super::defaults::*;
    use super::loader::load_config_from_sources;
    use super::*;
    use crate::error::ConfigError;
    use std::collections::HashMap;
    use std::io;
    use std::path::{Path, PathBuf};

    fn not_found(_: &Path) -> Result<String, io::Error> {
        Err(io::Error::new(io::ErrorKind::NotFound, "missing"))
    }

    fn home() -> Option<PathBuf> {
        Some(PathBuf::from("/home/dev"))
    }

    fn load_with(
        files: HashMap<PathBuf, String>,
        env: HashMap<&'static str, &'static str>,
        path_override: Option<&str>,
    ) -> Result<Config, ConfigError> {
        load_config_from_sources(
            path_override,
            |path| {
                files
                    .get(path)
                    .cloned()
                    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "missing"))
            },
            |name| env.get(name).map(|value| value.to_string()),
            || Some(PathBuf::from("/cfg")),
            home,
        )
    }

    #[test]
    fn defaults_are_sensible() {
        let c = load_config_from_sources(None, not_found, |_| None, || None, home).unwrap();
        assert_eq!(c.api.base_url, "https://chatgpt.com/backend-api/codex");
        assert_eq!(c.api.model, DEFAULT_MODEL_ID);
        assert_eq!(c.api.originator, "pi");
        assert_eq!(c.api.verbosity, "medium");
        assert_eq!(c.api.timeout_secs, DEFAULT_API_TIMEOUT_SECS);
        assert_eq!(c.api.usage_timeout_secs, DEFAULT_USAGE_TIMEOUT_SECS);
        assert_eq!(c.auth.provider, "openai-codex");
        assert_eq!(c.auth.token_url, "https://auth.openai.com/oauth/token");
        assert_eq!(c.auth.refresh_timeout_secs, DEFAULT_REFRESH_TIMEOUT_SECS);
        assert!(c.auth.file.ends_with(".pi/agent/auth.json"));
    }

    #[test]
    fn parse_partial_toml() {
        let toml = r#"
            [api]
            model = "gpt-5.2-codex"

            [auth]
            file = "~/custom/auth.json"
        "#;
        let files = HashMap::from([(PathBuf::from("codex-client.toml"), toml.to_string())]);
        let c = load_with(files, HashMap::new(), None).unwrap();
        assert_eq!(c.api.model, "gpt-5.2-codex");
        assert_eq!(c.api.originator, "pi");
        assert_eq!(c.auth.file, PathBuf::from("/home/dev/custom/auth.json"));
        assert_eq!(c.auth.provider, "openai-codex");
    }

    #[test]
    fn explicit_path_wins_over_local_and_global() {
        let files = HashMap::from([
            (
                PathBuf::from("/tmp/explicit.toml"),
                "[api]\nmodel = \"explicit\"".to_string(),
            ),
            (
                PathBuf::from("codex-client.toml"),
                "[api]\nmodel = \"local\"".to_string(),
            ),
            (
                PathBuf::from("/cfg/codex-client/codex-client.toml"),
                "[api]\nmodel = \"global\"".to_string(),
            ),
        ]);
        let c = load_with(files.clone(), HashMap::new(), Some("/tmp/explicit.toml")).unwrap();
        assert_eq!(c.api.model, "explicit");
        let c = load_with(files, HashMap::new(), None).unwrap();
        assert_eq!(c.api.model, "local");
    }

    #[test]
    fn global_file_used_when_no_local_file() {
        let files = HashMap::from([(
            PathBuf::from("/cfg/codex-client/codex-client.toml"),
            "[api]\nverbosity = \"low\"".to_string(),
        )]);
        let c = load_with(files, HashMap::new(), None).unwrap();
        assert_eq!(c.api.verbosity, "low");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_with(HashMap::new(), HashMap::new(), Some("/nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)), "{err}");
    }

    #[test]
    fn env_overrides_file_values() {
        let files = HashMap::from([(
            PathBuf::from("codex-client.toml"),
            "[api]\nmodel = \"from-file\"\nbase_url = \"https://file.example\"".to_string(),
        )]);
        let env = HashMap::from([
            ("CODEX_MODEL", "from-env"),
            ("CODEX_BASE_URL", "http://127.0.0.1:8080"),
            ("CODEX_AUTH_FILE", "/var/lib/auth.json"),
            ("CODEX_API_TIMEOUT_SECS", "0"),
        ]);
        let c = load_with(files, env, None).unwrap();
        assert_eq!(c.api.model, "from-env");
        assert_eq!(c.api.base_url, "http://127.0.0.1:8080");
        assert_eq!(c.auth.file, PathBuf::from("/var/lib/auth.json"));
        // Clamped so the client always has a deadline.
        assert_eq!(c.api.timeout_secs, 1);
    }

    #[test]
    fn invalid_timeout_env_is_rejected() {
        let env = HashMap::from([("CODEX_API_TIMEOUT_SECS", "soon")]);
        let err = load_with(HashMap::new(), env, None).unwrap_err();
        assert!(err.to_string().contains("CODEX_API_TIMEOUT_SECS"), "{err}");
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let files = HashMap::from([(
            PathBuf::from("codex-client.toml"),
            "[auth]\nprovider = \"  \"".to_string(),
        )]);
        let err = load_with(files, HashMap::new(), None).unwrap_err();
        assert!(err.to_string().contains("auth.provider"), "{err}");
    }

    #[test]
    fn malformed_toml_is_reported() {
        let files = HashMap::from([(PathBuf::from("codex-client.toml"), "[api".to_string())]);
        let err = load_with(files, HashMap::new(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
    }
}
