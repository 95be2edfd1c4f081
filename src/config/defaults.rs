//! Default configuration constants.
//!
//! Keeping defaults in one module lets the config types, the env layer, and
//! the tests share the same literals.

/// Default Codex backend base URL.
pub(super) const DEFAULT_API_BASE_URL: &str = crate::api::CODEX_BASE_URL;
/// Default model id for completion requests.
pub(super) const DEFAULT_MODEL_ID: &str = "gpt-5.1-codex-mini";
/// Value of the `originator` header the stored login expects.
pub(super) const DEFAULT_ORIGINATOR: &str = "pi";
/// Response verbosity requested from the backend.
pub(super) const DEFAULT_VERBOSITY: &str = "medium";
/// Overall deadline for one completion request, body included.
pub(super) const DEFAULT_API_TIMEOUT_SECS: u64 = 120;
/// Overall deadline for one usage query.
pub(super) const DEFAULT_USAGE_TIMEOUT_SECS: u64 = 30;
/// Overall deadline for one token refresh.
pub(super) const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 30;
/// Auth file location used when no home directory can be resolved.
pub(super) const FALLBACK_AUTH_FILE: &str = ".pi/agent/auth.json";
/// Config directory and file name under the user config root.
pub(super) const CONFIG_DIR_NAME: &str = "codex-client";
pub(super) const CONFIG_FILE_NAME: &str = "codex-client.toml";
