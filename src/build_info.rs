//! Compile-time build metadata exposed to the CLI.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("CODEX_CLIENT_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("CODEX_CLIENT_BUILD_TIMESTAMP");

/// Body of `codex-client --version`.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("CODEX_CLIENT_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("CODEX_CLIENT_BUILD_TIMESTAMP")
);

/// Help trailer block that surfaces build metadata in `codex-client --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("CODEX_CLIENT_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("CODEX_CLIENT_BUILD_TIMESTAMP")
);

/// One-line metadata shown by `codex-client status`.
pub fn build_metadata_line() -> String {
    format!("codex-client v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_metadata_line_contains_all_fields() {
        let text = build_metadata_line();
        assert!(text.starts_with("codex-client v"));
        assert!(text.contains(GIT_COMMIT));
        assert!(text.contains(BUILD_TIMESTAMP));
    }

    #[test]
    fn long_version_includes_expected_lines() {
        assert!(LONG_VERSION.starts_with(VERSION));
        assert!(LONG_VERSION.contains("\ncommit: "));
        assert!(LONG_VERSION.contains("\nbuilt: "));
    }
}
