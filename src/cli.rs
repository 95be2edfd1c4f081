//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};

/// Talk to the ChatGPT Codex backend with an existing `openai-codex` login.
#[derive(Debug, Parser)]
#[command(
    name = "codex-client",
    version,
    long_version = codex_client::build_info::LONG_VERSION,
    after_help = codex_client::build_info::HELP_BUILD_METADATA
)]
pub struct Args {
    /// Path to config file (default: ./codex-client.toml or ~/.config/codex-client/codex-client.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Override model id.
    #[arg(short = 'm', long = "model", global = true)]
    pub model: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one prompt and print the answer.
    Ask {
        /// User prompt.
        prompt: String,

        /// System instructions for this request.
        #[arg(short = 's', long = "system")]
        system: Option<String>,

        /// Print text deltas as they arrive.
        #[arg(long = "stream")]
        stream: bool,
    },
    /// Show plan, credits, and rate-limit windows for the logged-in account.
    Usage,
    /// Show whether stored credentials are present and fresh (no network).
    Status,
}
