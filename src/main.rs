//! CLI entry point for codex-client.

mod cli;

use clap::Parser;
use cli::{Args, Command};
use codex_client::api::CodexClient;
use codex_client::auth::{AuthError, CredentialStore, LoginHealth};
use codex_client::build_info::build_metadata_line;
use codex_client::config::load_config;
use codex_client::error::ApiError;
use codex_client::types::{CompletionResult, Message};
use crossterm::style::{Color, Stylize};
use std::io::Write;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Env var holding the tracing filter directive.
const LOG_ENV: &str = "CODEX_LOG";

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let color = !args.no_color;

    let store = Arc::new(CredentialStore::from_config(&config.auth));
    let mut client = CodexClient::new(Arc::clone(&store), &config.api);
    if let Some(model) = args.model {
        client = client.with_model(model);
    }
    let outcome = match args.command {
        Command::Ask {
            prompt,
            system,
            stream,
        } => run_ask(&client, &prompt, system.as_deref(), stream, color).await,
        Command::Usage => run_usage(&client).await,
        Command::Status => run_status(&store, color),
    };

    if let Err(err) = outcome {
        report_error(&err, color);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_ask(
    client: &CodexClient,
    prompt: &str,
    system: Option<&str>,
    stream: bool,
    color: bool,
) -> Result<(), ApiError> {
    let messages = [Message::user(prompt)];

    let result = if stream {
        let mut stdout = std::io::stdout();
        let result = client
            .complete_with(&messages, system, |delta| {
                let _ = stdout.write_all(delta.as_bytes());
                let _ = stdout.flush();
            })
            .await?;
        println!();
        result
    } else {
        let result = client.complete(&messages, system).await?;
        println!("{}", result.text);
        result
    };
    render_result_footer(&result, color);
    Ok(())
}

async fn run_usage(client: &CodexClient) -> Result<(), ApiError> {
    let snapshot = client.usage().await?;
    println!("{snapshot}");
    Ok(())
}

fn run_status(store: &CredentialStore, color: bool) -> Result<(), ApiError> {
    let health = store.health()?;
    eprintln!("{}", dim(&build_metadata_line(), color));
    println!("Auth file: {}", store.path().display());
    println!("{}", describe_health(&health, now_millis()));
    Ok(())
}

fn render_result_footer(result: &CompletionResult, color: bool) {
    let usage = match result.usage {
        Some(usage) => format!(
            "tokens: {} prompt ({} cached), {} completion, {} total",
            usage.prompt_tokens,
            usage.cached_prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        ),
        None => "tokens: not reported".to_string(),
    };
    eprintln!("{}", dim(&format!("model: {} | {usage}", result.model), color));
}

fn describe_health(health: &LoginHealth, now_ms: i64) -> String {
    if !health.has_credentials {
        return format!("Provider `{}`: not logged in", health.provider);
    }
    let account = health.account_id.as_deref().unwrap_or("unknown");
    let remaining = health
        .expires
        .map(|expires| format_remaining((expires - now_ms) / 1000))
        .unwrap_or_else(|| "unknown".to_string());
    let state = if health.expired {
        "refresh due"
    } else {
        "valid"
    };
    format!(
        "Provider `{}`: logged in (account {account}), token {state}, expires {remaining}",
        health.provider
    )
}

fn format_remaining(secs: i64) -> String {
    if secs <= 0 {
        return "now".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        format!("in {minutes} min")
    } else {
        format!("in {}h {}m", minutes / 60, minutes % 60)
    }
}

fn report_error(err: &ApiError, color: bool) {
    let label = if color {
        "error:".with(Color::Red).bold().to_string()
    } else {
        "error:".to_string()
    };
    eprintln!("{label} {err}");
    if let ApiError::Auth(AuthError::RefreshFailed { .. }) = err {
        eprintln!("Log in again with `npx @mariozechner/pi-ai login openai-codex`.");
    }
}

fn dim(text: &str, color: bool) -> String {
    if color {
        text.with(Color::DarkGrey).to_string()
    } else {
        text.to_string()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
