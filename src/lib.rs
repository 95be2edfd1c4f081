//! codex-client: a ChatGPT Codex backend client driven by a stored OAuth login.
//!
//! Two pieces do the work:
//! - [`auth::CredentialStore`] loads the `openai-codex` entry from the shared
//!   auth file, refreshes it before expiry (one refresh at a time), and
//!   writes it back atomically.
//! - [`api::CodexClient`] sends completion requests and turns the SSE
//!   response into either a buffered [`types::CompletionResult`] or a live
//!   sequence of text deltas; it also queries account usage.
//!
//! # Quick start
//!
//! ```no_run
//! use codex_client::api::CodexClient;
//! use codex_client::auth::CredentialStore;
//! use codex_client::config::load_config;
//! use codex_client::types::Message;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let store = Arc::new(CredentialStore::from_config(&config.auth));
//! let client = CodexClient::new(store, &config.api);
//! let result = client.complete(&[Message::user("Hello!")], None).await.unwrap();
//! println!("{}", result.text);
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod build_info;
pub mod config;
pub mod error;
#[cfg(test)]
pub mod testsupport;
pub mod types;
