//! OAuth credential management for the Codex backend.
//!
//! Credentials come from the auth file written by an external login flow
//! (`~/.pi/agent/auth.json`, entry `openai-codex`). This module never logs
//! in; it validates, refreshes, and persists what that flow left behind.

mod credentials;
mod error;
mod jwt;
mod openai;
mod store;
mod types;

pub use credentials::CredentialStore;
pub use error::AuthError;
pub use jwt::{decode_claim, extract_account_id, JWT_ACCOUNT_ID_CLAIM, JWT_AUTH_CLAIM};
pub use openai::{OAuthEndpoint, DEFAULT_REFRESH_TIMEOUT, OPENAI_CLIENT_ID, OPENAI_OAUTH_TOKEN_URL};
pub use store::{default_auth_file_path, DEFAULT_PROVIDER_KEY};
pub use types::{Credentials, LoginHealth};

pub(crate) use types::unix_now_millis;
