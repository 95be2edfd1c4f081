//! The credential store: load, validate, refresh, persist.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::openai::{
    build_auth_http_client, refresh_credentials, OAuthEndpoint, DEFAULT_REFRESH_TIMEOUT,
};
use super::store::{load_credentials, save_credentials, DEFAULT_PROVIDER_KEY};
use super::types::{Credentials, LoginHealth};
use crate::config::AuthConfig;

/// Owns the current Codex credential and hands out valid copies.
///
/// Share one store per auth file (typically behind an `Arc`). The cached
/// credential sits behind an async mutex that is held across load and
/// refresh, so concurrent callers racing an expired token wait for a single
/// refresh and all observe its result.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
    provider: String,
    endpoint: OAuthEndpoint,
    http: reqwest::Client,
    current: Mutex<Option<Credentials>>,
}

impl CredentialStore {
    /// Store backed by `path` with the default provider key and token endpoint.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            provider: DEFAULT_PROVIDER_KEY.to_string(),
            endpoint: OAuthEndpoint::default(),
            http: build_auth_http_client(DEFAULT_REFRESH_TIMEOUT),
            current: Mutex::new(None),
        }
    }

    /// Store configured from the `[auth]` config section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.file)
            .with_provider(&config.provider)
            .with_endpoint(OAuthEndpoint {
                token_url: config.token_url.clone(),
                client_id: config.client_id.clone(),
            })
            .with_refresh_timeout(Duration::from_secs(config.refresh_timeout_secs))
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: OAuthEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    #[must_use]
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.http = build_auth_http_client(timeout);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Read the provider entry from the auth file.
    ///
    /// Does not touch the cached credential.
    pub fn load(&self) -> Result<Credentials, AuthError> {
        let creds = load_credentials(&self.path, &self.provider)?;
        debug!(
            provider = %self.provider,
            expires = creds.expires,
            "loaded credentials from auth file"
        );
        Ok(creds)
    }

    /// Persist `creds` under this store's provider key.
    pub fn save(&self, creds: &Credentials) -> Result<(), AuthError> {
        save_credentials(&self.path, &self.provider, creds)
    }

    /// Return a credential that is not within five minutes of expiry.
    ///
    /// This is the only call request paths need; it loads on first use and
    /// refreshes (and persists) transparently.
    pub async fn get_valid(&self) -> Result<Credentials, AuthError> {
        let mut current = self.current.lock().await;
        if let Some(cached) = current.as_ref().filter(|creds| !creds.is_expired()) {
            return Ok(cached.clone());
        }

        // Another process sharing the auth file may already have refreshed.
        let loaded = self.blocking_io(load_credentials).await?;
        debug!(
            provider = %self.provider,
            expires = loaded.expires,
            "reloaded credentials from auth file"
        );
        if !loaded.is_expired() {
            *current = Some(loaded.clone());
            return Ok(loaded);
        }
        self.refresh_locked(&mut current, &loaded).await
    }

    /// Exchange the refresh token in `creds` for a new credential and persist it.
    ///
    /// Serialized with [`get_valid`](Self::get_valid): if the cached
    /// credential was already replaced by a concurrent refresh and is still
    /// valid, that value is returned instead of issuing another grant.
    ///
    /// If the grant succeeds but the save fails, the persistence error is
    /// returned and the new credential stays cached for this process only.
    /// The file still holds the old refresh token, which the provider may
    /// have revoked; other processes then need a fresh login.
    pub async fn refresh(&self, creds: &Credentials) -> Result<Credentials, AuthError> {
        let mut current = self.current.lock().await;
        if let Some(cached) = current
            .as_ref()
            .filter(|cached| cached.access != creds.access && !cached.is_expired())
        {
            debug!(provider = %self.provider, "refresh already completed by another caller");
            return Ok(cached.clone());
        }
        self.refresh_locked(&mut current, creds).await
    }

    async fn refresh_locked(
        &self,
        current: &mut MutexGuard<'_, Option<Credentials>>,
        creds: &Credentials,
    ) -> Result<Credentials, AuthError> {
        info!(provider = %self.provider, "refreshing access token");
        let refreshed = match refresh_credentials(&self.http, &self.endpoint, creds).await {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!(provider = %self.provider, error = %err, "token refresh failed");
                // Drop the cache so the next call re-reads the auth file.
                **current = None;
                return Err(err);
            }
        };
        let saved = refreshed.clone();
        let persisted = self
            .blocking_io(move |path, provider| save_credentials(path, provider, &saved))
            .await;
        **current = Some(refreshed.clone());
        if let Err(err) = persisted {
            warn!(
                provider = %self.provider,
                account_id = %refreshed.account_id,
                expires = refreshed.expires,
                path = %self.path.display(),
                error = %err,
                "refreshed credentials could not be saved; kept in memory only"
            );
            return Err(err);
        }
        info!(
            provider = %self.provider,
            expires = refreshed.expires,
            "access token refreshed"
        );
        Ok(refreshed)
    }

    /// Run auth file I/O on the blocking pool.
    async fn blocking_io<T, F>(&self, op: F) -> Result<T, AuthError>
    where
        T: Send + 'static,
        F: FnOnce(&Path, &str) -> Result<T, AuthError> + Send + 'static,
    {
        let path = self.path.clone();
        let provider = self.provider.clone();
        tokio::task::spawn_blocking(move || op(&path, &provider))
            .await
            .map_err(|err| {
                AuthError::persistence(&self.path, format!("auth file task failed: {err}"))
            })?
    }

    /// Inspect stored credentials without refreshing them.
    pub fn health(&self) -> Result<LoginHealth, AuthError> {
        match self.load() {
            Ok(creds) => Ok(LoginHealth {
                provider: self.provider.clone(),
                has_credentials: true,
                expired: creds.is_expired(),
                expires: Some(creds.expires),
                account_id: Some(creds.account_id),
            }),
            Err(AuthError::NotConfigured { .. }) => Ok(LoginHealth {
                provider: self.provider.clone(),
                has_credentials: false,
                expired: false,
                expires: None,
                account_id: None,
            }),
            Err(err) => Err(err),
        }
    }
}
