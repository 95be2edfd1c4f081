//! Auth subsystem error definitions.

use std::fmt;
use std::path::PathBuf;

/// Errors surfaced by the credential store.
#[derive(Debug)]
pub enum AuthError {
    /// No login has been performed: the auth file or the provider entry is missing.
    NotConfigured { path: PathBuf, provider: String },
    /// The access token could not be decoded into an account id.
    MalformedToken(String),
    /// The refresh request never got an answer: connect failure or deadline.
    Http(reqwest::Error),
    /// The token endpoint rejected the refresh or answered with an unusable body.
    RefreshFailed {
        status: Option<u16>,
        detail: String,
    },
    /// Reading or writing the auth file failed.
    Persistence { path: PathBuf, detail: String },
}

impl AuthError {
    pub(crate) fn persistence(path: &std::path::Path, detail: impl fmt::Display) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn refresh_failed(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::RefreshFailed {
            status,
            detail: detail.into(),
        }
    }

    /// True when the user has to complete an external login before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::NotConfigured { .. } | Self::MalformedToken(_) | Self::RefreshFailed { .. }
        )
    }

    /// True when the refresh request hit its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(inner) if inner.is_timeout())
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured { path, provider } => write!(
                f,
                "no `{provider}` login found in `{}`; run `npx @mariozechner/pi-ai login {provider}` first",
                path.display()
            ),
            Self::MalformedToken(detail) => {
                write!(f, "malformed access token: {detail}; log in again")
            }
            Self::Http(err) if err.is_timeout() => {
                write!(f, "token refresh request timed out: {err}")
            }
            Self::Http(err) => write!(f, "token refresh request failed: {err}"),
            Self::RefreshFailed {
                status: Some(code),
                detail,
            } => write!(f, "token refresh failed with status {code}: {detail}"),
            Self::RefreshFailed {
                status: None,
                detail,
            } => write!(f, "token refresh failed: {detail}"),
            Self::Persistence { path, detail } => {
                write!(f, "auth file `{}`: {detail}", path.display())
            }
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}
