//! Public auth model types.

use std::time::{SystemTime, UNIX_EPOCH};

/// Credentials are treated as expired this long before their real expiry.
pub(crate) const EXPIRY_MARGIN_MS: i64 = 5 * 60 * 1000;

/// One OAuth grant for the Codex provider.
///
/// Values are replaced wholesale on refresh; callers get a clone that is only
/// good for the request at hand.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
    /// Expiry as epoch milliseconds.
    pub expires: i64,
    pub account_id: String,
}

impl Credentials {
    /// True once the current time is within five minutes of expiry.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now_millis())
    }

    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis > self.expires.saturating_sub(EXPIRY_MARGIN_MS)
    }
}

// Keep token material out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .field("expires", &self.expires)
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Health summary for stored credentials, computed without any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginHealth {
    pub provider: String,
    pub has_credentials: bool,
    pub expired: bool,
    pub expires: Option<i64>,
    pub account_id: Option<String>,
}

pub(crate) fn unix_now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
