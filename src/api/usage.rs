//! Account quota snapshot returned by `GET /codex/usage`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Point-in-time plan, credit, and rate-limit report for the logged-in account.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UsageSnapshot {
    pub plan_type: Option<String>,
    pub email: Option<String>,
    pub credits: Option<Credits>,
    pub rate_limit: Option<RateLimit>,
}

/// Credit balance. Some plans report `unlimited` instead of a balance.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Credits {
    pub has_credits: Option<bool>,
    pub unlimited: bool,
    #[serde(deserialize_with = "deserialize_lenient_f64")]
    pub balance: Option<f64>,
    /// Provider-shaped estimate; kept verbatim.
    pub approx_local_messages: Option<Value>,
    pub approx_cloud_messages: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimit {
    pub allowed: Option<bool>,
    pub limit_reached: Option<bool>,
    pub primary_window: Option<RateLimitWindow>,
    pub secondary_window: Option<RateLimitWindow>,
}

/// Consumption of one rolling rate-limit window.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitWindow {
    #[serde(deserialize_with = "deserialize_lenient_f64")]
    pub used_percent: Option<f64>,
    pub limit_window_seconds: Option<u64>,
    pub reset_after_seconds: Option<u64>,
    pub reset_at: Option<i64>,
}

impl RateLimitWindow {
    pub fn reset_after(&self) -> Option<Duration> {
        self.reset_after_seconds.map(Duration::from_secs)
    }
}

const SECS_PER_DAY: f64 = 86_400.0;

/// Human-readable report: plan, credits, then rate-limit windows.
///
/// The primary window resets within hours and is shown in minutes; the
/// secondary window is shown in days.
impl fmt::Display for UsageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plan: {}", self.plan_type.as_deref().unwrap_or("unknown"))?;
        writeln!(f, "Email: {}", self.email.as_deref().unwrap_or("unknown"))?;

        let credits = self.credits.clone().unwrap_or_default();
        writeln!(f, "\nCredits:")?;
        match credits.balance {
            Some(balance) => writeln!(f, "  Balance: {balance}")?,
            None => writeln!(f, "  Balance: ?")?,
        }
        writeln!(f, "  Unlimited: {}", credits.unlimited)?;
        if let Some(local) = credits.approx_local_messages.as_ref().filter(|v| is_present(v)) {
            writeln!(f, "  Approx local messages: {local}")?;
        }
        if let Some(cloud) = credits.approx_cloud_messages.as_ref().filter(|v| is_present(v)) {
            writeln!(f, "  Approx cloud messages: {cloud}")?;
        }

        let rate_limit = self.rate_limit.clone().unwrap_or_default();
        writeln!(f, "\nRate Limit:")?;
        match rate_limit.allowed {
            Some(allowed) => write!(f, "  Allowed: {allowed}")?,
            None => write!(f, "  Allowed: ?")?,
        }
        if let Some(primary) = &rate_limit.primary_window {
            let minutes = primary.reset_after_seconds.unwrap_or(0) / 60;
            write!(
                f,
                "\n  Primary: {}% used, resets in {minutes} min",
                percent(primary.used_percent)
            )?;
        }
        if let Some(secondary) = &rate_limit.secondary_window {
            let days = secondary.reset_after_seconds.unwrap_or(0) as f64 / SECS_PER_DAY;
            write!(
                f,
                "\n  Secondary: {}% used, resets in {days:.1} days",
                percent(secondary.used_percent)
            )?;
        }
        Ok(())
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

/// Falsy provider values (null, 0, empty) are not worth printing.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(num) => num.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Parse a usage response body.
pub(crate) fn parse_usage_snapshot(body: &str) -> Result<UsageSnapshot, serde_json::Error> {
    serde_json::from_str(body)
}

/// Accept numbers given as JSON numbers or numeric strings; anything else is `None`.
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_snapshot() {
        let body = r#"{
            "plan_type": "plus",
            "email": "dev@example.com",
            "credits": {"has_credits": true, "unlimited": false, "balance": "12.5",
                        "approx_local_messages": [10, 20], "approx_cloud_messages": [1, 2]},
            "rate_limit": {
                "allowed": true,
                "limit_reached": false,
                "primary_window": {"used_percent": 42, "limit_window_seconds": 18000, "reset_after_seconds": 600, "reset_at": 1700000600},
                "secondary_window": {"used_percent": 7.5, "reset_after_seconds": 172800}
            }
        }"#;
        let snapshot = parse_usage_snapshot(body).expect("parse");
        assert_eq!(snapshot.plan_type.as_deref(), Some("plus"));
        assert_eq!(snapshot.email.as_deref(), Some("dev@example.com"));

        let credits = snapshot.credits.expect("credits");
        assert_eq!(credits.balance, Some(12.5));
        assert!(!credits.unlimited);
        assert!(credits.approx_local_messages.is_some());

        let rate_limit = snapshot.rate_limit.expect("rate limit");
        assert_eq!(rate_limit.allowed, Some(true));
        let primary = rate_limit.primary_window.expect("primary");
        assert_eq!(primary.used_percent, Some(42.0));
        assert_eq!(primary.reset_after(), Some(Duration::from_secs(600)));
        let secondary = rate_limit.secondary_window.expect("secondary");
        assert_eq!(secondary.used_percent, Some(7.5));
        assert_eq!(secondary.reset_after_seconds, Some(172_800));
    }

    #[test]
    fn missing_sections_default_to_none() {
        let snapshot = parse_usage_snapshot(r#"{"plan_type":"pro","unknown":1}"#).expect("parse");
        assert_eq!(snapshot.plan_type.as_deref(), Some("pro"));
        assert!(snapshot.credits.is_none());
        assert!(snapshot.rate_limit.is_none());
    }

    #[test]
    fn report_shows_minutes_for_primary_and_days_for_secondary() {
        let body = r#"{
            "plan_type": "plus",
            "credits": {"balance": 3, "unlimited": false, "approx_local_messages": [5, 9], "approx_cloud_messages": 0},
            "rate_limit": {
                "allowed": true,
                "primary_window": {"used_percent": 42, "reset_after_seconds": 630},
                "secondary_window": {"used_percent": 7.5, "reset_after_seconds": 172800}
            }
        }"#;
        let report = parse_usage_snapshot(body).expect("parse").to_string();
        assert!(report.starts_with("Plan: plus\nEmail: unknown\n"), "{report}");
        assert!(report.contains("  Balance: 3\n"), "{report}");
        assert!(report.contains("  Approx local messages: [5,9]\n"), "{report}");
        assert!(!report.contains("Approx cloud messages"), "{report}");
        assert!(report.contains("  Allowed: true"), "{report}");
        assert!(report.contains("  Primary: 42% used, resets in 10 min"), "{report}");
        assert!(report.contains("  Secondary: 7.5% used, resets in 2.0 days"), "{report}");
    }

    #[test]
    fn report_marks_unknown_values() {
        let report = UsageSnapshot::default().to_string();
        assert!(report.contains("Plan: unknown"));
        assert!(report.contains("  Balance: ?"));
        assert!(report.contains("  Allowed: ?"));
        assert!(!report.contains("Primary"));
    }

    #[test]
    fn null_balance_is_accepted() {
        let snapshot =
            parse_usage_snapshot(r#"{"credits":{"unlimited":true,"balance":null}}"#).expect("parse");
        let credits = snapshot.credits.expect("credits");
        assert!(credits.unlimited);
        assert_eq!(credits.balance, None);
    }
}
