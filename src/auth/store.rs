//! Persistent auth file helpers.
//!
//! The auth file is shared with other tools, so every save is a
//! read-modify-write of the whole JSON object. Entries for other providers
//! are kept as raw JSON text and written back exactly as read, in file order.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::error::AuthError;
use super::jwt::extract_account_id;
use super::types::Credentials;

/// Provider key of the Codex entry inside the auth file.
pub const DEFAULT_PROVIDER_KEY: &str = "openai-codex";

static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(0);

/// On-disk shape of one provider entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedEntry {
    #[serde(rename = "type", default = "oauth_kind")]
    kind: String,
    access: String,
    refresh: String,
    #[serde(deserialize_with = "deserialize_epoch_millis")]
    expires: i64,
    #[serde(rename = "accountId", default)]
    account_id: String,
}

fn oauth_kind() -> String {
    "oauth".to_string()
}

/// Top-level auth file object: provider key to the entry's unparsed JSON.
///
/// Entries are never decoded unless asked for, so numbers and strings in
/// other providers' entries survive a save untouched.
#[derive(Debug, Default)]
pub(crate) struct AuthFile {
    entries: Vec<(String, Box<RawValue>)>,
}

impl AuthFile {
    pub(crate) fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, raw)| raw.as_ref())
    }

    /// Replace `key` in place, or append it when absent.
    pub(crate) fn set(&mut self, key: &str, raw: Box<RawValue>) {
        match self.entries.iter_mut().find(|(name, _)| name == key) {
            Some(slot) => slot.1 = raw,
            None => self.entries.push((key.to_string(), raw)),
        }
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<'de> Deserialize<'de> for AuthFile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AuthFileVisitor;

        impl<'de> Visitor<'de> for AuthFileVisitor {
            type Value = AuthFile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object keyed by provider")
            }

            fn visit_map<A>(self, mut access: A) -> Result<AuthFile, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut file = AuthFile::default();
                while let Some((key, raw)) = access.next_entry::<String, Box<RawValue>>()? {
                    file.set(&key, raw);
                }
                Ok(file)
            }
        }

        deserializer.deserialize_map(AuthFileVisitor)
    }
}

impl Serialize for AuthFile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, raw) in &self.entries {
            map.serialize_entry(key, raw)?;
        }
        map.end()
    }
}

/// Returns the default auth file path (`~/.pi/agent/auth.json`) when available.
pub fn default_auth_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pi").join("agent").join("auth.json"))
}

/// Load the provider entry as credentials.
///
/// A missing or empty `accountId` is derived from the access token.
pub(crate) fn load_credentials(path: &Path, provider: &str) -> Result<Credentials, AuthError> {
    let not_configured = || AuthError::NotConfigured {
        path: path.to_path_buf(),
        provider: provider.to_string(),
    };
    let file = read_auth_file(path)?.ok_or_else(not_configured)?;
    let raw = file.get(provider).ok_or_else(not_configured)?;
    let entry: PersistedEntry = serde_json::from_str(raw.get()).map_err(|err| {
        AuthError::persistence(path, format!("invalid `{provider}` entry: {err}"))
    })?;

    let account_id = match entry.account_id.trim() {
        "" => extract_account_id(&entry.access)?,
        stored => stored.to_string(),
    };
    Ok(Credentials {
        access: entry.access,
        refresh: entry.refresh,
        expires: entry.expires,
        account_id,
    })
}

/// Persist credentials under `provider`, keeping every other key in the file.
pub(crate) fn save_credentials(
    path: &Path,
    provider: &str,
    creds: &Credentials,
) -> Result<(), AuthError> {
    let mut file = read_auth_file(path)?.unwrap_or_default();
    let entry = PersistedEntry {
        kind: oauth_kind(),
        access: creds.access.clone(),
        refresh: creds.refresh.clone(),
        expires: creds.expires,
        account_id: creds.account_id.clone(),
    };
    let raw = serde_json::value::to_raw_value(&entry)
        .map_err(|err| AuthError::persistence(path, err))?;
    file.set(provider, raw);
    write_auth_file(path, &file)
}

/// Read the whole auth file; `None` when it does not exist.
pub(crate) fn read_auth_file(path: &Path) -> Result<Option<AuthFile>, AuthError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(AuthError::persistence(path, err)),
    };
    if text.trim().is_empty() {
        return Ok(Some(AuthFile::default()));
    }
    serde_json::from_str::<AuthFile>(&text)
        .map(Some)
        .map_err(|err| AuthError::persistence(path, format!("failed to parse JSON: {err}")))
}

/// Atomically replace the auth file with `file`.
///
/// The JSON is written to a sibling temp file first and renamed over the
/// target, so concurrent readers see either the old or the new file.
pub(crate) fn write_auth_file(path: &Path, file: &AuthFile) -> Result<(), AuthError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| AuthError::persistence(path, err))?;
    }

    let text =
        serde_json::to_string_pretty(file).map_err(|err| AuthError::persistence(path, err))?;
    let temp_path = temp_sibling(path);
    let result = write_private_file(&temp_path, text.as_bytes())
        .and_then(|()| std::fs::rename(&temp_path, path));
    if let Err(err) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(AuthError::persistence(path, err));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let id = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "auth.json".to_string());
    path.with_file_name(format!(".{name}.tmp-{}-{id}", std::process::id()))
}

fn write_private_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Accept epoch milliseconds written as integer, float, or numeric string.
fn deserialize_epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(num) => num
            .as_i64()
            .or_else(|| num.as_f64().map(|f| f as i64))
            .ok_or_else(|| serde::de::Error::custom("expires must be a number")),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|err| serde::de::Error::custom(format!("invalid expires: {err}"))),
        _ => Err(serde::de::Error::custom("expires must be a number or string")),
    }
}
