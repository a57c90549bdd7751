use crate::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const USER_EMAIL_KEY: &str = "user_email";
pub const LINKEDIN_STATUS_KEY: &str = "siftin_linkedin_status";

/// Durable string key/value store shared by every context using the same file.
///
/// There is no locking: concurrent writers race and the last write wins.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.siftin/local_storage.json`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Unavailable("could not determine home directory".to_string()))?;
        Ok(home.join(".siftin").join("local_storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read one value. A value that is not a string is removed and reads as absent.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let mut raw = self.load_raw()?;
        match raw.remove(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => {
                tracing::warn!("Removing malformed local storage entry '{}'", key);
                self.save(&string_entries(raw))?;
                Ok(None)
            }
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.load_for_write();
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.load_for_write();
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }

    /// Drop every credential the API client reads
    pub fn clear_auth(&self) -> Result<()> {
        let mut items = self.load_for_write();
        let had_token = items.remove(AUTH_TOKEN_KEY).is_some();
        let had_email = items.remove(USER_EMAIL_KEY).is_some();
        if had_token || had_email {
            self.save(&items)?;
        }
        tracing::debug!("Cleared local auth state");
        Ok(())
    }

    fn load_raw(&self) -> Result<BTreeMap<String, Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        Ok(string_entries(self.load_raw()?))
    }

    // A corrupt file is replaced on the next write instead of blocking it forever
    fn load_for_write(&self) -> BTreeMap<String, String> {
        self.load().unwrap_or_else(|e| {
            tracing::warn!("Discarding unreadable local storage {}: {}", self.path.display(), e);
            BTreeMap::new()
        })
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(serde_json::to_string_pretty(items)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

/// Keep the string values; anything else was not written by `set_item`
fn string_entries(raw: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(value) => Some((key, value)),
            _ => {
                tracing::debug!("Skipping non-string local storage entry '{}'", key);
                None
            }
        })
        .collect()
}
