use crate::status::{LoginStatus, Source, now_millis};
use crate::storage::{LINKEDIN_STATUS_KEY, LocalStorage};
use serde::{Deserialize, Serialize};

/// Cached verdicts older than this are treated as absent
pub const FRESHNESS_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// On-disk shape of the cached verdict
#[derive(Debug, Serialize, Deserialize)]
struct CachedStatus {
    logged_in: bool,
    user_name: Option<String>,
    timestamp: i64,
}

/// Best-effort cache of the last known verdict.
///
/// Every failure of the underlying storage is logged and reported as a miss.
#[derive(Debug, Clone)]
pub struct LocalCache {
    storage: LocalStorage,
    window_ms: i64,
}

impl LocalCache {
    pub fn new(storage: LocalStorage) -> Self {
        Self {
            storage,
            window_ms: FRESHNESS_WINDOW_MS,
        }
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    /// Store `status` stamped with the current time, replacing any previous entry
    pub fn put(&self, status: &LoginStatus) {
        let record = CachedStatus {
            logged_in: status.logged_in(),
            user_name: status.user_name().map(str::to_string),
            timestamp: now_millis(),
        };

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize login status: {}", e);
                return;
            }
        };

        match self.storage.set_item(LINKEDIN_STATUS_KEY, &json) {
            Ok(()) => tracing::debug!("Cached login status (logged_in={})", record.logged_in),
            Err(e) => tracing::warn!("Failed to cache login status: {}", e),
        }
    }

    pub fn get(&self) -> Option<LoginStatus> {
        self.get_at(now_millis())
    }

    /// Read the cached verdict as of `now`; stale and malformed entries are removed
    pub fn get_at(&self, now: i64) -> Option<LoginStatus> {
        let raw = match self.storage.get_item(LINKEDIN_STATUS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Local storage unavailable, treating as cache miss: {}", e);
                return None;
            }
        };

        let record: CachedStatus = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Removing malformed cached login status: {}", e);
                self.clear();
                return None;
            }
        };

        let status = LoginStatus::with_timestamp(
            record.logged_in,
            record.user_name,
            record.timestamp,
            Source::LocalHeuristic,
        );

        let age = status.age_at(now);
        if age > self.window_ms {
            tracing::debug!("Cached login status is stale ({} ms old)", age);
            self.clear();
            return None;
        }

        Some(status)
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(LINKEDIN_STATUS_KEY) {
            tracing::warn!("Failed to clear cached login status: {}", e);
        }
    }
}
