use serde::{Deserialize, Serialize};

/// Where a verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    LocalHeuristic,
    RemoteApi,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::LocalHeuristic => "local-heuristic",
            Source::RemoteApi => "remote-api",
        }
    }
}

/// A single login verdict.
///
/// Fields are read-only; a new detection produces a new value rather than
/// mutating an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginStatus {
    logged_in: bool,
    user_name: Option<String>,
    timestamp: i64,
    source: Source,
}

impl LoginStatus {
    /// Create a verdict stamped with the current time
    pub fn new(logged_in: bool, user_name: Option<String>, source: Source) -> Self {
        Self::with_timestamp(logged_in, user_name, now_millis(), source)
    }

    pub fn with_timestamp(
        logged_in: bool,
        user_name: Option<String>,
        timestamp: i64,
        source: Source,
    ) -> Self {
        Self {
            logged_in,
            user_name,
            timestamp,
            source,
        }
    }

    /// Shorthand for a logged-out verdict with no name
    pub fn logged_out(source: Source) -> Self {
        Self::new(false, None, source)
    }

    pub fn logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Epoch milliseconds at creation
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Age in milliseconds relative to `now`. Future timestamps count as zero.
    pub fn age_at(&self, now: i64) -> i64 {
        (now - self.timestamp).max(0)
    }
}

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
