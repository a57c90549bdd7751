use serde::{Deserialize, Serialize};

/// Freshness of the verdict the backend last received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullState {
    Success,
    Expired,
    NotSet,
}

/// `GET /api/bookmarklet-status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullResponse {
    pub status: PullState,
    #[serde(default)]
    pub logged_in: Option<bool>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// `POST /api/bookmarklet-status` body
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PushBody<'a> {
    pub logged_in: bool,
    pub user_name: Option<&'a str>,
}

/// `GET /api/linkedin-login-status`; `logged_in` is null when the backend cannot tell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectStatus {
    #[serde(default)]
    pub logged_in: Option<bool>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub cached: bool,
}

/// Generic `{status, message}` acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
