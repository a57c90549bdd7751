use serde::Serialize;
use siftin_core::LoginStatus;

/// What the login indicator currently shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UiState {
    Checking,
    LoggedIn { user_name: Option<String> },
    NotLoggedIn,
}

impl UiState {
    pub fn from_status(status: &LoginStatus) -> Self {
        if status.logged_in() {
            UiState::LoggedIn {
                user_name: status.user_name().map(str::to_string),
            }
        } else {
            UiState::NotLoggedIn
        }
    }

    pub fn label(&self) -> String {
        match self {
            UiState::Checking => "Checking...".to_string(),
            UiState::LoggedIn {
                user_name: Some(name),
            } => format!("Logged In — as {}", name),
            UiState::LoggedIn { user_name: None } => "Logged In".to_string(),
            UiState::NotLoggedIn => "Not Logged In".to_string(),
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, UiState::Checking)
    }
}

/// Anything that displays the login state
pub trait StatusIndicator: Send + Sync {
    fn render(&self, state: &UiState);
}

/// Indicator that only logs state changes
pub struct LogIndicator;

impl StatusIndicator for LogIndicator {
    fn render(&self, state: &UiState) {
        tracing::info!("LinkedIn status: {}", state.label());
    }
}
