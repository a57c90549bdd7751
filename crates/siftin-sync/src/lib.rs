// Status API client and the login-status sync cycle

pub mod client;
pub mod config;
pub mod error;
pub mod messenger;
pub mod orchestrator;
pub mod types;
pub mod ui;

pub use client::{ApiClient, StatusApi, spawn_push};
pub use config::{ApiConfig, DEFAULT_BASE_URL, HEAVY_TIMEOUT, STATUS_TIMEOUT};
pub use error::{Error, Result};
pub use messenger::{Messenger, VerdictStore, channel};
pub use orchestrator::{SyncOrchestrator, SyncPhase};
pub use types::{Ack, DirectStatus, PullResponse, PullState};
pub use ui::{LogIndicator, StatusIndicator, UiState};
