use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Authentication required. Please log in again.")]
    AuthRequired,

    #[error("{detail}")]
    Http { status: u16, detail: String },

    #[error("Cannot connect to API server: {0}")]
    Unreachable(String),

    #[error("Request timed out after {}ms", .timeout.as_millis())]
    Timeout { timeout: Duration },

    #[error("Invalid response from API server: {0}")]
    Decode(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to initialize HTTP client: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, Error>;
