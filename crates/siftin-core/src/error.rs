use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to access local storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse local storage: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Local storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
