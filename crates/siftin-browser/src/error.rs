use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to connect to browser at {endpoint} after {attempts} attempts: {message}")]
    Connect {
        endpoint: String,
        attempts: u32,
        message: String,
    },

    #[error("LinkedIn tab returned an empty document")]
    EmptyPage,

    #[error("CDP error: {0}")]
    Cdp(String),
}

impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
