use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
