//! Error types for notekeep.

use thiserror::Error;

use crate::username::UsernameError;

/// Result type alias using notekeep's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for notekeep operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, malformed, or unknown bearer token
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Missing or unusable request fields
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Note (or other resource) not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Username rejected by the format policy
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
