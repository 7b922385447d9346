//! Error types for jscadview core

use thiserror::Error;

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling persisted state
#[derive(Error, Debug)]
pub enum Error {
    /// Persisted state could not be encoded or decoded
    #[error("State serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted state has an unexpected shape
    #[error("Invalid persisted state: {0}")]
    InvalidState(String),

    /// The host rejected a storage write
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
