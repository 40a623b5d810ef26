//! Common error types for Snapwall

use thiserror::Error;

/// Common result type for Snapwall operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Snapwall crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend collaborator (persistence or object storage) failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Realtime channel failure
    #[error("Channel error: {0}")]
    Channel(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
