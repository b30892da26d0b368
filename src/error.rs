//! Error types for the Floodgate service.

use thiserror::Error;

/// Main error type for Floodgate operations.
#[derive(Error, Debug)]
pub enum FloodgateError {
    /// Invalid caller input (empty route or client identifier)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any failure from the shared counter store, including records that
    /// exist but cannot be deserialized
    #[error("Store error: {0}")]
    Store(String),

    /// Service configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<redis::RedisError> for FloodgateError {
    fn from(err: redis::RedisError) -> Self {
        FloodgateError::Store(err.to_string())
    }
}

// A stored config record that fails to parse is a store fault, never a
// silent fallback to defaults.
impl From<serde_json::Error> for FloodgateError {
    fn from(err: serde_json::Error) -> Self {
        FloodgateError::Store(format!("config record deserialization failed: {err}"))
    }
}

/// Result type alias for Floodgate operations.
pub type Result<T> = std::result::Result<T, FloodgateError>;
