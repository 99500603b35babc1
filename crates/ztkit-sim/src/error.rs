//! Error types for the simulated kit device.

use thiserror::Error;

/// Errors raised while loading or persisting simulator state.
#[derive(Debug, Error)]
pub enum SimError {
    /// Filesystem access failed.
    #[error("state I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state was not valid JSON.
    #[error("state decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Persisted key material was malformed.
    #[error("key material error: {0}")]
    Key(String),
}

/// Result type alias for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
