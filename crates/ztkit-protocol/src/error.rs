//! Error types for the kit protocol.

use thiserror::Error;

/// Errors that can occur when talking to a kit device.
#[derive(Debug, Error)]
pub enum KitError {
    /// No report arrived within the read timeout.
    #[error("timeout (>{timeout_ms} ms) waiting for reply from kit device")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// Received text does not match the kit frame grammar.
    #[error("unable to parse kit protocol reply: {0}")]
    Parse(String),

    /// A reply frame carried a non-zero status byte.
    #[error("kit protocol error, received reply {frame}")]
    Status {
        /// The status byte from the reply frame.
        status: u8,
        /// The raw frame text, kept for diagnostics.
        frame: String,
    },

    /// The board application answered with an error object.
    #[error("kit error {error_code}: {error_msg}")]
    App {
        /// Application-level error code.
        error_code: u32,
        /// Human-readable error message from the board.
        error_msg: String,
    },

    /// A reply payload was not valid hex.
    #[error("invalid hex in reply payload: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A command or reply body was not valid JSON.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The underlying report device failed.
    #[error("device error: {0}")]
    Device(String),
}

/// Result type alias for kit protocol operations.
pub type KitResult<T> = Result<T, KitError>;
