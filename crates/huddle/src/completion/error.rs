//! Completion client error types.

use thiserror::Error;

/// Result type for completion operations.
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Errors that can occur during a completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// HTTP request failed (connect error, timeout, ...).
    #[error("completion request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("completion provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("failed to parse completion response: {0}")]
    Parse(String),

    /// Provider returned no usable text.
    #[error("completion provider returned an empty reply")]
    Empty,
}
