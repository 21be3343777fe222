//! Error types for reef-core.

use thiserror::Error;

/// Errors that can occur in core marketplace primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Rating score outside the accepted range.
    #[error("score must be between 1 and 100, got {0}")]
    InvalidScore(u8),
}
