//! Error types for repertoire-core.

use thiserror::Error;

/// Result type alias using SchedulerError.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors surfaced by the scheduler to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// No progress record exists for the item; it must be activated first.
    #[error("no progress for {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
