//! Error types for knowledge-base operations.

use crate::error::AppError;

/// Result type for KB operations
pub type KbResult<T> = std::result::Result<T, KbError>;

/// Errors that can occur in a KB repository. The in-memory backend cannot
/// fail structurally; these kinds exist for cancellation and for external
/// backends behind the same trait.
#[derive(Debug, thiserror::Error)]
pub enum KbError {
    /// Backend cannot be reached or refused the operation
    #[error("kb backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Operation gave up before completing
    #[error("kb operation cancelled")]
    Cancelled,
}

impl From<KbError> for AppError {
    fn from(err: KbError) -> Self {
        match err {
            KbError::BackendUnavailable(msg) => AppError::BackendUnavailable(msg),
            KbError::Cancelled => AppError::Internal("kb operation cancelled".to_string()),
        }
    }
}
