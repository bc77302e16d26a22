//! Error types for the sync layer.
//!
//! Failures are classified once, at the transport boundary, and carried as
//! tagged variants from there on.

use crate::mutation::MutationKind;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The server could not be reached, or the request timed out.
    #[error("network error: {0}")]
    Transport(String),

    /// The server (or local form validation) rejected specific fields.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The target record no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other failure.
    #[error("{0}")]
    Unknown(String),

    /// A mutation of the same kind is still in flight.
    #[error("still saving: another {0} is in progress")]
    StillSaving(MutationKind),

    /// The engine was shut down while the operation was suspended.
    #[error("operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Per-field messages, for errors that carry them.
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            SyncError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message to show in a non-field banner, if this error is shown as one.
    pub fn banner_message(&self) -> Option<String> {
        match self {
            SyncError::Validation(_) | SyncError::Cancelled => None,
            other => Some(other.to_string()),
        }
    }

    /// Returns true for rejections that clear up without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::StillSaving(_) | SyncError::Transport(_))
    }

    /// Returns true if local state is known stale and should be refetched.
    pub fn requires_refresh(&self) -> bool {
        matches!(self, SyncError::NotFound(_))
    }
}
