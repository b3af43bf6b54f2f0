//! Store error types.

use thiserror::Error;

use crate::error::ErrorKind;

/// Errors raised by the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No aggregate with this id.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Aggregate kind, e.g. `invoice`.
        kind: &'static str,
        /// Aggregate id.
        id: String,
    },

    /// The aggregate lock could not be acquired within the configured timeout.
    #[error("{kind} {id} is locked by another operation, please retry")]
    LockTimeout {
        /// Aggregate kind.
        kind: &'static str,
        /// Aggregate id.
        id: String,
    },

    /// The caller's expected version is stale.
    #[error("{kind} {id} version mismatch: expected {expected}, found {actual}")]
    VersionMismatch {
        /// Aggregate kind.
        kind: &'static str,
        /// Aggregate id.
        id: String,
        /// Version the caller saw.
        expected: u64,
        /// Current version.
        actual: u64,
    },

    /// An aggregate with this id already exists.
    #[error("{kind} already exists: {id}")]
    Duplicate {
        /// Aggregate kind.
        kind: &'static str,
        /// Aggregate id.
        id: String,
    },

    /// Failure of the backing store.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::LockTimeout { .. } => "LOCK_TIMEOUT",
            Self::VersionMismatch { .. } => "VERSION_MISMATCH",
            Self::Duplicate { .. } => "DUPLICATE",
            Self::Backend(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::LockTimeout { .. } | Self::VersionMismatch { .. } => {
                ErrorKind::ConcurrencyConflict
            }
            Self::Duplicate { .. } => ErrorKind::Validation,
            Self::Backend(_) => ErrorKind::Internal,
        }
    }
}
