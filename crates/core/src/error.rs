//! Error taxonomy shared by every engine module.

use serde::Serialize;

/// Category of an engine failure.
///
/// Every module error maps onto exactly one kind, so callers can branch on
/// the category without knowing the concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// State machine violation.
    InvalidTransition,
    /// Competing writers on the same aggregate, or a stale version.
    ConcurrencyConflict,
    /// Reference to an unknown entity.
    NotFound,
    /// Double-entry invariant violation. The write is always blocked.
    Integrity,
    /// Failure of the backing store.
    Internal,
}

impl ErrorKind {
    /// Returns the HTTP status code conventionally used for this kind.
    #[must_use]
    pub const fn http_status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::ConcurrencyConflict => 409,
            Self::InvalidTransition | Self::Integrity => 422,
            Self::Internal => 500,
        }
    }
}
