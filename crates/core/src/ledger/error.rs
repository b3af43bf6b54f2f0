//! Ledger error types for validation, chart and state errors.

use finledger_shared::types::{AccountId, JournalId};
use thiserror::Error;

use super::account::{AccountSubtype, AccountType};
use super::validation::LedgerValidationError;
use crate::error::ErrorKind;
use crate::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Posting Validation ==========
    /// Journal legs failed validation.
    #[error(transparent)]
    Invalid(#[from] LedgerValidationError),

    /// Header accounts aggregate children and do not accept postings.
    #[error("Account {0} is a header account and does not accept postings")]
    HeaderAccount(String),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    /// A reversal needs a reason.
    #[error("Reversal reason is required")]
    ReasonRequired,

    // ========== Chart of Accounts ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No account carries this code.
    #[error("Account code not found: {0}")]
    AccountCodeNotFound(String),

    /// Account codes are unique.
    #[error("Account code already exists: {0}")]
    DuplicateAccountCode(String),

    /// Account code or name is blank.
    #[error("Account code and name are required")]
    BlankAccountField,

    /// Child and parent must share an account type.
    #[error("Parent {parent} is {parent_type}, child cannot be {child_type}")]
    ParentTypeMismatch {
        /// Parent account code.
        parent: String,
        /// Parent's type.
        parent_type: AccountType,
        /// Requested child type.
        child_type: AccountType,
    },

    /// Subtype does not belong to the account type.
    #[error("Subtype {subtype:?} cannot be used on a {account_type} account")]
    SubtypeMismatch {
        /// Requested subtype.
        subtype: AccountSubtype,
        /// Account type.
        account_type: AccountType,
    },

    /// A posted leaf cannot become a header.
    #[error("Account {0} already has postings and cannot receive child accounts")]
    ParentHasPostings(String),

    // ========== Journals ==========
    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    /// A journal can be reversed only once.
    #[error("Journal {0} has already been reversed")]
    AlreadyReversed(JournalId),

    /// Reversals are final.
    #[error("Journal {0} is itself a reversal and cannot be reversed")]
    CannotReverseReversal(JournalId),

    // ========== Storage ==========
    /// Transaction log failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid(e) => match e {
                LedgerValidationError::Unbalanced { .. } => "UNBALANCED_TRANSACTION",
                LedgerValidationError::InsufficientLegs => "INSUFFICIENT_ENTRIES",
                LedgerValidationError::SingleSided => "SINGLE_SIDED",
                LedgerValidationError::InvalidAmount => "INVALID_AMOUNT",
                LedgerValidationError::ExcessPrecision { .. } => "EXCESS_PRECISION",
                LedgerValidationError::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
            },
            Self::HeaderAccount(_) => "HEADER_ACCOUNT",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::BlankAccountField => "BLANK_ACCOUNT_FIELD",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::SubtypeMismatch { .. } => "SUBTYPE_MISMATCH",
            Self::ParentHasPostings(_) => "PARENT_HAS_POSTINGS",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::CannotReverseReversal(_) => "CANNOT_REVERSE_REVERSAL",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(e) if e.is_integrity_violation() => ErrorKind::Integrity,
            Self::Invalid(_)
            | Self::HeaderAccount(_)
            | Self::AccountInactive(_)
            | Self::ReasonRequired
            | Self::DuplicateAccountCode(_)
            | Self::BlankAccountField
            | Self::ParentTypeMismatch { .. }
            | Self::SubtypeMismatch { .. }
            | Self::ParentHasPostings(_) => ErrorKind::Validation,
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) | Self::JournalNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::AlreadyReversed(_) | Self::CannotReverseReversal(_) => {
                ErrorKind::InvalidTransition
            }
            Self::Store(e) => e.kind(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }
}
