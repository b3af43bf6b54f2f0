//! Expense error types.

use finledger_shared::types::{ExpenseId, MAX_AMOUNT};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::ExpenseStatus;
use crate::error::ErrorKind;
use crate::store::StoreError;

/// Errors that can occur during expense operations.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Amount is zero or negative.
    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount exceeds the supported maximum.
    #[error("Expense amount {0} exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    AmountOutOfRange(Decimal),

    /// Description is blank.
    #[error("Expense description is required")]
    DescriptionRequired,

    /// The charged account is not an expense leaf account.
    #[error("Account {0} is not an expense leaf account")]
    NotExpenseAccount(String),

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ExpenseStatus,
        /// The attempted target status.
        to: ExpenseStatus,
    },

    /// Only draft expenses can be edited.
    #[error("Cannot edit an expense in status {0}")]
    NotEditable(ExpenseStatus),

    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(ExpenseId),

    /// Aggregate store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ExpenseError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "INVALID_AMOUNT",
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            Self::DescriptionRequired => "DESCRIPTION_REQUIRED",
            Self::NotExpenseAccount(_) => "NOT_EXPENSE_ACCOUNT",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::InvalidTransition { .. } | Self::NotEditable(_) => "INVALID_TRANSITION",
            Self::NotFound(_) => "EXPENSE_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveAmount(_)
            | Self::AmountOutOfRange(_)
            | Self::DescriptionRequired
            | Self::NotExpenseAccount(_)
            | Self::RejectionReasonRequired => ErrorKind::Validation,
            Self::InvalidTransition { .. } | Self::NotEditable(_) => ErrorKind::InvalidTransition,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Store(e) => e.kind(),
        }
    }
}
