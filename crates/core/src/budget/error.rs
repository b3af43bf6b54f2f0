//! Budget error types.

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, BudgetId, MAX_AMOUNT};
use thiserror::Error;

use super::types::BudgetStatus;
use crate::error::ErrorKind;
use crate::store::StoreError;

/// Budget-related errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Budget not found.
    #[error("Budget not found: {0}")]
    NotFound(BudgetId),

    /// Budget name is blank.
    #[error("Budget name is required")]
    NameRequired,

    /// Period ends before it starts.
    #[error("Budget period ends ({end}) before it starts ({start})")]
    InvalidPeriod {
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    /// Amount cannot be negative.
    #[error("Allocation for account {0} cannot be negative")]
    NegativeAmount(AccountId),

    /// A line amount exceeds the supported maximum.
    #[error("Allocation for account {0} exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    AmountOutOfRange(AccountId),

    /// Total allocation exceeds the supported maximum.
    #[error("Total allocation exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    TotalOutOfRange,

    /// Account budgeted twice.
    #[error("Account {0} appears on more than one budget line")]
    DuplicateBudgetLine(AccountId),

    /// A line's account sits under another line's account.
    #[error("Budget line {descendant} overlaps line {ancestor}")]
    OverlappingLines {
        /// Higher account.
        ancestor: AccountId,
        /// Account below it.
        descendant: AccountId,
    },

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Lines are editable only in draft.
    #[error("Budget lines cannot be modified in status {0}")]
    BudgetLocked(BudgetStatus),

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: BudgetStatus,
        /// The attempted target status.
        to: BudgetStatus,
    },

    /// Aggregate store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BudgetError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "BUDGET_NOT_FOUND",
            Self::NameRequired => "NAME_REQUIRED",
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::AmountOutOfRange(_) | Self::TotalOutOfRange => "AMOUNT_OUT_OF_RANGE",
            Self::DuplicateBudgetLine(_) => "DUPLICATE_BUDGET_LINE",
            Self::OverlappingLines { .. } => "OVERLAPPING_BUDGET_LINES",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::BudgetLocked(_) => "BUDGET_LOCKED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::AccountNotFound(_) => ErrorKind::NotFound,
            Self::NameRequired
            | Self::InvalidPeriod { .. }
            | Self::NegativeAmount(_)
            | Self::AmountOutOfRange(_)
            | Self::TotalOutOfRange
            | Self::DuplicateBudgetLine(_)
            | Self::OverlappingLines { .. } => ErrorKind::Validation,
            Self::BudgetLocked(_) | Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::Store(e) => e.kind(),
        }
    }
}
