//! Engine-level error wrapping every module error.

use thiserror::Error;

use crate::budget::BudgetError;
use crate::error::ErrorKind;
use crate::expense::ExpenseError;
use crate::invoice::InvoiceError;
use crate::ledger::LedgerError;
use crate::payment::PaymentError;
use crate::reports::ReportError;
use crate::store::StoreError;
use crate::tax::TaxError;

/// Any failure surfaced by [`super::FinanceEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Invoice failure.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// Payment failure.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Expense failure.
    #[error(transparent)]
    Expense(#[from] ExpenseError),

    /// Budget failure.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Tax failure.
    #[error(transparent)]
    Tax(#[from] TaxError),

    /// Report failure.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Aggregate store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Engine settings are invalid.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Invoice(e) => e.error_code(),
            Self::Payment(e) => e.error_code(),
            Self::Expense(e) => e.error_code(),
            Self::Budget(e) => e.error_code(),
            Self::Tax(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
            Self::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) => e.kind(),
            Self::Invoice(e) => e.kind(),
            Self::Payment(e) => e.kind(),
            Self::Expense(e) => e.kind(),
            Self::Budget(e) => e.kind(),
            Self::Tax(e) => e.kind(),
            Self::Report(e) => e.kind(),
            Self::Store(e) => e.kind(),
            Self::InvalidConfig(_) => ErrorKind::Validation,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        self.kind().http_status_code()
    }
}
