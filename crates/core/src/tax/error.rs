//! Tax error types.

use chrono::NaiveDate;
use finledger_shared::types::{MAX_AMOUNT, TaxId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{TaxStatus, TaxType};
use crate::error::ErrorKind;
use crate::store::StoreError;

/// Errors that can occur during tax operations.
#[derive(Debug, Error)]
pub enum TaxError {
    /// Month outside 1-12 or a year chrono cannot represent.
    #[error("Invalid tax period {year}-{month}")]
    InvalidPeriod {
        /// Period year.
        year: i32,
        /// Period month.
        month: u32,
    },

    /// Withheld taxes need a base and a rate.
    #[error("{0} needs a taxable amount and a tax rate")]
    FiguresRequired(TaxType),

    /// VAT figures come from the ledger and cannot be supplied.
    #[error("{0} figures are derived from the ledger and cannot be supplied")]
    FiguresDerived(TaxType),

    /// Base is negative.
    #[error("Taxable amount must not be negative, got {0}")]
    NegativeTaxableAmount(Decimal),

    /// Rate outside 0-100.
    #[error("Tax rate must be between 0 and 100, got {0}")]
    RateOutOfRange(Decimal),

    /// Amount exceeds the supported maximum.
    #[error("Tax amount {0} exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    AmountOutOfRange(Decimal),

    /// The period already has a record of this type.
    #[error("{tax_type} for {year}-{month:02} has already been calculated")]
    DuplicatePeriod {
        /// Kind of tax.
        tax_type: TaxType,
        /// Period year.
        year: i32,
        /// Period month.
        month: u32,
    },

    /// The action is not allowed in the current status.
    #[error("Cannot {action} a tax record in status {from}")]
    InvalidTransition {
        /// Current status.
        from: TaxStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// Nothing is owed, so there is nothing to remit.
    #[error("Tax amount {0} is not payable")]
    NothingToPay(Decimal),

    /// Payment dated before the return was filed.
    #[error("Payment date {paid} is before filing date {filed}")]
    PaidBeforeFiling {
        /// Filing date.
        filed: NaiveDate,
        /// Requested payment date.
        paid: NaiveDate,
    },

    /// Tax record not found.
    #[error("Tax record not found: {0}")]
    NotFound(TaxId),

    /// Aggregate store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TaxError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "INVALID_TAX_PERIOD",
            Self::FiguresRequired(_) => "TAX_FIGURES_REQUIRED",
            Self::FiguresDerived(_) => "TAX_FIGURES_DERIVED",
            Self::NegativeTaxableAmount(_) => "INVALID_TAXABLE_AMOUNT",
            Self::RateOutOfRange(_) => "INVALID_TAX_RATE",
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            Self::DuplicatePeriod { .. } => "TAX_PERIOD_EXISTS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NothingToPay(_) => "NOTHING_TO_PAY",
            Self::PaidBeforeFiling { .. } => "PAYMENT_BEFORE_FILING",
            Self::NotFound(_) => "TAX_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPeriod { .. }
            | Self::FiguresRequired(_)
            | Self::FiguresDerived(_)
            | Self::NegativeTaxableAmount(_)
            | Self::RateOutOfRange(_)
            | Self::AmountOutOfRange(_)
            | Self::DuplicatePeriod { .. }
            | Self::NothingToPay(_)
            | Self::PaidBeforeFiling { .. } => ErrorKind::Validation,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Store(e) => e.kind(),
        }
    }
}
