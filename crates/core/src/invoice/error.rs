//! Invoice error types.

use finledger_shared::types::{InvoiceId, MAX_AMOUNT};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{InvoiceStatus, InvoiceType};
use crate::error::ErrorKind;
use crate::store::StoreError;

/// Errors that can occur during invoice operations.
#[derive(Debug, Error)]
pub enum InvoiceError {
    // ========== Validation ==========
    /// An invoice needs at least one line.
    #[error("Invoice must have at least one line item")]
    NoLines,

    /// Line quantity is zero or negative.
    #[error("Line {line}: quantity must be positive")]
    NonPositiveQuantity {
        /// 1-based line number.
        line: usize,
    },

    /// Line unit price is negative.
    #[error("Line {line}: unit price cannot be negative")]
    NegativeUnitPrice {
        /// 1-based line number.
        line: usize,
    },

    /// Discount or tax percentage outside 0..=100.
    #[error("Line {line}: {field} must be between 0 and 100")]
    PercentOutOfRange {
        /// 1-based line number.
        line: usize,
        /// Offending field.
        field: &'static str,
    },

    /// A line figure exceeds the supported maximum.
    #[error("Line {line}: amount exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    LineAmountOutOfRange {
        /// 1-based line number.
        line: usize,
    },

    /// Invoice totals exceed the supported maximum.
    #[error("Invoice total exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    TotalOutOfRange,

    /// Header discount outside 0..=subtotal.
    #[error("Discount {discount} must be between 0 and the subtotal {subtotal}")]
    DiscountOutOfRange {
        /// Requested discount.
        discount: Decimal,
        /// Invoice subtotal.
        subtotal: Decimal,
    },

    /// Due date precedes issue date.
    #[error("Due date cannot be before the issue date")]
    DueBeforeIssue,

    /// Counterparty is blank.
    #[error("Counterparty is required")]
    CounterpartyRequired,

    /// Payment amount is zero or negative.
    #[error("Payment amount must be positive, got {0}")]
    NonPositivePayment(Decimal),

    /// Payment exceeds the outstanding amount.
    #[error("Payment {amount} exceeds outstanding amount {outstanding}")]
    Overpayment {
        /// Payment amount.
        amount: Decimal,
        /// Outstanding amount before the payment.
        outstanding: Decimal,
    },

    /// Cancellation needs a reason.
    #[error("Cancellation reason is required")]
    ReasonRequired,

    // ========== State Machine ==========
    /// The action is not allowed in the current status.
    #[error("Cannot {action} an invoice in status {from}")]
    InvalidTransition {
        /// Current status.
        from: InvoiceStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// Proforma invoices take no payments.
    #[error("A {0:?} invoice cannot receive payments")]
    NotPayable(InvoiceType),

    /// Settlement without full payment.
    #[error("Invoice is not fully paid: paid {paid} of {total}")]
    NotFullyPaid {
        /// Paid amount.
        paid: Decimal,
        /// Total amount.
        total: Decimal,
    },

    // ========== Lookup ==========
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(InvoiceId),

    /// Aggregate store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl InvoiceError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINE_ITEMS",
            Self::NonPositiveQuantity { .. } => "INVALID_QUANTITY",
            Self::NegativeUnitPrice { .. } => "INVALID_UNIT_PRICE",
            Self::PercentOutOfRange { .. } => "PERCENT_OUT_OF_RANGE",
            Self::LineAmountOutOfRange { .. } | Self::TotalOutOfRange => "AMOUNT_OUT_OF_RANGE",
            Self::DiscountOutOfRange { .. } => "DISCOUNT_OUT_OF_RANGE",
            Self::DueBeforeIssue => "DUE_BEFORE_ISSUE",
            Self::CounterpartyRequired => "COUNTERPARTY_REQUIRED",
            Self::NonPositivePayment(_) => "INVALID_PAYMENT_AMOUNT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotPayable(_) => "INVOICE_NOT_PAYABLE",
            Self::NotFullyPaid { .. } => "INVOICE_NOT_FULLY_PAID",
            Self::NotFound(_) => "INVOICE_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoLines
            | Self::NonPositiveQuantity { .. }
            | Self::NegativeUnitPrice { .. }
            | Self::PercentOutOfRange { .. }
            | Self::LineAmountOutOfRange { .. }
            | Self::TotalOutOfRange
            | Self::DiscountOutOfRange { .. }
            | Self::DueBeforeIssue
            | Self::CounterpartyRequired
            | Self::NonPositivePayment(_)
            | Self::Overpayment { .. }
            | Self::ReasonRequired => ErrorKind::Validation,
            Self::InvalidTransition { .. } | Self::NotPayable(_) | Self::NotFullyPaid { .. } => {
                ErrorKind::InvalidTransition
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Store(e) => e.kind(),
        }
    }
}
