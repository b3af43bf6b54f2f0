//! Payment error types.

use finledger_shared::types::{MAX_AMOUNT, PaymentId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::{PaymentStatus, PaymentType};
use crate::error::ErrorKind;
use crate::invoice::InvoiceType;
use crate::store::StoreError;

/// Errors that can occur during payment operations.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Amount is zero or negative.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount exceeds the supported maximum.
    #[error("Payment amount {0} exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    AmountOutOfRange(Decimal),

    /// Neither an invoice nor a counter account was given.
    #[error("A payment needs either an invoice or a counter account")]
    TargetRequired,

    /// Receipts settle sales invoices, payments settle purchase invoices.
    #[error("A {payment_type:?} cannot settle a {invoice_type:?} invoice")]
    InvoiceTypeMismatch {
        /// Payment direction.
        payment_type: PaymentType,
        /// Linked invoice type.
        invoice_type: InvoiceType,
    },

    /// The action is not allowed in the current status.
    #[error("Cannot {action} a payment in status {from}")]
    InvalidTransition {
        /// Current status.
        from: PaymentStatus,
        /// Attempted action.
        action: &'static str,
    },

    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(PaymentId),

    /// Aggregate store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "INVALID_PAYMENT_AMOUNT",
            Self::AmountOutOfRange(_) => "AMOUNT_OUT_OF_RANGE",
            Self::TargetRequired => "PAYMENT_TARGET_REQUIRED",
            Self::InvoiceTypeMismatch { .. } => "INVOICE_TYPE_MISMATCH",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::NotFound(_) => "PAYMENT_NOT_FOUND",
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the taxonomy kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NonPositiveAmount(_)
            | Self::AmountOutOfRange(_)
            | Self::TargetRequired
            | Self::InvoiceTypeMismatch { .. } => ErrorKind::Validation,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Store(e) => e.kind(),
        }
    }
}
