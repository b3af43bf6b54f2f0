//! Payment state machine and posting rules.

use chrono::Utc;
use finledger_shared::types::{AccountId, PaymentId, UserId, within_limit};
use rust_decimal::Decimal;

use super::error::PaymentError;
use super::types::{NewPayment, Payment, PaymentStatus, PaymentType};
use crate::invoice::InvoiceType;
use crate::ledger::{JournalInput, JournalLineInput, SourceReference};

/// Stateless service for payment transitions.
pub struct PaymentService;

impl PaymentService {
    /// Builds a pending payment from validated input.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive or out-of-range amount,
    /// or a missing invoice/counter account.
    pub fn create(
        input: NewPayment,
        number: String,
        cash_account: AccountId,
        created_by: Option<UserId>,
    ) -> Result<Payment, PaymentError> {
        if input.amount <= Decimal::ZERO {
            return Err(PaymentError::NonPositiveAmount(input.amount));
        }
        if !within_limit(input.amount) {
            return Err(PaymentError::AmountOutOfRange(input.amount));
        }
        if input.invoice_id.is_none() && input.counter_account.is_none() {
            return Err(PaymentError::TargetRequired);
        }

        Ok(Payment {
            id: PaymentId::new(),
            number,
            sequence: 0,
            payment_type: input.payment_type,
            amount: input.amount,
            method: input.method,
            status: PaymentStatus::Pending,
            payment_date: input.payment_date,
            invoice_id: input.invoice_id,
            cash_account: input.cash_account.unwrap_or(cash_account),
            counter_account: input.counter_account,
            reference: input.reference,
            notes: input.notes,
            journal_id: None,
            created_by,
            confirmed_by: None,
            confirmed_at: None,
            version: 0,
        })
    }

    /// Checks that the payment direction matches the invoice type.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceTypeMismatch` for receipts against purchase invoices,
    /// payments against sales invoices, and anything against proforma.
    pub fn check_invoice_link(
        payment_type: PaymentType,
        invoice_type: InvoiceType,
    ) -> Result<(), PaymentError> {
        match (payment_type, invoice_type) {
            (PaymentType::Receipt, InvoiceType::Sales)
            | (PaymentType::Payment, InvoiceType::Purchase) => Ok(()),
            _ => Err(PaymentError::InvoiceTypeMismatch {
                payment_type,
                invoice_type,
            }),
        }
    }

    /// Confirms a pending payment: pending → confirmed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside pending.
    pub fn confirm(payment: &mut Payment, confirmed_by: Option<UserId>) -> Result<(), PaymentError> {
        if payment.status != PaymentStatus::Pending {
            return Err(PaymentError::InvalidTransition {
                from: payment.status,
                action: "confirm",
            });
        }
        payment.status = PaymentStatus::Confirmed;
        payment.confirmed_by = confirmed_by;
        payment.confirmed_at = Some(Utc::now());
        Ok(())
    }

    /// Cancels a pending payment: pending → cancelled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside pending.
    pub fn cancel(payment: &mut Payment) -> Result<(), PaymentError> {
        if payment.status != PaymentStatus::Pending {
            return Err(PaymentError::InvalidTransition {
                from: payment.status,
                action: "cancel",
            });
        }
        payment.status = PaymentStatus::Cancelled;
        Ok(())
    }

    /// Journal moving cash against `counter`: receipts debit cash, payments
    /// credit it.
    #[must_use]
    pub fn journal(payment: &Payment, counter: AccountId) -> JournalInput {
        let lines = match payment.payment_type {
            PaymentType::Receipt => vec![
                JournalLineInput::debit(payment.cash_account, payment.amount),
                JournalLineInput::credit(counter, payment.amount),
            ],
            PaymentType::Payment => vec![
                JournalLineInput::debit(counter, payment.amount),
                JournalLineInput::credit(payment.cash_account, payment.amount),
            ],
        };
        JournalInput {
            date: payment.payment_date,
            description: format!("Payment {}", payment.number),
            reference: Some(SourceReference::Payment(payment.id)),
            lines,
        }
    }
}
