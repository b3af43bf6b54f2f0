//! Payment operations.

use finledger_shared::types::{PaymentId, UserId};
use tracing::{info, warn};

use super::{EngineError, FinanceEngine, missing};
use crate::invoice::{InvoiceError, InvoiceService, InvoiceType};
use crate::payment::{NewPayment, Payment, PaymentError, PaymentService};

impl FinanceEngine {
    /// Records a pending payment or receipt.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount, a missing
    /// target, or a payment direction that does not match the linked invoice.
    pub fn create_payment(
        &self,
        input: NewPayment,
        created_by: Option<UserId>,
    ) -> Result<Payment, EngineError> {
        if let Some(invoice_id) = input.invoice_id {
            let invoice = self.invoice(invoice_id)?;
            PaymentService::check_invoice_link(input.payment_type, invoice.invoice_type)?;
        }
        let accounts = self.posting_accounts()?;

        let payment_type = input.payment_type;
        let payment = PaymentService::create(input, String::new(), accounts.default_cash, created_by)
            .inspect_err(|e| warn!(error = %e, "Rejected payment"))?;
        let allocated = self.numbers.next_plain(payment_type.prefix());
        let payment = Payment {
            number: allocated.number,
            sequence: allocated.sequence,
            ..payment
        };

        let payment = self.payments.insert(payment.id, payment)?;
        info!(
            payment_id = %payment.id,
            number = %payment.number,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Stored payment.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn payment(&self, id: PaymentId) -> Result<Payment, EngineError> {
        self.payments
            .get(&id)
            .map_err(|e| missing(e.into(), || PaymentError::NotFound(id).into()))
    }

    /// All payments ordered by number prefix, then counter sequence.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if a payment stays locked past the timeout.
    pub fn list_payments(&self) -> Result<Vec<Payment>, EngineError> {
        let mut payments = self.payments.list()?;
        payments.sort_by_key(|p| (p.payment_type.prefix(), p.sequence));
        Ok(payments)
    }

    /// Confirms a pending payment and posts it.
    ///
    /// A linked payment locks the payment first, then the invoice, applies
    /// the amount to the invoice and posts against its receivable or
    /// payable. An unlinked payment posts against its counter account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside pending, any invoice payment
    /// error, or a ledger error. Nothing changes on error.
    pub fn confirm_payment(
        &self,
        id: PaymentId,
        confirmed_by: Option<UserId>,
        expected_version: Option<u64>,
    ) -> Result<Payment, EngineError> {
        let accounts = self.posting_accounts()?;
        let ((), payment) = self
            .payments
            .update(&id, expected_version, |payment| {
                PaymentService::confirm(payment, confirmed_by)?;

                let journal_id = match (payment.invoice_id, payment.counter_account) {
                    (Some(invoice_id), _) => {
                        let (journal_id, invoice) = self
                            .invoices
                            .update(&invoice_id, None, |invoice| {
                                PaymentService::check_invoice_link(
                                    payment.payment_type,
                                    invoice.invoice_type,
                                )?;
                                InvoiceService::apply_payment(invoice, payment.id, payment.amount)?;
                                let counter = match invoice.invoice_type {
                                    InvoiceType::Purchase => accounts.payable,
                                    _ => accounts.receivable,
                                };
                                let entry =
                                    self.ledger.post_journal(PaymentService::journal(payment, counter))?;
                                Ok::<_, EngineError>(entry.id)
                            })
                            .map_err(|e| missing(e, || InvoiceError::NotFound(invoice_id).into()))?;
                        info!(
                            invoice_id = %invoice.id,
                            paid = %invoice.paid_amount,
                            outstanding = %invoice.outstanding_amount,
                            status = ?invoice.status,
                            "Invoice payment applied"
                        );
                        journal_id
                    }
                    (None, Some(counter)) => {
                        self.ledger
                            .post_journal(PaymentService::journal(payment, counter))?
                            .id
                    }
                    (None, None) => return Err(PaymentError::TargetRequired.into()),
                };
                payment.journal_id = Some(journal_id);
                Ok::<_, EngineError>(())
            })
            .map_err(|e| missing(e, || PaymentError::NotFound(id).into()))
            .inspect_err(|e| warn!(payment_id = %id, error = %e, "Payment confirmation failed"))?;

        info!(
            payment_id = %id,
            number = %payment.number,
            amount = %payment.amount,
            direction = ?payment.payment_type,
            "Payment confirmed"
        );
        Ok(payment)
    }

    /// Cancels a pending payment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside pending.
    pub fn cancel_payment(&self, id: PaymentId, expected_version: Option<u64>) -> Result<Payment, EngineError> {
        let ((), payment) = self
            .payments
            .update(&id, expected_version, |payment| {
                PaymentService::cancel(payment).map_err(EngineError::from)
            })
            .map_err(|e| missing(e, || PaymentError::NotFound(id).into()))?;

        info!(payment_id = %id, number = %payment.number, "Payment cancelled");
        Ok(payment)
    }
}
