//! Invoice operations.

use chrono::{Datelike, NaiveDate};
use finledger_shared::types::{InvoiceId, UserId};
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::{EngineError, FinanceEngine, missing};
use crate::invoice::{
    AgingReport, Invoice, InvoiceError, InvoiceLineInput, InvoiceService, InvoiceType, InvoiceView,
    NewInvoice,
};

impl FinanceEngine {
    /// Creates a draft invoice with the next number for its type.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid lines, dates or discount.
    pub fn create_invoice(
        &self,
        input: NewInvoice,
        created_by: Option<UserId>,
    ) -> Result<Invoice, EngineError> {
        let invoice_type = input.invoice_type;
        let year = input.issue_date.year();
        let invoice = InvoiceService::create(input, String::new(), created_by, self.config.currency)
            .inspect_err(|e| warn!(error = %e, "Rejected invoice"))?;
        let allocated = self.numbers.next_yearly(invoice_type.prefix(), year);
        let invoice = Invoice {
            number: allocated.number,
            sequence: allocated.sequence,
            ..invoice
        };

        let invoice = self.invoices.insert(invoice.id, invoice)?;
        info!(
            invoice_id = %invoice.id,
            number = %invoice.number,
            total = %invoice.total_amount,
            "Invoice created"
        );
        Ok(invoice)
    }

    /// Stored invoice.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn invoice(&self, id: InvoiceId) -> Result<Invoice, EngineError> {
        self.invoices
            .get(&id)
            .map_err(|e| missing(e.into(), || InvoiceError::NotFound(id).into()))
    }

    /// Invoice with derived status, days overdue and payment progress.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn invoice_view(&self, id: InvoiceId, today: NaiveDate) -> Result<InvoiceView, EngineError> {
        Ok(InvoiceService::view(self.invoice(id)?, today))
    }

    /// All invoices as seen on `today`, ordered by number prefix, then
    /// counter sequence.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if an invoice stays locked past the timeout.
    pub fn list_invoices(&self, today: NaiveDate) -> Result<Vec<InvoiceView>, EngineError> {
        let mut invoices = self.invoices.list()?;
        invoices.sort_by_key(|i| (i.invoice_type.prefix(), i.sequence));
        Ok(invoices
            .into_iter()
            .map(|invoice| InvoiceService::view(invoice, today))
            .collect())
    }

    /// Replaces the lines and header discount of a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside draft or a validation error.
    pub fn update_invoice_lines(
        &self,
        id: InvoiceId,
        lines: &[InvoiceLineInput],
        discount_amount: Decimal,
        expected_version: Option<u64>,
    ) -> Result<Invoice, EngineError> {
        let currency = self.config.currency;
        let ((), invoice) = self
            .invoices
            .update(&id, expected_version, |invoice| {
                InvoiceService::update_lines(invoice, lines, discount_amount, currency)
                    .map_err(EngineError::from)
            })
            .map_err(|e| missing(e, || InvoiceError::NotFound(id).into()))?;

        info!(invoice_id = %id, total = %invoice.total_amount, "Invoice lines updated");
        Ok(invoice)
    }

    /// Issues a draft invoice and posts its issuance journal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside draft, or a ledger error if the
    /// journal cannot be posted (the invoice then stays draft).
    pub fn send_invoice(&self, id: InvoiceId, expected_version: Option<u64>) -> Result<Invoice, EngineError> {
        let accounts = self.posting_accounts()?;
        let ((), invoice) = self
            .invoices
            .update(&id, expected_version, |invoice| {
                InvoiceService::send(invoice)?;
                if let Some(journal) = InvoiceService::issuance_journal(invoice, &accounts) {
                    let entry = self.ledger.post_journal(journal)?;
                    invoice.issue_journal = Some(entry.id);
                }
                Ok::<_, EngineError>(())
            })
            .map_err(|e| missing(e, || InvoiceError::NotFound(id).into()))?;

        info!(
            invoice_id = %id,
            number = %invoice.number,
            status = ?invoice.status,
            journal_id = ?invoice.issue_journal,
            "Invoice sent"
        );
        Ok(invoice)
    }

    /// Marks an invoice with nothing outstanding as paid.
    ///
    /// # Errors
    ///
    /// Returns `NotFullyPaid` while an amount is outstanding.
    pub fn settle_invoice(&self, id: InvoiceId, expected_version: Option<u64>) -> Result<Invoice, EngineError> {
        let ((), invoice) = self
            .invoices
            .update(&id, expected_version, |invoice| {
                InvoiceService::settle(invoice).map_err(EngineError::from)
            })
            .map_err(|e| missing(e, || InvoiceError::NotFound(id).into()))?;

        info!(invoice_id = %id, status = ?invoice.status, "Invoice settled");
        Ok(invoice)
    }

    /// Cancels an invoice, reversing its issuance journal on `date`.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired` for a blank reason and `InvalidTransition`
    /// for paid or cancelled invoices.
    pub fn cancel_invoice(
        &self,
        id: InvoiceId,
        reason: &str,
        date: NaiveDate,
        expected_version: Option<u64>,
    ) -> Result<Invoice, EngineError> {
        let ((), invoice) = self
            .invoices
            .update(&id, expected_version, |invoice| {
                InvoiceService::cancel(invoice, reason)?;
                if let Some(journal_id) = invoice.issue_journal {
                    let entry = self.ledger.reverse_journal(journal_id, date, reason)?;
                    invoice.cancel_journal = Some(entry.id);
                }
                Ok::<_, EngineError>(())
            })
            .map_err(|e| missing(e, || InvoiceError::NotFound(id).into()))?;

        info!(
            invoice_id = %id,
            number = %invoice.number,
            reason = %reason.trim(),
            "Invoice cancelled"
        );
        Ok(invoice)
    }

    /// Outstanding amounts of open invoices of one type by days past due.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if an invoice stays locked past the timeout.
    pub fn invoice_aging(
        &self,
        invoice_type: InvoiceType,
        as_of: NaiveDate,
    ) -> Result<AgingReport, EngineError> {
        Ok(InvoiceService::aging(&self.invoices.list()?, invoice_type, as_of))
    }
}
