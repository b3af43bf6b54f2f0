//! Invoice state machine and derived figures.
//!
//! All functions are pure over an `Invoice` value. Locking, numbering and
//! ledger posting are orchestrated by the engine.

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, Currency, InvoiceId, PaymentId, UserId};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::InvoiceError;
use super::totals::compute_totals;
use super::types::{
    AgingBucket, AgingBucketTotal, AgingReport, Invoice, InvoiceLineInput, InvoiceStatus,
    InvoiceType, InvoiceView, NewInvoice,
};
use crate::engine::PostingAccounts;
use crate::ledger::{JournalInput, JournalLineInput, SourceReference};

/// Stateless service for invoice transitions.
pub struct InvoiceService;

impl InvoiceService {
    /// Builds a draft invoice from validated input.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid lines, dates or discount.
    pub fn create(
        input: NewInvoice,
        number: String,
        created_by: Option<UserId>,
        currency: Currency,
    ) -> Result<Invoice, InvoiceError> {
        if input.counterparty.trim().is_empty() {
            return Err(InvoiceError::CounterpartyRequired);
        }
        if input.due_date < input.issue_date {
            return Err(InvoiceError::DueBeforeIssue);
        }
        let (lines, totals) = compute_totals(&input.lines, input.discount_amount, currency)?;

        Ok(Invoice {
            id: InvoiceId::new(),
            number,
            sequence: 0,
            invoice_type: input.invoice_type,
            status: InvoiceStatus::Draft,
            counterparty: input.counterparty.trim().to_string(),
            issue_date: input.issue_date,
            due_date: input.due_date,
            lines,
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            paid_amount: Decimal::ZERO,
            outstanding_amount: totals.total_amount,
            payments: Vec::new(),
            issue_journal: None,
            cancel_journal: None,
            cancellation_reason: None,
            notes: input.notes,
            created_by,
            version: 0,
        })
    }

    /// Replaces the line items and header discount of a draft invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside draft, or a validation error.
    pub fn update_lines(
        invoice: &mut Invoice,
        lines: &[InvoiceLineInput],
        discount_amount: Decimal,
        currency: Currency,
    ) -> Result<(), InvoiceError> {
        if invoice.status != InvoiceStatus::Draft {
            return Err(InvoiceError::InvalidTransition {
                from: invoice.status,
                action: "edit",
            });
        }
        let (lines, totals) = compute_totals(lines, discount_amount, currency)?;

        invoice.lines = lines;
        invoice.subtotal = totals.subtotal;
        invoice.discount_amount = totals.discount_amount;
        invoice.tax_amount = totals.tax_amount;
        invoice.total_amount = totals.total_amount;
        invoice.outstanding_amount = totals.total_amount - invoice.paid_amount;
        Ok(())
    }

    /// Issues a draft invoice: draft → sent.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside draft.
    pub fn send(invoice: &mut Invoice) -> Result<(), InvoiceError> {
        match invoice.status {
            InvoiceStatus::Draft => {
                invoice.status = InvoiceStatus::Sent;
                Ok(())
            }
            from => Err(InvoiceError::InvalidTransition {
                from,
                action: "send",
            }),
        }
    }

    /// Journal recognising an issued invoice. `None` for proforma invoices
    /// and invoices with nothing to post.
    #[must_use]
    pub fn issuance_journal(invoice: &Invoice, accounts: &PostingAccounts) -> Option<JournalInput> {
        let (control, default_line, tax, control_side_debit) = match invoice.invoice_type {
            InvoiceType::Proforma => return None,
            InvoiceType::Sales => (
                accounts.receivable,
                accounts.sales_revenue,
                accounts.output_tax,
                true,
            ),
            InvoiceType::Purchase => (
                accounts.payable,
                accounts.purchases,
                accounts.input_tax,
                false,
            ),
        };

        // (account, amount on the control side) pairs; the other side is the
        // opposite entry.
        let mut control_side: Vec<(AccountId, Decimal)> = vec![(control, invoice.total_amount)];
        let mut other_side: Vec<(AccountId, Decimal)> = Vec::new();
        for line in &invoice.lines {
            merge(&mut other_side, line.account_id.unwrap_or(default_line), line.subtotal);
        }
        control_side.push((default_line, invoice.discount_amount));
        other_side.push((tax, invoice.tax_amount));

        let leg = |debit: bool, (account, amount): (AccountId, Decimal)| {
            if debit {
                JournalLineInput::debit(account, amount)
            } else {
                JournalLineInput::credit(account, amount)
            }
        };
        let lines: Vec<JournalLineInput> = control_side
            .into_iter()
            .map(|pair| leg(control_side_debit, pair))
            .chain(other_side.into_iter().map(|pair| leg(!control_side_debit, pair)))
            .filter(|line| line.amount > Decimal::ZERO)
            .collect();
        if lines.is_empty() {
            return None;
        }

        Some(JournalInput {
            date: invoice.issue_date,
            description: format!("Invoice {} - {}", invoice.number, invoice.counterparty),
            reference: Some(SourceReference::Invoice(invoice.id)),
            lines,
        })
    }

    /// Applies a confirmed payment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for draft, paid or cancelled invoices,
    /// `NotPayable` for proforma invoices, and a validation error for
    /// non-positive amounts or overpayment.
    pub fn apply_payment(
        invoice: &mut Invoice,
        payment_id: PaymentId,
        amount: Decimal,
    ) -> Result<InvoiceStatus, InvoiceError> {
        if invoice.invoice_type == InvoiceType::Proforma {
            return Err(InvoiceError::NotPayable(invoice.invoice_type));
        }
        match invoice.status {
            InvoiceStatus::Sent | InvoiceStatus::Partial | InvoiceStatus::Overdue => {}
            from => {
                return Err(InvoiceError::InvalidTransition {
                    from,
                    action: "pay",
                });
            }
        }
        if amount <= Decimal::ZERO {
            return Err(InvoiceError::NonPositivePayment(amount));
        }
        if amount > invoice.outstanding_amount {
            return Err(InvoiceError::Overpayment {
                amount,
                outstanding: invoice.outstanding_amount,
            });
        }

        invoice.paid_amount += amount;
        invoice.outstanding_amount = invoice.total_amount - invoice.paid_amount;
        invoice.payments.push(payment_id);
        invoice.status = if invoice.paid_amount >= invoice.total_amount {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::Partial
        };
        Ok(invoice.status)
    }

    /// Marks an open invoice paid without a payment when nothing is owed,
    /// which is how zero-total invoices reach `paid`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for invoices that are not open, or
    /// `NotFullyPaid` while an amount is outstanding.
    pub fn settle(invoice: &mut Invoice) -> Result<(), InvoiceError> {
        if invoice.invoice_type == InvoiceType::Proforma {
            return Err(InvoiceError::NotPayable(invoice.invoice_type));
        }
        if !matches!(invoice.status, InvoiceStatus::Sent | InvoiceStatus::Partial) {
            return Err(InvoiceError::InvalidTransition {
                from: invoice.status,
                action: "settle",
            });
        }
        if invoice.paid_amount < invoice.total_amount {
            return Err(InvoiceError::NotFullyPaid {
                paid: invoice.paid_amount,
                total: invoice.total_amount,
            });
        }
        invoice.status = InvoiceStatus::Paid;
        Ok(())
    }

    /// Cancels an invoice that is not paid or already cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired` for a blank reason and `InvalidTransition`
    /// for paid or cancelled invoices.
    pub fn cancel(invoice: &mut Invoice, reason: &str) -> Result<(), InvoiceError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(InvoiceError::ReasonRequired);
        }
        match invoice.status {
            InvoiceStatus::Paid | InvoiceStatus::Cancelled => Err(InvoiceError::InvalidTransition {
                from: invoice.status,
                action: "cancel",
            }),
            _ => {
                invoice.status = InvoiceStatus::Cancelled;
                invoice.cancellation_reason = Some(reason.to_string());
                Ok(())
            }
        }
    }

    /// Status as reported on `today`: open invoices past due read as overdue.
    #[must_use]
    pub fn derive_overdue_status(invoice: &Invoice, today: NaiveDate) -> InvoiceStatus {
        match invoice.status {
            InvoiceStatus::Sent | InvoiceStatus::Partial if invoice.due_date < today => {
                InvoiceStatus::Overdue
            }
            status => status,
        }
    }

    /// Days past due on `today`; 0 unless the invoice is overdue.
    #[must_use]
    pub fn days_overdue(invoice: &Invoice, today: NaiveDate) -> i64 {
        if Self::derive_overdue_status(invoice, today) == InvoiceStatus::Overdue {
            (today - invoice.due_date).num_days()
        } else {
            0
        }
    }

    /// paid / total × 100, rounded to 2 dp; 0 when total is 0.
    #[must_use]
    pub fn payment_progress(invoice: &Invoice) -> Decimal {
        if invoice.total_amount.is_zero() {
            return Decimal::ZERO;
        }
        (invoice.paid_amount / invoice.total_amount * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
    }

    /// Invoice with derived read-side fields for `today`.
    #[must_use]
    pub fn view(invoice: Invoice, today: NaiveDate) -> InvoiceView {
        InvoiceView {
            effective_status: Self::derive_overdue_status(&invoice, today),
            days_overdue: Self::days_overdue(&invoice, today),
            payment_progress: Self::payment_progress(&invoice),
            invoice,
        }
    }

    /// Aging bucket of an open invoice; `None` otherwise.
    #[must_use]
    pub fn aging_bucket(invoice: &Invoice, as_of: NaiveDate) -> Option<AgingBucket> {
        matches!(invoice.status, InvoiceStatus::Sent | InvoiceStatus::Partial)
            .then(|| AgingBucket::for_days((as_of - invoice.due_date).num_days()))
    }

    /// Buckets outstanding amounts of open invoices of one type.
    #[must_use]
    pub fn aging(invoices: &[Invoice], invoice_type: InvoiceType, as_of: NaiveDate) -> AgingReport {
        let mut buckets: Vec<AgingBucketTotal> = AgingBucket::ALL
            .iter()
            .map(|bucket| AgingBucketTotal {
                bucket: *bucket,
                count: 0,
                amount: Decimal::ZERO,
            })
            .collect();

        for invoice in invoices
            .iter()
            .filter(|i| i.invoice_type == invoice_type && i.issue_date <= as_of)
        {
            if let Some(bucket) = Self::aging_bucket(invoice, as_of)
                && let Some(total) = buckets.iter_mut().find(|t| t.bucket == bucket)
            {
                total.count += 1;
                total.amount += invoice.outstanding_amount;
            }
        }

        let total_outstanding = buckets.iter().map(|b| b.amount).sum();
        AgingReport {
            invoice_type,
            as_of,
            buckets,
            total_outstanding,
        }
    }
}

fn merge(pairs: &mut Vec<(AccountId, Decimal)>, account: AccountId, amount: Decimal) {
    match pairs.iter_mut().find(|(a, _)| *a == account) {
        Some((_, total)) => *total += amount,
        None => pairs.push((account, amount)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EntryType, validate_lines};
    use rust_decimal_macros::dec;

    fn d(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    fn accounts() -> PostingAccounts {
        PostingAccounts {
            receivable: AccountId::new(),
            payable: AccountId::new(),
            sales_revenue: AccountId::new(),
            purchases: AccountId::new(),
            output_tax: AccountId::new(),
            input_tax: AccountId::new(),
            accrued_expenses: AccountId::new(),
            default_cash: AccountId::new(),
            withholding_tax: AccountId::new(),
            prepaid_income_tax: AccountId::new(),
        }
    }

    fn scenario(invoice_type: InvoiceType) -> Invoice {
        InvoiceService::create(
            NewInvoice {
                invoice_type,
                counterparty: "PT Maju Jaya".into(),
                issue_date: d(3, 1),
                due_date: d(3, 31),
                lines: vec![
                    InvoiceLineInput {
                        description: "Consulting".into(),
                        quantity: dec!(10),
                        unit_price: dec!(100000),
                        discount_percent: dec!(0),
                        tax_percent: dec!(10),
                        account_id: None,
                    },
                    InvoiceLineInput {
                        description: "License".into(),
                        quantity: dec!(1),
                        unit_price: dec!(500000),
                        discount_percent: dec!(5),
                        tax_percent: dec!(0),
                        account_id: None,
                    },
                ],
                discount_amount: Decimal::ZERO,
                notes: None,
            },
            "INV-2026-0001".into(),
            None,
            Currency::Idr,
        )
        .unwrap()
    }

    #[test]
    fn test_full_payment_marks_paid() {
        let mut invoice = scenario(InvoiceType::Sales);
        assert_eq!(invoice.total_amount, dec!(1575000));
        InvoiceService::send(&mut invoice).unwrap();

        let status = InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(1575000)).unwrap();
        assert_eq!(status, InvoiceStatus::Paid);
        assert_eq!(invoice.outstanding_amount, Decimal::ZERO);
        assert_eq!(InvoiceService::payment_progress(&invoice), dec!(100));
    }

    #[test]
    fn test_partial_then_paid() {
        let mut invoice = scenario(InvoiceType::Sales);
        InvoiceService::send(&mut invoice).unwrap();

        InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(575000)).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Partial);
        assert_eq!(invoice.outstanding_amount, dec!(1000000));
        assert_eq!(InvoiceService::payment_progress(&invoice), dec!(36.51));

        InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(1000000)).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(invoice.payments.len(), 2);
    }

    #[test]
    fn test_payment_rules() {
        let mut invoice = scenario(InvoiceType::Sales);
        assert!(matches!(
            InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(1)),
            Err(InvoiceError::InvalidTransition { from: InvoiceStatus::Draft, .. })
        ));

        InvoiceService::send(&mut invoice).unwrap();
        assert!(matches!(
            InvoiceService::apply_payment(&mut invoice, PaymentId::new(), Decimal::ZERO),
            Err(InvoiceError::NonPositivePayment(_))
        ));
        assert!(matches!(
            InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(2000000)),
            Err(InvoiceError::Overpayment { .. })
        ));
        assert_eq!(invoice.paid_amount, Decimal::ZERO);

        InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(1575000)).unwrap();
        assert!(matches!(
            InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(1)),
            Err(InvoiceError::InvalidTransition { from: InvoiceStatus::Paid, .. })
        ));
    }

    #[test]
    fn test_proforma_not_payable() {
        let mut invoice = scenario(InvoiceType::Proforma);
        InvoiceService::send(&mut invoice).unwrap();
        assert!(matches!(
            InvoiceService::apply_payment(&mut invoice, PaymentId::new(), dec!(1)),
            Err(InvoiceError::NotPayable(InvoiceType::Proforma))
        ));
        assert!(InvoiceService::issuance_journal(&invoice, &accounts()).is_none());
    }

    #[test]
    fn test_zero_total_invoice_settles() {
        let mut invoice = scenario(InvoiceType::Sales);
        InvoiceService::update_lines(
            &mut invoice,
            &[InvoiceLineInput {
                description: "Free sample".into(),
                quantity: dec!(1),
                unit_price: Decimal::ZERO,
                discount_percent: Decimal::ZERO,
                tax_percent: Decimal::ZERO,
                account_id: None,
            }],
            Decimal::ZERO,
            Currency::Idr,
        )
        .unwrap();
        assert_eq!(invoice.total_amount, Decimal::ZERO);

        InvoiceService::send(&mut invoice).unwrap();
        assert!(InvoiceService::issuance_journal(&invoice, &accounts()).is_none());
        InvoiceService::settle(&mut invoice).unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Paid);
        assert_eq!(InvoiceService::payment_progress(&invoice), Decimal::ZERO);
    }

    #[test]
    fn test_settle_requires_full_payment() {
        let mut invoice = scenario(InvoiceType::Sales);
        InvoiceService::send(&mut invoice).unwrap();
        assert!(matches!(
            InvoiceService::settle(&mut invoice),
            Err(InvoiceError::NotFullyPaid { .. })
        ));
    }

    #[test]
    fn test_lines_locked_after_send() {
        let mut invoice = scenario(InvoiceType::Sales);
        InvoiceService::send(&mut invoice).unwrap();
        let result = InvoiceService::update_lines(&mut invoice, &[], Decimal::ZERO, Currency::Idr);
        assert!(matches!(result, Err(InvoiceError::InvalidTransition { .. })));
    }

    #[test]
    fn test_cancel_rules() {
        let mut invoice = scenario(InvoiceType::Sales);
        assert!(matches!(
            InvoiceService::cancel(&mut invoice, ""),
            Err(InvoiceError::ReasonRequired)
        ));
        InvoiceService::cancel(&mut invoice, "duplicate").unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Cancelled);
        assert!(matches!(
            InvoiceService::cancel(&mut invoice, "again"),
            Err(InvoiceError::InvalidTransition { from: InvoiceStatus::Cancelled, .. })
        ));
    }

    #[test]
    fn test_overdue_is_derived() {
        let mut invoice = scenario(InvoiceType::Sales);
        InvoiceService::send(&mut invoice).unwrap();

        assert_eq!(InvoiceService::derive_overdue_status(&invoice, d(3, 31)), InvoiceStatus::Sent);
        assert_eq!(InvoiceService::derive_overdue_status(&invoice, d(4, 1)), InvoiceStatus::Overdue);
        assert_eq!(InvoiceService::days_overdue(&invoice, d(4, 10)), 10);
        assert_eq!(invoice.status, InvoiceStatus::Sent);

        let view = InvoiceService::view(invoice, d(4, 10));
        assert_eq!(view.effective_status, InvoiceStatus::Overdue);
        assert_eq!(view.invoice.status, InvoiceStatus::Sent);
    }

    #[test]
    fn test_sales_issuance_journal_balances() {
        let accounts = accounts();
        let mut invoice = scenario(InvoiceType::Sales);
        InvoiceService::update_lines(
            &mut invoice,
            &[InvoiceLineInput {
                description: "Goods".into(),
                quantity: dec!(2),
                unit_price: dec!(100),
                discount_percent: Decimal::ZERO,
                tax_percent: dec!(10),
                account_id: None,
            }],
            dec!(50),
            Currency::Idr,
        )
        .unwrap();

        let journal = InvoiceService::issuance_journal(&invoice, &accounts).unwrap();
        assert!(validate_lines(&journal.lines, Currency::Idr).is_ok());

        let receivable = &journal.lines[0];
        assert_eq!(receivable.account_id, accounts.receivable);
        assert_eq!(receivable.entry_type, EntryType::Debit);
        assert_eq!(receivable.amount, dec!(170));
        assert!(journal.lines.iter().any(|l| l.account_id == accounts.output_tax
            && l.entry_type == EntryType::Credit
            && l.amount == dec!(20)));
    }

    #[test]
    fn test_purchase_issuance_journal_mirrors_sales() {
        let accounts = accounts();
        let invoice = scenario(InvoiceType::Purchase);
        let journal = InvoiceService::issuance_journal(&invoice, &accounts).unwrap();

        assert!(validate_lines(&journal.lines, Currency::Idr).is_ok());
        assert_eq!(journal.lines[0].account_id, accounts.payable);
        assert_eq!(journal.lines[0].entry_type, EntryType::Credit);
        assert!(journal.lines.iter().any(|l| l.account_id == accounts.purchases
            && l.entry_type == EntryType::Debit
            && l.amount == dec!(1475000)));
        assert!(journal.lines.iter().any(|l| l.account_id == accounts.input_tax
            && l.entry_type == EntryType::Debit));
    }

    #[test]
    fn test_aging_buckets() {
        let make = |due: NaiveDate, outstanding: Decimal| {
            let mut invoice = scenario(InvoiceType::Sales);
            invoice.due_date = due;
            invoice.issue_date = d(1, 1);
            invoice.status = InvoiceStatus::Sent;
            invoice.outstanding_amount = outstanding;
            invoice
        };
        let as_of = d(6, 30);
        let invoices = vec![
            make(d(7, 15), dec!(100)),
            make(d(6, 10), dec!(200)),
            make(d(5, 15), dec!(300)),
            make(d(4, 15), dec!(400)),
            make(d(1, 31), dec!(500)),
        ];

        let report = InvoiceService::aging(&invoices, InvoiceType::Sales, as_of);
        let amounts: Vec<_> = report.buckets.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![dec!(100), dec!(200), dec!(300), dec!(400), dec!(500)]);
        assert_eq!(report.total_outstanding, dec!(1500));

        let payables = InvoiceService::aging(&invoices, InvoiceType::Purchase, as_of);
        assert_eq!(payables.total_outstanding, Decimal::ZERO);
    }
}
