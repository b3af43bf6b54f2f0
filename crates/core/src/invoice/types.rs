//! Invoice domain types.

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, InvoiceId, JournalId, PaymentId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Versioned;

/// Invoice type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    /// Issued to a customer; creates a receivable.
    Sales,
    /// Received from a supplier; creates a payable.
    Purchase,
    /// Quotation only; never posts or takes payments.
    Proforma,
}

impl InvoiceType {
    /// Document number prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Sales => "INV",
            Self::Purchase => "PINV",
            Self::Proforma => "PRO",
        }
    }
}

/// Invoice status.
///
/// `Overdue` is never stored. It is derived on read from `Sent`/`Partial`
/// invoices past their due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Editable, not yet issued.
    Draft,
    /// Issued, nothing paid.
    Sent,
    /// Issued, partly paid.
    Partial,
    /// Fully paid.
    Paid,
    /// Open and past due (derived).
    Overdue,
    /// Cancelled.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true for issued invoices with an outstanding balance.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Sent | Self::Partial | Self::Overdue)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Line item as entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLineInput {
    /// Item description.
    pub description: String,
    /// Quantity, must be positive.
    pub quantity: Decimal,
    /// Unit price, must not be negative.
    pub unit_price: Decimal,
    /// Line discount in percent (0-100).
    #[serde(default)]
    pub discount_percent: Decimal,
    /// Tax rate in percent (0-100).
    #[serde(default)]
    pub tax_percent: Decimal,
    /// Revenue or cost account; defaults to the configured posting account.
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

/// Line item with computed figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Item description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Line discount in percent.
    pub discount_percent: Decimal,
    /// Tax rate in percent.
    pub tax_percent: Decimal,
    /// Revenue or cost account override.
    pub account_id: Option<AccountId>,
    /// quantity × `unit_price` × (1 − discount%), rounded to minor units.
    pub subtotal: Decimal,
    /// subtotal × tax%, rounded to minor units.
    pub tax_amount: Decimal,
}

/// Invoice aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Sequential document number.
    pub number: String,
    /// Counter value behind `number`; orders documents sharing a prefix.
    pub sequence: u64,
    /// Sales, purchase or proforma.
    pub invoice_type: InvoiceType,
    /// Stored status; never `Overdue`.
    pub status: InvoiceStatus,
    /// Customer or supplier name.
    pub counterparty: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Line items.
    pub lines: Vec<InvoiceLine>,
    /// Σ line subtotals.
    pub subtotal: Decimal,
    /// Header discount applied after line discounts.
    pub discount_amount: Decimal,
    /// Σ line taxes.
    pub tax_amount: Decimal,
    /// subtotal − discount + tax.
    pub total_amount: Decimal,
    /// Σ confirmed payments.
    pub paid_amount: Decimal,
    /// total − paid.
    pub outstanding_amount: Decimal,
    /// Confirmed payments applied to this invoice.
    pub payments: Vec<PaymentId>,
    /// Journal posted on send.
    pub issue_journal: Option<JournalId>,
    /// Reversal journal posted on cancel.
    pub cancel_journal: Option<JournalId>,
    /// Cancellation reason.
    pub cancellation_reason: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Versioned for Invoice {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Input for creating an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    /// Sales, purchase or proforma.
    pub invoice_type: InvoiceType,
    /// Customer or supplier name.
    pub counterparty: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date, not before the issue date.
    pub due_date: NaiveDate,
    /// At least one line item.
    pub lines: Vec<InvoiceLineInput>,
    /// Header discount.
    #[serde(default)]
    pub discount_amount: Decimal,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Invoice with read-side derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceView {
    /// Stored invoice.
    #[serde(flatten)]
    pub invoice: Invoice,
    /// Status with overdue applied for the given day.
    pub effective_status: InvoiceStatus,
    /// Days past due, 0 unless overdue.
    pub days_overdue: i64,
    /// paid / total × 100, 2 dp.
    pub payment_progress: Decimal,
}

/// Aging bucket by days past due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// Not yet due.
    Current,
    /// 1-30 days past due.
    Days1To30,
    /// 31-60 days past due.
    Days31To60,
    /// 61-90 days past due.
    Days61To90,
    /// More than 90 days past due.
    Over90,
}

impl AgingBucket {
    /// All buckets in display order.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Days1To30,
        Self::Days31To60,
        Self::Days61To90,
        Self::Over90,
    ];

    /// Bucket for a number of days past due.
    #[must_use]
    pub const fn for_days(days_overdue: i64) -> Self {
        match days_overdue {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }
}

/// Outstanding amount and count in one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingBucketTotal {
    /// Bucket.
    pub bucket: AgingBucket,
    /// Number of open invoices.
    pub count: usize,
    /// Outstanding amount.
    pub amount: Decimal,
}

/// Receivables or payables aging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgingReport {
    /// Sales (receivables) or purchase (payables).
    pub invoice_type: InvoiceType,
    /// Reference date.
    pub as_of: NaiveDate,
    /// One entry per bucket, in order.
    pub buckets: Vec<AgingBucketTotal>,
    /// Σ outstanding.
    pub total_outstanding: Decimal,
}
