//! Payment domain types.

use chrono::{DateTime, NaiveDate, Utc};
use finledger_shared::types::{AccountId, InvoiceId, JournalId, PaymentId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Versioned;

/// Direction of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Money received.
    Receipt,
    /// Money paid out.
    Payment,
}

impl PaymentType {
    /// Document number prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Receipt => "RCV",
            Self::Payment => "PAY",
        }
    }
}

/// Settlement method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Cheque.
    Check,
    /// Credit card.
    CreditCard,
    /// Anything else.
    Other,
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Recorded, not yet posted.
    Pending,
    /// Posted to the ledger.
    Confirmed,
    /// Withdrawn before confirmation.
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Payment aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID.
    pub id: PaymentId,
    /// Sequential document number.
    pub number: String,
    /// Counter value behind `number`; orders documents sharing a prefix.
    pub sequence: u64,
    /// Receipt or payment.
    pub payment_type: PaymentType,
    /// Positive amount.
    pub amount: Decimal,
    /// Settlement method.
    pub method: PaymentMethod,
    /// Current status.
    pub status: PaymentStatus,
    /// Value date.
    pub payment_date: NaiveDate,
    /// Invoice settled by this payment.
    pub invoice_id: Option<InvoiceId>,
    /// Cash or bank account moved.
    pub cash_account: AccountId,
    /// Other side of an unlinked payment.
    pub counter_account: Option<AccountId>,
    /// External reference (transfer id, cheque number).
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Journal posted on confirmation.
    pub journal_id: Option<JournalId>,
    /// Recording user.
    pub created_by: Option<UserId>,
    /// Confirming user.
    pub confirmed_by: Option<UserId>,
    /// Confirmation time.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Versioned for Payment {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Input for recording a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    /// Receipt or payment.
    pub payment_type: PaymentType,
    /// Positive amount.
    pub amount: Decimal,
    /// Settlement method.
    pub method: PaymentMethod,
    /// Value date.
    pub payment_date: NaiveDate,
    /// Invoice to settle.
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    /// Cash or bank account; defaults to the configured cash account.
    #[serde(default)]
    pub cash_account: Option<AccountId>,
    /// Other side when no invoice is linked.
    #[serde(default)]
    pub counter_account: Option<AccountId>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}
