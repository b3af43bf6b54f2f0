//! Immutable ledger records.

use chrono::{DateTime, NaiveDate, Utc};
use finledger_shared::types::{
    AccountId, ExpenseId, InvoiceId, JournalId, PaymentId, TaxId, TransactionId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a ledger leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry (increases assets/expenses, decreases liabilities/equity/revenue).
    Debit,
    /// Credit entry (decreases assets/expenses, increases liabilities/equity/revenue).
    Credit,
}

impl EntryType {
    /// Returns the other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Business document a posting originates from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum SourceReference {
    /// Invoice issuance or cancellation.
    Invoice(InvoiceId),
    /// Payment confirmation.
    Payment(PaymentId),
    /// Expense accrual or settlement.
    Expense(ExpenseId),
    /// Tax remittance.
    Tax(TaxId),
    /// Manual journal with a free-text reference.
    Manual(String),
}

/// A single posted leg. Never mutated once appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Unique identifier for this leg.
    pub id: TransactionId,
    /// The journal this leg was posted with.
    pub journal_id: JournalId,
    /// Position in the append-only log, assigned on append.
    pub sequence: u64,
    /// Accounting date.
    pub date: NaiveDate,
    /// Leaf account affected.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount in the ledger currency.
    pub amount: Decimal,
    /// Narrative.
    pub description: String,
    /// Originating document.
    pub reference: Option<SourceReference>,
    /// Leg this one corrects, for reversing entries.
    pub reverses: Option<TransactionId>,
    /// Wall-clock time the leg was appended.
    pub posted_at: DateTime<Utc>,
}

impl LedgerTransaction {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Debit => self.amount,
            EntryType::Credit => -self.amount,
        }
    }

    /// Returns `(debit, credit)` contributions of this leg.
    #[must_use]
    pub fn debit_credit(&self) -> (Decimal, Decimal) {
        match self.entry_type {
            EntryType::Debit => (self.amount, Decimal::ZERO),
            EntryType::Credit => (Decimal::ZERO, self.amount),
        }
    }
}
