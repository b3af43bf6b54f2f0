//! Posting inputs and the journal view of posted legs.

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, JournalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, LedgerTransaction, SourceReference};

/// One leg of a compound journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// Leaf account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Line narrative; falls back to the journal description.
    #[serde(default)]
    pub memo: Option<String>,
}

impl JournalLineInput {
    /// Debit leg.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Debit,
            amount,
            memo: None,
        }
    }

    /// Credit leg.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Credit,
            amount,
            memo: None,
        }
    }
}

/// A compound journal: two or more legs that must balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalInput {
    /// Accounting date.
    pub date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// Originating document.
    #[serde(default)]
    pub reference: Option<SourceReference>,
    /// Legs.
    pub lines: Vec<JournalLineInput>,
}

/// A single posting against a named contra account.
///
/// Posting it appends the requested leg and its mirror on `contra_account_id`
/// as one journal, so the ledger stays balanced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingInput {
    /// Leaf account receiving `entry_type`.
    pub account_id: AccountId,
    /// Debit or credit on `account_id`.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Accounting date.
    pub date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// Originating document.
    #[serde(default)]
    pub reference: Option<SourceReference>,
    /// Leaf account receiving the opposite side.
    pub contra_account_id: AccountId,
}

impl From<PostingInput> for JournalInput {
    fn from(posting: PostingInput) -> Self {
        Self {
            date: posting.date,
            description: posting.description,
            reference: posting.reference,
            lines: vec![
                JournalLineInput {
                    account_id: posting.account_id,
                    entry_type: posting.entry_type,
                    amount: posting.amount,
                    memo: None,
                },
                JournalLineInput {
                    account_id: posting.contra_account_id,
                    entry_type: posting.entry_type.opposite(),
                    amount: posting.amount,
                    memo: None,
                },
            ],
        }
    }
}

/// Debit and credit totals of a journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of debit legs.
    pub debit: Decimal,
    /// Sum of credit legs.
    pub credit: Decimal,
}

/// The legs posted together under one journal id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Journal ID.
    pub id: JournalId,
    /// Accounting date.
    pub date: NaiveDate,
    /// Narrative of the first leg.
    pub description: String,
    /// Originating document.
    pub reference: Option<SourceReference>,
    /// Posted legs in log order.
    pub transactions: Vec<LedgerTransaction>,
    /// Debit and credit totals.
    pub totals: JournalTotals,
}

impl JournalEntry {
    /// Assembles a journal view from its legs. Returns `None` for an empty set.
    #[must_use]
    pub fn from_legs(transactions: Vec<LedgerTransaction>) -> Option<Self> {
        let first = transactions.first()?;
        let (id, date, description, reference) = (
            first.journal_id,
            first.date,
            first.description.clone(),
            first.reference.clone(),
        );
        let totals = transactions.iter().fold(
            JournalTotals {
                debit: Decimal::ZERO,
                credit: Decimal::ZERO,
            },
            |mut totals, leg| {
                let (debit, credit) = leg.debit_credit();
                totals.debit += debit;
                totals.credit += credit;
                totals
            },
        );

        Some(Self {
            id,
            date,
            description,
            reference,
            transactions,
            totals,
        })
    }

    /// Returns true if this journal reverses another one.
    #[must_use]
    pub fn is_reversal(&self) -> bool {
        self.transactions.iter().any(|leg| leg.reverses.is_some())
    }
}
