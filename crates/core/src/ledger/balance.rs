//! Account balance calculations.
//!
//! Balances are never stored. They are folded from posted legs using the
//! account type's normal side:
//! - Asset/Expense: balance = debits - credits (debit-normal)
//! - Liability/Equity/Revenue: balance = credits - debits (credit-normal)

use chrono::NaiveDate;
use finledger_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::{Account, AccountType, NormalBalance};
use super::entry::LedgerTransaction;

/// Running debit and credit totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebitCredit {
    /// Sum of debit legs.
    pub debit: Decimal,
    /// Sum of credit legs.
    pub credit: Decimal,
}

impl DebitCredit {
    /// Adds one leg.
    pub fn add(&mut self, leg: &LedgerTransaction) {
        let (debit, credit) = leg.debit_credit();
        self.debit += debit;
        self.credit += credit;
    }

    /// Merges another set of totals.
    pub fn merge(&mut self, other: Self) {
        self.debit += other.debit;
        self.credit += other.credit;
    }

    /// Net balance on the given normal side.
    #[must_use]
    pub fn balance(self, normal: NormalBalance) -> Decimal {
        normal.balance(self.debit, self.credit)
    }
}

/// Account balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance on the account's normal side.
    pub balance: Decimal,
}

impl AccountBalance {
    /// Builds a balance for `account` from its totals.
    #[must_use]
    pub fn new(account: &Account, totals: DebitCredit) -> Self {
        Self {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            debit_total: totals.debit,
            credit_total: totals.credit,
            balance: totals.balance(account.account_type.normal_balance()),
        }
    }
}

/// Per-leaf debit and credit totals as of a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Inclusive as-of date.
    pub as_of: NaiveDate,
    /// Leaf accounts with activity, ordered by code.
    pub lines: Vec<AccountBalance>,
    /// Sum of all debit totals.
    pub total_debit: Decimal,
    /// Sum of all credit totals.
    pub total_credit: Decimal,
    /// True when debits equal credits.
    pub is_balanced: bool,
}

impl TrialBalance {
    /// Assembles a trial balance from per-leaf lines.
    #[must_use]
    pub fn from_lines(as_of: NaiveDate, lines: Vec<AccountBalance>) -> Self {
        let total_debit = lines.iter().map(|l| l.debit_total).sum();
        let total_credit = lines.iter().map(|l| l.credit_total).sum();
        Self {
            as_of,
            lines,
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        }
    }
}
