//! Frozen, read-only view of the ledger.

use std::collections::HashMap;

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, Currency, JournalId};
use rust_decimal::Decimal;

use super::balance::{AccountBalance, DebitCredit, TrialBalance};
use super::chart::ChartOfAccounts;
use super::entry::LedgerTransaction;
use super::error::LedgerError;
use super::journal::JournalEntry;

/// Which legs a query sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegFilter {
    /// Inclusive lower date bound.
    pub start: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end: Option<NaiveDate>,
    /// Only legs with a sequence below this value.
    pub before_sequence: Option<u64>,
}

impl LegFilter {
    /// Every leg.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Legs dated on or before `as_of`.
    #[must_use]
    pub fn as_of(as_of: NaiveDate) -> Self {
        Self {
            end: Some(as_of),
            ..Self::default()
        }
    }

    /// Legs dated strictly before `date`.
    #[must_use]
    pub fn before(date: NaiveDate) -> Self {
        Self {
            end: date.pred_opt(),
            // No date precedes NaiveDate::MIN, so an impossible window.
            start: date.pred_opt().map_or(Some(NaiveDate::MAX), |_| None),
            before_sequence: None,
        }
    }

    /// Legs dated within `[start, end]`.
    #[must_use]
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            before_sequence: None,
        }
    }

    /// Restricts the filter to legs appended before `sequence`.
    #[must_use]
    pub fn before_sequence(mut self, sequence: u64) -> Self {
        self.before_sequence = Some(sequence);
        self
    }

    /// Returns true if the leg passes the filter.
    #[must_use]
    pub fn matches(&self, leg: &LedgerTransaction) -> bool {
        self.start.is_none_or(|s| leg.date >= s)
            && self.end.is_none_or(|e| leg.date <= e)
            && self.before_sequence.is_none_or(|seq| leg.sequence < seq)
    }
}

/// A copy of the chart plus a consistent prefix of the transaction log.
///
/// Postings made after the snapshot was taken are not visible through it.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    chart: ChartOfAccounts,
    transactions: Vec<LedgerTransaction>,
    sequence: u64,
    currency: Currency,
}

impl LedgerSnapshot {
    /// Creates a snapshot from its parts.
    #[must_use]
    pub fn new(
        chart: ChartOfAccounts,
        transactions: Vec<LedgerTransaction>,
        sequence: u64,
        currency: Currency,
    ) -> Self {
        Self {
            chart,
            transactions,
            sequence,
            currency,
        }
    }

    /// The chart of accounts at snapshot time.
    #[must_use]
    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    /// All legs in log order.
    #[must_use]
    pub fn transactions(&self) -> &[LedgerTransaction] {
        &self.transactions
    }

    /// Sequence number the next leg after this snapshot would receive.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Ledger currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Debit and credit totals per leaf account.
    #[must_use]
    pub fn leaf_totals(&self, filter: LegFilter) -> HashMap<AccountId, DebitCredit> {
        let mut totals: HashMap<AccountId, DebitCredit> = HashMap::new();
        for leg in self.transactions.iter().filter(|leg| filter.matches(leg)) {
            totals.entry(leg.account_id).or_default().add(leg);
        }
        totals
    }

    /// Debit and credit totals of an account, summing leaves for headers.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn account_totals(
        &self,
        account_id: AccountId,
        filter: LegFilter,
    ) -> Result<DebitCredit, LedgerError> {
        self.chart.require(account_id)?;
        let leaves = self.chart.leaves_under(account_id);
        let mut totals = DebitCredit::default();
        for leg in self
            .transactions
            .iter()
            .filter(|leg| filter.matches(leg) && leaves.contains(&leg.account_id))
        {
            totals.add(leg);
        }
        Ok(totals)
    }

    /// Normal-side movement of an account over the filtered legs.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn movement(&self, account_id: AccountId, filter: LegFilter) -> Result<Decimal, LedgerError> {
        let account = self.chart.require(account_id)?;
        let normal = account.account_type.normal_balance();
        Ok(self.account_totals(account_id, filter)?.balance(normal))
    }

    /// Balance of an account as of a date (all legs when `None`).
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn balance(&self, account_id: AccountId, as_of: Option<NaiveDate>) -> Result<Decimal, LedgerError> {
        Ok(self.balance_detail(account_id, as_of)?.balance)
    }

    /// Balance with debit and credit totals.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn balance_detail(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountBalance, LedgerError> {
        let filter = as_of.map_or_else(LegFilter::all, LegFilter::as_of);
        let totals = self.account_totals(account_id, filter)?;
        let account = self.chart.require(account_id)?;
        Ok(AccountBalance::new(account, totals))
    }

    /// Trial balance over leaf accounts with activity up to `as_of`.
    #[must_use]
    pub fn trial_balance(&self, as_of: NaiveDate) -> TrialBalance {
        let totals = self.leaf_totals(LegFilter::as_of(as_of));
        let lines = self
            .chart
            .leaves()
            .filter_map(|account| {
                totals
                    .get(&account.id)
                    .map(|t| AccountBalance::new(account, *t))
            })
            .collect();
        TrialBalance::from_lines(as_of, lines)
    }

    /// Journals whose legs pass the filter, in log order.
    #[must_use]
    pub fn journals(&self, filter: LegFilter) -> Vec<JournalEntry> {
        let mut order: Vec<JournalId> = Vec::new();
        let mut grouped: HashMap<JournalId, Vec<LedgerTransaction>> = HashMap::new();
        for leg in self.transactions.iter().filter(|leg| filter.matches(leg)) {
            grouped
                .entry(leg.journal_id)
                .or_insert_with(|| {
                    order.push(leg.journal_id);
                    Vec::new()
                })
                .push(leg.clone());
        }
        order
            .into_iter()
            .filter_map(|id| grouped.remove(&id).and_then(JournalEntry::from_legs))
            .collect()
    }

    /// Debit and credit totals across the whole log.
    #[must_use]
    pub fn grand_totals(&self) -> DebitCredit {
        let mut totals = DebitCredit::default();
        for leg in &self.transactions {
            totals.add(leg);
        }
        totals
    }
}
