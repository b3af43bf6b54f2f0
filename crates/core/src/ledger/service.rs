//! The ledger: chart of accounts plus the append-only transaction log.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use finledger_shared::types::{AccountId, Currency, JournalId, TransactionId};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::account::{Account, NewAccount};
use super::balance::{AccountBalance, TrialBalance};
use super::chart::{ChartOfAccounts, default_chart};
use super::entry::LedgerTransaction;
use super::error::LedgerError;
use super::journal::{JournalEntry, JournalInput, PostingInput};
use super::snapshot::LedgerSnapshot;
use super::validation::validate_lines;
use crate::store::{InMemoryTransactionLog, StoreError, TransactionLog};

/// Double-entry ledger.
///
/// Postings validate against a read lock on the chart and append each
/// journal to the log in one batch. Chart edits take the write lock, so an
/// account cannot gain children while a posting to it is in flight.
pub struct Ledger {
    chart: RwLock<ChartOfAccounts>,
    log: Arc<dyn TransactionLog>,
    currency: Currency,
    reversal_gate: Mutex<()>,
    lock_timeout: Duration,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("accounts", &self.chart.read().len())
            .field("currency", &self.currency)
            .field("high_water_mark", &self.log.high_water_mark())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Creates an empty ledger over an in-memory log.
    #[must_use]
    pub fn new(currency: Currency, lock_timeout: Duration) -> Self {
        Self::with_log(Arc::new(InMemoryTransactionLog::new()), currency, lock_timeout)
    }

    /// Creates an empty ledger over the given log.
    #[must_use]
    pub fn with_log(log: Arc<dyn TransactionLog>, currency: Currency, lock_timeout: Duration) -> Self {
        Self {
            chart: RwLock::new(ChartOfAccounts::new()),
            log,
            currency,
            reversal_gate: Mutex::new(()),
            lock_timeout,
        }
    }

    /// Ledger currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    // ========== Chart of Accounts ==========

    /// Adds an account to the chart.
    ///
    /// # Errors
    ///
    /// Fails on invalid input, or when the parent already carries postings.
    pub fn add_account(&self, input: NewAccount) -> Result<Account, LedgerError> {
        let mut chart = self.chart.write();
        if let Some(parent) = chart.check_new(&input)?
            && self.log.has_postings(parent.id)?
        {
            warn!(parent = %parent.code, "Rejected child account under posted parent");
            return Err(LedgerError::ParentHasPostings(parent.code.clone()));
        }

        let account = chart.add(input)?;
        info!(
            account_id = %account.id,
            code = %account.code,
            account_type = %account.account_type,
            "Account added"
        );
        Ok(account)
    }

    /// Seeds the default chart. Returns the number of accounts added.
    ///
    /// # Errors
    ///
    /// Fails if any default code already exists.
    pub fn seed_default_chart(&self) -> Result<usize, LedgerError> {
        let accounts = default_chart();
        let count = accounts.len();
        for account in accounts {
            self.add_account(account)?;
        }
        info!(count, "Default chart of accounts seeded");
        Ok(count)
    }

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn set_account_active(&self, id: AccountId, active: bool) -> Result<Account, LedgerError> {
        let account = self.chart.write().set_active(id, active)?;
        info!(account_id = %id, active, "Account activation changed");
        Ok(account)
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.chart.read().require(id).cloned()
    }

    /// Looks up an account by code.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` for unknown codes.
    pub fn account_by_code(&self, code: &str) -> Result<Account, LedgerError> {
        self.chart.read().require_code(code).cloned()
    }

    /// All accounts ordered by code.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.chart.read().iter().cloned().collect()
    }

    /// Returns true if the account exists and accepts postings.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn is_leaf(&self, id: AccountId) -> Result<bool, LedgerError> {
        let chart = self.chart.read();
        chart.require(id)?;
        Ok(!chart.is_header(id))
    }

    /// Returns true if `ancestor` is a strict ancestor of `id` in the chart.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: AccountId, id: AccountId) -> bool {
        self.chart.read().is_ancestor(ancestor, id)
    }

    // ========== Posting ==========

    /// Posts one leg together with its mirror on the contra account.
    ///
    /// # Errors
    ///
    /// See [`Ledger::post_journal`].
    pub fn post_transaction(&self, input: PostingInput) -> Result<JournalEntry, LedgerError> {
        self.post_journal(input.into())
    }

    /// Posts a balanced compound journal atomically.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed legs or non-postable
    /// accounts, and an integrity error when debits and credits differ.
    /// Nothing is written on error.
    pub fn post_journal(&self, input: JournalInput) -> Result<JournalEntry, LedgerError> {
        if let Err(e) = validate_lines(&input.lines, self.currency) {
            if e.is_integrity_violation() {
                error!(error = %e, description = %input.description, "Blocked unbalanced journal");
            } else {
                warn!(error = %e, "Rejected journal");
            }
            return Err(e.into());
        }

        let chart = self.chart.read();
        for line in &input.lines {
            let account = chart.require(line.account_id)?;
            if chart.is_header(account.id) {
                return Err(LedgerError::HeaderAccount(account.code.clone()));
            }
            if !account.is_active {
                return Err(LedgerError::AccountInactive(account.code.clone()));
            }
        }

        let journal_id = JournalId::new();
        let posted_at = Utc::now();
        let legs = input
            .lines
            .into_iter()
            .map(|line| LedgerTransaction {
                id: TransactionId::new(),
                journal_id,
                sequence: 0,
                date: input.date,
                account_id: line.account_id,
                entry_type: line.entry_type,
                amount: line.amount,
                description: line.memo.unwrap_or_else(|| input.description.clone()),
                reference: input.reference.clone(),
                reverses: None,
                posted_at,
            })
            .collect();

        let stored = self.append(legs)?;
        drop(chart);

        let entry = journal_from(stored)?;
        info!(
            journal_id = %entry.id,
            date = %entry.date,
            legs = entry.transactions.len(),
            amount = %entry.totals.debit,
            "Journal posted"
        );
        Ok(entry)
    }

    /// Reverses a journal by appending one opposite leg per original leg.
    ///
    /// # Errors
    ///
    /// Fails when the reason is blank, the journal is unknown, already
    /// reversed, or is itself a reversal.
    pub fn reverse_journal(
        &self,
        journal_id: JournalId,
        date: NaiveDate,
        reason: &str,
    ) -> Result<JournalEntry, LedgerError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::ReasonRequired);
        }

        let _gate = self.reversal_gate.try_lock_for(self.lock_timeout).ok_or_else(|| {
            StoreError::LockTimeout {
                kind: "journal",
                id: journal_id.to_string(),
            }
        })?;

        let original = self.log.journal(journal_id)?;
        if original.is_empty() {
            return Err(LedgerError::JournalNotFound(journal_id));
        }
        if original.iter().any(|leg| leg.reverses.is_some()) {
            return Err(LedgerError::CannotReverseReversal(journal_id));
        }

        let original_ids: HashSet<TransactionId> = original.iter().map(|leg| leg.id).collect();
        let (all, _) = self.log.read_all()?;
        if all
            .iter()
            .any(|leg| leg.reverses.is_some_and(|id| original_ids.contains(&id)))
        {
            return Err(LedgerError::AlreadyReversed(journal_id));
        }

        let reversal_id = JournalId::new();
        let posted_at = Utc::now();
        let legs = original
            .iter()
            .map(|leg| LedgerTransaction {
                id: TransactionId::new(),
                journal_id: reversal_id,
                sequence: 0,
                date,
                account_id: leg.account_id,
                entry_type: leg.entry_type.opposite(),
                amount: leg.amount,
                description: format!("Reversal of {}: {reason}", leg.description),
                reference: leg.reference.clone(),
                reverses: Some(leg.id),
                posted_at,
            })
            .collect();

        let entry = journal_from(self.append(legs)?)?;
        info!(
            journal_id = %journal_id,
            reversal_id = %entry.id,
            reason,
            "Journal reversed"
        );
        Ok(entry)
    }

    fn append(&self, legs: Vec<LedgerTransaction>) -> Result<Vec<LedgerTransaction>, LedgerError> {
        self.log.append(legs).map_err(|e| {
            error!(error = %e, "Transaction log append failed");
            e.into()
        })
    }

    // ========== Queries ==========

    /// Balance of an account as of a date, summing leaves for headers.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn get_account_balance(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, LedgerError> {
        self.snapshot()?.balance(account_id, as_of)
    }

    /// Balance with debit and credit totals.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn account_balance_detail(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountBalance, LedgerError> {
        self.snapshot()?.balance_detail(account_id, as_of)
    }

    /// Trial balance as of a date.
    ///
    /// # Errors
    ///
    /// Returns a store error if the log cannot be read.
    pub fn trial_balance(&self, as_of: NaiveDate) -> Result<TrialBalance, LedgerError> {
        Ok(self.snapshot()?.trial_balance(as_of))
    }

    /// Legs dated within `[start, end]`, optionally restricted to an account
    /// and its descendants.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account filter.
    pub fn transactions(
        &self,
        start: Option<NaiveDate>,
        end: NaiveDate,
        account_id: Option<AccountId>,
    ) -> Result<Vec<LedgerTransaction>, LedgerError> {
        let Some(account_id) = account_id else {
            return Ok(self.log.range(start, end, None)?);
        };

        let leaves = {
            let chart = self.chart.read();
            chart.require(account_id)?;
            chart.leaves_under(account_id)
        };
        if let [leaf] = leaves.as_slice() {
            return Ok(self.log.range(start, end, Some(*leaf))?);
        }

        let leaves: HashSet<AccountId> = leaves.into_iter().collect();
        Ok(self
            .log
            .range(start, end, None)?
            .into_iter()
            .filter(|leg| leaves.contains(&leg.account_id))
            .collect())
    }

    /// The legs of one journal.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` for unknown journals.
    pub fn journal(&self, journal_id: JournalId) -> Result<JournalEntry, LedgerError> {
        JournalEntry::from_legs(self.log.journal(journal_id)?)
            .ok_or(LedgerError::JournalNotFound(journal_id))
    }

    /// Sequence number the next appended leg will receive.
    #[must_use]
    pub fn high_water_mark(&self) -> u64 {
        self.log.high_water_mark()
    }

    /// Runs `f` against the chart under its read lock, without touching the log.
    pub fn with_chart<R>(&self, f: impl FnOnce(&ChartOfAccounts) -> R) -> R {
        f(&self.chart.read())
    }

    /// Takes a consistent, frozen view of the chart and the log.
    ///
    /// # Errors
    ///
    /// Returns a store error if the log cannot be read.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        let chart = self.chart.read();
        let (transactions, sequence) = self.log.read_all()?;
        Ok(LedgerSnapshot::new(
            chart.clone(),
            transactions,
            sequence,
            self.currency,
        ))
    }
}

fn journal_from(legs: Vec<LedgerTransaction>) -> Result<JournalEntry, LedgerError> {
    JournalEntry::from_legs(legs)
        .ok_or_else(|| StoreError::Backend("log returned an empty journal".into()).into())
}
