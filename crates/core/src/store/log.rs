//! Append-only transaction log.

use std::collections::HashMap;

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, JournalId, TransactionId};
use parking_lot::RwLock;

use super::error::StoreError;
use crate::ledger::entry::LedgerTransaction;

/// Durable home of posted ledger legs.
///
/// Implementations must make `append` atomic: either every leg of the batch
/// becomes visible, with consecutive sequence numbers, or none does. Legs are
/// never updated or removed.
pub trait TransactionLog: Send + Sync {
    /// Appends a batch, assigning sequence numbers. Returns the stored legs.
    fn append(&self, legs: Vec<LedgerTransaction>) -> Result<Vec<LedgerTransaction>, StoreError>;

    /// Keyed lookup of one leg.
    fn get(&self, id: TransactionId) -> Result<Option<LedgerTransaction>, StoreError>;

    /// All legs of one journal in log order.
    fn journal(&self, id: JournalId) -> Result<Vec<LedgerTransaction>, StoreError>;

    /// Legs dated within `[start, end]`, optionally restricted to one account.
    fn range(
        &self,
        start: Option<NaiveDate>,
        end: NaiveDate,
        account: Option<AccountId>,
    ) -> Result<Vec<LedgerTransaction>, StoreError>;

    /// Every leg together with the sequence number the next append will get.
    /// The pair is read consistently.
    fn read_all(&self) -> Result<(Vec<LedgerTransaction>, u64), StoreError>;

    /// Sequence number the next appended leg will receive.
    fn high_water_mark(&self) -> u64;

    /// Returns true if any leg posts to `account`.
    fn has_postings(&self, account: AccountId) -> Result<bool, StoreError>;
}

#[derive(Default)]
struct LogState {
    legs: Vec<LedgerTransaction>,
    by_id: HashMap<TransactionId, usize>,
    by_journal: HashMap<JournalId, Vec<usize>>,
}

/// In-process log guarded by a single `RwLock`.
#[derive(Default)]
pub struct InMemoryTransactionLog {
    state: RwLock<LogState>,
}

impl InMemoryTransactionLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for InMemoryTransactionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTransactionLog")
            .field("len", &self.state.read().legs.len())
            .finish()
    }
}

impl TransactionLog for InMemoryTransactionLog {
    fn append(&self, legs: Vec<LedgerTransaction>) -> Result<Vec<LedgerTransaction>, StoreError> {
        let mut state = self.state.write();
        if let Some(duplicate) = legs.iter().find(|leg| state.by_id.contains_key(&leg.id)) {
            return Err(StoreError::Duplicate {
                kind: "transaction",
                id: duplicate.id.to_string(),
            });
        }

        let mut stored = Vec::with_capacity(legs.len());
        for mut leg in legs {
            let index = state.legs.len();
            leg.sequence = index as u64;
            state.by_id.insert(leg.id, index);
            state.by_journal.entry(leg.journal_id).or_default().push(index);
            state.legs.push(leg.clone());
            stored.push(leg);
        }

        Ok(stored)
    }

    fn get(&self, id: TransactionId) -> Result<Option<LedgerTransaction>, StoreError> {
        let state = self.state.read();
        Ok(state.by_id.get(&id).map(|index| state.legs[*index].clone()))
    }

    fn journal(&self, id: JournalId) -> Result<Vec<LedgerTransaction>, StoreError> {
        let state = self.state.read();
        Ok(state
            .by_journal
            .get(&id)
            .map(|indexes| indexes.iter().map(|i| state.legs[*i].clone()).collect())
            .unwrap_or_default())
    }

    fn range(
        &self,
        start: Option<NaiveDate>,
        end: NaiveDate,
        account: Option<AccountId>,
    ) -> Result<Vec<LedgerTransaction>, StoreError> {
        let state = self.state.read();
        Ok(state
            .legs
            .iter()
            .filter(|leg| leg.date <= end && start.is_none_or(|s| leg.date >= s))
            .filter(|leg| account.is_none_or(|a| leg.account_id == a))
            .cloned()
            .collect())
    }

    fn read_all(&self) -> Result<(Vec<LedgerTransaction>, u64), StoreError> {
        let state = self.state.read();
        Ok((state.legs.clone(), state.legs.len() as u64))
    }

    fn high_water_mark(&self) -> u64 {
        self.state.read().legs.len() as u64
    }

    fn has_postings(&self, account: AccountId) -> Result<bool, StoreError> {
        Ok(self
            .state
            .read()
            .legs
            .iter()
            .any(|leg| leg.account_id == account))
    }
}
