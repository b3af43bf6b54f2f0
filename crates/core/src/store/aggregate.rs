//! Versioned aggregate storage with bounded-wait per-aggregate locks.

use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::warn;

use super::error::StoreError;

/// An aggregate carrying an optimistic-concurrency version.
pub trait Versioned {
    /// Current version. Starts at 1 and increases by one per committed mutation.
    fn version(&self) -> u64;

    /// Overwrites the version. Only the store calls this.
    fn set_version(&mut self, version: u64);
}

/// Keyed aggregates, each behind its own mutex.
///
/// Mutations run on a working copy inside the aggregate's lock and are
/// committed only when the closure succeeds, so a failed operation leaves the
/// stored aggregate untouched. Lock acquisition waits at most `lock_timeout`
/// and reports `StoreError::LockTimeout` instead of blocking.
pub struct AggregateStore<K, T> {
    kind: &'static str,
    items: DashMap<K, Arc<Mutex<T>>>,
    lock_timeout: Duration,
}

impl<K, T> std::fmt::Debug for AggregateStore<K, T>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateStore")
            .field("kind", &self.kind)
            .field("len", &self.items.len())
            .field("lock_timeout", &self.lock_timeout)
            .finish()
    }
}

impl<K, T> AggregateStore<K, T>
where
    K: Copy + Eq + Hash + Display,
    T: Clone + Versioned,
{
    /// Creates an empty store for aggregates of the given kind.
    #[must_use]
    pub fn new(kind: &'static str, lock_timeout: Duration) -> Self {
        Self {
            kind,
            items: DashMap::new(),
            lock_timeout,
        }
    }

    /// Inserts a new aggregate at version 1.
    pub fn insert(&self, id: K, mut value: T) -> Result<T, StoreError> {
        value.set_version(1);
        match self.items.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::Duplicate {
                kind: self.kind,
                id: id.to_string(),
            }),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(value.clone())));
                Ok(value)
            }
        }
    }

    /// Returns a copy of the aggregate.
    pub fn get(&self, id: &K) -> Result<T, StoreError> {
        let cell = self.cell(id)?;
        let guard = self.lock(&cell, id)?;
        Ok(guard.clone())
    }

    /// Returns copies of every aggregate.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if any aggregate stays locked past the timeout,
    /// so a listing is either complete or not returned at all.
    pub fn list(&self) -> Result<Vec<T>, StoreError> {
        let cells: Vec<(K, Arc<Mutex<T>>)> = self
            .items
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        cells
            .into_iter()
            .map(|(id, cell)| self.lock(&cell, &id).map(|guard| guard.clone()))
            .collect()
    }

    /// Number of stored aggregates.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Runs `f` against the aggregate under its lock and commits on success.
    ///
    /// When `expected_version` is given it must match the stored version.
    /// On commit the version is incremented. Returns the closure's result
    /// together with the committed aggregate.
    pub fn update<R, E, F>(&self, id: &K, expected_version: Option<u64>, f: F) -> Result<(R, T), E>
    where
        F: FnOnce(&mut T) -> Result<R, E>,
        E: From<StoreError>,
    {
        let cell = self.cell(id)?;
        let mut guard = self.lock(&cell, id)?;

        let current = guard.version();
        if let Some(expected) = expected_version
            && expected != current
        {
            return Err(StoreError::VersionMismatch {
                kind: self.kind,
                id: id.to_string(),
                expected,
                actual: current,
            }
            .into());
        }

        let mut working = guard.clone();
        let result = f(&mut working)?;
        working.set_version(current + 1);
        *guard = working.clone();

        Ok((result, working))
    }

    fn cell(&self, id: &K) -> Result<Arc<Mutex<T>>, StoreError> {
        // Clone the Arc so the DashMap shard lock is released before waiting
        // on the aggregate lock.
        self.items
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StoreError::NotFound {
                kind: self.kind,
                id: id.to_string(),
            })
    }

    fn lock<'a>(
        &self,
        cell: &'a Arc<Mutex<T>>,
        id: &K,
    ) -> Result<parking_lot::MutexGuard<'a, T>, StoreError> {
        cell.try_lock_for(self.lock_timeout).ok_or_else(|| {
            warn!(kind = self.kind, id = %id, timeout = ?self.lock_timeout, "Aggregate lock timeout");
            StoreError::LockTimeout {
                kind: self.kind,
                id: id.to_string(),
            }
        })
    }
}
