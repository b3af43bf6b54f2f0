//! Sequential document numbers.

use dashmap::DashMap;

/// An allocated document number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNumber {
    /// Counter value; the numeric order of documents under one prefix.
    pub sequence: u64,
    /// Formatted number.
    pub number: String,
}

/// Independent monotonically increasing counters keyed by document prefix.
#[derive(Debug, Default)]
pub struct DocumentNumbers {
    counters: DashMap<&'static str, u64>,
}

impl DocumentNumbers {
    /// Creates an empty set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next sequence number for `prefix`, starting at 1.
    pub fn next(&self, prefix: &'static str) -> u64 {
        let mut counter = self.counters.entry(prefix).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Allocates `{prefix}-{seq:04}`.
    pub fn next_plain(&self, prefix: &'static str) -> DocumentNumber {
        let sequence = self.next(prefix);
        DocumentNumber {
            sequence,
            number: format!("{prefix}-{sequence:04}"),
        }
    }

    /// Allocates `{prefix}-{year}-{seq:04}`.
    pub fn next_yearly(&self, prefix: &'static str, year: i32) -> DocumentNumber {
        let sequence = self.next(prefix);
        DocumentNumber {
            sequence,
            number: format!("{prefix}-{year}-{sequence:04}"),
        }
    }
}
