//! Storage boundary of the engine.
//!
//! - `log` - the append-only transaction log behind the ledger
//! - `aggregate` - versioned, lock-guarded storage for invoices, payments,
//!   expenses and budgets
//! - `error` - store failures

pub mod aggregate;
pub mod error;
pub mod log;

pub use aggregate::{AggregateStore, Versioned};
pub use error::StoreError;
pub use log::{InMemoryTransactionLog, TransactionLog};
