//! Double-entry bookkeeping.
//!
//! This module implements the core ledger functionality:
//! - Chart of accounts with header/leaf hierarchy
//! - Immutable transaction legs grouped into journals
//! - Balance derivation from the log
//! - Business rule validation
//! - Frozen snapshots for reporting

pub mod account;
pub mod balance;
pub mod chart;
pub mod entry;
pub mod error;
pub mod journal;
pub mod service;
pub mod snapshot;
pub mod validation;

#[cfg(test)]
mod ledger_props;
#[cfg(test)]
mod validation_props;

pub use account::{Account, AccountSubtype, AccountType, CashFlowActivity, NewAccount, NormalBalance};
pub use balance::{AccountBalance, DebitCredit, TrialBalance};
pub use chart::{ChartOfAccounts, default_chart};
pub use entry::{EntryType, LedgerTransaction, SourceReference};
pub use error::LedgerError;
pub use journal::{JournalEntry, JournalInput, JournalLineInput, JournalTotals, PostingInput};
pub use service::Ledger;
pub use snapshot::{LedgerSnapshot, LegFilter};
pub use validation::{LedgerValidationError, validate_lines};
