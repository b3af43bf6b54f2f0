//! Core business logic for the finance ledger.
//!
//! This crate contains pure business logic with ZERO web dependencies.
//! All domain types, validation rules, postings and report calculations
//! live here; the HTTP surface lives in `finledger-api`.
//!
//! # Modules
//!
//! - `ledger` - Chart of accounts and double-entry bookkeeping
//! - `invoice` - Sales, purchase and proforma invoices
//! - `payment` - Receipts and disbursements
//! - `expense` - Expense approval with accrual on approval
//! - `budget` - Budget tracking and variance analysis
//! - `tax` - Monthly tax records from calculation to remittance
//! - `reports` - Trial balance, balance sheet, profit and loss, cash flow
//! - `dashboard` - Point-in-time summary metrics
//! - `fiscal` - Fiscal year boundaries
//! - `store` - Transaction log and versioned aggregate storage
//! - `engine` - The facade tying the above together

pub mod budget;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod expense;
pub mod fiscal;
pub mod invoice;
pub mod ledger;
pub mod numbering;
pub mod payment;
pub mod reports;
pub mod store;
pub mod tax;

pub use engine::{EngineConfig, EngineError, FinanceEngine};
pub use error::ErrorKind;
