//! Financial report generation.
//!
//! This module provides pure business logic for generating financial reports
//! over a frozen ledger snapshot:
//! - Trial Balance
//! - Balance Sheet
//! - Profit & Loss
//! - Cash Flow (direct method)
//! - Expenses by category
//! - Monthly revenue and expense trend

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::{MAX_TREND_MONTHS, ReportService};
pub use types::*;
