//! Finance dashboard metrics.
//!
//! This module folds the current state of invoices, payments, expenses,
//! budgets and cash into one summary.

pub mod service;
pub mod types;

pub use service::DashboardService;
pub use types::*;
