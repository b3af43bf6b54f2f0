//! Fiscal year management.

pub mod period;

pub use period::FiscalCalendar;
