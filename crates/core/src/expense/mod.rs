//! Expense approval flow with accrual on approval.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::ExpenseError;
pub use service::ExpenseWorkflow;
pub use types::{
    Expense, ExpenseAction, ExpenseCategory, ExpenseStatus, ExpenseUpdate, NewExpense,
};
