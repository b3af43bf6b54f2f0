//! Budget tracking and variance analysis.

pub mod error;
pub mod service;
pub mod types;


pub use error::BudgetError;
pub use service::BudgetService;
pub use types::{
    Budget, BudgetLine, BudgetStatus, BudgetUtilization, LineUtilization, NewBudget,
    VarianceResult, VarianceStatus,
};
