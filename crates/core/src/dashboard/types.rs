//! Dashboard data types.

use chrono::NaiveDate;
use finledger_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dashboard metrics response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    /// Reference date.
    pub as_of: NaiveDate,
    /// Currency.
    pub currency: Currency,
    /// Open sales invoices.
    pub receivables: InvoicePosition,
    /// Open purchase invoices.
    pub payables: InvoicePosition,
    /// Expense pipeline.
    pub expenses: ExpensePosition,
    /// Active budgets.
    pub budgets: BudgetPosition,
    /// Cash position.
    pub cash: CashPosition,
}

/// Outstanding position of one invoice type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoicePosition {
    /// Σ outstanding of open invoices.
    pub outstanding: Decimal,
    /// Number of open invoices.
    pub open_count: usize,
    /// Number of overdue invoices.
    pub overdue_count: usize,
    /// Σ outstanding of overdue invoices.
    pub overdue_amount: Decimal,
}

/// Expense pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePosition {
    /// Submitted expenses awaiting a decision.
    pub pending_approval_count: usize,
    /// Σ submitted amounts.
    pub pending_approval_amount: Decimal,
    /// Approved expenses not yet paid.
    pub approved_unpaid_count: usize,
    /// Σ approved, unpaid amounts.
    pub approved_unpaid_amount: Decimal,
}

/// Aggregate over active budgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPosition {
    /// Number of active budgets.
    pub active_count: usize,
    /// Σ allocated.
    pub total_allocated: Decimal,
    /// Σ spent.
    pub total_spent: Decimal,
    /// spent / allocated × 100, 2 dp.
    pub utilization_percent: Decimal,
}

/// Cash position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashPosition {
    /// Σ cash account balances as of the reference date.
    pub balance: Decimal,
    /// Confirmed receipts dated in the reference month.
    pub receipts_this_month: Decimal,
    /// Confirmed payments dated in the reference month.
    pub payments_this_month: Decimal,
}
