//! Budget data types.

use chrono::{DateTime, NaiveDate, Utc};
use finledger_shared::types::{AccountId, BudgetId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AccountType;
use crate::store::Versioned;

/// Budget status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Lines editable.
    Draft,
    /// Approved, not yet tracking.
    Approved,
    /// Tracking spend.
    Active,
    /// Frozen against further attribution.
    Closed,
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Active => "active",
            Self::Closed => "closed",
        })
    }
}

/// A budget line: one account (leaf or header) and its allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetLine {
    /// Budgeted account.
    pub account_id: AccountId,
    /// Allocated amount.
    pub allocated_amount: Decimal,
    /// Open commitments (purchase orders and the like) entered by hand.
    #[serde(default)]
    pub committed_amount: Decimal,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A budget record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Budget name.
    pub name: String,
    /// Fiscal year label.
    pub fiscal_year: i32,
    /// First day tracked.
    pub period_start: NaiveDate,
    /// Last day tracked.
    pub period_end: NaiveDate,
    /// Department scope.
    pub department: Option<String>,
    /// Project scope.
    pub project: Option<String>,
    /// Budget lines.
    pub lines: Vec<BudgetLine>,
    /// Σ line allocations.
    pub total_allocated: Decimal,
    /// Current status.
    pub status: BudgetStatus,
    /// Creating user.
    pub created_by: Option<UserId>,
    /// Approving user.
    pub approved_by: Option<UserId>,
    /// When approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When activated.
    pub activated_at: Option<DateTime<Utc>>,
    /// Close date.
    pub closed_on: Option<NaiveDate>,
    /// Log sequence at close; legs at or after it are not attributed.
    pub closed_at_sequence: Option<u64>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Versioned for Budget {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Input for creating a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBudget {
    /// Budget name.
    pub name: String,
    /// Fiscal year label.
    pub fiscal_year: i32,
    /// First day tracked.
    pub period_start: NaiveDate,
    /// Last day tracked.
    pub period_end: NaiveDate,
    /// Department scope.
    #[serde(default)]
    pub department: Option<String>,
    /// Project scope.
    #[serde(default)]
    pub project: Option<String>,
    /// Budget lines.
    #[serde(default)]
    pub lines: Vec<BudgetLine>,
}

/// Variance status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Favorable variance (under budget for expenses, over target for revenue).
    Favorable,
    /// Unfavorable variance (over budget for expenses, under target for revenue).
    Unfavorable,
    /// On budget (no variance).
    OnBudget,
}

/// Variance calculation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceResult {
    /// Budgeted amount.
    pub budgeted: Decimal,
    /// Actual amount.
    pub actual: Decimal,
    /// Variance amount.
    pub variance: Decimal,
    /// Variance percentage.
    pub variance_percent: Decimal,
    /// Variance status.
    pub status: VarianceStatus,
}

/// Utilization of one budget line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineUtilization {
    /// Budgeted account.
    pub account_id: AccountId,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Allocated amount.
    pub allocated: Decimal,
    /// Normal-side movement in the window.
    pub spent: Decimal,
    /// Line commitments plus submitted expenses.
    pub committed: Decimal,
    /// allocated − spent.
    pub remaining: Decimal,
    /// allocated − spent − committed.
    pub available: Decimal,
    /// spent / allocated × 100, 2 dp, unclamped.
    pub utilization_percentage: Decimal,
    /// Budget vs actual variance.
    pub variance: VarianceResult,
}

/// Budget utilization as of a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetUtilization {
    /// Budget ID.
    pub budget_id: BudgetId,
    /// Budget status.
    pub status: BudgetStatus,
    /// Reference date.
    pub as_of: NaiveDate,
    /// Window start (period start).
    pub window_start: NaiveDate,
    /// Window end (earlier of period end and as-of).
    pub window_end: NaiveDate,
    /// Σ allocated.
    pub total_allocated: Decimal,
    /// Σ spent.
    pub total_spent: Decimal,
    /// Σ committed.
    pub total_committed: Decimal,
    /// allocated − spent.
    pub remaining: Decimal,
    /// allocated − spent − committed.
    pub available: Decimal,
    /// spent / allocated × 100, 2 dp, unclamped.
    pub utilization_percentage: Decimal,
    /// Per-line figures.
    pub lines: Vec<LineUtilization>,
}
