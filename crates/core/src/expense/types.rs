//! Expense domain types and workflow actions.

use chrono::{DateTime, NaiveDate, Utc};
use finledger_shared::types::{AccountId, ExpenseId, JournalId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Versioned;

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// General operations.
    Operational,
    /// Travel and accommodation.
    Travel,
    /// Office supplies.
    Office,
    /// Electricity, water, internet.
    Utilities,
    /// Payroll.
    Salaries,
    /// Marketing and advertising.
    Marketing,
    /// Training and education.
    Training,
    /// Anything else.
    Other,
}

/// Expense status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Editable, not yet submitted.
    Draft,
    /// Awaiting approval.
    Submitted,
    /// Approved and accrued.
    Approved,
    /// Rejected (terminal).
    Rejected,
    /// Settled in cash (terminal).
    Paid,
}

impl ExpenseStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expense aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Sequential document number.
    pub number: String,
    /// Counter value behind `number`; orders documents sharing a prefix.
    pub sequence: u64,
    /// Category.
    pub category: ExpenseCategory,
    /// What was spent on.
    pub description: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Date incurred.
    pub expense_date: NaiveDate,
    /// Expense leaf account charged.
    pub account_id: AccountId,
    /// Department scope.
    pub department: Option<String>,
    /// Project scope.
    pub project: Option<String>,
    /// Current status.
    pub status: ExpenseStatus,
    /// Requesting user.
    pub requested_by: Option<UserId>,
    /// When submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Approving user.
    pub approved_by: Option<UserId>,
    /// When approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approver notes.
    pub approval_notes: Option<String>,
    /// Why it was rejected.
    pub rejection_reason: Option<String>,
    /// When settled.
    pub paid_at: Option<DateTime<Utc>>,
    /// Journal recognising the expense on approval.
    pub accrual_journal: Option<JournalId>,
    /// Journal settling the accrual.
    pub payment_journal: Option<JournalId>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl Versioned for Expense {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Input for recording an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpense {
    /// Category.
    pub category: ExpenseCategory,
    /// What was spent on.
    pub description: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Date incurred.
    pub expense_date: NaiveDate,
    /// Expense leaf account.
    pub account_id: AccountId,
    /// Department scope.
    #[serde(default)]
    pub department: Option<String>,
    /// Project scope.
    #[serde(default)]
    pub project: Option<String>,
}

/// Editable fields of a draft expense.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    /// New amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New expense account.
    #[serde(default)]
    pub account_id: Option<AccountId>,
    /// New category.
    #[serde(default)]
    pub category: Option<ExpenseCategory>,
    /// New date.
    #[serde(default)]
    pub expense_date: Option<NaiveDate>,
}

/// Validated state change produced by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseAction {
    /// Submit a draft expense.
    Submit {
        /// The new status after submission.
        new_status: ExpenseStatus,
        /// When the expense was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Approve a submitted expense.
    Approve {
        /// The new status after approval.
        new_status: ExpenseStatus,
        /// The approving user.
        approved_by: Option<UserId>,
        /// When the expense was approved.
        approved_at: DateTime<Utc>,
        /// Optional notes from the approver.
        approval_notes: Option<String>,
    },
    /// Reject a submitted expense.
    Reject {
        /// The new status after rejection.
        new_status: ExpenseStatus,
        /// The reason for rejection.
        rejection_reason: String,
    },
    /// Settle an approved expense.
    Pay {
        /// The new status after payment.
        new_status: ExpenseStatus,
        /// When the expense was paid.
        paid_at: DateTime<Utc>,
    },
}

impl ExpenseAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> ExpenseStatus {
        match self {
            Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Pay { new_status, .. } => *new_status,
        }
    }

    /// Writes the action onto the expense.
    pub fn apply(self, expense: &mut Expense) {
        expense.status = self.new_status();
        match self {
            Self::Submit { submitted_at, .. } => expense.submitted_at = Some(submitted_at),
            Self::Approve {
                approved_by,
                approved_at,
                approval_notes,
                ..
            } => {
                expense.approved_by = approved_by;
                expense.approved_at = Some(approved_at);
                expense.approval_notes = approval_notes;
            }
            Self::Reject {
                rejection_reason, ..
            } => expense.rejection_reason = Some(rejection_reason),
            Self::Pay { paid_at, .. } => expense.paid_at = Some(paid_at),
        }
    }
}
