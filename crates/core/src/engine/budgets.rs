//! Budget operations.

use chrono::NaiveDate;
use finledger_shared::types::{BudgetId, UserId};
use tracing::{info, warn};

use super::{EngineError, FinanceEngine, missing};
use crate::budget::{Budget, BudgetError, BudgetLine, BudgetService, BudgetUtilization, NewBudget};
use crate::ledger::LedgerError;

impl FinanceEngine {
    /// Creates a draft budget.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid periods or lines and
    /// `AccountNotFound` for unknown line accounts.
    pub fn create_budget(
        &self,
        input: NewBudget,
        created_by: Option<UserId>,
    ) -> Result<Budget, EngineError> {
        self.check_budget_accounts(&input.lines)?;
        let budget = BudgetService::create(input, created_by, |a, b| self.ledger.is_ancestor(a, b))
            .inspect_err(|e| warn!(error = %e, "Rejected budget"))?;

        let budget = self.budgets.insert(budget.id, budget)?;
        info!(
            budget_id = %budget.id,
            name = %budget.name,
            allocated = %budget.total_allocated,
            "Budget created"
        );
        Ok(budget)
    }

    /// Stored budget.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn budget(&self, id: BudgetId) -> Result<Budget, EngineError> {
        self.budgets
            .get(&id)
            .map_err(|e| missing(e.into(), || BudgetError::NotFound(id).into()))
    }

    /// All budgets ordered by period start, then name.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if a budget stays locked past the timeout.
    pub fn list_budgets(&self) -> Result<Vec<Budget>, EngineError> {
        let mut budgets = self.budgets.list()?;
        budgets.sort_by(|a, b| (a.period_start, &a.name).cmp(&(b.period_start, &b.name)));
        Ok(budgets)
    }

    /// Replaces the lines of a draft budget.
    ///
    /// # Errors
    ///
    /// Returns `BudgetLocked` outside draft or a line validation error.
    pub fn update_budget_lines(
        &self,
        id: BudgetId,
        lines: Vec<BudgetLine>,
        expected_version: Option<u64>,
    ) -> Result<Budget, EngineError> {
        self.check_budget_accounts(&lines)?;
        let ((), budget) = self
            .budgets
            .update(&id, expected_version, |budget| {
                BudgetService::update_lines(budget, lines, |a, b| self.ledger.is_ancestor(a, b))
                    .map_err(EngineError::from)
            })
            .map_err(|e| missing(e, || BudgetError::NotFound(id).into()))?;

        info!(budget_id = %id, allocated = %budget.total_allocated, "Budget lines updated");
        Ok(budget)
    }

    /// draft → approved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside draft.
    pub fn approve_budget(
        &self,
        id: BudgetId,
        approved_by: Option<UserId>,
        expected_version: Option<u64>,
    ) -> Result<Budget, EngineError> {
        self.transition_budget(id, expected_version, |budget| {
            BudgetService::approve(budget, approved_by)
        })
    }

    /// approved → active.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless approved.
    pub fn activate_budget(&self, id: BudgetId, expected_version: Option<u64>) -> Result<Budget, EngineError> {
        self.transition_budget(id, expected_version, BudgetService::activate)
    }

    /// active → closed. Postings appended after this call are no longer
    /// attributed to the budget.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless active.
    pub fn close_budget(
        &self,
        id: BudgetId,
        closed_on: NaiveDate,
        expected_version: Option<u64>,
    ) -> Result<Budget, EngineError> {
        self.transition_budget(id, expected_version, |budget| {
            BudgetService::close(budget, closed_on, self.ledger.high_water_mark())
        })
    }

    /// Utilization of a budget as of a date.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids, or `LockTimeout` if an expense
    /// counted as a commitment stays locked past the timeout.
    pub fn budget_utilization(
        &self,
        id: BudgetId,
        as_of: NaiveDate,
    ) -> Result<BudgetUtilization, EngineError> {
        let budget = self.budget(id)?;
        let snapshot = self.snapshot()?;
        Ok(BudgetService::compute_utilization(
            &budget,
            &snapshot,
            as_of,
            &self.expenses.list()?,
        )?)
    }

    fn transition_budget(
        &self,
        id: BudgetId,
        expected_version: Option<u64>,
        transition: impl FnOnce(&mut Budget) -> Result<(), BudgetError>,
    ) -> Result<Budget, EngineError> {
        let ((), budget) = self
            .budgets
            .update(&id, expected_version, |budget| {
                transition(budget)
                    .inspect_err(|e| warn!(budget_id = %id, error = %e, "Budget transition rejected"))
                    .map_err(EngineError::from)
            })
            .map_err(|e| missing(e, || BudgetError::NotFound(id).into()))?;

        info!(budget_id = %id, name = %budget.name, status = %budget.status, "Budget status changed");
        Ok(budget)
    }

    fn check_budget_accounts(&self, lines: &[BudgetLine]) -> Result<(), EngineError> {
        for line in lines {
            self.ledger.account(line.account_id).map_err(|e| match e {
                LedgerError::AccountNotFound(id) => EngineError::from(BudgetError::AccountNotFound(id)),
                other => other.into(),
            })?;
        }
        Ok(())
    }
}
