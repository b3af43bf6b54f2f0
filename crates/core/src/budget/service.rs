//! Budget lifecycle, utilization and variance.

use chrono::{NaiveDate, Utc};
use finledger_shared::types::{AccountId, BudgetId, UserId, checked_sum, within_limit};
use rust_decimal::{Decimal, RoundingStrategy};

use super::error::BudgetError;
use super::types::{
    Budget, BudgetLine, BudgetStatus, BudgetUtilization, LineUtilization, NewBudget,
    VarianceResult, VarianceStatus,
};
use crate::expense::{Expense, ExpenseStatus};
use crate::ledger::{AccountType, LedgerError, LedgerSnapshot, LegFilter};

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Builds a draft budget.
    ///
    /// `is_ancestor(a, b)` reports whether account `a` sits above `b` in the
    /// chart.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name, an inverted period, or
    /// invalid lines.
    pub fn create(
        input: NewBudget,
        created_by: Option<UserId>,
        is_ancestor: impl Fn(AccountId, AccountId) -> bool,
    ) -> Result<Budget, BudgetError> {
        if input.name.trim().is_empty() {
            return Err(BudgetError::NameRequired);
        }
        if input.period_end < input.period_start {
            return Err(BudgetError::InvalidPeriod {
                start: input.period_start,
                end: input.period_end,
            });
        }
        Self::validate_lines(&input.lines, is_ancestor)?;
        let total_allocated = total_allocated(&input.lines)?;

        Ok(Budget {
            id: BudgetId::new(),
            name: input.name.trim().to_string(),
            fiscal_year: input.fiscal_year,
            period_start: input.period_start,
            period_end: input.period_end,
            department: input.department,
            project: input.project,
            total_allocated,
            lines: input.lines,
            status: BudgetStatus::Draft,
            created_by,
            approved_by: None,
            approved_at: None,
            activated_at: None,
            closed_on: None,
            closed_at_sequence: None,
            version: 0,
        })
    }

    /// Validate budget lines.
    ///
    /// # Errors
    ///
    /// Returns `NegativeAmount` for negative allocations or commitments,
    /// `AmountOutOfRange` for amounts beyond `MAX_AMOUNT`, `DuplicateBudgetLine` for a repeated account, and `OverlappingLines`
    /// when one line's account is an ancestor of another's.
    pub fn validate_lines(
        lines: &[BudgetLine],
        is_ancestor: impl Fn(AccountId, AccountId) -> bool,
    ) -> Result<(), BudgetError> {
        for (i, line) in lines.iter().enumerate() {
            if line.allocated_amount < Decimal::ZERO || line.committed_amount < Decimal::ZERO {
                return Err(BudgetError::NegativeAmount(line.account_id));
            }
            if !within_limit(line.allocated_amount) || !within_limit(line.committed_amount) {
                return Err(BudgetError::AmountOutOfRange(line.account_id));
            }
            for other in &lines[i + 1..] {
                if other.account_id == line.account_id {
                    return Err(BudgetError::DuplicateBudgetLine(line.account_id));
                }
                for (ancestor, descendant) in [
                    (line.account_id, other.account_id),
                    (other.account_id, line.account_id),
                ] {
                    if is_ancestor(ancestor, descendant) {
                        return Err(BudgetError::OverlappingLines {
                            ancestor,
                            descendant,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Replaces the lines of a draft budget.
    ///
    /// # Errors
    ///
    /// Returns `BudgetLocked` outside draft, or a line validation error.
    pub fn update_lines(
        budget: &mut Budget,
        lines: Vec<BudgetLine>,
        is_ancestor: impl Fn(AccountId, AccountId) -> bool,
    ) -> Result<(), BudgetError> {
        if budget.status != BudgetStatus::Draft {
            return Err(BudgetError::BudgetLocked(budget.status));
        }
        Self::validate_lines(&lines, is_ancestor)?;
        budget.total_allocated = total_allocated(&lines)?;
        budget.lines = lines;
        Ok(())
    }

    /// draft → approved.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if not in draft.
    pub fn approve(budget: &mut Budget, approved_by: Option<UserId>) -> Result<(), BudgetError> {
        transition(budget, BudgetStatus::Draft, BudgetStatus::Approved)?;
        budget.approved_by = approved_by;
        budget.approved_at = Some(Utc::now());
        Ok(())
    }

    /// approved → active.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if not approved.
    pub fn activate(budget: &mut Budget) -> Result<(), BudgetError> {
        transition(budget, BudgetStatus::Approved, BudgetStatus::Active)?;
        budget.activated_at = Some(Utc::now());
        Ok(())
    }

    /// active → closed. Legs appended at or after `sequence` are no longer
    /// attributed to the budget.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if not active.
    pub fn close(budget: &mut Budget, closed_on: NaiveDate, sequence: u64) -> Result<(), BudgetError> {
        transition(budget, BudgetStatus::Active, BudgetStatus::Closed)?;
        budget.closed_on = Some(closed_on);
        budget.closed_at_sequence = Some(sequence);
        Ok(())
    }

    /// Calculate variance between budgeted and actual amounts.
    ///
    /// For revenue accounts: variance = actual - budgeted
    ///   - Positive variance (over target) is favorable
    ///
    /// For every other account type: variance = budgeted - actual
    ///   - Positive variance (under budget) is favorable
    #[must_use]
    pub fn calculate_variance(
        budgeted: Decimal,
        actual: Decimal,
        account_type: AccountType,
    ) -> VarianceResult {
        let variance = match account_type {
            AccountType::Revenue => actual - budgeted,
            _ => budgeted - actual,
        };

        let status = match variance.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => VarianceStatus::Favorable,
            std::cmp::Ordering::Less => VarianceStatus::Unfavorable,
            std::cmp::Ordering::Equal => VarianceStatus::OnBudget,
        };

        VarianceResult {
            budgeted,
            actual,
            variance,
            variance_percent: percent(variance, budgeted),
            status,
        }
    }

    /// Utilization of a budget as of a date.
    ///
    /// Spend is the normal-side movement of each line account (summing leaves
    /// under headers) dated within `[period_start, min(period_end, as_of)]`.
    /// Committed adds submitted, not yet approved expenses charged to a line
    /// account within the same window.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if a line account is missing from the chart.
    pub fn compute_utilization(
        budget: &Budget,
        snapshot: &LedgerSnapshot,
        as_of: NaiveDate,
        expenses: &[Expense],
    ) -> Result<BudgetUtilization, BudgetError> {
        let window_start = budget.period_start;
        let window_end = budget.period_end.min(as_of);
        let mut filter = LegFilter::between(window_start, window_end);
        if let Some(sequence) = budget.closed_at_sequence {
            filter = filter.before_sequence(sequence);
        }

        let chart = snapshot.chart();
        let lines = budget
            .lines
            .iter()
            .map(|line| {
                let account = chart
                    .get(line.account_id)
                    .ok_or(BudgetError::AccountNotFound(line.account_id))?;
                let spent = snapshot
                    .movement(line.account_id, filter)
                    .map_err(|e| match e {
                        LedgerError::AccountNotFound(id) => BudgetError::AccountNotFound(id),
                        _ => BudgetError::AccountNotFound(line.account_id),
                    })?;

                let pending: Decimal = expenses
                    .iter()
                    .filter(|e| e.status == ExpenseStatus::Submitted)
                    .filter(|e| e.expense_date >= window_start && e.expense_date <= window_end)
                    .filter(|e| {
                        e.account_id == line.account_id || chart.is_ancestor(line.account_id, e.account_id)
                    })
                    .map(|e| e.amount)
                    .sum();
                let committed = line.committed_amount + pending;
                let allocated = line.allocated_amount;

                Ok(LineUtilization {
                    account_id: account.id,
                    account_code: account.code.clone(),
                    account_name: account.name.clone(),
                    account_type: account.account_type,
                    allocated,
                    spent,
                    committed,
                    remaining: allocated - spent,
                    available: allocated - spent - committed,
                    utilization_percentage: percent(spent, allocated),
                    variance: Self::calculate_variance(allocated, spent, account.account_type),
                })
            })
            .collect::<Result<Vec<_>, BudgetError>>()?;

        let total_allocated: Decimal = lines.iter().map(|l| l.allocated).sum();
        let total_spent: Decimal = lines.iter().map(|l| l.spent).sum();
        let total_committed: Decimal = lines.iter().map(|l| l.committed).sum();

        Ok(BudgetUtilization {
            budget_id: budget.id,
            status: budget.status,
            as_of,
            window_start,
            window_end,
            total_allocated,
            total_spent,
            total_committed,
            remaining: total_allocated - total_spent,
            available: total_allocated - total_spent - total_committed,
            utilization_percentage: percent(total_spent, total_allocated),
            lines,
        })
    }
}

fn transition(budget: &mut Budget, from: BudgetStatus, to: BudgetStatus) -> Result<(), BudgetError> {
    if budget.status != from {
        return Err(BudgetError::InvalidTransition {
            from: budget.status,
            to,
        });
    }
    budget.status = to;
    Ok(())
}

fn total_allocated(lines: &[BudgetLine]) -> Result<Decimal, BudgetError> {
    checked_sum(lines.iter().map(|l| l.allocated_amount)).ok_or(BudgetError::TotalOutOfRange)
}

/// part / whole × 100 rounded to 2 dp; 0 when whole is 0.
pub(crate) fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}
