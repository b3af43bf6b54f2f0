//! Expense operations.

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, ExpenseId, UserId};
use tracing::{info, warn};

use super::{EngineError, FinanceEngine, missing};
use crate::expense::{
    Expense, ExpenseAction, ExpenseError, ExpenseUpdate, ExpenseWorkflow, NewExpense,
};
use crate::ledger::AccountType;

impl FinanceEngine {
    /// Records a draft expense.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount, a blank
    /// description, or an account that is not an expense leaf.
    pub fn create_expense(
        &self,
        input: NewExpense,
        requested_by: Option<UserId>,
    ) -> Result<Expense, EngineError> {
        self.check_expense_account(input.account_id)?;
        let expense = ExpenseWorkflow::create(input, String::new(), requested_by)
            .inspect_err(|e| warn!(error = %e, "Rejected expense"))?;
        let allocated = self.numbers.next_plain("EXP");
        let expense = Expense {
            number: allocated.number,
            sequence: allocated.sequence,
            ..expense
        };

        let expense = self.expenses.insert(expense.id, expense)?;
        info!(
            expense_id = %expense.id,
            number = %expense.number,
            amount = %expense.amount,
            "Expense recorded"
        );
        Ok(expense)
    }

    /// Stored expense.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn expense(&self, id: ExpenseId) -> Result<Expense, EngineError> {
        self.expenses
            .get(&id)
            .map_err(|e| missing(e.into(), || ExpenseError::NotFound(id).into()))
    }

    /// All expenses in numbering order.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if an expense stays locked past the timeout.
    pub fn list_expenses(&self) -> Result<Vec<Expense>, EngineError> {
        let mut expenses = self.expenses.list()?;
        expenses.sort_by_key(|e| e.sequence);
        Ok(expenses)
    }

    /// Edits a draft expense.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` outside draft or a validation error.
    pub fn update_expense(
        &self,
        id: ExpenseId,
        update: ExpenseUpdate,
        expected_version: Option<u64>,
    ) -> Result<Expense, EngineError> {
        if let Some(account_id) = update.account_id {
            self.check_expense_account(account_id)?;
        }
        let ((), expense) = self
            .expenses
            .update(&id, expected_version, |expense| {
                ExpenseWorkflow::update(expense, update).map_err(EngineError::from)
            })
            .map_err(|e| missing(e, || ExpenseError::NotFound(id).into()))?;

        info!(expense_id = %id, amount = %expense.amount, "Expense updated");
        Ok(expense)
    }

    /// draft → submitted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside draft.
    pub fn submit_expense(&self, id: ExpenseId, expected_version: Option<u64>) -> Result<Expense, EngineError> {
        self.transition_expense(id, expected_version, |expense| {
            ExpenseWorkflow::submit(expense.status)
        })
    }

    /// submitted → approved, accruing the expense.
    ///
    /// Posts Dr expense account / Cr accrued expenses dated on the expense date.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside submitted, or a ledger error.
    pub fn approve_expense(
        &self,
        id: ExpenseId,
        approved_by: Option<UserId>,
        notes: Option<String>,
        expected_version: Option<u64>,
    ) -> Result<Expense, EngineError> {
        let accounts = self.posting_accounts()?;
        let ((), expense) = self
            .expenses
            .update(&id, expected_version, |expense| {
                let action = ExpenseWorkflow::approve(expense.status, approved_by, notes)?;
                let journal = ExpenseWorkflow::accrual_journal(expense, accounts.accrued_expenses);
                expense.accrual_journal = Some(self.ledger.post_journal(journal)?.id);
                action.apply(expense);
                Ok::<_, EngineError>(())
            })
            .map_err(|e| missing(e, || ExpenseError::NotFound(id).into()))?;

        info!(
            expense_id = %id,
            number = %expense.number,
            status = %expense.status,
            journal_id = ?expense.accrual_journal,
            "Expense approved"
        );
        Ok(expense)
    }

    /// submitted → rejected.
    ///
    /// # Errors
    ///
    /// Returns `RejectionReasonRequired` for a blank reason, then
    /// `InvalidTransition` outside submitted.
    pub fn reject_expense(
        &self,
        id: ExpenseId,
        reason: &str,
        expected_version: Option<u64>,
    ) -> Result<Expense, EngineError> {
        self.transition_expense(id, expected_version, |expense| {
            ExpenseWorkflow::reject(expense.status, reason)
        })
    }

    /// approved → paid, settling the accrual from a cash account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside approved, or a ledger error.
    pub fn pay_expense(
        &self,
        id: ExpenseId,
        cash_account: Option<AccountId>,
        date: NaiveDate,
        expected_version: Option<u64>,
    ) -> Result<Expense, EngineError> {
        let accounts = self.posting_accounts()?;
        let cash = cash_account.unwrap_or(accounts.default_cash);
        let ((), expense) = self
            .expenses
            .update(&id, expected_version, |expense| {
                let action = ExpenseWorkflow::pay(expense.status)?;
                let journal =
                    ExpenseWorkflow::payment_journal(expense, accounts.accrued_expenses, cash, date);
                expense.payment_journal = Some(self.ledger.post_journal(journal)?.id);
                action.apply(expense);
                Ok::<_, EngineError>(())
            })
            .map_err(|e| missing(e, || ExpenseError::NotFound(id).into()))?;

        info!(
            expense_id = %id,
            number = %expense.number,
            journal_id = ?expense.payment_journal,
            "Expense paid"
        );
        Ok(expense)
    }

    fn transition_expense(
        &self,
        id: ExpenseId,
        expected_version: Option<u64>,
        decide: impl FnOnce(&Expense) -> Result<ExpenseAction, ExpenseError>,
    ) -> Result<Expense, EngineError> {
        let ((), expense) = self
            .expenses
            .update(&id, expected_version, |expense| {
                let action = decide(expense)
                    .inspect_err(|e| warn!(expense_id = %id, error = %e, "Expense transition rejected"))?;
                action.apply(expense);
                Ok::<_, EngineError>(())
            })
            .map_err(|e| missing(e, || ExpenseError::NotFound(id).into()))?;

        info!(expense_id = %id, number = %expense.number, status = %expense.status, "Expense status changed");
        Ok(expense)
    }

    fn check_expense_account(&self, account_id: AccountId) -> Result<(), EngineError> {
        let account = self.ledger.account(account_id)?;
        if account.account_type != AccountType::Expense || !self.ledger.is_leaf(account_id)? {
            return Err(ExpenseError::NotExpenseAccount(account.code).into());
        }
        Ok(())
    }
}
