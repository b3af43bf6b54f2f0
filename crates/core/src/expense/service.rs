//! Expense approval workflow.
//!
//! Transitions are validated from the current status alone and returned as
//! an [`ExpenseAction`]; the engine applies the action together with the
//! matching ledger posting.

use chrono::{NaiveDate, Utc};
use finledger_shared::types::{AccountId, ExpenseId, UserId, within_limit};
use rust_decimal::Decimal;

use super::error::ExpenseError;
use super::types::{Expense, ExpenseAction, ExpenseStatus, ExpenseUpdate, NewExpense};
use crate::ledger::{JournalInput, JournalLineInput, SourceReference};

/// Stateless service for expense transitions.
pub struct ExpenseWorkflow;

impl ExpenseWorkflow {
    /// Builds a draft expense.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount or blank
    /// description.
    pub fn create(
        input: NewExpense,
        number: String,
        requested_by: Option<UserId>,
    ) -> Result<Expense, ExpenseError> {
        validate_amount(input.amount)?;
        if input.description.trim().is_empty() {
            return Err(ExpenseError::DescriptionRequired);
        }

        Ok(Expense {
            id: ExpenseId::new(),
            number,
            sequence: 0,
            category: input.category,
            description: input.description.trim().to_string(),
            amount: input.amount,
            expense_date: input.expense_date,
            account_id: input.account_id,
            department: input.department,
            project: input.project,
            status: ExpenseStatus::Draft,
            requested_by,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
            approval_notes: None,
            rejection_reason: None,
            paid_at: None,
            accrual_journal: None,
            payment_journal: None,
            version: 0,
        })
    }

    /// Applies edits to a draft expense.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` outside draft, or a validation error.
    pub fn update(expense: &mut Expense, update: ExpenseUpdate) -> Result<(), ExpenseError> {
        if expense.status != ExpenseStatus::Draft {
            return Err(ExpenseError::NotEditable(expense.status));
        }
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
            expense.amount = amount;
        }
        if let Some(description) = update.description {
            if description.trim().is_empty() {
                return Err(ExpenseError::DescriptionRequired);
            }
            expense.description = description.trim().to_string();
        }
        if let Some(account_id) = update.account_id {
            expense.account_id = account_id;
        }
        if let Some(category) = update.category {
            expense.category = category;
        }
        if let Some(expense_date) = update.expense_date {
            expense.expense_date = expense_date;
        }
        Ok(())
    }

    /// Submit a draft expense for approval.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if not in draft.
    pub fn submit(current_status: ExpenseStatus) -> Result<ExpenseAction, ExpenseError> {
        match current_status {
            ExpenseStatus::Draft => Ok(ExpenseAction::Submit {
                new_status: ExpenseStatus::Submitted,
                submitted_at: Utc::now(),
            }),
            _ => Err(ExpenseError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Submitted,
            }),
        }
    }

    /// Approve a submitted expense.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if not submitted.
    pub fn approve(
        current_status: ExpenseStatus,
        approved_by: Option<UserId>,
        approval_notes: Option<String>,
    ) -> Result<ExpenseAction, ExpenseError> {
        match current_status {
            ExpenseStatus::Submitted => Ok(ExpenseAction::Approve {
                new_status: ExpenseStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
                approval_notes,
            }),
            _ => Err(ExpenseError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Approved,
            }),
        }
    }

    /// Reject a submitted expense. The reason is checked first.
    ///
    /// # Errors
    ///
    /// Returns `RejectionReasonRequired` for a blank reason and
    /// `InvalidTransition` if not submitted.
    pub fn reject(
        current_status: ExpenseStatus,
        rejection_reason: &str,
    ) -> Result<ExpenseAction, ExpenseError> {
        let rejection_reason = rejection_reason.trim();
        if rejection_reason.is_empty() {
            return Err(ExpenseError::RejectionReasonRequired);
        }

        match current_status {
            ExpenseStatus::Submitted => Ok(ExpenseAction::Reject {
                new_status: ExpenseStatus::Rejected,
                rejection_reason: rejection_reason.to_string(),
            }),
            _ => Err(ExpenseError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Rejected,
            }),
        }
    }

    /// Settle an approved expense.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if not approved.
    pub fn pay(current_status: ExpenseStatus) -> Result<ExpenseAction, ExpenseError> {
        match current_status {
            ExpenseStatus::Approved => Ok(ExpenseAction::Pay {
                new_status: ExpenseStatus::Paid,
                paid_at: Utc::now(),
            }),
            _ => Err(ExpenseError::InvalidTransition {
                from: current_status,
                to: ExpenseStatus::Paid,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Draft → Submitted (submit)
    /// - Submitted → Approved (approve)
    /// - Submitted → Rejected (reject)
    /// - Approved → Paid (pay)
    #[must_use]
    pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (ExpenseStatus::Draft, ExpenseStatus::Submitted)
                | (
                    ExpenseStatus::Submitted,
                    ExpenseStatus::Approved | ExpenseStatus::Rejected
                )
                | (ExpenseStatus::Approved, ExpenseStatus::Paid)
        )
    }

    /// Accrual on approval: Dr expense account / Cr accrued expenses.
    #[must_use]
    pub fn accrual_journal(expense: &Expense, accrued_expenses: AccountId) -> JournalInput {
        JournalInput {
            date: expense.expense_date,
            description: format!("Expense {} - {}", expense.number, expense.description),
            reference: Some(SourceReference::Expense(expense.id)),
            lines: vec![
                JournalLineInput::debit(expense.account_id, expense.amount),
                JournalLineInput::credit(accrued_expenses, expense.amount),
            ],
        }
    }

    /// Settlement: Dr accrued expenses / Cr cash.
    #[must_use]
    pub fn payment_journal(
        expense: &Expense,
        accrued_expenses: AccountId,
        cash_account: AccountId,
        date: NaiveDate,
    ) -> JournalInput {
        JournalInput {
            date,
            description: format!("Payment of expense {}", expense.number),
            reference: Some(SourceReference::Expense(expense.id)),
            lines: vec![
                JournalLineInput::debit(accrued_expenses, expense.amount),
                JournalLineInput::credit(cash_account, expense.amount),
            ],
        }
    }
}

fn validate_amount(amount: Decimal) -> Result<(), ExpenseError> {
    if amount <= Decimal::ZERO {
        return Err(ExpenseError::NonPositiveAmount(amount));
    }
    if !within_limit(amount) {
        return Err(ExpenseError::AmountOutOfRange(amount));
    }
    Ok(())
}
