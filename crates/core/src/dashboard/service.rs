//! Dashboard aggregation.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::types::{BudgetPosition, CashPosition, DashboardMetrics, ExpensePosition, InvoicePosition};
use crate::budget::BudgetUtilization;
use crate::budget::service::percent;
use crate::expense::{Expense, ExpenseStatus};
use crate::invoice::{Invoice, InvoiceService, InvoiceStatus, InvoiceType};
use crate::ledger::LedgerSnapshot;
use crate::payment::{Payment, PaymentStatus, PaymentType};
use crate::reports::ReportService;

/// Builds dashboard metrics from aggregate lists and a ledger snapshot.
pub struct DashboardService;

impl DashboardService {
    /// Folds every figure as of `as_of`. `budgets` holds the utilization of
    /// each active budget.
    #[must_use]
    pub fn build(
        as_of: NaiveDate,
        snapshot: &LedgerSnapshot,
        invoices: &[Invoice],
        payments: &[Payment],
        expenses: &[Expense],
        budgets: &[BudgetUtilization],
    ) -> DashboardMetrics {
        DashboardMetrics {
            as_of,
            currency: snapshot.currency(),
            receivables: invoice_position(invoices, InvoiceType::Sales, as_of),
            payables: invoice_position(invoices, InvoiceType::Purchase, as_of),
            expenses: expense_position(expenses),
            budgets: budget_position(budgets),
            cash: CashPosition {
                balance: ReportService::cash_position(snapshot, as_of),
                receipts_this_month: confirmed_in_month(payments, PaymentType::Receipt, as_of),
                payments_this_month: confirmed_in_month(payments, PaymentType::Payment, as_of),
            },
        }
    }
}

fn invoice_position(invoices: &[Invoice], invoice_type: InvoiceType, as_of: NaiveDate) -> InvoicePosition {
    let mut position = InvoicePosition::default();
    for invoice in invoices
        .iter()
        .filter(|i| i.invoice_type == invoice_type && i.status.is_open())
    {
        position.open_count += 1;
        position.outstanding += invoice.outstanding_amount;
        if InvoiceService::derive_overdue_status(invoice, as_of) == InvoiceStatus::Overdue {
            position.overdue_count += 1;
            position.overdue_amount += invoice.outstanding_amount;
        }
    }
    position
}

fn expense_position(expenses: &[Expense]) -> ExpensePosition {
    let mut position = ExpensePosition::default();
    for expense in expenses {
        match expense.status {
            ExpenseStatus::Submitted => {
                position.pending_approval_count += 1;
                position.pending_approval_amount += expense.amount;
            }
            ExpenseStatus::Approved => {
                position.approved_unpaid_count += 1;
                position.approved_unpaid_amount += expense.amount;
            }
            _ => {}
        }
    }
    position
}

fn budget_position(budgets: &[BudgetUtilization]) -> BudgetPosition {
    let total_allocated: Decimal = budgets.iter().map(|b| b.total_allocated).sum();
    let total_spent: Decimal = budgets.iter().map(|b| b.total_spent).sum();
    BudgetPosition {
        active_count: budgets.len(),
        total_allocated,
        total_spent,
        utilization_percent: percent(total_spent, total_allocated),
    }
}

fn confirmed_in_month(payments: &[Payment], payment_type: PaymentType, as_of: NaiveDate) -> Decimal {
    payments
        .iter()
        .filter(|p| p.payment_type == payment_type && p.status == PaymentStatus::Confirmed)
        .filter(|p| {
            p.payment_date.year() == as_of.year()
                && p.payment_date.month() == as_of.month()
                && p.payment_date <= as_of
        })
        .map(|p| p.amount)
        .sum()
}
