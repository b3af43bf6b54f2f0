//! End-to-end flows through the finance engine.
//!
//! Each test builds a fresh engine over the default chart and drives
//! documents through their lifecycles, checking the ledger and reports
//! the postings produce.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finledger_core::budget::{BudgetLine, BudgetStatus, NewBudget};
use finledger_core::expense::{ExpenseCategory, ExpenseError, ExpenseStatus, NewExpense};
use finledger_core::invoice::{
    InvoiceError, InvoiceLineInput, InvoiceStatus, InvoiceType, NewInvoice,
};
use finledger_core::ledger::{EntryType, PostingInput};
use finledger_core::payment::{NewPayment, PaymentMethod, PaymentStatus, PaymentType};
use finledger_core::tax::{TaxCalculation, TaxFiling, TaxStatus, TaxType};
use finledger_core::{EngineConfig, EngineError, ErrorKind, FinanceEngine};
use finledger_shared::types::{AccountId, MAX_AMOUNT};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn engine() -> FinanceEngine {
    FinanceEngine::new(EngineConfig::default()).expect("engine should start")
}

fn account(engine: &FinanceEngine, code: &str) -> AccountId {
    engine.ledger().account_by_code(code).unwrap().id
}

fn post(engine: &FinanceEngine, debit: &str, credit: &str, amount: Decimal, on: NaiveDate) {
    engine
        .post_transaction(PostingInput {
            account_id: account(engine, debit),
            entry_type: EntryType::Debit,
            amount,
            date: on,
            description: format!("{debit} / {credit}"),
            reference: None,
            contra_account_id: account(engine, credit),
        })
        .unwrap();
}

fn two_line_invoice() -> NewInvoice {
    NewInvoice {
        invoice_type: InvoiceType::Sales,
        counterparty: "PT Maju Jaya".into(),
        issue_date: date(2026, 3, 1),
        due_date: date(2026, 3, 31),
        lines: vec![
            InvoiceLineInput {
                description: "Consulting hours".into(),
                quantity: dec!(10),
                unit_price: dec!(100000),
                discount_percent: Decimal::ZERO,
                tax_percent: dec!(10),
                account_id: None,
            },
            InvoiceLineInput {
                description: "Setup package".into(),
                quantity: dec!(1),
                unit_price: dec!(500000),
                discount_percent: dec!(5),
                tax_percent: Decimal::ZERO,
                account_id: None,
            },
        ],
        discount_amount: Decimal::ZERO,
        notes: None,
    }
}

fn receipt_for(invoice_id: finledger_shared::types::InvoiceId, amount: Decimal) -> NewPayment {
    NewPayment {
        payment_type: PaymentType::Receipt,
        amount,
        method: PaymentMethod::BankTransfer,
        payment_date: date(2026, 3, 20),
        invoice_id: Some(invoice_id),
        cash_account: None,
        counter_account: None,
        reference: None,
        notes: None,
    }
}

// ============================================================================
// Invoices and payments
// ============================================================================

#[test]
fn test_invoice_paid_in_full() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();

    assert_eq!(invoice.number, "INV-2026-0001");
    assert_eq!(invoice.subtotal, dec!(1475000));
    assert_eq!(invoice.tax_amount, dec!(100000));
    assert_eq!(invoice.total_amount, dec!(1575000));
    assert_eq!(invoice.outstanding_amount, dec!(1575000));

    let invoice = engine.send_invoice(invoice.id, Some(invoice.version)).unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Sent);
    let receivable = account(&engine, "1130");
    assert_eq!(
        engine.account_balance(receivable, None).unwrap().balance,
        dec!(1575000)
    );

    let payment = engine
        .create_payment(receipt_for(invoice.id, dec!(1575000)), None)
        .unwrap();
    assert_eq!(payment.number, "RCV-0001");
    let payment = engine.confirm_payment(payment.id, None, None).unwrap();
    assert_eq!(payment.status, PaymentStatus::Confirmed);
    assert!(payment.journal_id.is_some());

    let invoice = engine.invoice(invoice.id).unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.paid_amount, dec!(1575000));
    assert_eq!(invoice.outstanding_amount, Decimal::ZERO);
    assert_eq!(invoice.payments, vec![payment.id]);

    assert_eq!(
        engine.account_balance(receivable, None).unwrap().balance,
        Decimal::ZERO
    );
    assert_eq!(
        engine
            .account_balance(account(&engine, "1120"), None)
            .unwrap()
            .balance,
        dec!(1575000)
    );
}

#[test]
fn test_partial_payment_then_overpayment_rejected() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    engine.send_invoice(invoice.id, None).unwrap();

    let first = engine
        .create_payment(receipt_for(invoice.id, dec!(575000)), None)
        .unwrap();
    engine.confirm_payment(first.id, None, None).unwrap();
    let view = engine.invoice_view(invoice.id, date(2026, 3, 21)).unwrap();
    assert_eq!(view.invoice.status, InvoiceStatus::Partial);
    assert_eq!(view.invoice.outstanding_amount, dec!(1000000));

    let second = engine
        .create_payment(receipt_for(invoice.id, dec!(1000001)), None)
        .unwrap();
    let err = engine.confirm_payment(second.id, None, None).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Invoice(InvoiceError::Overpayment { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Nothing moved on failure.
    assert_eq!(engine.payment(second.id).unwrap().status, PaymentStatus::Pending);
    assert_eq!(
        engine.invoice(invoice.id).unwrap().outstanding_amount,
        dec!(1000000)
    );
}

#[test]
fn test_draft_invoice_not_payable() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    let payment = engine
        .create_payment(receipt_for(invoice.id, dec!(1000)), None)
        .unwrap();

    let err = engine.confirm_payment(payment.id, None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(engine.ledger().high_water_mark(), 0);
}

#[test]
fn test_cancel_reverses_issuance() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    let invoice = engine.send_invoice(invoice.id, None).unwrap();
    let issue_journal = invoice.issue_journal.unwrap();

    let err = engine
        .cancel_invoice(invoice.id, "  ", date(2026, 3, 5), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let invoice = engine
        .cancel_invoice(invoice.id, "Duplicate order", date(2026, 3, 5), None)
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Cancelled);
    assert_eq!(invoice.cancellation_reason.as_deref(), Some("Duplicate order"));

    let reversal = engine.journal(invoice.cancel_journal.unwrap()).unwrap();
    assert!(reversal.is_reversal());
    assert_ne!(reversal.id, issue_journal);

    for code in ["1130", "4100", "2130"] {
        assert_eq!(
            engine
                .account_balance(account(&engine, code), None)
                .unwrap()
                .balance,
            Decimal::ZERO,
            "account {code} should net to zero"
        );
    }

    let err = engine
        .cancel_invoice(invoice.id, "again", date(2026, 3, 6), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[test]
fn test_overdue_is_derived_on_read() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    engine.send_invoice(invoice.id, None).unwrap();

    let late = date(2026, 4, 10);
    let first = engine.invoice_view(invoice.id, late).unwrap();
    let second = engine.invoice_view(invoice.id, late).unwrap();
    assert_eq!(first.effective_status, InvoiceStatus::Overdue);
    assert_eq!(second.effective_status, InvoiceStatus::Overdue);
    assert_eq!(first.days_overdue, 10);
    assert_eq!(engine.invoice(invoice.id).unwrap().status, InvoiceStatus::Sent);
}

#[test]
fn test_stale_version_is_a_conflict() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    engine.send_invoice(invoice.id, Some(invoice.version)).unwrap();

    let err = engine
        .cancel_invoice(invoice.id, "late change", date(2026, 3, 2), Some(invoice.version))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);
    assert_eq!(engine.invoice(invoice.id).unwrap().status, InvoiceStatus::Sent);
}

// ============================================================================
// Failure atomicity
// ============================================================================

fn deactivate(engine: &FinanceEngine, code: &str) {
    engine
        .ledger()
        .set_account_active(account(engine, code), false)
        .unwrap();
}

#[test]
fn test_failed_issuance_leaves_invoice_draft() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    deactivate(&engine, "2130");
    let mark = engine.ledger().high_water_mark();

    let err = engine.send_invoice(invoice.id, Some(invoice.version)).unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");

    let stored = engine.invoice(invoice.id).unwrap();
    assert_eq!(stored.status, InvoiceStatus::Draft);
    assert_eq!(stored.version, invoice.version);
    assert!(stored.issue_journal.is_none());
    assert_eq!(engine.ledger().high_water_mark(), mark);

    // The same version still works once the account is back.
    engine
        .ledger()
        .set_account_active(account(&engine, "2130"), true)
        .unwrap();
    let sent = engine.send_invoice(invoice.id, Some(invoice.version)).unwrap();
    assert_eq!(sent.status, InvoiceStatus::Sent);
}

#[test]
fn test_failed_accrual_leaves_expense_submitted() {
    let engine = engine();
    let expense = engine.create_expense(travel_expense(&engine), None).unwrap();
    let expense = engine.submit_expense(expense.id, None).unwrap();
    deactivate(&engine, "2120");
    let mark = engine.ledger().high_water_mark();

    let err = engine
        .approve_expense(expense.id, None, Some("ok".into()), Some(expense.version))
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");

    let stored = engine.expense(expense.id).unwrap();
    assert_eq!(stored.status, ExpenseStatus::Submitted);
    assert_eq!(stored.version, expense.version);
    assert!(stored.accrual_journal.is_none());
    assert!(stored.approved_by.is_none());
    assert_eq!(engine.ledger().high_water_mark(), mark);
}

#[test]
fn test_failed_receipt_posting_leaves_payment_and_invoice_untouched() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    let invoice = engine.send_invoice(invoice.id, None).unwrap();
    let payment = engine
        .create_payment(receipt_for(invoice.id, dec!(575000)), None)
        .unwrap();
    deactivate(&engine, "1130");
    let mark = engine.ledger().high_water_mark();

    let err = engine
        .confirm_payment(payment.id, None, Some(payment.version))
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");

    let stored = engine.payment(payment.id).unwrap();
    assert_eq!(stored.status, PaymentStatus::Pending);
    assert_eq!(stored.version, payment.version);
    assert!(stored.journal_id.is_none());

    let unpaid = engine.invoice(invoice.id).unwrap();
    assert_eq!(unpaid.status, InvoiceStatus::Sent);
    assert_eq!(unpaid.version, invoice.version);
    assert_eq!(unpaid.paid_amount, Decimal::ZERO);
    assert!(unpaid.payments.is_empty());
    assert_eq!(engine.ledger().high_water_mark(), mark);
}

// ============================================================================
// Amount limits
// ============================================================================

#[test]
fn test_oversized_invoice_line_is_rejected() {
    let engine = engine();
    let mut input = two_line_invoice();
    input.lines[0].quantity = dec!(1_000_000_000_000_000);
    input.lines[0].unit_price = dec!(1_000_000_000_000_000);

    let err = engine.create_invoice(input, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
    assert!(engine.list_invoices(date(2026, 3, 1)).unwrap().is_empty());
}

#[test]
fn test_oversized_posting_is_rejected() {
    let engine = engine();
    let err = engine
        .post_transaction(PostingInput {
            account_id: account(&engine, "1120"),
            entry_type: EntryType::Debit,
            amount: dec!(50_000_000_000_000_000_000_000_000_000),
            date: date(2026, 1, 2),
            description: "Typo".into(),
            reference: None,
            contra_account_id: account(&engine, "3100"),
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
    assert_eq!(engine.ledger().high_water_mark(), 0);
}

#[test]
fn test_balances_fold_past_single_leg_limit() {
    let engine = engine();
    post(&engine, "1120", "3100", MAX_AMOUNT, date(2026, 1, 2));
    post(&engine, "1120", "3100", MAX_AMOUNT, date(2026, 1, 3));

    let cash = engine
        .account_balance(account(&engine, "1120"), None)
        .unwrap();
    assert_eq!(cash.balance, MAX_AMOUNT * Decimal::TWO);
}

#[test]
fn test_oversized_payment_and_expense_are_rejected() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    let too_much = MAX_AMOUNT + Decimal::ONE;

    let err = engine
        .create_payment(receipt_for(invoice.id, too_much), None)
        .unwrap_err();
    assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");

    let mut input = travel_expense(&engine);
    input.amount = too_much;
    let err = engine.create_expense(input, None).unwrap_err();
    assert_eq!(err.error_code(), "AMOUNT_OUT_OF_RANGE");
    assert!(engine.list_payments().unwrap().is_empty());
}

// ============================================================================
// Expenses
// ============================================================================

fn travel_expense(engine: &FinanceEngine) -> NewExpense {
    NewExpense {
        category: ExpenseCategory::Travel,
        description: "Client visit Surabaya".into(),
        amount: dec!(2500000),
        expense_date: date(2026, 2, 10),
        account_id: account(engine, "6400"),
        department: Some("Sales".into()),
        project: None,
    }
}

#[test]
fn test_rejected_expense_cannot_be_approved() {
    let engine = engine();
    let expense = engine.create_expense(travel_expense(&engine), None).unwrap();
    engine.submit_expense(expense.id, None).unwrap();

    let expense = engine
        .reject_expense(expense.id, "missing receipt", None)
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Rejected);
    assert_eq!(expense.rejection_reason.as_deref(), Some("missing receipt"));

    let err = engine
        .approve_expense(expense.id, None, None, None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Expense(ExpenseError::InvalidTransition { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(engine.ledger().high_water_mark(), 0);
}

#[test]
fn test_expense_accrues_on_approval_and_settles_on_payment() {
    let engine = engine();
    post(&engine, "1120", "3100", dec!(10000000), date(2026, 1, 2));

    let expense = engine.create_expense(travel_expense(&engine), None).unwrap();
    assert_eq!(expense.number, "EXP-0001");
    engine.submit_expense(expense.id, None).unwrap();

    let expense = engine
        .approve_expense(expense.id, None, Some("ok".into()), None)
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Approved);
    assert!(expense.accrual_journal.is_some());

    let accrued = account(&engine, "2120");
    let travel = account(&engine, "6400");
    assert_eq!(engine.account_balance(travel, None).unwrap().balance, dec!(2500000));
    assert_eq!(engine.account_balance(accrued, None).unwrap().balance, dec!(2500000));

    let expense = engine
        .pay_expense(expense.id, None, date(2026, 2, 15), None)
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Paid);
    assert_eq!(engine.account_balance(accrued, None).unwrap().balance, Decimal::ZERO);
    assert_eq!(
        engine
            .account_balance(account(&engine, "1120"), None)
            .unwrap()
            .balance,
        dec!(7500000)
    );
}

#[test]
fn test_expense_must_target_expense_leaf() {
    let engine = engine();
    let mut input = travel_expense(&engine);
    input.account_id = account(&engine, "1120");

    let err = engine.create_expense(input, None).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Expense(ExpenseError::NotExpenseAccount(ref code)) if code == "1120"
    ));
    assert!(engine.list_expenses().unwrap().is_empty());
}

// ============================================================================
// Budgets
// ============================================================================

#[test]
fn test_over_budget_is_reported_not_enforced() {
    let engine = engine();
    let salaries = account(&engine, "6100");
    let budget = engine
        .create_budget(
            NewBudget {
                name: "Operations 2026".into(),
                fiscal_year: 2026,
                period_start: date(2026, 1, 1),
                period_end: date(2026, 12, 31),
                department: None,
                project: None,
                lines: vec![BudgetLine {
                    account_id: salaries,
                    allocated_amount: dec!(10000000),
                    committed_amount: Decimal::ZERO,
                    notes: None,
                }],
            },
            None,
        )
        .unwrap();
    engine.approve_budget(budget.id, None, None).unwrap();
    engine.activate_budget(budget.id, None).unwrap();

    post(&engine, "6100", "1120", dec!(6000000), date(2026, 2, 25));
    post(&engine, "6100", "1120", dec!(5000000), date(2026, 3, 25));
    // Outside the period.
    post(&engine, "6100", "1120", dec!(9000000), date(2025, 12, 25));

    let utilization = engine.budget_utilization(budget.id, date(2026, 6, 30)).unwrap();
    assert_eq!(utilization.total_spent, dec!(11000000));
    assert_eq!(utilization.utilization_percentage, dec!(110.00));
    assert_eq!(utilization.remaining, dec!(-1000000));
    assert_eq!(engine.budget(budget.id).unwrap().status, BudgetStatus::Active);
}

#[test]
fn test_closed_budget_ignores_later_postings() {
    let engine = engine();
    let budget = engine
        .create_budget(
            NewBudget {
                name: "Marketing Q1".into(),
                fiscal_year: 2026,
                period_start: date(2026, 1, 1),
                period_end: date(2026, 3, 31),
                department: Some("Marketing".into()),
                project: None,
                lines: vec![BudgetLine {
                    account_id: account(&engine, "6500"),
                    allocated_amount: dec!(4000000),
                    committed_amount: Decimal::ZERO,
                    notes: None,
                }],
            },
            None,
        )
        .unwrap();
    engine.approve_budget(budget.id, None, None).unwrap();
    engine.activate_budget(budget.id, None).unwrap();

    post(&engine, "6500", "1120", dec!(1000000), date(2026, 2, 1));
    engine.close_budget(budget.id, date(2026, 3, 15), None).unwrap();
    post(&engine, "6500", "1120", dec!(2000000), date(2026, 3, 20));

    let utilization = engine.budget_utilization(budget.id, date(2026, 3, 31)).unwrap();
    assert_eq!(utilization.total_spent, dec!(1000000));
    assert_eq!(utilization.utilization_percentage, dec!(25.00));

    let err = engine.activate_budget(budget.id, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[test]
fn test_budget_line_for_unknown_account() {
    let engine = engine();
    let err = engine
        .create_budget(
            NewBudget {
                name: "Ghost".into(),
                fiscal_year: 2026,
                period_start: date(2026, 1, 1),
                period_end: date(2026, 12, 31),
                department: None,
                project: None,
                lines: vec![BudgetLine {
                    account_id: AccountId::new(),
                    allocated_amount: dec!(1),
                    committed_amount: Decimal::ZERO,
                    notes: None,
                }],
            },
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_reports_after_mixed_activity() {
    let engine = engine();
    post(&engine, "1120", "3100", dec!(5000000), date(2026, 1, 2));

    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    engine.send_invoice(invoice.id, None).unwrap();
    let payment = engine
        .create_payment(receipt_for(invoice.id, dec!(1575000)), None)
        .unwrap();
    engine.confirm_payment(payment.id, None, None).unwrap();

    let expense = engine.create_expense(travel_expense(&engine), None).unwrap();
    engine.submit_expense(expense.id, None).unwrap();
    engine.approve_expense(expense.id, None, None, None).unwrap();

    let as_of = date(2026, 3, 31);
    let trial = engine.trial_balance(as_of).unwrap();
    assert!(trial.trial_balance.is_balanced);
    assert_eq!(trial.trial_balance.total_debit, trial.trial_balance.total_credit);

    let sheet = engine.balance_sheet(as_of).unwrap();
    assert!(sheet.is_balanced);
    assert_eq!(sheet.assets.total, sheet.liabilities.total + sheet.equity.total);
    assert_eq!(sheet.assets.total, dec!(6575000));

    let pl = engine.profit_and_loss(date(2026, 1, 1), as_of).unwrap();
    assert_eq!(pl.revenue.total, dec!(1475000));
    assert_eq!(pl.operating_expenses.total, dec!(2500000));
    assert_eq!(pl.net_profit, dec!(-1025000));
    assert_eq!(sheet.equity.current_year_profit, pl.net_profit);

    let cash = engine.cash_flow(date(2026, 1, 1), as_of).unwrap();
    assert_eq!(cash.opening_cash, Decimal::ZERO);
    assert_eq!(cash.operating.total, dec!(1575000));
    assert_eq!(cash.financing.total, dec!(5000000));
    assert_eq!(cash.closing_cash, dec!(6575000));

    let dashboard = engine.dashboard(as_of).unwrap();
    assert_eq!(dashboard.receivables.outstanding, Decimal::ZERO);
    assert_eq!(dashboard.expenses.approved_unpaid_count, 1);
    assert_eq!(dashboard.cash.balance, dec!(6575000));
    assert_eq!(dashboard.cash.receipts_this_month, dec!(1575000));
}

#[test]
fn test_inverted_report_range() {
    let engine = engine();
    let err = engine
        .profit_and_loss(date(2026, 2, 1), date(2026, 1, 1))
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_DATE_RANGE");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_unlinked_payment_posts_to_counter_account() {
    let engine = engine();
    let rent = account(&engine, "6200");
    let payment = engine
        .create_payment(
            NewPayment {
                payment_type: PaymentType::Payment,
                amount: dec!(3000000),
                method: PaymentMethod::BankTransfer,
                payment_date: date(2026, 1, 5),
                invoice_id: None,
                cash_account: None,
                counter_account: Some(rent),
                reference: Some("JAN-RENT".into()),
                notes: None,
            },
            None,
        )
        .unwrap();
    assert_eq!(payment.number, "PAY-0001");
    engine.confirm_payment(payment.id, None, None).unwrap();

    assert_eq!(engine.account_balance(rent, None).unwrap().balance, dec!(3000000));
    assert_eq!(
        engine
            .account_balance(account(&engine, "1120"), None)
            .unwrap()
            .balance,
        dec!(-3000000)
    );

    let err = engine.cancel_payment(payment.id, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
}

#[test]
fn test_expense_breakdown_and_monthly_trend() {
    let engine = engine();
    let invoice = engine.create_invoice(two_line_invoice(), None).unwrap();
    engine.send_invoice(invoice.id, None).unwrap();

    let travel = engine.create_expense(travel_expense(&engine), None).unwrap();
    engine.submit_expense(travel.id, None).unwrap();
    engine.approve_expense(travel.id, None, None, None).unwrap();

    let mut training = travel_expense(&engine);
    training.category = ExpenseCategory::Training;
    training.account_id = account(&engine, "6700");
    training.amount = dec!(500000);
    training.expense_date = date(2026, 3, 3);
    let training = engine.create_expense(training, None).unwrap();
    engine.submit_expense(training.id, None).unwrap();
    engine.approve_expense(training.id, None, None, None).unwrap();

    // Submitted only.
    let pending = engine.create_expense(travel_expense(&engine), None).unwrap();
    engine.submit_expense(pending.id, None).unwrap();

    let breakdown = engine
        .expense_by_category(date(2026, 1, 1), date(2026, 3, 31))
        .unwrap();
    assert_eq!(breakdown.total, dec!(3000000));
    let categories = breakdown
        .categories
        .iter()
        .map(|c| (c.category, c.amount, c.percentage))
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        vec![
            (ExpenseCategory::Travel, dec!(2500000), dec!(83.33)),
            (ExpenseCategory::Training, dec!(500000), dec!(16.67)),
        ]
    );

    let trend = engine
        .revenue_expense_trend(date(2026, 2, 1), date(2026, 3, 31))
        .unwrap();
    let months = trend
        .months
        .iter()
        .map(|m| (m.month.as_str(), m.revenue, m.expense, m.profit))
        .collect::<Vec<_>>();
    assert_eq!(
        months,
        vec![
            ("2026-02", Decimal::ZERO, dec!(2500000), dec!(-2500000)),
            ("2026-03", dec!(1475000), dec!(500000), dec!(975000)),
        ]
    );
}

// ============================================================================
// Taxes
// ============================================================================

fn purchase_invoice() -> NewInvoice {
    NewInvoice {
        invoice_type: InvoiceType::Purchase,
        counterparty: "CV Sumber Makmur".into(),
        issue_date: date(2026, 3, 10),
        due_date: date(2026, 4, 10),
        lines: vec![InvoiceLineInput {
            description: "Raw materials".into(),
            quantity: dec!(3),
            unit_price: dec!(100000),
            discount_percent: Decimal::ZERO,
            tax_percent: dec!(10),
            account_id: None,
        }],
        discount_amount: Decimal::ZERO,
        notes: None,
    }
}

fn vat_for(year: i32, month: u32) -> TaxCalculation {
    TaxCalculation {
        tax_type: TaxType::Ppn,
        period_year: year,
        period_month: month,
        taxable_amount: None,
        tax_rate: None,
        notes: None,
    }
}

fn filing(on: NaiveDate) -> TaxFiling {
    TaxFiling {
        filing_date: on,
        reference_number: Some("BPE-0042".into()),
    }
}

#[test]
fn test_vat_calculated_from_ledger_and_remitted() {
    let engine = engine();
    post(&engine, "1120", "3100", dec!(5000000), date(2026, 1, 2));
    let sale = engine.create_invoice(two_line_invoice(), None).unwrap();
    engine.send_invoice(sale.id, None).unwrap();
    let purchase = engine.create_invoice(purchase_invoice(), None).unwrap();
    engine.send_invoice(purchase.id, None).unwrap();

    let record = engine.calculate_tax(vat_for(2026, 3), None).unwrap();
    assert_eq!(record.number, "TAX-2026-0001");
    assert_eq!(record.status, TaxStatus::Calculated);
    assert_eq!(record.figures.taxable_amount, dec!(100000));
    assert_eq!(record.figures.credit_amount, dec!(30000));
    assert_eq!(record.figures.tax_amount, dec!(70000));

    let err = engine.calculate_tax(vat_for(2026, 3), None).unwrap_err();
    assert_eq!(err.error_code(), "TAX_PERIOD_EXISTS");

    let err = engine
        .pay_tax(record.id, None, date(2026, 4, 15), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    let record = engine
        .file_tax(record.id, filing(date(2026, 4, 10)), Some(record.version))
        .unwrap();
    assert_eq!(record.status, TaxStatus::Filed);
    assert_eq!(record.reference_number.as_deref(), Some("BPE-0042"));

    let record = engine
        .pay_tax(record.id, None, date(2026, 4, 15), Some(record.version))
        .unwrap();
    assert_eq!(record.status, TaxStatus::Paid);
    assert!(record.payment_journal.is_some());

    for code in ["2130", "1140"] {
        assert_eq!(
            engine
                .account_balance(account(&engine, code), None)
                .unwrap()
                .balance,
            Decimal::ZERO,
            "account {code} should be cleared"
        );
    }
    assert_eq!(
        engine
            .account_balance(account(&engine, "1120"), None)
            .unwrap()
            .balance,
        dec!(4930000)
    );

    // The April remittance is not April VAT activity.
    let april = engine.calculate_tax(vat_for(2026, 4), None).unwrap();
    assert_eq!(april.figures.tax_amount, Decimal::ZERO);
    let april = engine
        .file_tax(april.id, filing(date(2026, 5, 10)), None)
        .unwrap();
    let err = engine
        .pay_tax(april.id, None, date(2026, 5, 15), None)
        .unwrap_err();
    assert_eq!(err.error_code(), "NOTHING_TO_PAY");
}

#[test]
fn test_withholding_tax_settles_liability() {
    let engine = engine();
    post(&engine, "1120", "3100", dec!(20000000), date(2026, 1, 2));
    // Payroll with employee tax withheld.
    post(&engine, "6100", "2140", dec!(750000), date(2026, 3, 25));

    let record = engine
        .calculate_tax(
            TaxCalculation {
                tax_type: TaxType::Pph21,
                period_year: 2026,
                period_month: 3,
                taxable_amount: Some(dec!(15000000)),
                tax_rate: Some(dec!(5)),
                notes: Some("March payroll".into()),
            },
            None,
        )
        .unwrap();
    assert_eq!(record.figures.tax_amount, dec!(750000));

    engine
        .file_tax(record.id, filing(date(2026, 4, 10)), None)
        .unwrap();

    deactivate(&engine, "2140");
    let filed = engine.tax(record.id).unwrap();
    let mark = engine.ledger().high_water_mark();
    let err = engine
        .pay_tax(record.id, None, date(2026, 4, 15), Some(filed.version))
        .unwrap_err();
    assert_eq!(err.error_code(), "ACCOUNT_INACTIVE");
    let unchanged = engine.tax(record.id).unwrap();
    assert_eq!(unchanged.status, TaxStatus::Filed);
    assert_eq!(unchanged.version, filed.version);
    assert_eq!(engine.ledger().high_water_mark(), mark);

    engine
        .ledger()
        .set_account_active(account(&engine, "2140"), true)
        .unwrap();
    engine
        .pay_tax(record.id, None, date(2026, 4, 15), Some(filed.version))
        .unwrap();
    assert_eq!(
        engine
            .account_balance(account(&engine, "2140"), None)
            .unwrap()
            .balance,
        Decimal::ZERO
    );
}

#[test]
fn test_tax_requests_are_validated() {
    let engine = engine();
    let err = engine.calculate_tax(vat_for(2026, 13), None).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_TAX_PERIOD");

    let mut instalment = vat_for(2026, 1);
    instalment.tax_type = TaxType::Pph25;
    let err = engine.calculate_tax(instalment, None).unwrap_err();
    assert_eq!(err.error_code(), "TAX_FIGURES_REQUIRED");
    assert!(engine.list_taxes().unwrap().is_empty());
}
