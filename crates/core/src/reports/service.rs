//! Report generation service.
//!
//! Every report is a pure function of a [`LedgerSnapshot`], so a report run
//! never observes postings made after the snapshot was taken.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use finledger_shared::types::{AccountId, Currency};
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    AssetsSection, BalanceSheetReport, CashFlowReport, CategoryAmount, EquitySection,
    ExpenseByCategoryReport, LiabilitiesSection, MonthlyTrend, ProfitLossReport, ReportLine,
    ReportSection, RevenueExpenseTrendReport, TrialBalanceReport,
};
use crate::budget::service::percent;
use crate::expense::{Expense, ExpenseCategory, ExpenseStatus};
use crate::fiscal::FiscalCalendar;
use crate::ledger::{
    Account, AccountSubtype, AccountType, CashFlowActivity, DebitCredit, LedgerSnapshot, LegFilter,
};

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Trial balance as of a date.
    #[must_use]
    pub fn trial_balance(snapshot: &LedgerSnapshot, as_of: NaiveDate) -> TrialBalanceReport {
        TrialBalanceReport {
            report_type: "trial_balance".to_string(),
            currency: snapshot.currency(),
            trial_balance: snapshot.trial_balance(as_of),
        }
    }

    /// Profit and loss over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn profit_and_loss(
        snapshot: &LedgerSnapshot,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProfitLossReport, ReportError> {
        check_range(start, end)?;
        let totals = snapshot.leaf_totals(LegFilter::between(start, end));

        let mut revenue = ReportSection::default();
        let mut cost_of_goods_sold = ReportSection::default();
        let mut operating_expenses = ReportSection::default();
        let mut other_income = ReportSection::default();
        let mut other_expenses = ReportSection::default();
        let mut tax = ReportSection::default();

        for (account, line) in lines(snapshot, &totals) {
            match (account.account_type, account.subtype) {
                (AccountType::Revenue, Some(AccountSubtype::OtherIncome)) => other_income.push(line),
                (AccountType::Revenue, _) => revenue.push(line),
                (AccountType::Expense, Some(AccountSubtype::CostOfGoodsSold)) => {
                    cost_of_goods_sold.push(line);
                }
                (AccountType::Expense, Some(AccountSubtype::OtherExpense)) => {
                    other_expenses.push(line);
                }
                (AccountType::Expense, Some(AccountSubtype::TaxExpense)) => tax.push(line),
                (AccountType::Expense, _) => operating_expenses.push(line),
                _ => {}
            }
        }

        let gross_profit = revenue.total - cost_of_goods_sold.total;
        let operating_profit = gross_profit - operating_expenses.total;
        let profit_before_tax = operating_profit + other_income.total - other_expenses.total;
        let net_profit = profit_before_tax - tax.total;

        Ok(ProfitLossReport {
            report_type: "profit_and_loss".to_string(),
            period_start: start,
            period_end: end,
            currency: snapshot.currency(),
            gross_margin: percent(gross_profit, revenue.total),
            operating_margin: percent(operating_profit, revenue.total),
            net_margin: percent(net_profit, revenue.total),
            revenue,
            cost_of_goods_sold,
            gross_profit,
            operating_expenses,
            operating_profit,
            other_income,
            other_expenses,
            profit_before_tax,
            tax,
            net_profit,
        })
    }

    /// Balance sheet as of a date.
    ///
    /// Income statement accounts are folded into equity: profit dated before
    /// the fiscal-year start becomes retained earnings, the rest is
    /// current-year profit. Assets therefore equal liabilities plus equity
    /// exactly for any snapshot.
    #[must_use]
    pub fn balance_sheet(
        snapshot: &LedgerSnapshot,
        as_of: NaiveDate,
        calendar: FiscalCalendar,
    ) -> BalanceSheetReport {
        let fiscal_year_start = calendar.year_start(as_of);
        let totals = snapshot.leaf_totals(LegFilter::as_of(as_of));

        let mut assets = AssetsSection::default();
        let mut liabilities = LiabilitiesSection::default();
        let mut equity = EquitySection::default();
        let mut retained_accounts = Decimal::ZERO;

        for (account, line) in lines(snapshot, &totals) {
            match (account.account_type, account.subtype) {
                (
                    AccountType::Asset,
                    Some(AccountSubtype::FixedAsset | AccountSubtype::AccumulatedDepreciation),
                ) => assets.fixed_assets.push(line),
                (AccountType::Asset, _) => assets.current_assets.push(line),
                (AccountType::Liability, Some(AccountSubtype::LongTermLiability)) => {
                    liabilities.long_term_liabilities.push(line);
                }
                (AccountType::Liability, _) => liabilities.current_liabilities.push(line),
                (AccountType::Equity, Some(AccountSubtype::RetainedEarnings)) => {
                    retained_accounts += line.amount;
                }
                (AccountType::Equity, _) => equity.capital.push(line),
                _ => {}
            }
        }

        let prior_profit = profit(snapshot, LegFilter::before(fiscal_year_start));
        let current_year_profit = profit(snapshot, LegFilter::between(fiscal_year_start, as_of));

        assets.total = assets.current_assets.total + assets.fixed_assets.total;
        liabilities.total =
            liabilities.current_liabilities.total + liabilities.long_term_liabilities.total;
        equity.retained_earnings = retained_accounts + prior_profit;
        equity.current_year_profit = current_year_profit;
        equity.total = equity.capital.total + equity.retained_earnings + equity.current_year_profit;

        let liabilities_and_equity = liabilities.total + equity.total;
        BalanceSheetReport {
            report_type: "balance_sheet".to_string(),
            as_of,
            fiscal_year_start,
            currency: snapshot.currency(),
            is_balanced: assets.total == liabilities_and_equity,
            assets,
            liabilities,
            equity,
            liabilities_and_equity,
        }
    }

    /// Cash flow over `[start, end]` by the direct method.
    ///
    /// For each journal touching a cash account, its non-cash legs are
    /// attributed to the activity of their account. A credit on a non-cash
    /// leg is a cash inflow.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn cash_flow(
        snapshot: &LedgerSnapshot,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<CashFlowReport, ReportError> {
        check_range(start, end)?;
        let chart = snapshot.chart();
        let is_cash = |id: AccountId| chart.get(id).is_some_and(Account::is_cash);

        let mut flows: BTreeMap<String, (CashFlowActivity, ReportLine)> = BTreeMap::new();
        for journal in snapshot.journals(LegFilter::between(start, end)) {
            if !journal.transactions.iter().any(|leg| is_cash(leg.account_id)) {
                continue;
            }
            for leg in journal.transactions.iter().filter(|leg| !is_cash(leg.account_id)) {
                let Some(account) = chart.get(leg.account_id) else {
                    continue;
                };
                let (_, line) = flows.entry(account.code.clone()).or_insert_with(|| {
                    (account.cash_flow_activity(), report_line(account, Decimal::ZERO))
                });
                line.amount -= leg.signed_amount();
            }
        }

        let mut operating = ReportSection::default();
        let mut investing = ReportSection::default();
        let mut financing = ReportSection::default();
        for (activity, line) in flows.into_values() {
            match activity {
                CashFlowActivity::Operating => operating.push(line),
                CashFlowActivity::Investing => investing.push(line),
                CashFlowActivity::Financing => financing.push(line),
            }
        }

        let opening_cash = cash_balance(snapshot, LegFilter::before(start));
        let net_cash_flow = operating.total + investing.total + financing.total;

        Ok(CashFlowReport {
            report_type: "cash_flow".to_string(),
            period_start: start,
            period_end: end,
            currency: snapshot.currency(),
            opening_cash,
            operating,
            investing,
            financing,
            net_cash_flow,
            closing_cash: opening_cash + net_cash_flow,
        })
    }

    /// Approved and paid expenses dated within `[start, end]`, by category.
    ///
    /// Categories without spend are left out; the rest are ordered by amount,
    /// largest first, ties in category order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn expense_by_category(
        expenses: &[Expense],
        start: NaiveDate,
        end: NaiveDate,
        currency: Currency,
    ) -> Result<ExpenseByCategoryReport, ReportError> {
        check_range(start, end)?;

        let mut by_category: BTreeMap<ExpenseCategory, (usize, Decimal)> = BTreeMap::new();
        for expense in expenses.iter().filter(|e| {
            matches!(e.status, ExpenseStatus::Approved | ExpenseStatus::Paid)
                && (start..=end).contains(&e.expense_date)
        }) {
            let (count, amount) = by_category.entry(expense.category).or_default();
            *count += 1;
            *amount += expense.amount;
        }

        let total: Decimal = by_category.values().map(|(_, amount)| *amount).sum();
        let mut categories = by_category
            .into_iter()
            .map(|(category, (count, amount))| CategoryAmount {
                category,
                count,
                amount,
                percentage: percent(amount, total),
            })
            .collect::<Vec<_>>();
        categories.sort_by(|a, b| b.amount.cmp(&a.amount));

        Ok(ExpenseByCategoryReport {
            report_type: "expense_by_category".to_string(),
            period_start: start,
            period_end: end,
            currency,
            total,
            categories,
        })
    }

    /// Revenue, expense and profit for each calendar month of `[start, end]`.
    ///
    /// Months without postings are reported with zeros. The first and last
    /// month only count legs inside the range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`, or `RangeTooLong` past
    /// [`MAX_TREND_MONTHS`] months.
    pub fn revenue_expense_trend(
        snapshot: &LedgerSnapshot,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RevenueExpenseTrendReport, ReportError> {
        check_range(start, end)?;
        let chart = snapshot.chart();

        let first = month_index(start);
        let span = usize::try_from(month_index(end) - first + 1).unwrap_or(usize::MAX);
        if span > MAX_TREND_MONTHS {
            return Err(ReportError::RangeTooLong {
                months: span,
                max: MAX_TREND_MONTHS,
            });
        }

        let mut buckets = vec![(Decimal::ZERO, Decimal::ZERO); span];
        let filter = LegFilter::between(start, end);
        for leg in snapshot.transactions().iter().filter(|leg| filter.matches(leg)) {
            let Some(account) = chart.get(leg.account_id) else {
                continue;
            };
            let Some(bucket) = usize::try_from(month_index(leg.date) - first)
                .ok()
                .and_then(|offset| buckets.get_mut(offset))
            else {
                continue;
            };
            let (revenue, expense) = bucket;
            match account.account_type {
                AccountType::Revenue => *revenue -= leg.signed_amount(),
                AccountType::Expense => *expense += leg.signed_amount(),
                _ => {}
            }
        }

        let months = buckets
            .into_iter()
            .zip(first..)
            .map(|((revenue, expense), index)| MonthlyTrend {
                month: format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1),
                revenue,
                expense,
                profit: revenue - expense,
            })
            .collect();

        Ok(RevenueExpenseTrendReport {
            report_type: "revenue_expense_trend".to_string(),
            period_start: start,
            period_end: end,
            currency: snapshot.currency(),
            months,
        })
    }

    /// Total cash held as of a date.
    #[must_use]
    pub fn cash_position(snapshot: &LedgerSnapshot, as_of: NaiveDate) -> Decimal {
        cash_balance(snapshot, LegFilter::as_of(as_of))
    }
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ReportError> {
    if start > end {
        return Err(ReportError::InvalidDateRange { start, end });
    }
    Ok(())
}

/// Longest range the monthly trend covers.
pub const MAX_TREND_MONTHS: usize = 240;

/// Months since January of year 0.
fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn report_line(account: &Account, amount: Decimal) -> ReportLine {
    ReportLine {
        account_id: account.id,
        code: account.code.clone(),
        name: account.name.clone(),
        account_type: account.account_type,
        subtype: account.subtype,
        amount,
    }
}

/// Leaf accounts with activity and their normal-side amounts, in code order.
fn lines<'a>(
    snapshot: &'a LedgerSnapshot,
    totals: &'a HashMap<AccountId, DebitCredit>,
) -> impl Iterator<Item = (&'a Account, ReportLine)> + 'a {
    snapshot.chart().leaves().filter_map(move |account| {
        let amount = totals
            .get(&account.id)?
            .balance(account.account_type.normal_balance());
        Some((account, report_line(account, amount)))
    })
}

/// Revenue minus expenses over the filtered legs.
fn profit(snapshot: &LedgerSnapshot, filter: LegFilter) -> Decimal {
    let totals = snapshot.leaf_totals(filter);
    lines(snapshot, &totals)
        .map(|(account, line)| match account.account_type {
            AccountType::Revenue => line.amount,
            AccountType::Expense => -line.amount,
            _ => Decimal::ZERO,
        })
        .sum()
}

fn cash_balance(snapshot: &LedgerSnapshot, filter: LegFilter) -> Decimal {
    let totals = snapshot.leaf_totals(filter);
    lines(snapshot, &totals)
        .filter(|(account, _)| account.is_cash())
        .map(|(_, line)| line.amount)
        .sum()
}
