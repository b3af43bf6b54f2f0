//! Report data types.

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, Currency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expense::ExpenseCategory;
use crate::ledger::{AccountSubtype, AccountType, TrialBalance};

/// One account's figure inside a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Account subtype.
    pub subtype: Option<AccountSubtype>,
    /// Normal-side amount.
    pub amount: Decimal,
}

/// A report section: per-account lines and their total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section total.
    pub total: Decimal,
    /// Accounts in this section, in code order.
    pub accounts: Vec<ReportLine>,
}

impl ReportSection {
    /// Adds a line and its amount to the total.
    pub fn push(&mut self, line: ReportLine) {
        self.total += line.amount;
        self.accounts.push(line);
    }
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report type identifier.
    pub report_type: String,
    /// Currency.
    pub currency: Currency,
    /// The trial balance itself.
    #[serde(flatten)]
    pub trial_balance: TrialBalance,
}

/// Profit and loss statement for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitLossReport {
    /// Report type identifier.
    pub report_type: String,
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Currency.
    pub currency: Currency,
    /// Revenue from ordinary activities.
    pub revenue: ReportSection,
    /// Cost of goods sold.
    pub cost_of_goods_sold: ReportSection,
    /// revenue - COGS.
    pub gross_profit: Decimal,
    /// Operating expenses.
    pub operating_expenses: ReportSection,
    /// gross profit - operating expenses.
    pub operating_profit: Decimal,
    /// Income outside ordinary activities.
    pub other_income: ReportSection,
    /// Expenses outside ordinary activities.
    pub other_expenses: ReportSection,
    /// operating profit + other income - other expenses.
    pub profit_before_tax: Decimal,
    /// Income tax.
    pub tax: ReportSection,
    /// profit before tax - tax.
    pub net_profit: Decimal,
    /// Gross profit as % of revenue.
    pub gross_margin: Decimal,
    /// Operating profit as % of revenue.
    pub operating_margin: Decimal,
    /// Net profit as % of revenue.
    pub net_margin: Decimal,
}

/// Assets side of the balance sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetsSection {
    /// Cash, receivables and other current assets.
    pub current_assets: ReportSection,
    /// Fixed assets net of accumulated depreciation.
    pub fixed_assets: ReportSection,
    /// current + fixed.
    pub total: Decimal,
}

/// Liabilities side of the balance sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiabilitiesSection {
    /// Due within twelve months.
    pub current_liabilities: ReportSection,
    /// Due after twelve months.
    pub long_term_liabilities: ReportSection,
    /// current + long-term.
    pub total: Decimal,
}

/// Equity side of the balance sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquitySection {
    /// Paid-in capital and other non-retained equity.
    pub capital: ReportSection,
    /// Retained earnings accounts plus profit of prior fiscal years.
    pub retained_earnings: Decimal,
    /// Profit from fiscal-year start to the as-of date.
    pub current_year_profit: Decimal,
    /// capital + retained earnings + current-year profit.
    pub total: Decimal,
}

/// Balance sheet as of a date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Report type identifier.
    pub report_type: String,
    /// As of date.
    pub as_of: NaiveDate,
    /// First day of the fiscal year containing `as_of`.
    pub fiscal_year_start: NaiveDate,
    /// Currency.
    pub currency: Currency,
    /// Assets.
    pub assets: AssetsSection,
    /// Liabilities.
    pub liabilities: LiabilitiesSection,
    /// Equity.
    pub equity: EquitySection,
    /// liabilities + equity.
    pub liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Cash flow statement (direct method) for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowReport {
    /// Report type identifier.
    pub report_type: String,
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Currency.
    pub currency: Currency,
    /// Cash balance before `period_start`.
    pub opening_cash: Decimal,
    /// Trading activity.
    pub operating: ReportSection,
    /// Fixed asset purchases and disposals.
    pub investing: ReportSection,
    /// Borrowing and owner funding.
    pub financing: ReportSection,
    /// operating + investing + financing.
    pub net_cash_flow: Decimal,
    /// opening + net.
    pub closing_cash: Decimal,
}

/// Spend of one expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAmount {
    /// Expense category.
    pub category: ExpenseCategory,
    /// Number of expenses counted.
    pub count: usize,
    /// Sum of their amounts.
    pub amount: Decimal,
    /// Share of the report total, 2 dp.
    pub percentage: Decimal,
}

/// Approved and paid expenses grouped by category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseByCategoryReport {
    /// Report type identifier.
    pub report_type: String,
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Currency.
    pub currency: Currency,
    /// Sum over all categories.
    pub total: Decimal,
    /// Categories with spend, largest first.
    pub categories: Vec<CategoryAmount>,
}

/// Revenue and expense of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// `YYYY-MM`.
    pub month: String,
    /// Revenue posted in the month.
    pub revenue: Decimal,
    /// Expense posted in the month.
    pub expense: Decimal,
    /// revenue - expense.
    pub profit: Decimal,
}

/// Month-by-month revenue and expense over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueExpenseTrendReport {
    /// Report type identifier.
    pub report_type: String,
    /// Period start date.
    pub period_start: NaiveDate,
    /// Period end date.
    pub period_end: NaiveDate,
    /// Currency.
    pub currency: Currency,
    /// One entry per calendar month touched by the range, oldest first.
    pub months: Vec<MonthlyTrend>,
}
