//! Chart-of-accounts node types and sign conventions.

use finledger_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The five fundamental account types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// Returns the side on which this account type increases.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for revenue and expense accounts.
    #[must_use]
    pub const fn is_income_statement(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normal balance side.
///
/// - Asset/Expense: balance = debit - credit (debit-normal)
/// - Liability/Equity/Revenue: balance = credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense).
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    Credit,
}

impl NormalBalance {
    /// Calculates the balance from debit and credit totals.
    #[must_use]
    pub fn balance(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Statement classification below the account type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    /// Cash on hand and bank balances.
    Cash,
    /// Trade receivables.
    Receivable,
    /// Other current assets.
    CurrentAsset,
    /// Property, plant and equipment.
    FixedAsset,
    /// Contra-asset reducing fixed assets.
    AccumulatedDepreciation,
    /// Trade payables.
    Payable,
    /// Other current liabilities.
    CurrentLiability,
    /// Liabilities due after twelve months.
    LongTermLiability,
    /// Paid-in capital.
    Capital,
    /// Earnings retained from prior years.
    RetainedEarnings,
    /// Revenue from ordinary activities.
    OperatingRevenue,
    /// Income outside ordinary activities.
    OtherIncome,
    /// Direct cost of goods sold.
    CostOfGoodsSold,
    /// Operating expenses.
    OperatingExpense,
    /// Expenses outside ordinary activities.
    OtherExpense,
    /// Income tax expense.
    TaxExpense,
}

impl AccountSubtype {
    /// Returns the only account type this subtype may be attached to.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Cash
            | Self::Receivable
            | Self::CurrentAsset
            | Self::FixedAsset
            | Self::AccumulatedDepreciation => AccountType::Asset,
            Self::Payable | Self::CurrentLiability | Self::LongTermLiability => {
                AccountType::Liability
            }
            Self::Capital | Self::RetainedEarnings => AccountType::Equity,
            Self::OperatingRevenue | Self::OtherIncome => AccountType::Revenue,
            Self::CostOfGoodsSold
            | Self::OperatingExpense
            | Self::OtherExpense
            | Self::TaxExpense => AccountType::Expense,
        }
    }
}

/// Cash flow activity a non-cash account's movements are attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlowActivity {
    /// Day-to-day trading.
    Operating,
    /// Long-lived asset purchases and disposals.
    Investing,
    /// Borrowing and owner funding.
    Financing,
}

/// A chart-of-accounts node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Statement classification.
    pub subtype: Option<AccountSubtype>,
    /// Parent header account.
    pub parent_id: Option<AccountId>,
    /// Explicit header flag. Accounts with children are headers regardless.
    pub is_header: bool,
    /// Inactive accounts reject new postings.
    pub is_active: bool,
    /// Free-form description.
    pub description: Option<String>,
}

impl Account {
    /// Returns true if this account holds cash.
    #[must_use]
    pub fn is_cash(&self) -> bool {
        self.subtype == Some(AccountSubtype::Cash)
    }

    /// Activity that movements on this account represent in a cash flow statement.
    #[must_use]
    pub fn cash_flow_activity(&self) -> CashFlowActivity {
        match (self.account_type, self.subtype) {
            (
                _,
                Some(AccountSubtype::FixedAsset | AccountSubtype::AccumulatedDepreciation),
            ) => CashFlowActivity::Investing,
            (_, Some(AccountSubtype::LongTermLiability)) | (AccountType::Equity, _) => {
                CashFlowActivity::Financing
            }
            _ => CashFlowActivity::Operating,
        }
    }
}

/// Input for adding an account to the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Statement classification.
    #[serde(default)]
    pub subtype: Option<AccountSubtype>,
    /// Parent account code.
    #[serde(default)]
    pub parent_code: Option<String>,
    /// Create as a header account.
    #[serde(default)]
    pub is_header: bool,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

impl NewAccount {
    /// Shorthand for a leaf account.
    #[must_use]
    pub fn leaf(
        code: &str,
        name: &str,
        account_type: AccountType,
        subtype: Option<AccountSubtype>,
        parent_code: Option<&str>,
    ) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            subtype,
            parent_code: parent_code.map(str::to_string),
            is_header: false,
            description: None,
        }
    }

    /// Shorthand for a header account.
    #[must_use]
    pub fn header(
        code: &str,
        name: &str,
        account_type: AccountType,
        parent_code: Option<&str>,
    ) -> Self {
        Self {
            is_header: true,
            ..Self::leaf(code, name, account_type, None, parent_code)
        }
    }
}
