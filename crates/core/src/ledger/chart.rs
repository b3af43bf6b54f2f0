//! Chart of accounts tree.

use std::collections::{BTreeMap, HashMap};

use finledger_shared::types::AccountId;

use super::account::{Account, AccountSubtype, AccountType, NewAccount};
use super::error::LedgerError;

/// The account tree, indexed by id and by code.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: HashMap<AccountId, Account>,
    by_code: BTreeMap<String, AccountId>,
    children: HashMap<AccountId, Vec<AccountId>>,
}

impl ChartOfAccounts {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a new account against the chart. Returns the resolved parent.
    ///
    /// # Errors
    ///
    /// Returns an error for duplicate codes, unknown parents, or type mismatches.
    pub fn check_new(&self, input: &NewAccount) -> Result<Option<&Account>, LedgerError> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(LedgerError::BlankAccountField);
        }
        if self.by_code.contains_key(input.code.trim()) {
            return Err(LedgerError::DuplicateAccountCode(input.code.trim().to_string()));
        }
        if let Some(subtype) = input.subtype
            && subtype.account_type() != input.account_type
        {
            return Err(LedgerError::SubtypeMismatch {
                subtype,
                account_type: input.account_type,
            });
        }

        let Some(parent_code) = input.parent_code.as_deref() else {
            return Ok(None);
        };
        let parent = self.require_code(parent_code)?;
        if parent.account_type != input.account_type {
            return Err(LedgerError::ParentTypeMismatch {
                parent: parent.code.clone(),
                parent_type: parent.account_type,
                child_type: input.account_type,
            });
        }
        Ok(Some(parent))
    }

    /// Adds an account. Callers must ensure the parent has no postings.
    ///
    /// # Errors
    ///
    /// See [`ChartOfAccounts::check_new`].
    pub fn add(&mut self, input: NewAccount) -> Result<Account, LedgerError> {
        let parent_id = self.check_new(&input)?.map(|parent| parent.id);

        let account = Account {
            id: AccountId::new(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            account_type: input.account_type,
            subtype: input.subtype,
            parent_id,
            is_header: input.is_header,
            is_active: true,
            description: input.description,
        };

        self.by_code.insert(account.code.clone(), account.id);
        if let Some(parent_id) = parent_id {
            self.children.entry(parent_id).or_default().push(account.id);
        }
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Activates or deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn set_active(&mut self, id: AccountId, active: bool) -> Result<Account, LedgerError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        account.is_active = active;
        Ok(account.clone())
    }

    /// Looks up an account by id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Looks up an account by id, failing with `AccountNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn require(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.get(id).ok_or(LedgerError::AccountNotFound(id))
    }

    /// Looks up an account by code.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&Account> {
        self.by_code.get(code).and_then(|id| self.accounts.get(id))
    }

    /// Looks up an account by code, failing with `AccountCodeNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` for unknown codes.
    pub fn require_code(&self, code: &str) -> Result<&Account, LedgerError> {
        self.by_code(code)
            .ok_or_else(|| LedgerError::AccountCodeNotFound(code.to_string()))
    }

    /// Direct children of an account.
    #[must_use]
    pub fn children(&self, id: AccountId) -> &[AccountId] {
        self.children.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Returns true if the account aggregates children instead of taking postings.
    #[must_use]
    pub fn is_header(&self, id: AccountId) -> bool {
        self.get(id).is_some_and(|a| a.is_header) || !self.children(id).is_empty()
    }

    /// All leaf accounts in the subtree rooted at `id`, including `id` itself
    /// when it is a leaf.
    #[must_use]
    pub fn leaves_under(&self, id: AccountId) -> Vec<AccountId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let children = self.children(current);
            if children.is_empty() {
                if !self.is_header(current) {
                    leaves.push(current);
                }
            } else {
                stack.extend_from_slice(children);
            }
        }
        leaves
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: AccountId, id: AccountId) -> bool {
        let mut current = self.get(id).and_then(|a| a.parent_id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.get(parent).and_then(|a| a.parent_id);
        }
        false
    }

    /// Accounts ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.by_code.values().filter_map(|id| self.accounts.get(id))
    }

    /// Leaf accounts ordered by code.
    pub fn leaves(&self) -> impl Iterator<Item = &Account> {
        self.iter().filter(|a| !self.is_header(a.id))
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// The chart seeded on startup. Parents precede children.
#[must_use]
pub fn default_chart() -> Vec<NewAccount> {
    use AccountSubtype as S;
    use AccountType as T;

    vec![
        NewAccount::header("1000", "Assets", T::Asset, None),
        NewAccount::header("1100", "Current Assets", T::Asset, Some("1000")),
        NewAccount::leaf("1110", "Cash on Hand", T::Asset, Some(S::Cash), Some("1100")),
        NewAccount::leaf("1120", "Bank", T::Asset, Some(S::Cash), Some("1100")),
        NewAccount::leaf("1130", "Accounts Receivable", T::Asset, Some(S::Receivable), Some("1100")),
        NewAccount::leaf("1140", "VAT Receivable", T::Asset, Some(S::CurrentAsset), Some("1100")),
        NewAccount::leaf(
            "1150",
            "Prepaid Income Tax",
            T::Asset,
            Some(S::CurrentAsset),
            Some("1100"),
        ),
        NewAccount::header("1200", "Fixed Assets", T::Asset, Some("1000")),
        NewAccount::leaf("1210", "Equipment", T::Asset, Some(S::FixedAsset), Some("1200")),
        NewAccount::leaf(
            "1290",
            "Accumulated Depreciation",
            T::Asset,
            Some(S::AccumulatedDepreciation),
            Some("1200"),
        ),
        NewAccount::header("2000", "Liabilities", T::Liability, None),
        NewAccount::header("2100", "Current Liabilities", T::Liability, Some("2000")),
        NewAccount::leaf("2110", "Accounts Payable", T::Liability, Some(S::Payable), Some("2100")),
        NewAccount::leaf(
            "2120",
            "Accrued Expenses",
            T::Liability,
            Some(S::CurrentLiability),
            Some("2100"),
        ),
        NewAccount::leaf("2130", "VAT Payable", T::Liability, Some(S::CurrentLiability), Some("2100")),
        NewAccount::leaf(
            "2140",
            "Withholding Tax Payable",
            T::Liability,
            Some(S::CurrentLiability),
            Some("2100"),
        ),
        NewAccount::header("2200", "Long-term Liabilities", T::Liability, Some("2000")),
        NewAccount::leaf(
            "2210",
            "Bank Loans",
            T::Liability,
            Some(S::LongTermLiability),
            Some("2200"),
        ),
        NewAccount::header("3000", "Equity", T::Equity, None),
        NewAccount::leaf("3100", "Share Capital", T::Equity, Some(S::Capital), Some("3000")),
        NewAccount::leaf(
            "3200",
            "Retained Earnings",
            T::Equity,
            Some(S::RetainedEarnings),
            Some("3000"),
        ),
        NewAccount::header("4000", "Revenue", T::Revenue, None),
        NewAccount::leaf("4100", "Sales Revenue", T::Revenue, Some(S::OperatingRevenue), Some("4000")),
        NewAccount::leaf(
            "4200",
            "Service Revenue",
            T::Revenue,
            Some(S::OperatingRevenue),
            Some("4000"),
        ),
        NewAccount::leaf("4900", "Other Income", T::Revenue, Some(S::OtherIncome), Some("4000")),
        NewAccount::header("5000", "Cost of Goods Sold", T::Expense, None),
        NewAccount::leaf("5100", "Purchases", T::Expense, Some(S::CostOfGoodsSold), Some("5000")),
        NewAccount::header("6000", "Operating Expenses", T::Expense, None),
        NewAccount::leaf("6100", "Salaries", T::Expense, Some(S::OperatingExpense), Some("6000")),
        NewAccount::leaf("6200", "Rent", T::Expense, Some(S::OperatingExpense), Some("6000")),
        NewAccount::leaf("6300", "Utilities", T::Expense, Some(S::OperatingExpense), Some("6000")),
        NewAccount::leaf("6400", "Travel", T::Expense, Some(S::OperatingExpense), Some("6000")),
        NewAccount::leaf(
            "6500",
            "Office Supplies",
            T::Expense,
            Some(S::OperatingExpense),
            Some("6000"),
        ),
        NewAccount::leaf("6600", "Marketing", T::Expense, Some(S::OperatingExpense), Some("6000")),
        NewAccount::leaf("6700", "Training", T::Expense, Some(S::OperatingExpense), Some("6000")),
        NewAccount::leaf(
            "6800",
            "Depreciation Expense",
            T::Expense,
            Some(S::OperatingExpense),
            Some("6000"),
        ),
        NewAccount::leaf(
            "6900",
            "Miscellaneous Expense",
            T::Expense,
            Some(S::OperatingExpense),
            Some("6000"),
        ),
        NewAccount::header("7000", "Other Expenses", T::Expense, None),
        NewAccount::leaf("7100", "Interest Expense", T::Expense, Some(S::OtherExpense), Some("7000")),
        NewAccount::header("8000", "Income Tax", T::Expense, None),
        NewAccount::leaf("8100", "Income Tax Expense", T::Expense, Some(S::TaxExpense), Some("8000")),
    ]
}
