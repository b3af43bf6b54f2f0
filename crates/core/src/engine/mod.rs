//! The finance engine facade.
//!
//! `FinanceEngine` owns the ledger, the aggregate stores and the document
//! counters. Each mutation locks its aggregate, runs the pure state machine
//! on a working copy, posts to the ledger as the last fallible step, and
//! commits. A failure anywhere leaves the stored aggregate unchanged and
//! writes nothing to the ledger.

mod budgets;
pub mod config;
pub mod error;
mod expenses;
mod invoices;
mod payments;
mod taxes;

use std::sync::Arc;

use chrono::NaiveDate;
use finledger_shared::types::{
    AccountId, BudgetId, ExpenseId, InvoiceId, JournalId, PaymentId, TaxId,
};
use parking_lot::Mutex;
use tracing::info;

pub use config::{EngineConfig, PostingAccounts};
pub use error::EngineError;

use crate::budget::{Budget, BudgetService, BudgetStatus};
use crate::dashboard::{DashboardMetrics, DashboardService};
use crate::expense::Expense;
use crate::invoice::Invoice;
use crate::ledger::{
    Account, AccountBalance, JournalEntry, JournalInput, Ledger, LedgerSnapshot, LedgerTransaction,
    NewAccount, PostingInput,
};
use crate::numbering::DocumentNumbers;
use crate::payment::Payment;
use crate::reports::{
    BalanceSheetReport, CashFlowReport, ExpenseByCategoryReport, ProfitLossReport, ReportService,
    RevenueExpenseTrendReport, TrialBalanceReport,
};
use crate::store::{AggregateStore, InMemoryTransactionLog, StoreError, TransactionLog};
use crate::tax::TaxRecord;

/// Ledger, documents and reports behind one thread-safe handle.
pub struct FinanceEngine {
    config: EngineConfig,
    ledger: Ledger,
    invoices: AggregateStore<InvoiceId, Invoice>,
    payments: AggregateStore<PaymentId, Payment>,
    expenses: AggregateStore<ExpenseId, Expense>,
    budgets: AggregateStore<BudgetId, Budget>,
    taxes: AggregateStore<TaxId, TaxRecord>,
    tax_calculation: Mutex<()>,
    numbers: DocumentNumbers,
}

impl std::fmt::Debug for FinanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceEngine")
            .field("config", &self.config)
            .field("invoices", &self.invoices)
            .field("payments", &self.payments)
            .field("expenses", &self.expenses)
            .field("budgets", &self.budgets)
            .field("taxes", &self.taxes)
            .finish_non_exhaustive()
    }
}

impl FinanceEngine {
    /// Creates an engine over an in-memory transaction log.
    ///
    /// # Errors
    ///
    /// Fails if the default chart cannot be seeded or the configured posting
    /// accounts do not resolve to leaf accounts.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_log(config, Arc::new(InMemoryTransactionLog::new()))
    }

    /// Creates an engine over the given transaction log.
    ///
    /// # Errors
    ///
    /// See [`FinanceEngine::new`].
    pub fn with_log(config: EngineConfig, log: Arc<dyn TransactionLog>) -> Result<Self, EngineError> {
        let timeout = config.lock_timeout;
        let ledger = Ledger::with_log(log, config.currency, timeout);

        if config.seed_default_chart {
            let seeded = ledger.seed_default_chart()?;
            ledger.with_chart(|chart| PostingAccounts::resolve(&config.posting, chart))?;
            info!(accounts = seeded, "Seeded default chart of accounts");
        }

        Ok(Self {
            config,
            ledger,
            invoices: AggregateStore::new("invoice", timeout),
            payments: AggregateStore::new("payment", timeout),
            expenses: AggregateStore::new("expense", timeout),
            budgets: AggregateStore::new("budget", timeout),
            taxes: AggregateStore::new("tax", timeout),
            tax_calculation: Mutex::new(()),
            numbers: DocumentNumbers::new(),
        })
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The underlying ledger.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn posting_accounts(&self) -> Result<PostingAccounts, EngineError> {
        Ok(self
            .ledger
            .with_chart(|chart| PostingAccounts::resolve(&self.config.posting, chart))?)
    }

    // ========== Chart & Ledger ==========

    /// Adds an account to the chart.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid accounts.
    pub fn add_account(&self, input: NewAccount) -> Result<Account, EngineError> {
        Ok(self.ledger.add_account(input)?)
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn account(&self, id: AccountId) -> Result<Account, EngineError> {
        Ok(self.ledger.account(id)?)
    }

    /// All accounts in code order.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.ledger.accounts()
    }

    /// Balance of an account as of a date (all postings when `None`).
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn account_balance(
        &self,
        id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountBalance, EngineError> {
        Ok(self.ledger.account_balance_detail(id, as_of)?)
    }

    /// Posts one leg and its contra leg.
    ///
    /// # Errors
    ///
    /// Returns a validation or integrity error; nothing is written on error.
    pub fn post_transaction(&self, input: PostingInput) -> Result<JournalEntry, EngineError> {
        Ok(self.ledger.post_transaction(input)?)
    }

    /// Posts a compound journal.
    ///
    /// # Errors
    ///
    /// Returns a validation or integrity error; nothing is written on error.
    pub fn post_journal(&self, input: JournalInput) -> Result<JournalEntry, EngineError> {
        Ok(self.ledger.post_journal(input)?)
    }

    /// Reverses a journal.
    ///
    /// # Errors
    ///
    /// See [`Ledger::reverse_journal`].
    pub fn reverse_journal(
        &self,
        journal_id: JournalId,
        date: NaiveDate,
        reason: &str,
    ) -> Result<JournalEntry, EngineError> {
        Ok(self.ledger.reverse_journal(journal_id, date, reason)?)
    }

    /// The legs of one journal.
    ///
    /// # Errors
    ///
    /// Returns `JournalNotFound` for unknown journals.
    pub fn journal(&self, journal_id: JournalId) -> Result<JournalEntry, EngineError> {
        Ok(self.ledger.journal(journal_id)?)
    }

    /// Legs dated within `[start, end]`, optionally under one account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown account filter.
    pub fn transactions(
        &self,
        start: Option<NaiveDate>,
        end: NaiveDate,
        account_id: Option<AccountId>,
    ) -> Result<Vec<LedgerTransaction>, EngineError> {
        Ok(self.ledger.transactions(start, end, account_id)?)
    }

    /// A frozen view of the ledger.
    ///
    /// # Errors
    ///
    /// Returns a store error if the log cannot be read.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, EngineError> {
        Ok(self.ledger.snapshot()?)
    }

    // ========== Reports ==========

    /// Trial balance as of a date.
    ///
    /// # Errors
    ///
    /// Returns a store error if the log cannot be read.
    pub fn trial_balance(&self, as_of: NaiveDate) -> Result<TrialBalanceReport, EngineError> {
        Ok(ReportService::trial_balance(&self.snapshot()?, as_of))
    }

    /// Balance sheet as of a date.
    ///
    /// # Errors
    ///
    /// Returns a store error if the log cannot be read.
    pub fn balance_sheet(&self, as_of: NaiveDate) -> Result<BalanceSheetReport, EngineError> {
        Ok(ReportService::balance_sheet(
            &self.snapshot()?,
            as_of,
            self.config.fiscal_calendar,
        ))
    }

    /// Profit and loss over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn profit_and_loss(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ProfitLossReport, EngineError> {
        Ok(ReportService::profit_and_loss(&self.snapshot()?, start, end)?)
    }

    /// Cash flow over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`.
    pub fn cash_flow(&self, start: NaiveDate, end: NaiveDate) -> Result<CashFlowReport, EngineError> {
        Ok(ReportService::cash_flow(&self.snapshot()?, start, end)?)
    }

    /// Approved and paid expenses over `[start, end]` by category.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`, or `LockTimeout` if an
    /// expense stays locked past the timeout.
    pub fn expense_by_category(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ExpenseByCategoryReport, EngineError> {
        Ok(ReportService::expense_by_category(
            &self.expenses.list()?,
            start,
            end,
            self.config.currency,
        )?)
    }

    /// Monthly revenue, expense and profit over `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `start > end`, or `RangeTooLong` for
    /// spans past the supported number of months.
    pub fn revenue_expense_trend(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RevenueExpenseTrendReport, EngineError> {
        Ok(ReportService::revenue_expense_trend(&self.snapshot()?, start, end)?)
    }

    /// Dashboard metrics as of a date.
    ///
    /// # Errors
    ///
    /// Returns a store error if the log cannot be read, or `LockTimeout` if
    /// any document stays locked past the timeout.
    pub fn dashboard(&self, as_of: NaiveDate) -> Result<DashboardMetrics, EngineError> {
        let snapshot = self.snapshot()?;
        let expenses = self.expenses.list()?;
        let budgets = self
            .budgets
            .list()?
            .into_iter()
            .filter(|b| b.status == BudgetStatus::Active)
            .map(|b| BudgetService::compute_utilization(&b, &snapshot, as_of, &expenses))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DashboardService::build(
            as_of,
            &snapshot,
            &self.invoices.list()?,
            &self.payments.list()?,
            &expenses,
            &budgets,
        ))
    }
}

/// Replaces a store-level not-found with the module's own variant.
fn missing(err: EngineError, not_found: impl FnOnce() -> EngineError) -> EngineError {
    match err {
        EngineError::Store(StoreError::NotFound { .. }) => not_found(),
        other => other,
    }
}
