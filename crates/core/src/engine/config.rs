//! Engine configuration resolved from application settings.

use std::time::Duration;

use finledger_shared::config::{EngineSettings, PostingAccountCodes};
use finledger_shared::types::{AccountId, Currency};

use super::error::EngineError;
use crate::fiscal::FiscalCalendar;
use crate::ledger::{ChartOfAccounts, LedgerError};

/// Validated engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Functional currency.
    pub currency: Currency,
    /// Upper bound on waiting for any aggregate lock.
    pub lock_timeout: Duration,
    /// Fiscal year boundaries.
    pub fiscal_calendar: FiscalCalendar,
    /// Seed the default chart on construction.
    pub seed_default_chart: bool,
    /// Codes of system posting accounts.
    pub posting: PostingAccountCodes,
}

impl EngineConfig {
    /// Validates raw settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero lock timeout or a fiscal start
    /// month outside 1..=12.
    pub fn from_settings(settings: &EngineSettings) -> Result<Self, EngineError> {
        if settings.lock_timeout_ms == 0 {
            return Err(EngineError::InvalidConfig(
                "lock_timeout_ms must be greater than zero".to_string(),
            ));
        }
        let fiscal_calendar = FiscalCalendar::new(settings.fiscal_year_start_month).ok_or_else(|| {
            EngineError::InvalidConfig(format!(
                "fiscal_year_start_month must be 1-12, got {}",
                settings.fiscal_year_start_month
            ))
        })?;

        Ok(Self {
            currency: settings.currency,
            lock_timeout: Duration::from_millis(settings.lock_timeout_ms),
            fiscal_calendar,
            seed_default_chart: settings.seed_default_chart,
            posting: settings.posting.clone(),
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            lock_timeout: Duration::from_secs(2),
            fiscal_calendar: FiscalCalendar::default(),
            seed_default_chart: true,
            posting: PostingAccountCodes::default(),
        }
    }
}

/// Leaf accounts the engine posts system journals to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingAccounts {
    /// Trade receivables.
    pub receivable: AccountId,
    /// Trade payables.
    pub payable: AccountId,
    /// Default sales revenue.
    pub sales_revenue: AccountId,
    /// Default purchases.
    pub purchases: AccountId,
    /// VAT collected.
    pub output_tax: AccountId,
    /// VAT paid.
    pub input_tax: AccountId,
    /// Accrued expense liability.
    pub accrued_expenses: AccountId,
    /// Default cash account.
    pub default_cash: AccountId,
    /// Withheld income tax owed.
    pub withholding_tax: AccountId,
    /// Income tax paid in advance.
    pub prepaid_income_tax: AccountId,
}

impl PostingAccounts {
    /// Resolves every code against the chart. Each must name a leaf.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` for unknown codes and `HeaderAccount`
    /// for header accounts.
    pub fn resolve(codes: &PostingAccountCodes, chart: &ChartOfAccounts) -> Result<Self, LedgerError> {
        let leaf = |code: &str| -> Result<AccountId, LedgerError> {
            let account = chart.require_code(code)?;
            if chart.is_header(account.id) {
                return Err(LedgerError::HeaderAccount(account.code.clone()));
            }
            Ok(account.id)
        };

        Ok(Self {
            receivable: leaf(&codes.receivable)?,
            payable: leaf(&codes.payable)?,
            sales_revenue: leaf(&codes.sales_revenue)?,
            purchases: leaf(&codes.purchases)?,
            output_tax: leaf(&codes.output_tax)?,
            input_tax: leaf(&codes.input_tax)?,
            accrued_expenses: leaf(&codes.accrued_expenses)?,
            default_cash: leaf(&codes.default_cash)?,
            withholding_tax: leaf(&codes.withholding_tax)?,
            prepaid_income_tax: leaf(&codes.prepaid_income_tax)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(2000, 0)]
    #[case(2000, 13)]
    fn test_invalid_settings_rejected(#[case] lock_timeout_ms: u64, #[case] month: u32) {
        let settings = EngineSettings {
            lock_timeout_ms,
            fiscal_year_start_month: month,
            ..EngineSettings::default()
        };
        let err = EngineConfig::from_settings(&settings).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_valid_settings() {
        let settings = EngineSettings {
            lock_timeout_ms: 250,
            fiscal_year_start_month: 4,
            ..EngineSettings::default()
        };
        let config = EngineConfig::from_settings(&settings).unwrap();
        assert_eq!(config.lock_timeout, Duration::from_millis(250));
        assert_eq!(config.fiscal_calendar.start_month(), 4);
    }
}
