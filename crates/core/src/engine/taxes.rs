//! Tax operations.

use chrono::NaiveDate;
use finledger_shared::types::{AccountId, TaxId, UserId};
use tracing::info;

use super::{EngineError, FinanceEngine, missing};
use crate::tax::{TaxCalculation, TaxError, TaxFiling, TaxRecord, TaxService};

impl FinanceEngine {
    /// Computes a tax for one month and records it as calculated.
    ///
    /// PPN figures are read from the output and input VAT accounts over the
    /// month. Calculations run one at a time so each type and period is
    /// recorded once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod`, `DuplicatePeriod`, or a figure validation
    /// error.
    pub fn calculate_tax(
        &self,
        input: TaxCalculation,
        created_by: Option<UserId>,
    ) -> Result<TaxRecord, EngineError> {
        let (start, end) = TaxService::period_bounds(input.period_year, input.period_month)?;
        let _serial = self.tax_calculation.lock();

        if self
            .taxes
            .list()?
            .iter()
            .any(|t| t.covers(input.tax_type, input.period_year, input.period_month))
        {
            return Err(TaxError::DuplicatePeriod {
                tax_type: input.tax_type,
                year: input.period_year,
                month: input.period_month,
            }
            .into());
        }

        let figures = if input.tax_type.is_vat() {
            let accounts = self.posting_accounts()?;
            let snapshot = self.snapshot()?;
            TaxService::figures(
                &input,
                || TaxService::vat_position(&snapshot, accounts.output_tax, accounts.input_tax, start, end),
                self.config.currency,
            )?
        } else {
            TaxService::figures(&input, Default::default, self.config.currency)?
        };

        let allocated = self.numbers.next_yearly("TAX", input.period_year);
        let record = TaxRecord {
            number: allocated.number,
            sequence: allocated.sequence,
            ..TaxService::create(input, figures, String::new(), created_by)
        };

        let record = self.taxes.insert(record.id, record)?;
        info!(
            tax_id = %record.id,
            number = %record.number,
            tax_type = %record.tax_type,
            amount = %record.figures.tax_amount,
            "Tax calculated"
        );
        Ok(record)
    }

    /// Stored tax record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids.
    pub fn tax(&self, id: TaxId) -> Result<TaxRecord, EngineError> {
        self.taxes
            .get(&id)
            .map_err(|e| missing(e.into(), || TaxError::NotFound(id).into()))
    }

    /// All tax records, latest period first.
    ///
    /// # Errors
    ///
    /// Returns `LockTimeout` if a record stays locked past the timeout.
    pub fn list_taxes(&self) -> Result<Vec<TaxRecord>, EngineError> {
        let mut taxes = self.taxes.list()?;
        taxes.sort_by(|a, b| {
            (b.period_year, b.period_month)
                .cmp(&(a.period_year, a.period_month))
                .then(a.sequence.cmp(&b.sequence))
        });
        Ok(taxes)
    }

    /// calculated → filed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside calculated.
    pub fn file_tax(
        &self,
        id: TaxId,
        filing: TaxFiling,
        expected_version: Option<u64>,
    ) -> Result<TaxRecord, EngineError> {
        let ((), record) = self
            .taxes
            .update(&id, expected_version, |record| {
                TaxService::file(record, filing).map_err(EngineError::from)
            })
            .map_err(|e| missing(e, || TaxError::NotFound(id).into()))?;

        info!(tax_id = %id, number = %record.number, status = %record.status, "Tax filed");
        Ok(record)
    }

    /// filed → paid, posting the remittance.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside filed, `NothingToPay` for a zero
    /// or refundable amount, or a ledger error. Nothing changes on error.
    pub fn pay_tax(
        &self,
        id: TaxId,
        cash_account: Option<AccountId>,
        date: NaiveDate,
        expected_version: Option<u64>,
    ) -> Result<TaxRecord, EngineError> {
        let accounts = self.posting_accounts()?;
        let cash = cash_account.unwrap_or(accounts.default_cash);
        let ((), record) = self
            .taxes
            .update(&id, expected_version, |record| {
                TaxService::pay(record, cash, date)?;
                let journal = TaxService::payment_journal(record, cash, date, &accounts);
                record.payment_journal = Some(self.ledger.post_journal(journal)?.id);
                Ok::<_, EngineError>(())
            })
            .map_err(|e| missing(e, || TaxError::NotFound(id).into()))?;

        info!(
            tax_id = %id,
            number = %record.number,
            amount = %record.figures.tax_amount,
            journal_id = ?record.payment_journal,
            "Tax paid"
        );
        Ok(record)
    }
}
