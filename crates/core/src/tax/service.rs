//! Tax calculation, filing and remittance.
//!
//! Withheld taxes (PPh 21/23/25 and other) are `taxable × rate / 100`,
//! rounded to the currency's minor units. VAT (PPN) is the output VAT
//! collected in the month less the input VAT paid, read from the ledger.

use chrono::{Months, NaiveDate, Utc};
use finledger_shared::types::{AccountId, Currency, TaxId, UserId, within_limit};
use rust_decimal::Decimal;

use super::error::TaxError;
use super::types::{
    TaxCalculation, TaxFigures, TaxFiling, TaxRecord, TaxStatus, TaxType, VatPosition,
};
use crate::engine::PostingAccounts;
use crate::ledger::{JournalInput, JournalLineInput, LedgerSnapshot, LegFilter, SourceReference};

/// Stateless service for tax records.
pub struct TaxService;

impl TaxService {
    /// First and last day of a tax period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriod` for a month outside 1-12 or an unrepresentable
    /// year.
    pub fn period_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), TaxError> {
        let invalid = || TaxError::InvalidPeriod { year, month };
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;
        Ok((first, last))
    }

    /// VAT collected and paid within `[start, end]`.
    ///
    /// Legs posted by tax remittances are skipped, so settling one period
    /// never shows up as VAT activity of the month it is paid in.
    #[must_use]
    pub fn vat_position(
        snapshot: &LedgerSnapshot,
        output_tax: AccountId,
        input_tax: AccountId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> VatPosition {
        let filter = LegFilter::between(start, end);
        let mut position = VatPosition::default();
        for leg in snapshot.transactions().iter().filter(|leg| {
            filter.matches(leg) && !matches!(leg.reference, Some(SourceReference::Tax(_)))
        }) {
            if leg.account_id == output_tax {
                position.output_tax -= leg.signed_amount();
            } else if leg.account_id == input_tax {
                position.input_tax += leg.signed_amount();
            }
        }
        position
    }

    /// Computes the figures of a calculation request.
    ///
    /// `vat` is only consulted for PPN.
    ///
    /// # Errors
    ///
    /// Returns `FiguresRequired` when a withheld tax lacks its base or rate,
    /// `FiguresDerived` when PPN is given either, and a validation error for
    /// a negative base, a rate outside 0-100, or an out-of-range amount.
    pub fn figures(
        input: &TaxCalculation,
        vat: impl FnOnce() -> VatPosition,
        currency: Currency,
    ) -> Result<TaxFigures, TaxError> {
        if input.tax_type.is_vat() {
            if input.taxable_amount.is_some() || input.tax_rate.is_some() {
                return Err(TaxError::FiguresDerived(input.tax_type));
            }
            let position = vat();
            for amount in [position.output_tax, position.input_tax] {
                if !within_limit(amount) {
                    return Err(TaxError::AmountOutOfRange(amount));
                }
            }
            return Ok(TaxFigures {
                taxable_amount: position.output_tax,
                tax_rate: None,
                credit_amount: position.input_tax,
                tax_amount: position.output_tax - position.input_tax,
            });
        }

        let (Some(taxable_amount), Some(rate)) = (input.taxable_amount, input.tax_rate) else {
            return Err(TaxError::FiguresRequired(input.tax_type));
        };
        if taxable_amount < Decimal::ZERO {
            return Err(TaxError::NegativeTaxableAmount(taxable_amount));
        }
        if !within_limit(taxable_amount) {
            return Err(TaxError::AmountOutOfRange(taxable_amount));
        }
        if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
            return Err(TaxError::RateOutOfRange(rate));
        }

        Ok(TaxFigures {
            taxable_amount,
            tax_rate: Some(rate),
            credit_amount: Decimal::ZERO,
            tax_amount: currency.round(taxable_amount * rate / Decimal::ONE_HUNDRED),
        })
    }

    /// Builds a calculated record.
    #[must_use]
    pub fn create(
        input: TaxCalculation,
        figures: TaxFigures,
        number: String,
        created_by: Option<UserId>,
    ) -> TaxRecord {
        TaxRecord {
            id: TaxId::new(),
            number,
            sequence: 0,
            tax_type: input.tax_type,
            period_year: input.period_year,
            period_month: input.period_month,
            figures,
            status: TaxStatus::Calculated,
            filing_date: None,
            reference_number: None,
            payment_date: None,
            cash_account: None,
            payment_journal: None,
            notes: input.notes,
            created_by,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// calculated → filed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside calculated.
    pub fn file(record: &mut TaxRecord, filing: TaxFiling) -> Result<(), TaxError> {
        if record.status != TaxStatus::Calculated {
            return Err(TaxError::InvalidTransition {
                from: record.status,
                action: "file",
            });
        }
        record.status = TaxStatus::Filed;
        record.filing_date = Some(filing.filing_date);
        record.reference_number = filing
            .reference_number
            .filter(|r| !r.trim().is_empty())
            .or(record.reference_number.take());
        Ok(())
    }

    /// filed → paid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside filed, `NothingToPay` when no
    /// positive amount is owed, and `PaidBeforeFiling` for a payment dated
    /// before the filing.
    pub fn pay(record: &mut TaxRecord, cash_account: AccountId, date: NaiveDate) -> Result<(), TaxError> {
        if record.status != TaxStatus::Filed {
            return Err(TaxError::InvalidTransition {
                from: record.status,
                action: "pay",
            });
        }
        if record.figures.tax_amount <= Decimal::ZERO {
            return Err(TaxError::NothingToPay(record.figures.tax_amount));
        }
        if let Some(filed) = record.filing_date.filter(|filed| date < *filed) {
            return Err(TaxError::PaidBeforeFiling { filed, paid: date });
        }
        record.status = TaxStatus::Paid;
        record.payment_date = Some(date);
        record.cash_account = Some(cash_account);
        Ok(())
    }

    /// Remittance journal of a paid record.
    ///
    /// PPN clears output VAT against input VAT and pays the difference.
    /// PPh 25 instalments are prepaid income tax. Every other type settles
    /// the withholding liability.
    #[must_use]
    pub fn payment_journal(
        record: &TaxRecord,
        cash_account: AccountId,
        date: NaiveDate,
        accounts: &PostingAccounts,
    ) -> JournalInput {
        let figures = &record.figures;
        let lines = match record.tax_type {
            TaxType::Ppn => [
                (accounts.output_tax, figures.taxable_amount),
                (accounts.input_tax, -figures.credit_amount),
                (cash_account, -figures.tax_amount),
            ]
            .into_iter()
            .filter_map(|(account, signed)| leg(account, signed))
            .collect(),
            TaxType::Pph25 => vec![
                JournalLineInput::debit(accounts.prepaid_income_tax, figures.tax_amount),
                JournalLineInput::credit(cash_account, figures.tax_amount),
            ],
            TaxType::Pph21 | TaxType::Pph23 | TaxType::Other => vec![
                JournalLineInput::debit(accounts.withholding_tax, figures.tax_amount),
                JournalLineInput::credit(cash_account, figures.tax_amount),
            ],
        };

        JournalInput {
            date,
            description: format!(
                "{} {} {}-{:02}",
                record.number, record.tax_type, record.period_year, record.period_month
            ),
            reference: Some(SourceReference::Tax(record.id)),
            lines,
        }
    }
}

/// Debit for a positive amount, credit for a negative one, nothing for zero.
fn leg(account: AccountId, signed: Decimal) -> Option<JournalLineInput> {
    if signed > Decimal::ZERO {
        Some(JournalLineInput::debit(account, signed))
    } else if signed < Decimal::ZERO {
        Some(JournalLineInput::credit(account, -signed))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EntryType, validate_lines};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn d(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn request(tax_type: TaxType, taxable: Option<Decimal>, rate: Option<Decimal>) -> TaxCalculation {
        TaxCalculation {
            tax_type,
            period_year: 2026,
            period_month: 3,
            taxable_amount: taxable,
            tax_rate: rate,
            notes: None,
        }
    }

    fn no_vat() -> VatPosition {
        panic!("VAT position read for a withheld tax")
    }

    fn accounts() -> PostingAccounts {
        PostingAccounts {
            receivable: AccountId::new(),
            payable: AccountId::new(),
            sales_revenue: AccountId::new(),
            purchases: AccountId::new(),
            output_tax: AccountId::new(),
            input_tax: AccountId::new(),
            accrued_expenses: AccountId::new(),
            default_cash: AccountId::new(),
            withholding_tax: AccountId::new(),
            prepaid_income_tax: AccountId::new(),
        }
    }

    fn filed(tax_type: TaxType, figures: TaxFigures) -> TaxRecord {
        let mut record = TaxService::create(
            request(tax_type, None, None),
            figures,
            "TAX-2026-0001".into(),
            None,
        );
        TaxService::file(
            &mut record,
            TaxFiling {
                filing_date: d(2026, 4, 10),
                reference_number: Some("BPE-1".into()),
            },
        )
        .unwrap();
        record
    }

    #[rstest]
    #[case(2026, 2, d(2026, 2, 1), d(2026, 2, 28))]
    #[case(2024, 2, d(2024, 2, 1), d(2024, 2, 29))]
    #[case(2026, 12, d(2026, 12, 1), d(2026, 12, 31))]
    fn test_period_bounds(
        #[case] year: i32,
        #[case] month: u32,
        #[case] first: NaiveDate,
        #[case] last: NaiveDate,
    ) {
        assert_eq!(TaxService::period_bounds(year, month).unwrap(), (first, last));
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    fn test_invalid_period(#[case] month: u32) {
        let err = TaxService::period_bounds(2026, month).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TAX_PERIOD");
    }

    #[rstest]
    #[case(TaxType::Pph21, dec!(15000000), dec!(5), dec!(750000))]
    #[case(TaxType::Pph23, dec!(3333333), dec!(2), dec!(66666.66))]
    #[case(TaxType::Pph25, dec!(40000000), dec!(0.75), dec!(300000))]
    #[case(TaxType::Other, dec!(1000), dec!(0), dec!(0))]
    fn test_withheld_tax_is_base_times_rate(
        #[case] tax_type: TaxType,
        #[case] taxable: Decimal,
        #[case] rate: Decimal,
        #[case] expected: Decimal,
    ) {
        let figures =
            TaxService::figures(&request(tax_type, Some(taxable), Some(rate)), no_vat, Currency::Idr)
                .unwrap();
        assert_eq!(figures.tax_amount, expected);
        assert_eq!(figures.tax_rate, Some(rate));
        assert_eq!(figures.credit_amount, Decimal::ZERO);
    }

    #[test]
    fn test_withheld_tax_validation() {
        let cases = [
            (request(TaxType::Pph21, None, Some(dec!(5))), "TAX_FIGURES_REQUIRED"),
            (request(TaxType::Pph23, Some(dec!(-1)), Some(dec!(2))), "INVALID_TAXABLE_AMOUNT"),
            (request(TaxType::Pph23, Some(dec!(100)), Some(dec!(100.01))), "INVALID_TAX_RATE"),
            (
                request(TaxType::Pph25, Some(dec!(2_000_000_000_000_000_000)), Some(dec!(1))),
                "AMOUNT_OUT_OF_RANGE",
            ),
        ];
        for (input, code) in cases {
            let err = TaxService::figures(&input, no_vat, Currency::Idr).unwrap_err();
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn test_vat_is_output_less_input() {
        let position = VatPosition {
            output_tax: dec!(1100000),
            input_tax: dec!(400000),
        };
        let figures =
            TaxService::figures(&request(TaxType::Ppn, None, None), || position, Currency::Idr).unwrap();
        assert_eq!(figures.taxable_amount, dec!(1100000));
        assert_eq!(figures.credit_amount, dec!(400000));
        assert_eq!(figures.tax_amount, dec!(700000));
        assert_eq!(figures.tax_rate, None);

        let err = TaxService::figures(
            &request(TaxType::Ppn, Some(dec!(1)), None),
            || position,
            Currency::Idr,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "TAX_FIGURES_DERIVED");
    }

    #[test]
    fn test_lifecycle() {
        let figures = TaxFigures {
            taxable_amount: dec!(15000000),
            tax_rate: Some(dec!(5)),
            credit_amount: Decimal::ZERO,
            tax_amount: dec!(750000),
        };
        let mut record = TaxService::create(
            request(TaxType::Pph21, None, None),
            figures,
            "TAX-2026-0001".into(),
            None,
        );
        assert_eq!(record.status, TaxStatus::Calculated);

        let cash = AccountId::new();
        assert!(matches!(
            TaxService::pay(&mut record, cash, d(2026, 4, 15)),
            Err(TaxError::InvalidTransition { from: TaxStatus::Calculated, .. })
        ));

        TaxService::file(
            &mut record,
            TaxFiling {
                filing_date: d(2026, 4, 10),
                reference_number: Some("  ".into()),
            },
        )
        .unwrap();
        assert_eq!(record.status, TaxStatus::Filed);
        assert_eq!(record.reference_number, None);

        assert!(matches!(
            TaxService::pay(&mut record, cash, d(2026, 4, 9)),
            Err(TaxError::PaidBeforeFiling { .. })
        ));
        TaxService::pay(&mut record, cash, d(2026, 4, 15)).unwrap();
        assert_eq!(record.status, TaxStatus::Paid);
        assert_eq!(record.cash_account, Some(cash));

        assert!(matches!(
            TaxService::file(
                &mut record,
                TaxFiling {
                    filing_date: d(2026, 4, 20),
                    reference_number: None,
                },
            ),
            Err(TaxError::InvalidTransition { from: TaxStatus::Paid, .. })
        ));
    }

    #[test]
    fn test_vat_refund_position_is_not_payable() {
        let mut record = filed(
            TaxType::Ppn,
            TaxFigures {
                taxable_amount: dec!(100),
                tax_rate: None,
                credit_amount: dec!(300),
                tax_amount: dec!(-200),
            },
        );
        let err = TaxService::pay(&mut record, AccountId::new(), d(2026, 4, 15)).unwrap_err();
        assert_eq!(err.error_code(), "NOTHING_TO_PAY");
        assert_eq!(record.status, TaxStatus::Filed);
    }

    #[test]
    fn test_vat_remittance_journal() {
        let accounts = accounts();
        let cash = AccountId::new();
        let record = filed(
            TaxType::Ppn,
            TaxFigures {
                taxable_amount: dec!(1100000),
                tax_rate: None,
                credit_amount: dec!(400000),
                tax_amount: dec!(700000),
            },
        );

        let journal = TaxService::payment_journal(&record, cash, d(2026, 4, 15), &accounts);
        let legs = journal
            .lines
            .iter()
            .map(|l| (l.account_id, l.entry_type, l.amount))
            .collect::<Vec<_>>();
        assert_eq!(
            legs,
            vec![
                (accounts.output_tax, EntryType::Debit, dec!(1100000)),
                (accounts.input_tax, EntryType::Credit, dec!(400000)),
                (cash, EntryType::Credit, dec!(700000)),
            ]
        );
        assert_eq!(journal.reference, Some(SourceReference::Tax(record.id)));
        assert!(validate_lines(&journal.lines, Currency::Idr).is_ok());
    }

    #[test]
    fn test_vat_journal_without_input_tax_has_two_legs() {
        let accounts = accounts();
        let record = filed(
            TaxType::Ppn,
            TaxFigures {
                taxable_amount: dec!(500),
                tax_rate: None,
                credit_amount: Decimal::ZERO,
                tax_amount: dec!(500),
            },
        );
        let journal = TaxService::payment_journal(&record, AccountId::new(), d(2026, 4, 15), &accounts);
        assert_eq!(journal.lines.len(), 2);
        assert!(journal.lines.iter().all(|l| l.account_id != accounts.input_tax));
    }

    #[rstest]
    #[case(TaxType::Pph21)]
    #[case(TaxType::Pph23)]
    #[case(TaxType::Pph25)]
    #[case(TaxType::Other)]
    fn test_withheld_remittance_journal(#[case] tax_type: TaxType) {
        let accounts = accounts();
        let cash = AccountId::new();
        let record = filed(
            tax_type,
            TaxFigures {
                taxable_amount: dec!(1000),
                tax_rate: Some(dec!(2)),
                credit_amount: Decimal::ZERO,
                tax_amount: dec!(20),
            },
        );
        let journal = TaxService::payment_journal(&record, cash, d(2026, 4, 15), &accounts);
        let expected_debit = if tax_type == TaxType::Pph25 {
            accounts.prepaid_income_tax
        } else {
            accounts.withholding_tax
        };
        assert_eq!(journal.lines[0].account_id, expected_debit);
        assert_eq!(journal.lines[0].entry_type, EntryType::Debit);
        assert_eq!(journal.lines[1].account_id, cash);
        assert_eq!(journal.lines[1].amount, dec!(20));
    }
}
