//! Tax record types.

use chrono::{DateTime, NaiveDate, Utc};
use finledger_shared::types::{AccountId, JournalId, TaxId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Versioned;

/// Kind of periodic tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxType {
    /// Employee income tax withheld by the employer.
    Pph21,
    /// Tax withheld on services and royalties.
    Pph23,
    /// Monthly corporate income tax instalment.
    Pph25,
    /// Value added tax: output minus input VAT.
    Ppn,
    /// Any other withheld tax.
    Other,
}

impl TaxType {
    /// True for VAT, whose figures come from the ledger.
    #[must_use]
    pub const fn is_vat(self) -> bool {
        matches!(self, Self::Ppn)
    }
}

impl std::fmt::Display for TaxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pph21 => "pph21",
            Self::Pph23 => "pph23",
            Self::Pph25 => "pph25",
            Self::Ppn => "ppn",
            Self::Other => "other",
        })
    }
}

/// Tax record status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    /// Amount computed, return not yet filed.
    Calculated,
    /// Return filed with the tax office.
    Filed,
    /// Remitted and posted.
    Paid,
}

impl std::fmt::Display for TaxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Calculated => "calculated",
            Self::Filed => "filed",
            Self::Paid => "paid",
        })
    }
}

/// Computed amounts of a tax record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxFigures {
    /// Base the tax is levied on; output VAT for PPN.
    pub taxable_amount: Decimal,
    /// Percentage applied to the base; absent for PPN.
    pub tax_rate: Option<Decimal>,
    /// Input VAT credited against output VAT; zero for other types.
    pub credit_amount: Decimal,
    /// Amount owed; negative when input VAT exceeds output VAT.
    pub tax_amount: Decimal,
}

/// VAT movement of one period, excluding tax remittances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VatPosition {
    /// VAT collected on sales.
    pub output_tax: Decimal,
    /// VAT paid on purchases.
    pub input_tax: Decimal,
}

/// One tax obligation for a calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxRecord {
    /// Record ID.
    pub id: TaxId,
    /// `TAX-{year}-{seq}`.
    pub number: String,
    /// Counter value behind `number`; orders documents sharing a prefix.
    pub sequence: u64,
    /// Kind of tax.
    pub tax_type: TaxType,
    /// Period year.
    pub period_year: i32,
    /// Period month, 1-12.
    pub period_month: u32,
    /// Computed amounts.
    #[serde(flatten)]
    pub figures: TaxFigures,
    /// Current status.
    pub status: TaxStatus,
    /// When the return was filed.
    pub filing_date: Option<NaiveDate>,
    /// Tax office receipt or billing code.
    pub reference_number: Option<String>,
    /// When the tax was remitted.
    pub payment_date: Option<NaiveDate>,
    /// Cash account the remittance left from.
    pub cash_account: Option<AccountId>,
    /// Journal posted on payment.
    pub payment_journal: Option<JournalId>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Calculating user.
    pub created_by: Option<UserId>,
    /// Calculation time.
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency version.
    pub version: u64,
}

impl TaxRecord {
    /// Returns true if the record covers the given period.
    #[must_use]
    pub fn covers(&self, tax_type: TaxType, year: i32, month: u32) -> bool {
        self.tax_type == tax_type && self.period_year == year && self.period_month == month
    }
}

impl Versioned for TaxRecord {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Request to compute a tax for a period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxCalculation {
    /// Kind of tax.
    pub tax_type: TaxType,
    /// Period year.
    pub period_year: i32,
    /// Period month, 1-12.
    pub period_month: u32,
    /// Base for withheld taxes; must be absent for PPN.
    #[serde(default)]
    pub taxable_amount: Option<Decimal>,
    /// Percentage for withheld taxes; must be absent for PPN.
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Details recorded when a return is filed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxFiling {
    /// Filing date.
    pub filing_date: NaiveDate,
    /// Tax office receipt.
    #[serde(default)]
    pub reference_number: Option<String>,
}
