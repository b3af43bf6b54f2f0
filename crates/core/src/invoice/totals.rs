//! Invoice line and total computation.
//!
//! Every line figure is rounded to the currency's minor units with banker's
//! rounding before summing, so invoice totals are exact sums of the figures
//! shown on each line. Line discounts apply first; the header discount is
//! then taken off the discounted subtotal.

use finledger_shared::types::{Currency, checked_sum, within_limit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;
use super::types::{InvoiceLine, InvoiceLineInput};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Computed invoice totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Σ line subtotals.
    pub subtotal: Decimal,
    /// Header discount.
    pub discount_amount: Decimal,
    /// Σ line taxes.
    pub tax_amount: Decimal,
    /// subtotal − discount + tax.
    pub total_amount: Decimal,
}

/// Validates one line and computes its subtotal and tax.
///
/// `line` is the 1-based position used in error messages.
///
/// # Errors
///
/// Returns an error for non-positive quantities, negative prices,
/// percentages outside 0..=100, or a line amount beyond `MAX_AMOUNT`.
pub fn compute_line(
    line: usize,
    input: &InvoiceLineInput,
    currency: Currency,
) -> Result<InvoiceLine, InvoiceError> {
    if input.quantity <= Decimal::ZERO {
        return Err(InvoiceError::NonPositiveQuantity { line });
    }
    if input.unit_price < Decimal::ZERO {
        return Err(InvoiceError::NegativeUnitPrice { line });
    }
    if !(Decimal::ZERO..=HUNDRED).contains(&input.discount_percent) {
        return Err(InvoiceError::PercentOutOfRange {
            line,
            field: "discount_percent",
        });
    }
    if !(Decimal::ZERO..=HUNDRED).contains(&input.tax_percent) {
        return Err(InvoiceError::PercentOutOfRange {
            line,
            field: "tax_percent",
        });
    }

    let gross = input
        .quantity
        .checked_mul(input.unit_price)
        .filter(|gross| within_limit(*gross))
        .ok_or(InvoiceError::LineAmountOutOfRange { line })?;
    let subtotal = currency.round(gross * (HUNDRED - input.discount_percent) / HUNDRED);
    let tax_amount = currency.round(subtotal * input.tax_percent / HUNDRED);

    Ok(InvoiceLine {
        description: input.description.clone(),
        quantity: input.quantity,
        unit_price: input.unit_price,
        discount_percent: input.discount_percent,
        tax_percent: input.tax_percent,
        account_id: input.account_id,
        subtotal,
        tax_amount,
    })
}

/// Computes all lines and the invoice totals.
///
/// # Errors
///
/// Returns an error for an empty line list, an invalid line, totals beyond
/// `MAX_AMOUNT`, or a header discount outside 0..=subtotal.
pub fn compute_totals(
    inputs: &[InvoiceLineInput],
    discount_amount: Decimal,
    currency: Currency,
) -> Result<(Vec<InvoiceLine>, InvoiceTotals), InvoiceError> {
    if inputs.is_empty() {
        return Err(InvoiceError::NoLines);
    }

    let lines = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| compute_line(i + 1, input, currency))
        .collect::<Result<Vec<_>, _>>()?;

    let subtotal =
        checked_sum(lines.iter().map(|l| l.subtotal)).ok_or(InvoiceError::TotalOutOfRange)?;
    let tax_amount =
        checked_sum(lines.iter().map(|l| l.tax_amount)).ok_or(InvoiceError::TotalOutOfRange)?;
    let discount_amount = currency.round(discount_amount);
    if discount_amount < Decimal::ZERO || discount_amount > subtotal {
        return Err(InvoiceError::DiscountOutOfRange {
            discount: discount_amount,
            subtotal,
        });
    }

    let total_amount = subtotal - discount_amount + tax_amount;
    if !within_limit(total_amount) {
        return Err(InvoiceError::TotalOutOfRange);
    }

    let totals = InvoiceTotals {
        subtotal,
        discount_amount,
        tax_amount,
        total_amount,
    };
    Ok((lines, totals))
}
