//! Business rule validation for ledger postings.

use finledger_shared::types::{Currency, MAX_AMOUNT, within_limit};
use rust_decimal::Decimal;
use thiserror::Error;

use super::entry::EntryType;
use super::journal::JournalLineInput;

/// Validation errors for journal legs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerValidationError {
    /// Journal legs do not balance.
    #[error("Journal is unbalanced: debits ({debits}) != credits ({credits})")]
    Unbalanced {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    /// Journal has fewer than two legs.
    #[error("Journal must have at least two legs")]
    InsufficientLegs,

    /// Journal has only one side (all debits or all credits).
    #[error("Journal must have both debit and credit legs")]
    SingleSided,

    /// Leg amount is zero or negative.
    #[error("Leg amount must be positive")]
    InvalidAmount,

    /// Leg amount, or the journal total, exceeds the supported maximum.
    #[error("Amount {amount} exceeds the supported maximum of {max}", max = MAX_AMOUNT)]
    AmountOutOfRange {
        /// Offending amount.
        amount: Decimal,
    },

    /// Leg amount is finer than the currency's minor unit.
    #[error("Amount {amount} has more than {places} decimal places")]
    ExcessPrecision {
        /// Offending amount.
        amount: Decimal,
        /// Allowed decimal places.
        places: u32,
    },
}

impl LedgerValidationError {
    /// Returns true for double-entry violations, which are integrity errors
    /// rather than ordinary input errors.
    #[must_use]
    pub const fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Unbalanced { .. })
    }
}

/// Validates that a set of journal legs is well-formed and balanced.
///
/// Amount and precision checks run before the balance check, so an
/// `Unbalanced` error always describes otherwise valid legs.
///
/// # Errors
///
/// Returns an error if the legs are not balanced or violate business rules.
pub fn validate_lines(
    lines: &[JournalLineInput],
    currency: Currency,
) -> Result<(), LedgerValidationError> {
    if lines.len() < 2 {
        return Err(LedgerValidationError::InsufficientLegs);
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for line in lines {
        if line.amount <= Decimal::ZERO {
            return Err(LedgerValidationError::InvalidAmount);
        }
        if !within_limit(line.amount) {
            return Err(LedgerValidationError::AmountOutOfRange { amount: line.amount });
        }
        if !currency.is_representable(line.amount) {
            return Err(LedgerValidationError::ExcessPrecision {
                amount: line.amount,
                places: currency.decimal_places(),
            });
        }

        let (total, seen) = match line.entry_type {
            EntryType::Debit => (&mut total_debits, &mut has_debit),
            EntryType::Credit => (&mut total_credits, &mut has_credit),
        };
        *total = total
            .checked_add(line.amount)
            .filter(|sum| within_limit(*sum))
            .ok_or(LedgerValidationError::AmountOutOfRange { amount: *total })?;
        *seen = true;
    }

    if !has_debit || !has_credit {
        return Err(LedgerValidationError::SingleSided);
    }

    if total_debits != total_credits {
        return Err(LedgerValidationError::Unbalanced {
            debits: total_debits,
            credits: total_credits,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finledger_shared::types::AccountId;
    use rust_decimal_macros::dec;

    fn make_line(entry_type: EntryType, amount: Decimal) -> JournalLineInput {
        JournalLineInput {
            account_id: AccountId::new(),
            entry_type,
            amount,
            memo: None,
        }
    }

    #[test]
    fn test_balanced_lines() {
        let lines = vec![
            make_line(EntryType::Debit, dec!(100.00)),
            make_line(EntryType::Credit, dec!(60.00)),
            make_line(EntryType::Credit, dec!(40.00)),
        ];
        assert!(validate_lines(&lines, Currency::Idr).is_ok());
    }

    #[test]
    fn test_unbalanced_lines() {
        let lines = vec![
            make_line(EntryType::Debit, dec!(100.00)),
            make_line(EntryType::Credit, dec!(50.00)),
        ];
        let err = validate_lines(&lines, Currency::Idr).unwrap_err();
        assert!(err.is_integrity_violation());
        assert_eq!(
            err,
            LedgerValidationError::Unbalanced {
                debits: dec!(100.00),
                credits: dec!(50.00),
            }
        );
    }

    #[test]
    fn test_single_leg() {
        let lines = vec![make_line(EntryType::Debit, dec!(100))];
        assert_eq!(
            validate_lines(&lines, Currency::Idr),
            Err(LedgerValidationError::InsufficientLegs)
        );
    }

    #[test]
    fn test_single_sided() {
        let lines = vec![
            make_line(EntryType::Debit, dec!(100.00)),
            make_line(EntryType::Debit, dec!(50.00)),
        ];
        assert_eq!(
            validate_lines(&lines, Currency::Idr),
            Err(LedgerValidationError::SingleSided)
        );
    }

    #[test]
    fn test_amount_out_of_range() {
        let huge = dec!(50_000_000_000_000_000_000_000_000_000);
        let lines = vec![
            make_line(EntryType::Debit, huge),
            make_line(EntryType::Credit, huge),
        ];
        assert!(matches!(
            validate_lines(&lines, Currency::Idr),
            Err(LedgerValidationError::AmountOutOfRange { .. })
        ));

        let at_limit = vec![
            make_line(EntryType::Debit, MAX_AMOUNT),
            make_line(EntryType::Credit, MAX_AMOUNT),
        ];
        assert!(validate_lines(&at_limit, Currency::Idr).is_ok());
    }

    #[test]
    fn test_journal_total_out_of_range() {
        let lines = vec![
            make_line(EntryType::Debit, MAX_AMOUNT),
            make_line(EntryType::Debit, MAX_AMOUNT),
            make_line(EntryType::Credit, MAX_AMOUNT),
            make_line(EntryType::Credit, MAX_AMOUNT),
        ];
        let err = validate_lines(&lines, Currency::Idr).unwrap_err();
        assert!(matches!(err, LedgerValidationError::AmountOutOfRange { .. }));
        assert!(!err.is_integrity_violation());
    }

    #[test]
    fn test_excess_precision() {
        let lines = vec![
            make_line(EntryType::Debit, dec!(10.001)),
            make_line(EntryType::Credit, dec!(10.001)),
        ];
        assert!(matches!(
            validate_lines(&lines, Currency::Idr),
            Err(LedgerValidationError::ExcessPrecision { places: 2, .. })
        ));
        assert!(!validate_lines(&lines, Currency::Idr)
            .unwrap_err()
            .is_integrity_violation());
    }
}
