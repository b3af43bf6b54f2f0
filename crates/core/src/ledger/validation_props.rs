//! Property-based tests for journal leg validation rules.

use finledger_shared::types::{AccountId, Currency};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::EntryType;
use super::journal::JournalLineInput;
use super::validation::{LedgerValidationError, validate_lines};

/// Strategy to generate a valid positive amount (> 0).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    // Generate amounts from 0.01 to 1,000,000.00
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a non-positive amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

/// Strategy to generate an entry type.
fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::Debit), Just(EntryType::Credit)]
}

fn make_line(entry_type: EntryType, amount: Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id: AccountId::new(),
        entry_type,
        amount,
        memo: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Non-positive legs are rejected regardless of the other legs.
    #[test]
    fn prop_non_positive_amount_rejected(
        entry_type in entry_type_strategy(),
        bad_amount in non_positive_amount(),
        other_amount in positive_amount(),
    ) {
        let lines = vec![
            make_line(entry_type, bad_amount),
            make_line(entry_type.opposite(), other_amount),
        ];

        let result = validate_lines(&lines, Currency::Idr);
        prop_assert!(
            matches!(result, Err(LedgerValidationError::InvalidAmount)),
            "Non-positive amount should be rejected, got: {:?}",
            result
        );
    }

    /// A lone leg can never balance.
    #[test]
    fn prop_single_leg_rejected(
        entry_type in entry_type_strategy(),
        amount in positive_amount(),
    ) {
        let lines = vec![make_line(entry_type, amount)];
        prop_assert_eq!(
            validate_lines(&lines, Currency::Idr),
            Err(LedgerValidationError::InsufficientLegs)
        );
    }

    /// Splitting one side into several legs still balances.
    #[test]
    fn prop_split_legs_balanced_accepted(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        debit_side in any::<bool>(),
    ) {
        let total: Decimal = amounts.iter().copied().sum();
        let (split_side, single_side) = if debit_side {
            (EntryType::Debit, EntryType::Credit)
        } else {
            (EntryType::Credit, EntryType::Debit)
        };
        let mut lines: Vec<_> = amounts.iter().map(|a| make_line(split_side, *a)).collect();
        lines.push(make_line(single_side, total));

        prop_assert!(validate_lines(&lines, Currency::Idr).is_ok());
    }

    /// Any mismatch between the sides is reported as an integrity violation.
    #[test]
    fn prop_mismatch_is_integrity_violation(
        amount in positive_amount(),
        delta in positive_amount(),
    ) {
        let lines = vec![
            make_line(EntryType::Debit, amount + delta),
            make_line(EntryType::Credit, amount),
        ];

        let err = validate_lines(&lines, Currency::Idr).unwrap_err();
        prop_assert!(err.is_integrity_violation());
    }
}
