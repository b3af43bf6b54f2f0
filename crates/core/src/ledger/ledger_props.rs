//! Property-based tests for ledger-wide invariants.

use std::time::Duration;

use chrono::NaiveDate;
use finledger_shared::types::Currency;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::EntryType;
use super::journal::{JournalInput, JournalLineInput, PostingInput};
use super::service::Ledger;

const LEAF_CODES: [&str; 8] = ["1110", "1120", "1130", "2110", "3100", "4100", "5100", "6100"];

fn amount() -> impl Strategy<Value = Decimal> {
    (-50_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn posting() -> impl Strategy<Value = (usize, usize, bool, Decimal, u32)> {
    (0..LEAF_CODES.len(), 0..LEAF_CODES.len(), any::<bool>(), amount(), 1u32..=28)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Whatever mix of postings is attempted, accepted or rejected, the log
    /// stays balanced.
    #[test]
    fn prop_global_debits_equal_credits(
        postings in prop::collection::vec(posting(), 1..30),
        skew in prop::option::of(1i64..1000),
    ) {
        let ledger = Ledger::new(Currency::Idr, Duration::from_millis(100));
        ledger.seed_default_chart().unwrap();
        let id = |i: usize| ledger.account_by_code(LEAF_CODES[i]).unwrap().id;

        for (a, b, debit, amount, day) in postings {
            let _ = ledger.post_transaction(PostingInput {
                account_id: id(a),
                entry_type: if debit { EntryType::Debit } else { EntryType::Credit },
                amount,
                date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
                description: "prop".into(),
                reference: None,
                contra_account_id: id(b),
            });
        }

        if let Some(skew) = skew {
            let rejected = ledger.post_journal(JournalInput {
                date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                description: "skewed".into(),
                reference: None,
                lines: vec![
                    JournalLineInput::debit(id(0), Decimal::new(100_000 + skew, 2)),
                    JournalLineInput::credit(id(1), Decimal::new(100_000, 2)),
                ],
            });
            prop_assert!(rejected.is_err());
        }

        let totals = ledger.snapshot().unwrap().grand_totals();
        prop_assert_eq!(totals.debit, totals.credit);
        prop_assert!(ledger.trial_balance(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()).unwrap().is_balanced);
    }

    /// Header balances equal the sum of their leaf balances.
    #[test]
    fn prop_header_equals_leaf_sum(
        amounts in prop::collection::vec((1i64..1_000_000, 0usize..3), 1..20),
    ) {
        let ledger = Ledger::new(Currency::Idr, Duration::from_millis(100));
        ledger.seed_default_chart().unwrap();
        let leaves = ["1110", "1120", "1130"];
        let capital = ledger.account_by_code("3100").unwrap().id;

        for (cents, leaf) in amounts {
            ledger.post_transaction(PostingInput {
                account_id: ledger.account_by_code(leaves[leaf]).unwrap().id,
                entry_type: EntryType::Debit,
                amount: Decimal::new(cents, 2),
                date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                description: "prop".into(),
                reference: None,
                contra_account_id: capital,
            }).unwrap();
        }

        let snapshot = ledger.snapshot().unwrap();
        let header = ledger.account_by_code("1100").unwrap().id;
        let leaf_sum: Decimal = leaves
            .iter()
            .map(|code| snapshot.balance(ledger.account_by_code(code).unwrap().id, None).unwrap())
            .sum();
        prop_assert_eq!(snapshot.balance(header, None).unwrap(), leaf_sum);
        prop_assert_eq!(snapshot.balance(capital, None).unwrap(), leaf_sum);
    }
}
