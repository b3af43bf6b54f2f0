//! Property-based tests for the expense workflow.

use proptest::prelude::*;

use super::error::ExpenseError;
use super::service::ExpenseWorkflow;
use super::types::ExpenseStatus;

fn arb_status() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Draft),
        Just(ExpenseStatus::Submitted),
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::Rejected),
        Just(ExpenseStatus::Paid),
    ]
}

fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every transition the workflow accepts is in the transition table,
    /// and every rejected one is not.
    #[test]
    fn prop_actions_follow_transition_table(status in arb_status(), reason in arb_reason()) {
        let attempts = [
            (ExpenseStatus::Submitted, ExpenseWorkflow::submit(status)),
            (ExpenseStatus::Approved, ExpenseWorkflow::approve(status, None, None)),
            (ExpenseStatus::Rejected, ExpenseWorkflow::reject(status, &reason)),
            (ExpenseStatus::Paid, ExpenseWorkflow::pay(status)),
        ];
        for (target, result) in attempts {
            match result {
                Ok(action) => {
                    prop_assert_eq!(action.new_status(), target);
                    prop_assert!(ExpenseWorkflow::is_valid_transition(status, target));
                }
                Err(ExpenseError::InvalidTransition { from, to }) => {
                    prop_assert_eq!(from, status);
                    prop_assert_eq!(to, target);
                    prop_assert!(!ExpenseWorkflow::is_valid_transition(status, target));
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }

    /// Terminal states accept nothing.
    #[test]
    fn prop_terminal_states(reason in arb_reason()) {
        for status in [ExpenseStatus::Rejected, ExpenseStatus::Paid] {
            prop_assert!(ExpenseWorkflow::submit(status).is_err());
            prop_assert!(ExpenseWorkflow::approve(status, None, None).is_err());
            prop_assert!(ExpenseWorkflow::reject(status, &reason).is_err());
            prop_assert!(ExpenseWorkflow::pay(status).is_err());
        }
    }
}
