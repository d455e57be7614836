//! Property-based tests for ExpenseLifecycle.

use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::lifecycle::ExpenseLifecycle;
use crate::workflow::types::{Decision, ExpenseOperation, ExpenseStatus, WorkflowAction};

/// Strategy for generating random ExpenseStatus values.
fn arb_status() -> impl Strategy<Value = ExpenseStatus> {
    prop::sample::select(ExpenseStatus::ALL.to_vec())
}

/// Strategy for generating non-draft statuses.
fn arb_non_draft_status() -> impl Strategy<Value = ExpenseStatus> {
    arb_status().prop_filter("non-draft", |s| *s != ExpenseStatus::Draft)
}

fn arb_decision() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Approved), Just(Decision::Rejected)]
}

fn arb_operation() -> impl Strategy<Value = ExpenseOperation> {
    prop_oneof![
        Just(ExpenseOperation::Update),
        Just(ExpenseOperation::Delete),
        Just(ExpenseOperation::Submit),
    ]
}

/// Strategy for generating random UUIDs.
fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Strategy for whitespace-only comments, including the empty string.
fn arb_blank_comment() -> impl Strategy<Value = String> {
    "[ \t\n]{0,10}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Update, delete and submit fail with InvalidState outside draft.
    #[test]
    fn prop_non_draft_rejects_mutations(
        status in arb_non_draft_status(),
        operation in arb_operation(),
    ) {
        let result = ExpenseLifecycle::ensure_editable(status, operation);
        let is_invalid_state = matches!(
            result,
            Err(WorkflowError::InvalidState { status: s, operation: o }) if s == status && o == operation
        );
        prop_assert!(is_invalid_state);
    }

    /// Draft accepts every mutation.
    #[test]
    fn prop_draft_accepts_mutations(operation in arb_operation()) {
        prop_assert!(ExpenseLifecycle::ensure_editable(ExpenseStatus::Draft, operation).is_ok());
    }

    /// Submit succeeds only from draft and records the submitter.
    #[test]
    fn prop_submit_only_from_draft(status in arb_status(), user in arb_uuid()) {
        let result = ExpenseLifecycle::submit(status, user);
        if status == ExpenseStatus::Draft {
            let action = result.unwrap();
            prop_assert_eq!(action.new_status(), ExpenseStatus::Pending);
            if let WorkflowAction::Submit { submitted_by, .. } = action {
                prop_assert_eq!(submitted_by, user);
            } else {
                prop_assert!(false, "Expected Submit action");
            }
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Terminal statuses never transition anywhere.
    #[test]
    fn prop_terminal_is_final(from in arb_status(), to in arb_status()) {
        if from.is_terminal() {
            prop_assert!(!ExpenseLifecycle::is_valid_transition(from, to));
        }
    }

    /// Every resolve result lands on a terminal status matching the decision.
    #[test]
    fn prop_resolve_lands_on_decision(
        status in arb_status(),
        decision in arb_decision(),
        approver in arb_uuid(),
    ) {
        match ExpenseLifecycle::resolve(status, decision, approver) {
            Ok(action) => {
                prop_assert_eq!(status, ExpenseStatus::Pending);
                prop_assert_eq!(action.new_status(), decision.expense_status());
                prop_assert!(action.new_status().is_terminal());
                prop_assert!(ExpenseLifecycle::is_valid_transition(status, action.new_status()));
            }
            Err(err) => {
                prop_assert_ne!(status, ExpenseStatus::Pending);
                let is_invalid_transition = matches!(err, WorkflowError::InvalidTransition { .. });
                prop_assert!(is_invalid_transition);
            }
        }
    }

    /// Rejecting with a blank comment always fails validation.
    #[test]
    fn prop_blank_rejection_comment_fails(comment in arb_blank_comment()) {
        let result = ExpenseLifecycle::decision_comment(Decision::Rejected, Some(comment));
        let is_required = matches!(result, Err(WorkflowError::RejectionCommentRequired));
        prop_assert!(is_required);
    }

    /// Approving never needs a comment.
    #[test]
    fn prop_approval_comment_optional(comment in proptest::option::of("[a-z ]{0,20}")) {
        let expected = comment.clone().unwrap_or_default();
        let normalized = ExpenseLifecycle::decision_comment(Decision::Approved, comment).unwrap();
        prop_assert_eq!(normalized, expected);
    }
}
