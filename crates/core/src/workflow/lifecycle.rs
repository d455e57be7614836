//! Expense lifecycle state machine.
//!
//! This module implements the pure transition rules for expenses,
//! independent of how or where expenses are stored.

use chrono::Utc;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{Decision, ExpenseOperation, ExpenseStatus, WorkflowAction};

/// Stateless rules for expense status transitions.
///
/// All methods are associated functions that validate a transition
/// and return the resulting `WorkflowAction`.
pub struct ExpenseLifecycle;

impl ExpenseLifecycle {
    /// Checks that an expense in `status` accepts `operation`.
    ///
    /// Update, delete and submit are only allowed while the expense is a draft.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::InvalidState` for any non-draft status.
    pub fn ensure_editable(
        status: ExpenseStatus,
        operation: ExpenseOperation,
    ) -> Result<(), WorkflowError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(WorkflowError::InvalidState { status, operation })
        }
    }

    /// Submit a draft expense for approval.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Submit)` if the expense is a draft
    /// * `Err(WorkflowError::InvalidState)` otherwise
    pub fn submit(
        current_status: ExpenseStatus,
        submitted_by: Uuid,
    ) -> Result<WorkflowAction, WorkflowError> {
        Self::ensure_editable(current_status, ExpenseOperation::Submit)?;

        Ok(WorkflowAction::Submit {
            new_status: ExpenseStatus::Pending,
            submitted_by,
            submitted_at: Utc::now(),
        })
    }

    /// Resolve a pending expense with an approver decision.
    ///
    /// # Returns
    /// * `Ok(WorkflowAction::Resolve)` if the expense is pending
    /// * `Err(WorkflowError::InvalidTransition)` otherwise
    pub fn resolve(
        current_status: ExpenseStatus,
        decision: Decision,
        resolved_by: Uuid,
    ) -> Result<WorkflowAction, WorkflowError> {
        let target = decision.expense_status();
        if current_status != ExpenseStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: current_status,
                to: target,
            });
        }

        Ok(WorkflowAction::Resolve {
            new_status: target,
            decision,
            resolved_by,
            resolved_at: Utc::now(),
        })
    }

    /// Normalizes the comment attached to a decision.
    ///
    /// Rejections need a non-blank comment; approvals default to an empty one.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::RejectionCommentRequired` when rejecting
    /// with a missing or whitespace-only comment.
    pub fn decision_comment(
        decision: Decision,
        comment: Option<String>,
    ) -> Result<String, WorkflowError> {
        let comment = comment.unwrap_or_default();
        if decision == Decision::Rejected && comment.trim().is_empty() {
            return Err(WorkflowError::RejectionCommentRequired);
        }
        Ok(comment)
    }

    /// Returns true if moving from `from` to `to` is a legal transition.
    #[must_use]
    pub fn is_valid_transition(from: ExpenseStatus, to: ExpenseStatus) -> bool {
        matches!(
            (from, to),
            (ExpenseStatus::Draft, ExpenseStatus::Pending)
                | (
                    ExpenseStatus::Pending,
                    ExpenseStatus::Approved | ExpenseStatus::Rejected
                )
        )
    }
}
