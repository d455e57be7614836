//! Storage ports for the expense workflow.
//!
//! Every mutation that depends on a status is expressed as a conditional
//! write, so implementations must check the status and change it in one
//! atomic step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use expensa_shared::PageRequest;
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

use crate::workflow::approval::{Approval, PendingApproval, ResolutionOutcome};
use crate::workflow::audit::AuditEvent;
use crate::workflow::error::WorkflowError;
use crate::workflow::expense::{Expense, ExpenseChanges};
use crate::workflow::types::{ApprovalStatus, Decision, ExpenseStatus};

/// Filter for listing a submitter's expenses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExpenseFilter {
    /// Only return expenses in this status.
    pub status: Option<ExpenseStatus>,
}

/// Input to [`ExpenseStore::resolve_if_pending`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Approval to resolve.
    pub approval_id: Uuid,
    /// Caller, who must be the assigned approver.
    pub approver_id: Uuid,
    /// Decision taken.
    pub decision: Decision,
    /// Normalized comment stored on the approval.
    pub comment: String,
    /// When the decision was taken.
    pub acted_at: DateTime<Utc>,
    /// Audit entry to append in the same transaction.
    pub audit: AuditEvent,
}

/// Persistence port for expenses, approvals and audit entries.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Inserts a new expense.
    async fn insert_expense(&self, expense: Expense) -> Result<Expense, WorkflowError>;

    /// Finds an expense by id, optionally restricted to its submitter.
    async fn find_expense(
        &self,
        id: Uuid,
        submitter_id: Option<Uuid>,
    ) -> Result<Option<Expense>, WorkflowError>;

    /// Lists a submitter's expenses, newest `updated_at` first, with the total count.
    async fn list_expenses(
        &self,
        submitter_id: Uuid,
        filter: ExpenseFilter,
        page: PageRequest,
    ) -> Result<(Vec<Expense>, u64), WorkflowError>;

    /// Applies `changes` if the expense belongs to `submitter_id` and is still a draft.
    ///
    /// Returns `None` when no draft matched.
    async fn update_draft_expense(
        &self,
        id: Uuid,
        submitter_id: Uuid,
        changes: &ExpenseChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, WorkflowError>;

    /// Deletes the expense if it belongs to `submitter_id` and is still a draft.
    ///
    /// Returns `false` when no draft matched.
    async fn delete_draft_expense(&self, id: Uuid, submitter_id: Uuid)
    -> Result<bool, WorkflowError>;

    /// Moves a draft to pending and inserts `approval` atomically.
    ///
    /// Returns `None` when no draft matched, in which case nothing is written.
    async fn submit_if_draft(
        &self,
        id: Uuid,
        submitter_id: Uuid,
        submitted_at: DateTime<Utc>,
        approval: Option<Approval>,
    ) -> Result<Option<Expense>, WorkflowError>;

    /// Finds an approval assigned to `approver_id` in the given status.
    async fn find_approval(
        &self,
        id: Uuid,
        approver_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<Option<Approval>, WorkflowError>;

    /// Lists all approvals recorded for an expense.
    async fn list_approvals_for_expense(
        &self,
        expense_id: Uuid,
    ) -> Result<Vec<Approval>, WorkflowError>;

    /// Pending approvals for an approver, newest submission first.
    async fn list_pending_approvals(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<PendingApproval>, WorkflowError>;

    /// Resolves a pending approval, cascades the expense status and
    /// appends the audit entry, all in one transaction.
    ///
    /// Returns `None` when no pending approval matched the id and approver.
    async fn resolve_if_pending(
        &self,
        resolution: Resolution,
    ) -> Result<Option<ResolutionOutcome>, WorkflowError>;
}

/// Lookup of reporting lines.
#[async_trait]
pub trait ManagerDirectory: Send + Sync {
    /// Returns the direct manager of `user_id`, if any.
    async fn manager_of(&self, user_id: Uuid) -> Result<Option<Uuid>, WorkflowError>;

    /// Returns true when `ancestor` sits somewhere above `user_id` in the
    /// reporting chain.
    ///
    /// The walk stops at the first repeated user, so an existing loop in
    /// the data cannot make it spin forever.
    async fn reports_to(&self, user_id: Uuid, ancestor: Uuid) -> Result<bool, WorkflowError> {
        let mut seen = HashSet::new();
        let mut current = user_id;
        while seen.insert(current) {
            match self.manager_of(current).await? {
                Some(manager) if manager == ancestor => return Ok(true),
                Some(manager) => current = manager,
                None => return Ok(false),
            }
        }
        Ok(false)
    }
}
