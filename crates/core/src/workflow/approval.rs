//! Single-step approval workflow engine.
//!
//! Every submitted expense gets at most one approval, assigned to the
//! submitter's direct manager. The approver resolves it exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::workflow::audit::AuditEvent;
use crate::workflow::error::WorkflowError;
use crate::workflow::expense::Expense;
use crate::workflow::lifecycle::ExpenseLifecycle;
use crate::workflow::store::{ExpenseStore, ManagerDirectory, Resolution};
use crate::workflow::types::{ApprovalStatus, Decision};

/// Authorization record tying one expense to one approver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    /// Approval ID.
    pub id: Uuid,
    /// Expense awaiting the decision.
    pub expense_id: Uuid,
    /// User allowed to resolve this approval.
    pub approver_id: Uuid,
    /// Current status.
    pub status: ApprovalStatus,
    /// Decision comment, set on resolution.
    pub comment: Option<String>,
    /// When the decision was taken.
    pub acted_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Approval {
    /// Creates a pending approval.
    #[must_use]
    pub fn pending(expense_id: Uuid, approver_id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            approver_id,
            status: ApprovalStatus::Pending,
            comment: None,
            acted_at: None,
            created_at,
        }
    }
}

/// Submitter details shown to approvers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitterSummary {
    /// User ID.
    pub id: Uuid,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
}

/// A pending approval joined with its expense and submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    /// Approval ID.
    pub approval_id: Uuid,
    /// When the approval was created.
    pub created_at: DateTime<Utc>,
    /// The expense awaiting a decision.
    pub expense: Expense,
    /// Who submitted it.
    pub submitter: SubmitterSummary,
}

/// Records returned after a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// The expense in its terminal status.
    pub expense: Expense,
    /// The resolved approval.
    pub approval: Approval,
}

/// Approval workflow engine over injected storage ports.
pub struct ApprovalWorkflow<S: ?Sized, D: ?Sized> {
    store: Arc<S>,
    directory: Arc<D>,
}

impl<S: ?Sized, D: ?Sized> Clone for ApprovalWorkflow<S, D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<S, D> ApprovalWorkflow<S, D>
where
    S: ExpenseStore + ?Sized,
    D: ManagerDirectory + ?Sized,
{
    /// Creates a new workflow engine.
    pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        Self { store, directory }
    }

    /// Builds the approval for a freshly submitted expense.
    ///
    /// Returns `None` when the submitter has no manager. The caller hands the
    /// approval to [`ExpenseStore::submit_if_draft`] so both writes land together.
    pub async fn create_for_submission(
        &self,
        expense_id: Uuid,
        submitter_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<Option<Approval>, WorkflowError> {
        match self.directory.manager_of(submitter_id).await? {
            Some(manager_id) => Ok(Some(Approval::pending(expense_id, manager_id, created_at))),
            None => {
                warn!(
                    %expense_id,
                    %submitter_id,
                    "Submitter has no manager; expense will stay pending without an approver"
                );
                Ok(None)
            }
        }
    }

    /// Lists pending approvals assigned to `approver_id`.
    pub async fn list_pending(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<PendingApproval>, WorkflowError> {
        self.store.list_pending_approvals(approver_id).await
    }

    /// Resolves a pending approval.
    ///
    /// Fails with `NotFound` when the approval does not exist, is assigned to
    /// another approver, or was already resolved.
    pub async fn resolve(
        &self,
        approval_id: Uuid,
        actor_id: Uuid,
        decision: Decision,
        comment: Option<String>,
    ) -> Result<ResolutionOutcome, WorkflowError> {
        let comment = ExpenseLifecycle::decision_comment(decision, comment)?;

        let approval = self
            .store
            .find_approval(approval_id, actor_id, ApprovalStatus::Pending)
            .await?
            .ok_or(WorkflowError::ApprovalNotFound(approval_id))?;

        let acted_at = Utc::now();
        let audit =
            AuditEvent::for_resolution(approval.expense_id, actor_id, decision, &comment, acted_at);

        let outcome = self
            .store
            .resolve_if_pending(Resolution {
                approval_id,
                approver_id: actor_id,
                decision,
                comment,
                acted_at,
                audit,
            })
            .await?
            .ok_or(WorkflowError::ApprovalNotFound(approval_id))?;

        info!(
            %approval_id,
            expense_id = %outcome.expense.id,
            %decision,
            "Approval resolved"
        );

        Ok(outcome)
    }
}
