//! In-memory implementation of the workflow storage ports.
//!
//! Honors the same conditional-update contract as the PostgreSQL store:
//! every status check and the write that depends on it happen under one
//! write lock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use expensa_shared::PageRequest;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::workflow::approval::{Approval, PendingApproval, ResolutionOutcome, SubmitterSummary};
use crate::workflow::audit::AuditEvent;
use crate::workflow::error::WorkflowError;
use crate::workflow::expense::{Expense, ExpenseChanges};
use crate::workflow::lifecycle::ExpenseLifecycle;
use crate::workflow::store::{ExpenseFilter, ExpenseStore, ManagerDirectory, Resolution};
use crate::workflow::types::{ApprovalStatus, ExpenseStatus};

#[derive(Debug, Default)]
struct State {
    expenses: HashMap<Uuid, Expense>,
    approvals: Vec<Approval>,
    audit_log: Vec<AuditEvent>,
    users: HashMap<Uuid, SubmitterSummary>,
    managers: HashMap<Uuid, Uuid>,
}

/// Lock-guarded store for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, WorkflowError> {
        self.state
            .read()
            .map_err(|_| WorkflowError::Store("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, WorkflowError> {
        self.state
            .write()
            .map_err(|_| WorkflowError::Store("in-memory store lock poisoned".to_string()))
    }

    /// Registers a user so pending approvals can show submitter details.
    pub fn register_user(&self, user: SubmitterSummary) -> Result<(), WorkflowError> {
        self.write()?.users.insert(user.id, user);
        Ok(())
    }

    /// Sets or clears the direct manager of `user_id`.
    pub fn set_manager(&self, user_id: Uuid, manager_id: Option<Uuid>) -> Result<(), WorkflowError> {
        let mut state = self.write()?;
        match manager_id {
            Some(manager_id) => state.managers.insert(user_id, manager_id),
            None => state.managers.remove(&user_id),
        };
        Ok(())
    }

    /// Returns a snapshot of the audit log, oldest first.
    pub fn audit_log(&self) -> Result<Vec<AuditEvent>, WorkflowError> {
        Ok(self.read()?.audit_log.clone())
    }
}

#[async_trait]
impl ExpenseStore for InMemoryStore {
    async fn insert_expense(&self, expense: Expense) -> Result<Expense, WorkflowError> {
        self.write()?.expenses.insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn find_expense(
        &self,
        id: Uuid,
        submitter_id: Option<Uuid>,
    ) -> Result<Option<Expense>, WorkflowError> {
        let state = self.read()?;
        Ok(state
            .expenses
            .get(&id)
            .filter(|e| submitter_id.is_none_or(|s| e.submitter_id == s))
            .cloned())
    }

    async fn list_expenses(
        &self,
        submitter_id: Uuid,
        filter: ExpenseFilter,
        page: PageRequest,
    ) -> Result<(Vec<Expense>, u64), WorkflowError> {
        let state = self.read()?;
        let mut matching: Vec<&Expense> = state
            .expenses
            .values()
            .filter(|e| e.submitter_id == submitter_id)
            .filter(|e| filter.status.is_none_or(|s| e.status == s))
            .collect();
        matching.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn update_draft_expense(
        &self,
        id: Uuid,
        submitter_id: Uuid,
        changes: &ExpenseChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, WorkflowError> {
        let mut state = self.write()?;
        let Some(expense) = state
            .expenses
            .get_mut(&id)
            .filter(|e| e.submitter_id == submitter_id && e.status == ExpenseStatus::Draft)
        else {
            return Ok(None);
        };

        changes.apply_to(expense, updated_at);
        Ok(Some(expense.clone()))
    }

    async fn delete_draft_expense(
        &self,
        id: Uuid,
        submitter_id: Uuid,
    ) -> Result<bool, WorkflowError> {
        let mut state = self.write()?;
        let is_draft = state
            .expenses
            .get(&id)
            .is_some_and(|e| e.submitter_id == submitter_id && e.status == ExpenseStatus::Draft);
        if is_draft {
            state.expenses.remove(&id);
        }
        Ok(is_draft)
    }

    async fn submit_if_draft(
        &self,
        id: Uuid,
        submitter_id: Uuid,
        submitted_at: DateTime<Utc>,
        approval: Option<Approval>,
    ) -> Result<Option<Expense>, WorkflowError> {
        let mut state = self.write()?;
        let Some(expense) = state
            .expenses
            .get_mut(&id)
            .filter(|e| e.submitter_id == submitter_id && e.status == ExpenseStatus::Draft)
        else {
            return Ok(None);
        };

        expense.status = ExpenseStatus::Pending;
        expense.submitted_at = Some(submitted_at);
        expense.updated_at = submitted_at;
        let submitted = expense.clone();

        if let Some(approval) = approval {
            state.approvals.push(approval);
        }
        Ok(Some(submitted))
    }

    async fn find_approval(
        &self,
        id: Uuid,
        approver_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<Option<Approval>, WorkflowError> {
        let state = self.read()?;
        Ok(state
            .approvals
            .iter()
            .find(|a| a.id == id && a.approver_id == approver_id && a.status == status)
            .cloned())
    }

    async fn list_approvals_for_expense(
        &self,
        expense_id: Uuid,
    ) -> Result<Vec<Approval>, WorkflowError> {
        let state = self.read()?;
        Ok(state
            .approvals
            .iter()
            .filter(|a| a.expense_id == expense_id)
            .cloned()
            .collect())
    }

    async fn list_pending_approvals(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<PendingApproval>, WorkflowError> {
        let state = self.read()?;
        let mut pending: Vec<PendingApproval> = state
            .approvals
            .iter()
            .filter(|a| a.approver_id == approver_id && a.status == ApprovalStatus::Pending)
            .filter_map(|a| {
                let expense = state.expenses.get(&a.expense_id)?;
                let submitter = state
                    .users
                    .get(&expense.submitter_id)
                    .cloned()
                    .unwrap_or_else(|| SubmitterSummary {
                        id: expense.submitter_id,
                        first_name: String::new(),
                        last_name: String::new(),
                        email: String::new(),
                    });
                Some(PendingApproval {
                    approval_id: a.id,
                    created_at: a.created_at,
                    expense: expense.clone(),
                    submitter,
                })
            })
            .collect();
        pending.sort_by(|a, b| b.expense.submitted_at.cmp(&a.expense.submitted_at));
        Ok(pending)
    }

    async fn resolve_if_pending(
        &self,
        resolution: Resolution,
    ) -> Result<Option<ResolutionOutcome>, WorkflowError> {
        let mut state = self.write()?;
        let state = &mut *state;

        let Some(approval) = state.approvals.iter_mut().find(|a| {
            a.id == resolution.approval_id
                && a.approver_id == resolution.approver_id
                && a.status == ApprovalStatus::Pending
        }) else {
            return Ok(None);
        };

        let expense = state
            .expenses
            .get_mut(&approval.expense_id)
            .ok_or(WorkflowError::ExpenseNotFound(approval.expense_id))?;
        let action =
            ExpenseLifecycle::resolve(expense.status, resolution.decision, resolution.approver_id)?;

        approval.status = resolution.decision.approval_status();
        approval.comment = Some(resolution.comment);
        approval.acted_at = Some(resolution.acted_at);
        expense.status = action.new_status();
        expense.updated_at = resolution.acted_at;
        state.audit_log.push(resolution.audit);

        Ok(Some(ResolutionOutcome {
            expense: expense.clone(),
            approval: approval.clone(),
        }))
    }
}

#[async_trait]
impl ManagerDirectory for InMemoryStore {
    async fn manager_of(&self, user_id: Uuid) -> Result<Option<Uuid>, WorkflowError> {
        Ok(self.read()?.managers.get(&user_id).copied())
    }
}
