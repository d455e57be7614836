//! Expense lifecycle manager.
//!
//! Owns the draft-only rules for creating, editing, deleting and submitting
//! expenses, and hands submissions to the approval workflow engine.

use chrono::Utc;
use expensa_shared::{PageRequest, PageResponse};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::workflow::approval::ApprovalWorkflow;
use crate::workflow::error::WorkflowError;
use crate::workflow::expense::{Expense, ExpensePatch, NewExpense};
use crate::workflow::lifecycle::ExpenseLifecycle;
use crate::workflow::store::{ExpenseFilter, ExpenseStore, ManagerDirectory};
use crate::workflow::types::{ExpenseOperation, WorkflowAction};

/// Service for expense mutations scoped to their submitter.
pub struct ExpenseService<S: ?Sized, D: ?Sized> {
    store: Arc<S>,
    workflow: ApprovalWorkflow<S, D>,
}

impl<S, D> ExpenseService<S, D>
where
    S: ExpenseStore + ?Sized,
    D: ManagerDirectory + ?Sized,
{
    /// Creates a new expense service.
    pub fn new(store: Arc<S>, directory: Arc<D>) -> Self {
        Self {
            workflow: ApprovalWorkflow::new(Arc::clone(&store), directory),
            store,
        }
    }

    /// Creates a draft expense.
    pub async fn create(
        &self,
        submitter_id: Uuid,
        company_id: Uuid,
        input: NewExpense,
    ) -> Result<Expense, WorkflowError> {
        let fields = input.validate()?;
        let expense = Expense::draft(submitter_id, company_id, fields, Utc::now());
        let expense = self.store.insert_expense(expense).await?;

        info!(expense_id = %expense.id, %submitter_id, "Expense created");
        Ok(expense)
    }

    /// Returns one of the requester's expenses.
    pub async fn get(&self, expense_id: Uuid, requester_id: Uuid) -> Result<Expense, WorkflowError> {
        self.store
            .find_expense(expense_id, Some(requester_id))
            .await?
            .ok_or(WorkflowError::ExpenseNotFound(expense_id))
    }

    /// Lists the requester's expenses, most recently updated first.
    pub async fn list(
        &self,
        requester_id: Uuid,
        filter: ExpenseFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Expense>, WorkflowError> {
        let page = page.normalized();
        let (items, total) = self.store.list_expenses(requester_id, filter, page).await?;
        Ok(PageResponse::new(items, page.page, page.per_page, total))
    }

    /// Applies a partial update to a draft expense.
    pub async fn update(
        &self,
        expense_id: Uuid,
        requester_id: Uuid,
        patch: ExpensePatch,
    ) -> Result<Expense, WorkflowError> {
        let current = self.get(expense_id, requester_id).await?;
        ExpenseLifecycle::ensure_editable(current.status, ExpenseOperation::Update)?;
        let changes = patch.validate()?;

        let updated = self
            .store
            .update_draft_expense(expense_id, requester_id, &changes, Utc::now())
            .await?;
        let updated = self
            .settle_lost_race(updated, expense_id, requester_id, ExpenseOperation::Update)
            .await?;

        info!(%expense_id, "Expense updated");
        Ok(updated)
    }

    /// Deletes a draft expense.
    pub async fn delete(&self, expense_id: Uuid, requester_id: Uuid) -> Result<(), WorkflowError> {
        let current = self.get(expense_id, requester_id).await?;
        ExpenseLifecycle::ensure_editable(current.status, ExpenseOperation::Delete)?;

        if !self
            .store
            .delete_draft_expense(expense_id, requester_id)
            .await?
        {
            self.settle_lost_race(None, expense_id, requester_id, ExpenseOperation::Delete)
                .await?;
        }

        info!(%expense_id, "Expense deleted");
        Ok(())
    }

    /// Submits a draft expense and creates its approval.
    ///
    /// Submitters without a manager end up with a pending expense and no
    /// approval; the workflow engine logs that case.
    pub async fn submit(&self, expense_id: Uuid, requester_id: Uuid) -> Result<Expense, WorkflowError> {
        let current = self.get(expense_id, requester_id).await?;
        let WorkflowAction::Submit { submitted_at, .. } =
            ExpenseLifecycle::submit(current.status, requester_id)?
        else {
            return Err(WorkflowError::InvalidState {
                status: current.status,
                operation: ExpenseOperation::Submit,
            });
        };

        let approval = self
            .workflow
            .create_for_submission(expense_id, requester_id, submitted_at)
            .await?;
        let has_approver = approval.is_some();

        let submitted = self
            .store
            .submit_if_draft(expense_id, requester_id, submitted_at, approval)
            .await?;
        let submitted = self
            .settle_lost_race(submitted, expense_id, requester_id, ExpenseOperation::Submit)
            .await?;

        info!(%expense_id, has_approver, "Expense submitted");
        Ok(submitted)
    }

    /// Turns an unmatched conditional write into the right error.
    ///
    /// The record either vanished (`NotFound`) or left draft between the read
    /// and the write (`InvalidState`).
    async fn settle_lost_race(
        &self,
        written: Option<Expense>,
        expense_id: Uuid,
        requester_id: Uuid,
        operation: ExpenseOperation,
    ) -> Result<Expense, WorkflowError> {
        if let Some(expense) = written {
            return Ok(expense);
        }
        let current = self.get(expense_id, requester_id).await?;
        Err(WorkflowError::InvalidState {
            status: current.status,
            operation,
        })
    }
}
