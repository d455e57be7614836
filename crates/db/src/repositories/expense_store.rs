//! PostgreSQL implementation of the expense workflow store.
//!
//! Every status-dependent write is a single `UPDATE ... WHERE status = ...`
//! whose affected-row count decides the outcome, so concurrent requests
//! cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{error, info};
use uuid::Uuid;

use expensa_core::currency::CurrencyCode;
use expensa_core::workflow::{
    Approval, Expense, ExpenseChanges, ExpenseFilter, ExpenseLifecycle, ExpenseStore,
    PendingApproval, Resolution, ResolutionOutcome, SubmitterSummary, WorkflowError,
};
use expensa_shared::PageRequest;

use crate::entities::{
    approvals, audit_logs, expenses,
    sea_orm_active_enums::{ApprovalStatus, ExpenseStatus},
    users,
};

/// Expense store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgExpenseStore {
    db: DatabaseConnection,
}

impl PgExpenseStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_expense<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<Expense, WorkflowError> {
        expenses::Entity::find_by_id(id)
            .one(conn)
            .await
            .map_err(store_err)?
            .ok_or(WorkflowError::ExpenseNotFound(id))
            .and_then(expense_to_core)
    }
}

#[async_trait]
impl ExpenseStore for PgExpenseStore {
    async fn insert_expense(&self, expense: Expense) -> Result<Expense, WorkflowError> {
        let model = expenses::ActiveModel {
            id: Set(expense.id),
            submitter_id: Set(expense.submitter_id),
            company_id: Set(expense.company_id),
            description: Set(expense.description),
            amount: Set(expense.amount),
            currency_code: Set(expense.currency_code.as_str().to_string()),
            category: Set(expense.category),
            expense_date: Set(expense.expense_date),
            status: Set(expense.status.into()),
            submitted_at: Set(expense.submitted_at.map(Into::into)),
            created_at: Set(expense.created_at.into()),
            updated_at: Set(expense.updated_at.into()),
        };

        let inserted = model.insert(&self.db).await.map_err(store_err)?;
        expense_to_core(inserted)
    }

    async fn find_expense(
        &self,
        id: Uuid,
        submitter_id: Option<Uuid>,
    ) -> Result<Option<Expense>, WorkflowError> {
        let mut query = expenses::Entity::find_by_id(id);
        if let Some(submitter_id) = submitter_id {
            query = query.filter(expenses::Column::SubmitterId.eq(submitter_id));
        }

        query
            .one(&self.db)
            .await
            .map_err(store_err)?
            .map(expense_to_core)
            .transpose()
    }

    async fn list_expenses(
        &self,
        submitter_id: Uuid,
        filter: ExpenseFilter,
        page: PageRequest,
    ) -> Result<(Vec<Expense>, u64), WorkflowError> {
        let mut query =
            expenses::Entity::find().filter(expenses::Column::SubmitterId.eq(submitter_id));
        if let Some(status) = filter.status {
            query = query.filter(expenses::Column::Status.eq(ExpenseStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await.map_err(store_err)?;
        let rows = query
            .order_by_desc(expenses::Column::UpdatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(store_err)?;

        let items = rows
            .into_iter()
            .map(expense_to_core)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((items, total))
    }

    async fn update_draft_expense(
        &self,
        id: Uuid,
        submitter_id: Uuid,
        changes: &ExpenseChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, WorkflowError> {
        let mut patch = expenses::ActiveModel {
            updated_at: Set(updated_at.into()),
            ..Default::default()
        };
        if let Some(description) = &changes.description {
            patch.description = Set(description.clone());
        }
        if let Some(amount) = changes.amount {
            patch.amount = Set(amount);
        }
        if let Some(currency_code) = changes.currency_code {
            patch.currency_code = Set(currency_code.as_str().to_string());
        }
        if let Some(category) = &changes.category {
            patch.category = Set(category.clone());
        }
        if let Some(expense_date) = changes.expense_date {
            patch.expense_date = Set(expense_date);
        }

        let txn = self.db.begin().await.map_err(store_err)?;
        let result = expenses::Entity::update_many()
            .set(patch)
            .filter(expenses::Column::Id.eq(id))
            .filter(expenses::Column::SubmitterId.eq(submitter_id))
            .filter(expenses::Column::Status.eq(ExpenseStatus::Draft))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(store_err)?;
            return Ok(None);
        }

        let updated = Self::fetch_expense(&txn, id).await?;
        txn.commit().await.map_err(store_err)?;
        Ok(Some(updated))
    }

    async fn delete_draft_expense(
        &self,
        id: Uuid,
        submitter_id: Uuid,
    ) -> Result<bool, WorkflowError> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(id))
            .filter(expenses::Column::SubmitterId.eq(submitter_id))
            .filter(expenses::Column::Status.eq(ExpenseStatus::Draft))
            .exec(&self.db)
            .await
            .map_err(store_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn submit_if_draft(
        &self,
        id: Uuid,
        submitter_id: Uuid,
        submitted_at: DateTime<Utc>,
        approval: Option<Approval>,
    ) -> Result<Option<Expense>, WorkflowError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let result = expenses::Entity::update_many()
            .set(expenses::ActiveModel {
                status: Set(ExpenseStatus::Pending),
                submitted_at: Set(Some(submitted_at.into())),
                updated_at: Set(submitted_at.into()),
                ..Default::default()
            })
            .filter(expenses::Column::Id.eq(id))
            .filter(expenses::Column::SubmitterId.eq(submitter_id))
            .filter(expenses::Column::Status.eq(ExpenseStatus::Draft))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(store_err)?;
            return Ok(None);
        }

        if let Some(approval) = approval {
            approvals::ActiveModel {
                id: Set(approval.id),
                expense_id: Set(approval.expense_id),
                approver_id: Set(approval.approver_id),
                status: Set(approval.status.into()),
                comment: Set(approval.comment),
                acted_at: Set(approval.acted_at.map(Into::into)),
                created_at: Set(approval.created_at.into()),
            }
            .insert(&txn)
            .await
            .map_err(store_err)?;
        }

        let submitted = Self::fetch_expense(&txn, id).await?;
        txn.commit().await.map_err(store_err)?;

        info!(expense_id = %id, "Expense moved to pending");
        Ok(Some(submitted))
    }

    async fn find_approval(
        &self,
        id: Uuid,
        approver_id: Uuid,
        status: expensa_core::workflow::ApprovalStatus,
    ) -> Result<Option<Approval>, WorkflowError> {
        let approval = approvals::Entity::find_by_id(id)
            .filter(approvals::Column::ApproverId.eq(approver_id))
            .filter(approvals::Column::Status.eq(ApprovalStatus::from(status)))
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(approval.map(approval_to_core))
    }

    async fn list_approvals_for_expense(
        &self,
        expense_id: Uuid,
    ) -> Result<Vec<Approval>, WorkflowError> {
        let rows = approvals::Entity::find()
            .filter(approvals::Column::ExpenseId.eq(expense_id))
            .order_by_asc(approvals::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        Ok(rows.into_iter().map(approval_to_core).collect())
    }

    async fn list_pending_approvals(
        &self,
        approver_id: Uuid,
    ) -> Result<Vec<PendingApproval>, WorkflowError> {
        let rows = approvals::Entity::find()
            .filter(approvals::Column::ApproverId.eq(approver_id))
            .filter(approvals::Column::Status.eq(ApprovalStatus::Pending))
            .find_also_related(expenses::Entity)
            .order_by_desc(expenses::Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        let submitter_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, expense)| expense.as_ref().map(|e| e.submitter_id))
            .collect();
        let submitters: HashMap<Uuid, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(submitter_ids))
            .all(&self.db)
            .await
            .map_err(store_err)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut pending = Vec::with_capacity(rows.len());
        for (approval, expense) in rows {
            let Some(expense) = expense else { continue };
            let Some(submitter) = submitters.get(&expense.submitter_id) else {
                continue;
            };
            pending.push(PendingApproval {
                approval_id: approval.id,
                created_at: approval.created_at.with_timezone(&Utc),
                submitter: SubmitterSummary {
                    id: submitter.id,
                    first_name: submitter.first_name.clone(),
                    last_name: submitter.last_name.clone(),
                    email: submitter.email.clone(),
                },
                expense: expense_to_core(expense)?,
            });
        }

        Ok(pending)
    }

    async fn resolve_if_pending(
        &self,
        resolution: Resolution,
    ) -> Result<Option<ResolutionOutcome>, WorkflowError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let result = approvals::Entity::update_many()
            .set(approvals::ActiveModel {
                status: Set(resolution.decision.approval_status().into()),
                comment: Set(Some(resolution.comment.clone())),
                acted_at: Set(Some(resolution.acted_at.into())),
                ..Default::default()
            })
            .filter(approvals::Column::Id.eq(resolution.approval_id))
            .filter(approvals::Column::ApproverId.eq(resolution.approver_id))
            .filter(approvals::Column::Status.eq(ApprovalStatus::Pending))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(store_err)?;
            return Ok(None);
        }

        let approval = approvals::Entity::find_by_id(resolution.approval_id)
            .one(&txn)
            .await
            .map_err(store_err)?
            .map(approval_to_core)
            .ok_or(WorkflowError::ApprovalNotFound(resolution.approval_id))?;

        let current = Self::fetch_expense(&txn, approval.expense_id).await?;
        let action = ExpenseLifecycle::resolve(
            current.status,
            resolution.decision,
            resolution.approver_id,
        )?;

        let cascaded = expenses::Entity::update_many()
            .set(expenses::ActiveModel {
                status: Set(action.new_status().into()),
                updated_at: Set(resolution.acted_at.into()),
                ..Default::default()
            })
            .filter(expenses::Column::Id.eq(approval.expense_id))
            .filter(expenses::Column::Status.eq(ExpenseStatus::Pending))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if cascaded.rows_affected == 0 {
            return Err(WorkflowError::InvalidTransition {
                from: current.status,
                to: action.new_status(),
            });
        }

        let audit = &resolution.audit;
        audit_logs::ActiveModel {
            id: Set(audit.id),
            expense_id: Set(audit.expense_id),
            user_id: Set(audit.actor_id),
            event_type: Set(audit.event_type.clone()),
            payload: Set(audit.payload()),
            created_at: Set(audit.occurred_at.into()),
        }
        .insert(&txn)
        .await
        .map_err(store_err)?;

        let expense = Self::fetch_expense(&txn, approval.expense_id).await?;
        txn.commit().await.map_err(store_err)?;

        Ok(Some(ResolutionOutcome { expense, approval }))
    }
}

fn store_err(e: DbErr) -> WorkflowError {
    error!(error = %e, "Expense store query failed");
    WorkflowError::Store(e.to_string())
}

fn expense_to_core(model: expenses::Model) -> Result<Expense, WorkflowError> {
    let currency_code = CurrencyCode::parse(&model.currency_code)
        .map_err(|e| WorkflowError::Store(format!("expense {}: {e}", model.id)))?;

    Ok(Expense {
        id: model.id,
        submitter_id: model.submitter_id,
        company_id: model.company_id,
        description: model.description,
        amount: model.amount,
        currency_code,
        category: model.category,
        expense_date: model.expense_date,
        status: model.status.into(),
        submitted_at: model.submitted_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn approval_to_core(model: approvals::Model) -> Approval {
    Approval {
        id: model.id,
        expense_id: model.expense_id,
        approver_id: model.approver_id,
        status: model.status.into(),
        comment: model.comment,
        acted_at: model.acted_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
