//! End-to-end workflow scenarios against the in-memory store.

use chrono::NaiveDate;
use expensa_shared::PageRequest;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

use crate::workflow::approval::{ApprovalWorkflow, SubmitterSummary};
use crate::workflow::error::{ErrorKind, WorkflowError};
use crate::workflow::expense::{ExpensePatch, NewExpense};
use crate::workflow::memory::InMemoryStore;
use crate::workflow::service::ExpenseService;
use crate::workflow::store::{ExpenseFilter, ExpenseStore, ManagerDirectory};
use crate::workflow::types::{ApprovalStatus, Decision, ExpenseStatus};

struct Fixture {
    store: Arc<InMemoryStore>,
    expenses: ExpenseService<InMemoryStore, InMemoryStore>,
    approvals: ApprovalWorkflow<InMemoryStore, InMemoryStore>,
    company: Uuid,
    employee: Uuid,
    manager: Uuid,
}

impl Fixture {
    fn new(with_manager: bool) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let company = Uuid::new_v4();
        let employee = Uuid::new_v4();
        let manager = Uuid::new_v4();

        store
            .register_user(SubmitterSummary {
                id: employee,
                first_name: "Erin".to_string(),
                last_name: "Employee".to_string(),
                email: "erin@example.com".to_string(),
            })
            .unwrap();
        if with_manager {
            store.set_manager(employee, Some(manager)).unwrap();
        }

        Self {
            expenses: ExpenseService::new(Arc::clone(&store), Arc::clone(&store)),
            approvals: ApprovalWorkflow::new(Arc::clone(&store), Arc::clone(&store)),
            store,
            company,
            employee,
            manager,
        }
    }

    async fn draft(&self) -> Uuid {
        let input = NewExpense {
            description: Some("Flight to client".to_string()),
            amount: dec!(500.00),
            currency_code: Some("USD".to_string()),
            category: "Travel".to_string(),
            expense_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        };
        self.expenses
            .create(self.employee, self.company, input)
            .await
            .unwrap()
            .id
    }

    async fn submitted_approval(&self) -> (Uuid, Uuid) {
        let expense_id = self.draft().await;
        self.expenses
            .submit(expense_id, self.employee)
            .await
            .unwrap();
        let approvals = self
            .store
            .list_approvals_for_expense(expense_id)
            .await
            .unwrap();
        (expense_id, approvals[0].id)
    }
}

#[tokio::test]
async fn scenario_approve_with_manager() {
    let fx = Fixture::new(true);
    let expense_id = fx.draft().await;

    let submitted = fx.expenses.submit(expense_id, fx.employee).await.unwrap();
    assert_eq!(submitted.status, ExpenseStatus::Pending);
    assert!(submitted.submitted_at.is_some());

    let approvals = fx.store.list_approvals_for_expense(expense_id).await.unwrap();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].approver_id, fx.manager);
    assert_eq!(approvals[0].status, ApprovalStatus::Pending);

    let outcome = fx
        .approvals
        .resolve(approvals[0].id, fx.manager, Decision::Approved, Some("ok".into()))
        .await
        .unwrap();
    assert_eq!(outcome.expense.status, ExpenseStatus::Approved);
    assert_eq!(outcome.approval.status, ApprovalStatus::Approved);
    assert_eq!(outcome.approval.comment.as_deref(), Some("ok"));

    let audit = fx.store.audit_log().unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].event_type, "expense_approved");
    assert_eq!(audit[0].expense_id, expense_id);
    assert_eq!(audit[0].approver_id, fx.manager);
}

#[tokio::test]
async fn scenario_reject_without_comment_changes_nothing() {
    let fx = Fixture::new(true);
    let (expense_id, approval_id) = fx.submitted_approval().await;

    let err = fx
        .approvals
        .resolve(approval_id, fx.manager, Decision::Rejected, Some(String::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let expense = fx.expenses.get(expense_id, fx.employee).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);
    let approvals = fx.store.list_approvals_for_expense(expense_id).await.unwrap();
    assert_eq!(approvals[0].status, ApprovalStatus::Pending);
    assert!(fx.store.audit_log().unwrap().is_empty());
}

#[tokio::test]
async fn scenario_submit_without_manager_leaves_expense_unassigned() {
    let fx = Fixture::new(false);
    let expense_id = fx.draft().await;

    let submitted = fx.expenses.submit(expense_id, fx.employee).await.unwrap();
    assert_eq!(submitted.status, ExpenseStatus::Pending);
    assert!(fx.store.list_approvals_for_expense(expense_id).await.unwrap().is_empty());
    assert!(fx.approvals.list_pending(fx.manager).await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_other_approver_gets_not_found() {
    let fx = Fixture::new(true);
    let (expense_id, approval_id) = fx.submitted_approval().await;
    let intruder = Uuid::new_v4();

    let err = fx
        .approvals
        .resolve(approval_id, intruder, Decision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::ApprovalNotFound(id) if id == approval_id));

    let expense = fx.expenses.get(expense_id, fx.employee).await.unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);
    assert!(fx.store.audit_log().unwrap().is_empty());
}

#[tokio::test]
async fn resolving_twice_is_not_found() {
    let fx = Fixture::new(true);
    let (_, approval_id) = fx.submitted_approval().await;

    let first = fx
        .approvals
        .resolve(approval_id, fx.manager, Decision::Rejected, Some("Duplicate".into()))
        .await
        .unwrap();
    assert_eq!(first.expense.status, ExpenseStatus::Rejected);

    let second = fx
        .approvals
        .resolve(approval_id, fx.manager, Decision::Approved, None)
        .await
        .unwrap_err();
    assert_eq!(second.kind(), ErrorKind::NotFound);
    assert_eq!(fx.store.audit_log().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolves_settle_once() {
    let fx = Fixture::new(true);
    let (expense_id, approval_id) = fx.submitted_approval().await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let approvals = fx.approvals.clone();
            let manager = fx.manager;
            tokio::spawn(async move {
                let (decision, comment) = if i % 2 == 0 {
                    (Decision::Approved, None)
                } else {
                    (Decision::Rejected, Some("Over budget".to_string()))
                };
                approvals
                    .resolve(approval_id, manager, decision, comment)
                    .await
            })
        })
        .collect();

    let mut settled = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => settled += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::NotFound),
        }
    }

    assert_eq!(settled, 1);
    assert_eq!(fx.store.audit_log().unwrap().len(), 1);
    let expense = fx.store.find_expense(expense_id, None).await.unwrap().unwrap();
    assert_ne!(expense.status, ExpenseStatus::Pending);
}

#[tokio::test]
async fn reporting_chain_detects_loops() {
    let fx = Fixture::new(true);
    let director = Uuid::new_v4();
    fx.store.set_manager(fx.manager, Some(director)).unwrap();

    assert!(fx.store.reports_to(fx.employee, director).await.unwrap());
    assert!(fx.store.reports_to(fx.employee, fx.manager).await.unwrap());
    assert!(!fx.store.reports_to(director, fx.employee).await.unwrap());

    // Pre-existing loop between two strangers must still terminate.
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    fx.store.set_manager(a, Some(b)).unwrap();
    fx.store.set_manager(b, Some(a)).unwrap();
    assert!(!fx.store.reports_to(a, fx.employee).await.unwrap());
}

#[tokio::test]
async fn approve_without_comment_defaults_to_empty() {
    let fx = Fixture::new(true);
    let (_, approval_id) = fx.submitted_approval().await;

    let outcome = fx
        .approvals
        .resolve(approval_id, fx.manager, Decision::Approved, None)
        .await
        .unwrap();
    assert_eq!(outcome.approval.comment.as_deref(), Some(""));
}

#[tokio::test]
async fn non_draft_expense_rejects_mutations() {
    let fx = Fixture::new(true);
    let (expense_id, _) = fx.submitted_approval().await;

    let patch = ExpensePatch {
        amount: Some(dec!(10)),
        ..ExpensePatch::default()
    };
    let update = fx.expenses.update(expense_id, fx.employee, patch).await;
    let delete = fx.expenses.delete(expense_id, fx.employee).await;
    let submit = fx.expenses.submit(expense_id, fx.employee).await;

    for err in [update.unwrap_err(), delete.unwrap_err(), submit.unwrap_err()] {
        assert!(matches!(err, WorkflowError::InvalidState { status: ExpenseStatus::Pending, .. }));
    }
}

#[tokio::test]
async fn other_submitter_cannot_see_or_touch_expense() {
    let fx = Fixture::new(true);
    let expense_id = fx.draft().await;
    let stranger = Uuid::new_v4();

    assert!(matches!(
        fx.expenses.get(expense_id, stranger).await,
        Err(WorkflowError::ExpenseNotFound(_))
    ));
    assert!(matches!(
        fx.expenses.delete(expense_id, stranger).await,
        Err(WorkflowError::ExpenseNotFound(_))
    ));
    assert!(matches!(
        fx.expenses.submit(expense_id, stranger).await,
        Err(WorkflowError::ExpenseNotFound(_))
    ));
}

#[tokio::test]
async fn draft_update_and_delete() {
    let fx = Fixture::new(true);
    let expense_id = fx.draft().await;

    let patch: ExpensePatch =
        serde_json::from_str(r#"{"category": "Lodging", "amount": "320.40"}"#).unwrap();
    let updated = fx.expenses.update(expense_id, fx.employee, patch).await.unwrap();
    assert_eq!(updated.category, "Lodging");
    assert_eq!(updated.amount, dec!(320.40));
    assert_eq!(updated.status, ExpenseStatus::Draft);

    let empty = fx
        .expenses
        .update(expense_id, fx.employee, ExpensePatch::default())
        .await
        .unwrap_err();
    assert_eq!(empty.kind(), ErrorKind::Validation);

    fx.expenses.delete(expense_id, fx.employee).await.unwrap();
    assert!(matches!(
        fx.expenses.get(expense_id, fx.employee).await,
        Err(WorkflowError::ExpenseNotFound(_))
    ));
}

#[tokio::test]
async fn list_filters_and_paginates() {
    let fx = Fixture::new(true);
    for _ in 0..3 {
        fx.draft().await;
    }
    let (submitted, _) = fx.submitted_approval().await;

    let all = fx
        .expenses
        .list(fx.employee, ExpenseFilter::default(), PageRequest::new(1, 2))
        .await
        .unwrap();
    assert_eq!(all.data.len(), 2);
    assert_eq!(all.meta.total, 4);
    assert_eq!(all.meta.total_pages, 2);
    assert_eq!(all.data[0].id, submitted);

    let pending = fx
        .expenses
        .list(
            fx.employee,
            ExpenseFilter {
                status: Some(ExpenseStatus::Pending),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending.meta.total, 1);
    assert_eq!(pending.data[0].id, submitted);
}

#[tokio::test]
async fn pending_list_shows_submitter_newest_first() {
    let fx = Fixture::new(true);
    let (older, _) = fx.submitted_approval().await;
    let (newer, _) = fx.submitted_approval().await;

    let pending = fx.approvals.list_pending(fx.manager).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].expense.id, newer);
    assert_eq!(pending[1].expense.id, older);
    assert_eq!(pending[0].submitter.email, "erin@example.com");
}
