//! Expense routes: draft CRUD and submission.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{json_error, workflow_error_response};
use crate::{AppState, middleware::AuthUser};
use expensa_core::workflow::{ExpenseFilter, ExpensePatch, ExpenseStatus, NewExpense};
use expensa_shared::PageRequest;

/// Creates the expense routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{expense_id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/expenses/{expense_id}/submit", post(submit_expense))
}

/// Query parameters for listing expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ListExpensesQuery {
    /// Only return expenses in this status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    #[serde(alias = "per_page")]
    pub limit: Option<u32>,
}

impl ListExpensesQuery {
    fn filter(&self) -> Result<ExpenseFilter, String> {
        let status = match self.status.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                ExpenseStatus::parse(raw).ok_or_else(|| format!("Unknown status '{raw}'"))?,
            ),
        };
        Ok(ExpenseFilter { status })
    }

    fn page(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(default.page),
            self.limit.unwrap_or(default.per_page),
        )
    }
}

/// Maps a malformed JSON body to a 400 validation error.
pub(crate) fn body_rejection(rejection: &JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        rejection.body_text(),
    )
}

/// GET `/expenses` - List the caller's expenses, most recently updated first.
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListExpensesQuery>,
) -> impl IntoResponse {
    let filter = match query.filter() {
        Ok(f) => f,
        Err(message) => return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message),
    };

    match state
        .expenses()
        .list(auth.user_id(), filter, query.page())
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => workflow_error_response(e),
    }
}

/// POST `/expenses` - Create a draft expense.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<NewExpense>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return body_rejection(&rejection),
    };

    match state
        .expenses()
        .create(auth.user_id(), auth.company_id(), payload)
        .await
    {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => workflow_error_response(e),
    }
}

/// GET `/expenses/{expense_id}` - Fetch one of the caller's expenses.
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.expenses().get(expense_id, auth.user_id()).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => workflow_error_response(e),
    }
}

/// PUT `/expenses/{expense_id}` - Partially update a draft.
async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
    payload: Result<Json<ExpensePatch>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match payload {
        Ok(p) => p,
        Err(rejection) => return body_rejection(&rejection),
    };

    match state
        .expenses()
        .update(expense_id, auth.user_id(), patch)
        .await
    {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => workflow_error_response(e),
    }
}

/// DELETE `/expenses/{expense_id}` - Delete a draft.
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.expenses().delete(expense_id, auth.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => workflow_error_response(e),
    }
}

/// POST `/expenses/{expense_id}/submit` - Submit a draft for approval.
async fn submit_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.expenses().submit(expense_id, auth.user_id()).await {
        Ok(expense) => (StatusCode::OK, Json(expense)).into_response(),
        Err(e) => workflow_error_response(e),
    }
}
