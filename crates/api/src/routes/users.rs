//! User directory routes: listing and manager assignment.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{db_error_response, json_error, workflow_error_response};
use crate::routes::auth::user_info;
use crate::routes::expenses::body_rejection;
use crate::{AppState, middleware::AuthUser};
use expensa_core::workflow::ManagerDirectory;
use expensa_db::UserRepository;

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{user_id}/manager", put(assign_manager))
}

/// Request body for manager assignment. `null` clears the manager.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignManagerRequest {
    /// New manager, or `None` to clear.
    #[serde(alias = "manager_id")]
    pub manager_id: Option<Uuid>,
}

fn forbidden() -> axum::response::Response {
    json_error(
        StatusCode::FORBIDDEN,
        "FORBIDDEN",
        "Only administrators can manage users",
    )
}

/// GET `/users` - List the users of the caller's company.
async fn list_users(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.role().can_manage_users() {
        return forbidden();
    }

    match UserRepository::new((*state.db).clone())
        .list_by_company(auth.company_id())
        .await
    {
        Ok(users) => {
            let users: Vec<_> = users.iter().map(user_info).collect();
            (StatusCode::OK, Json(json!({ "users": users }))).into_response()
        }
        Err(e) => db_error_response(&e, "list users"),
    }
}

/// PUT `/users/{user_id}/manager` - Assign or clear a user's manager.
async fn assign_manager(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    payload: Result<Json<AssignManagerRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return body_rejection(&rejection),
    };

    if !auth.role().can_manage_users() {
        return forbidden();
    }

    let repo = UserRepository::new((*state.db).clone());

    match repo.find_by_id(user_id).await {
        Ok(Some(user)) if user.company_id == auth.company_id() => {}
        Ok(Some(_)) => return forbidden(),
        Ok(None) => {
            return json_error(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found");
        }
        Err(e) => return db_error_response(&e, "assign manager user lookup"),
    }

    if let Some(manager_id) = payload.manager_id {
        if manager_id == user_id {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "A user cannot manage themselves",
            );
        }
        match repo.find_by_id(manager_id).await {
            Ok(Some(manager)) if manager.company_id == auth.company_id() => {}
            Ok(Some(_)) => return forbidden(),
            Ok(None) => {
                return json_error(
                    StatusCode::NOT_FOUND,
                    "USER_NOT_FOUND",
                    "Manager not found",
                );
            }
            Err(e) => return db_error_response(&e, "assign manager lookup"),
        }
        match repo.reports_to(manager_id, user_id).await {
            Ok(false) => {}
            Ok(true) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    "Manager assignment would create a reporting cycle",
                );
            }
            Err(e) => return workflow_error_response(e),
        }
    }

    match repo.set_manager(user_id, payload.manager_id).await {
        Ok(Some(user)) => {
            info!(%user_id, manager_id = ?payload.manager_id, admin_id = %auth.user_id(), "Manager assigned");
            (StatusCode::OK, Json(user_info(&user))).into_response()
        }
        Ok(None) => json_error(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "User not found"),
        Err(e) => db_error_response(&e, "assign manager"),
    }
}
