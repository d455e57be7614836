//! Mapping of domain errors to JSON responses.
//!
//! Every error body has the shape `{"error": code, "message": text}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use expensa_core::workflow::WorkflowError;
use expensa_shared::AppError;

/// Builds a JSON error response.
pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Maps an application error, hiding server-side details.
pub fn app_error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    json_error(status, err.error_code(), err.public_message())
}

/// Maps a workflow error.
pub fn workflow_error_response(err: WorkflowError) -> Response {
    let code = err.error_code();
    let app: AppError = err.into();
    let status =
        StatusCode::from_u16(app.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %app, "Workflow operation failed");
    }
    json_error(status, code, app.public_message())
}

/// Maps a database error from a repository call.
pub fn db_error_response(err: &sea_orm::DbErr, context: &str) -> Response {
    error!(error = %err, context, "Database error");
    app_error_response(&AppError::Database(err.to_string()))
}
