//! Approval routes: the approver's inbox and decisions.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{json_error, workflow_error_response};
use crate::{AppState, middleware::AuthUser};
use expensa_core::workflow::Decision;

/// Creates the approval routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/approvals/pending", get(list_pending))
        .route("/approvals/{approval_id}/approve", post(approve))
        .route("/approvals/{approval_id}/reject", post(reject))
}

/// Request body for a decision.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    /// Approver's note. Required when rejecting.
    pub comment: Option<String>,
}

impl DecisionRequest {
    /// Parses the request body. An empty body carries no comment.
    fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

/// GET `/approvals/pending` - Pending approvals assigned to the caller.
async fn list_pending(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    match state.approvals().list_pending(auth.user_id()).await {
        Ok(pending) => (StatusCode::OK, Json(json!({ "approvals": pending }))).into_response(),
        Err(e) => workflow_error_response(e),
    }
}

async fn decide(
    state: AppState,
    auth: &AuthUser,
    approval_id: Uuid,
    decision: Decision,
    body: &[u8],
) -> axum::response::Response {
    let comment = match DecisionRequest::from_body(body) {
        Ok(request) => request.comment,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),
    };

    match state
        .approvals()
        .resolve(approval_id, auth.user_id(), decision, comment)
        .await
    {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => workflow_error_response(e),
    }
}

/// POST `/approvals/{approval_id}/approve` - Approve; the body is optional.
async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(approval_id): Path<Uuid>,
    body: Bytes,
) -> impl IntoResponse {
    decide(state, &auth, approval_id, Decision::Approved, &body).await
}

/// POST `/approvals/{approval_id}/reject` - Reject with a mandatory comment.
async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(approval_id): Path<Uuid>,
    body: Bytes,
) -> impl IntoResponse {
    decide(state, &auth, approval_id, Decision::Rejected, &body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_body_parsing() {
        assert_eq!(DecisionRequest::from_body(b"").unwrap().comment, None);
        assert_eq!(DecisionRequest::from_body(b"{}").unwrap().comment, None);
        assert_eq!(
            DecisionRequest::from_body(br#"{"comment": "Missing receipt"}"#)
                .unwrap()
                .comment
                .as_deref(),
            Some("Missing receipt")
        );
        assert!(DecisionRequest::from_body(b"{not json").is_err());
    }
}
