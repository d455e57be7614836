//! Audit events emitted when an approval is resolved.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::workflow::types::Decision;

/// Comment recorded in the audit trail for approvals given without one.
pub const DEFAULT_APPROVAL_NOTE: &str = "Approved by manager";

/// Immutable record of an approval decision.
///
/// Written exactly once per resolution, in the same store transaction
/// as the status updates it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Audit entry ID.
    pub id: Uuid,
    /// Expense the decision applies to.
    pub expense_id: Uuid,
    /// User who performed the action.
    pub actor_id: Uuid,
    /// `expense_approved` or `expense_rejected`.
    pub event_type: String,
    /// Comment carried in the payload.
    pub comment: String,
    /// Approver carried in the payload.
    pub approver_id: Uuid,
    /// When the decision was taken.
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Assembles the event for an approval resolution.
    #[must_use]
    pub fn for_resolution(
        expense_id: Uuid,
        actor_id: Uuid,
        decision: Decision,
        comment: &str,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        let comment = if comment.is_empty() && decision == Decision::Approved {
            DEFAULT_APPROVAL_NOTE
        } else {
            comment
        };

        Self {
            id: Uuid::new_v4(),
            expense_id,
            actor_id,
            event_type: decision.event_type().to_string(),
            comment: comment.to_string(),
            approver_id: actor_id,
            occurred_at,
        }
    }

    /// JSON payload persisted with the entry.
    #[must_use]
    pub fn payload(&self) -> Value {
        json!({
            "comment": self.comment,
            "approver_id": self.approver_id,
        })
    }
}
