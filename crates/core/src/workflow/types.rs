//! Workflow domain types for expense lifecycle management.
//!
//! This module defines the statuses an expense and its approval move
//! through, the decision an approver makes, and the workflow actions
//! produced by valid transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Expense status in the approval workflow.
///
/// The valid transitions are:
/// - Draft → Pending (submit)
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
///
/// Approved and Rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    /// Expense is being drafted and can be modified by its submitter.
    Draft,
    /// Expense has been submitted and awaits a decision.
    Pending,
    /// Expense has been approved (terminal).
    Approved,
    /// Expense has been rejected (terminal).
    Rejected,
}

impl ExpenseStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Draft, Self::Pending, Self::Approved, Self::Rejected];

    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if the expense fields can still be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single approval record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Awaiting a decision from the approver.
    Pending,
    /// The approver accepted the expense.
    Approved,
    /// The approver rejected the expense.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decision taken by an approver on a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Accept the expense.
    Approved,
    /// Reject the expense. Requires a comment.
    Rejected,
}

impl Decision {
    /// Returns the string representation of the decision.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Status the expense takes once this decision is applied.
    #[must_use]
    pub fn expense_status(&self) -> ExpenseStatus {
        match self {
            Self::Approved => ExpenseStatus::Approved,
            Self::Rejected => ExpenseStatus::Rejected,
        }
    }

    /// Status the approval takes once this decision is applied.
    #[must_use]
    pub fn approval_status(&self) -> ApprovalStatus {
        match self {
            Self::Approved => ApprovalStatus::Approved,
            Self::Rejected => ApprovalStatus::Rejected,
        }
    }

    /// Audit event type recorded for this decision.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Approved => "expense_approved",
            Self::Rejected => "expense_rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation a submitter attempts on one of their expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseOperation {
    /// Change expense fields.
    Update,
    /// Remove the expense.
    Delete,
    /// Send the expense for approval.
    Submit,
}

impl ExpenseOperation {
    /// Returns the verb used in error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Submit => "submit",
        }
    }
}

impl fmt::Display for ExpenseOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow action representing a state transition with audit data.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Submit a draft expense for approval.
    Submit {
        /// The new status after submission.
        new_status: ExpenseStatus,
        /// The user who submitted the expense.
        submitted_by: Uuid,
        /// When the expense was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Resolve a pending expense with an approver decision.
    Resolve {
        /// The new status after resolution.
        new_status: ExpenseStatus,
        /// The decision taken.
        decision: Decision,
        /// The approver who resolved the expense.
        resolved_by: Uuid,
        /// When the expense was resolved.
        resolved_at: DateTime<Utc>,
    },
}

impl WorkflowAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> ExpenseStatus {
        match self {
            Self::Submit { new_status, .. } | Self::Resolve { new_status, .. } => *new_status,
        }
    }

    /// Returns the action name for logging and audit purposes.
    #[must_use]
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::Resolve {
                decision: Decision::Approved,
                ..
            } => "approve",
            Self::Resolve {
                decision: Decision::Rejected,
                ..
            } => "reject",
        }
    }
}
