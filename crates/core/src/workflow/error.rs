//! Workflow error types for expense lifecycle management.
//!
//! This module defines all error types that can occur during
//! expense mutations, submissions and approval resolutions.

use expensa_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::workflow::types::{ExpenseOperation, ExpenseStatus};

/// Broad category of a workflow error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input failed validation.
    Validation,
    /// Record missing or not owned by the caller.
    NotFound,
    /// Record exists but its status forbids the operation.
    InvalidState,
    /// The backing store failed.
    Store,
}

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Rejection comment is required but not provided.
    #[error("Comment is required when rejecting an expense")]
    RejectionCommentRequired,

    /// Expense not found for the requester.
    #[error("Expense {0} not found")]
    ExpenseNotFound(Uuid),

    /// Approval not found, not pending, or assigned to another approver.
    #[error("Approval {0} not found")]
    ApprovalNotFound(Uuid),

    /// Expense status does not allow the requested operation.
    #[error("Cannot {operation} expense in {status} status")]
    InvalidState {
        /// The current status.
        status: ExpenseStatus,
        /// The attempted operation.
        operation: ExpenseOperation,
    },

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ExpenseStatus,
        /// The attempted target status.
        to: ExpenseStatus,
    },

    /// Backing store error.
    #[error("Store error: {0}")]
    Store(String),
}

impl WorkflowError {
    /// Returns the broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::RejectionCommentRequired => ErrorKind::Validation,
            Self::ExpenseNotFound(_) | Self::ApprovalNotFound(_) => ErrorKind::NotFound,
            Self::InvalidState { .. } | Self::InvalidTransition { .. } => ErrorKind::InvalidState,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::InvalidState => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Store => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::RejectionCommentRequired => "REJECTION_COMMENT_REQUIRED",
            Self::ExpenseNotFound(_) => "EXPENSE_NOT_FOUND",
            Self::ApprovalNotFound(_) => "APPROVAL_NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::Validation(err.to_string()),
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::InvalidState => Self::InvalidState(err.to_string()),
            ErrorKind::Store => Self::Database(err.to_string()),
        }
    }
}
