//! Expense workflow management for Expensa.
//!
//! This module implements the expense lifecycle state machine, the
//! single-step approval workflow engine and the audit event contract.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (`ExpenseStatus`, `Decision`, `WorkflowAction`)
//! - `error` - Workflow-specific error types
//! - `lifecycle` - Pure state transition logic
//! - `expense` - Expense records and their validated inputs
//! - `approval` - Approval records and the approval workflow engine
//! - `audit` - Audit events emitted on approval resolution
//! - `store` - Storage ports implemented by the persistence layer
//! - `memory` - In-memory store honoring the same conditional-update contract
//! - `service` - Expense lifecycle manager

pub mod approval;
pub mod audit;
pub mod error;
pub mod expense;
pub mod lifecycle;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod expense_props;
#[cfg(test)]
mod lifecycle_props;
#[cfg(test)]
mod scenarios;

pub use approval::{
    Approval, ApprovalWorkflow, PendingApproval, ResolutionOutcome, SubmitterSummary,
};
pub use audit::AuditEvent;
pub use error::{ErrorKind, WorkflowError};
pub use expense::{Expense, ExpenseChanges, ExpenseFields, ExpensePatch, NewExpense};
pub use lifecycle::ExpenseLifecycle;
pub use memory::InMemoryStore;
pub use service::ExpenseService;
pub use store::{ExpenseFilter, ExpenseStore, ManagerDirectory, Resolution};
pub use types::{ApprovalStatus, Decision, ExpenseOperation, ExpenseStatus, WorkflowAction};
