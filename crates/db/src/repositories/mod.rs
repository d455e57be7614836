//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod audit_log;
pub mod company;
pub mod expense_store;
pub mod user;

pub use audit_log::AuditLogRepository;
pub use company::CompanyRepository;
pub use expense_store::PgExpenseStore;
pub use user::{CreateUserInput, UserRepository};
