//! Entity re-exports.

pub use super::approvals::Entity as Approvals;
pub use super::audit_logs::Entity as AuditLogs;
pub use super::companies::Entity as Companies;
pub use super::expenses::Entity as Expenses;
pub use super::users::Entity as Users;
