//! `SeaORM` entity definitions.

pub mod prelude;

pub mod approvals;
pub mod audit_logs;
pub mod companies;
pub mod expenses;
pub mod sea_orm_active_enums;
pub mod users;
