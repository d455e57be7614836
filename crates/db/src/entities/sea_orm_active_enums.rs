//! `SeaORM` mappings of the PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `expense_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_status")]
pub enum ExpenseStatus {
    /// Draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Pending.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// `approval_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "approval_status")]
pub enum ApprovalStatus {
    /// Pending.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    /// Employee.
    #[sea_orm(string_value = "employee")]
    Employee,
    /// Manager.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Admin.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// CFO.
    #[sea_orm(string_value = "cfo")]
    Cfo,
}

impl From<ExpenseStatus> for expensa_core::workflow::ExpenseStatus {
    fn from(status: ExpenseStatus) -> Self {
        match status {
            ExpenseStatus::Draft => Self::Draft,
            ExpenseStatus::Pending => Self::Pending,
            ExpenseStatus::Approved => Self::Approved,
            ExpenseStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<expensa_core::workflow::ExpenseStatus> for ExpenseStatus {
    fn from(status: expensa_core::workflow::ExpenseStatus) -> Self {
        use expensa_core::workflow::ExpenseStatus as Core;
        match status {
            Core::Draft => Self::Draft,
            Core::Pending => Self::Pending,
            Core::Approved => Self::Approved,
            Core::Rejected => Self::Rejected,
        }
    }
}

impl From<ApprovalStatus> for expensa_core::workflow::ApprovalStatus {
    fn from(status: ApprovalStatus) -> Self {
        match status {
            ApprovalStatus::Pending => Self::Pending,
            ApprovalStatus::Approved => Self::Approved,
            ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<expensa_core::workflow::ApprovalStatus> for ApprovalStatus {
    fn from(status: expensa_core::workflow::ApprovalStatus) -> Self {
        use expensa_core::workflow::ApprovalStatus as Core;
        match status {
            Core::Pending => Self::Pending,
            Core::Approved => Self::Approved,
            Core::Rejected => Self::Rejected,
        }
    }
}

impl From<UserRole> for expensa_core::auth::UserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Employee => Self::Employee,
            UserRole::Manager => Self::Manager,
            UserRole::Admin => Self::Admin,
            UserRole::Cfo => Self::Cfo,
        }
    }
}

impl From<expensa_core::auth::UserRole> for UserRole {
    fn from(role: expensa_core::auth::UserRole) -> Self {
        use expensa_core::auth::UserRole as Core;
        match role {
            Core::Employee => Self::Employee,
            Core::Manager => Self::Manager,
            Core::Admin => Self::Admin,
            Core::Cfo => Self::Cfo,
        }
    }
}
