//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password policy checks for signup
//! - User role definitions

mod password;

pub use password::{
    MIN_PASSWORD_LENGTH, PasswordError, check_password_policy, hash_password, verify_password,
};

use serde::{Deserialize, Serialize};

/// User roles within a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Submits expenses. Default for new signups.
    #[default]
    Employee,
    /// Resolves approvals for direct reports.
    Manager,
    /// Manages users and reporting lines.
    Admin,
    /// Finance lead with the same approval rights as a manager.
    Cfo,
}

impl UserRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Admin => "admin",
            Self::Cfo => "cfo",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            "cfo" => Some(Self::Cfo),
            _ => None,
        }
    }

    /// Returns true if this role can act as an approver.
    #[must_use]
    pub const fn can_approve(&self) -> bool {
        matches!(self, Self::Manager | Self::Admin | Self::Cfo)
    }

    /// Returns true if this role can manage users and reporting lines.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
