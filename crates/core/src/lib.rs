//! Core business logic for Expensa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and state transitions live here.
//!
//! # Modules
//!
//! - `workflow` - Expense lifecycle, approval workflow engine and audit events
//! - `currency` - Supported currency codes and amount conversion
//! - `auth` - Password hashing and user roles

pub mod auth;
pub mod currency;
pub mod workflow;
