//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Error to response mapping
//! - The exchange-rate provider

pub mod error;
pub mod middleware;
pub mod rates;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use expensa_core::workflow::{ApprovalWorkflow, ExpenseService, ExpenseStore, ManagerDirectory};
use expensa_db::{PgExpenseStore, UserRepository};
use expensa_shared::JwtService;

use crate::middleware::RateLimiter;
use crate::rates::RateProvider;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Expense workflow store.
    pub expense_store: Arc<dyn ExpenseStore>,
    /// Reporting-line lookup used on submission.
    pub managers: Arc<dyn ManagerDirectory>,
    /// Exchange-rate provider.
    pub rates: Arc<dyn RateProvider>,
    /// Per-client budget for the approval routes.
    pub approval_limiter: RateLimiter,
}

impl AppState {
    /// Wires the PostgreSQL-backed workflow ports onto `db`.
    pub fn with_postgres(
        db: DatabaseConnection,
        jwt_service: JwtService,
        rates: Arc<dyn RateProvider>,
        approval_limiter: RateLimiter,
    ) -> Self {
        Self {
            expense_store: Arc::new(PgExpenseStore::new(db.clone())),
            managers: Arc::new(UserRepository::new(db.clone())),
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            rates,
            approval_limiter,
        }
    }

    /// Expense lifecycle manager over the configured ports.
    pub fn expenses(&self) -> ExpenseService<dyn ExpenseStore, dyn ManagerDirectory> {
        ExpenseService::new(Arc::clone(&self.expense_store), Arc::clone(&self.managers))
    }

    /// Approval workflow engine over the configured ports.
    pub fn approvals(&self) -> ApprovalWorkflow<dyn ExpenseStore, dyn ManagerDirectory> {
        ApprovalWorkflow::new(Arc::clone(&self.expense_store), Arc::clone(&self.managers))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
