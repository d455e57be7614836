//! API route definitions.

use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{auth_middleware, rate_limit_middleware};

pub mod approvals;
pub mod auth;
pub mod currency;
pub mod expenses;
pub mod health;
pub mod users;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(expenses::routes())
        .merge(currency::routes())
        .layer(require_auth.clone());

    // Approval routes are throttled per client before authentication runs
    let approval_routes = approvals::routes().layer(require_auth).layer(
        middleware::from_fn_with_state(state.approval_limiter.clone(), rate_limit_middleware),
    );

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
        .merge(approval_routes)
}
