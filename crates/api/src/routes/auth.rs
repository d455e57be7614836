//! Authentication routes for signup and login.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use sea_orm::SqlErr;
use tracing::{error, info, warn};

use crate::AppState;
use crate::error::{db_error_response, json_error};
use crate::routes::expenses::body_rejection;
use expensa_core::auth::{UserRole, check_password_policy, hash_password, verify_password};
use expensa_db::entities::users;
use expensa_db::{CompanyRepository, CreateUserInput, UserRepository};
use expensa_shared::auth::{AuthResponse, LoginRequest, SignupRequest, UserInfo};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

/// Builds the public view of a user row.
pub(crate) fn user_info(user: &users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: UserRole::from(user.role).as_str().to_string(),
        company_id: user.company_id,
        manager_id: user.manager_id,
    }
}

fn internal_error(action: &str) -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        format!("An error occurred during {action}"),
    )
}

/// Canonical form used for every email lookup and insert.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn email_taken() -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "EMAIL_EXISTS",
        "An account with this email already exists",
    )
}

fn validate_signup(payload: &SignupRequest) -> Result<(), String> {
    let email = normalize_email(&payload.email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err("A valid email address is required".to_string()),
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err("First and last name are required".to_string());
    }
    check_password_policy(&payload.password).map_err(|e| e.to_string())
}

/// Signs a token for `user` and wraps it with the user info.
fn auth_response(state: &AppState, user: &users::Model) -> Result<AuthResponse, String> {
    let role = UserRole::from(user.role);
    let token = state
        .jwt_service
        .generate_access_token(user.id, user.company_id, role.as_str())
        .map_err(|e| e.to_string())?;

    Ok(AuthResponse {
        user: user_info(user),
        token,
        expires_in: state.jwt_service.access_token_expires_in(),
    })
}

/// POST /auth/signup - Register a new employee and return a token.
async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return body_rejection(&rejection),
    };

    if let Err(message) = validate_signup(&payload) {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message);
    }

    match CompanyRepository::new((*state.db).clone())
        .find_by_id(payload.company_id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Company does not exist",
            );
        }
        Err(e) => return db_error_response(&e, "signup company lookup"),
    }

    let user_repo = UserRepository::new((*state.db).clone());
    let email = normalize_email(&payload.email);

    match user_repo.email_exists(&email).await {
        Ok(true) => return email_taken(),
        Ok(false) => {}
        Err(e) => return db_error_response(&e, "signup email check"),
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("signup");
        }
    };

    let user = match user_repo
        .create(CreateUserInput {
            company_id: payload.company_id,
            email,
            password_hash,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            role: UserRole::Employee.into(),
            manager_id: None,
        })
        .await
    {
        Ok(u) => u,
        // A concurrent signup won the race for this email.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            warn!(company_id = %payload.company_id, "Signup lost unique email race");
            return email_taken();
        }
        Err(e) => return db_error_response(&e, "signup user insert"),
    };

    info!(user_id = %user.id, company_id = %user.company_id, "New user registered");

    match auth_response(&state, &user) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            internal_error("signup")
        }
    }
}

/// POST /auth/login - Authenticate a user and return a token.
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => return body_rejection(&rejection),
    };

    let invalid_credentials = || {
        json_error(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid email or password",
        )
    };

    let user = match UserRepository::new((*state.db).clone())
        .find_by_email(&normalize_email(&payload.email))
        .await
    {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!("Login attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => return db_error_response(&e, "login"),
    };

    if !user.is_active {
        return json_error(
            StatusCode::UNAUTHORIZED,
            "ACCOUNT_DISABLED",
            "This account has been disabled",
        );
    }

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("login");
        }
    }

    info!(user_id = %user.id, "User logged in successfully");

    match auth_response(&state, &user) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            internal_error("login")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request(email: &str, password: &str, first: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            company_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_validate_signup() {
        assert!(validate_signup(&request("jane@example.com", "secret123", "Jane")).is_ok());
        assert!(validate_signup(&request("not-an-email", "secret123", "Jane")).is_err());
        assert!(validate_signup(&request("jane@example.com", "short", "Jane")).is_err());
        assert!(validate_signup(&request("jane@example.com", "secret123", "  ")).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" Jane@Example.COM "), "jane@example.com");
        assert_eq!(normalize_email("jane@example.com"), "jane@example.com");
    }
}
