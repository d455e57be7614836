//! Unit tests for JWT functionality.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::Claims;
use crate::config::JwtSettings;
use crate::jwt::{JwtConfig, JwtError, JwtService};

fn create_test_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expires_minutes: 15,
    })
}

#[test]
fn test_claims_new_sets_correct_fields() {
    let user_id = Uuid::new_v4();
    let company_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let claims = Claims::new(user_id, company_id, "manager", expires_at);

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.company_id(), company_id);
    assert_eq!(claims.role, "manager");
    assert!(claims.iat <= Utc::now().timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
}

#[test]
fn test_generate_and_validate_token() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();
    let company_id = Uuid::new_v4();

    let token = service
        .generate_access_token(user_id, company_id, "employee")
        .unwrap();
    let claims = service.validate_token(&token).unwrap();

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.company_id(), company_id);
    assert_eq!(claims.role, "employee");
}

#[test]
fn test_invalid_token() {
    let service = create_test_service();
    let result = service.validate_token("invalid.token.here");
    assert!(matches!(result, Err(JwtError::DecodingError(_))));
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let other = JwtService::new(JwtConfig {
        secret: "another-secret".to_string(),
        access_token_expires_minutes: 15,
    });
    let token = other
        .generate_access_token(Uuid::new_v4(), Uuid::new_v4(), "admin")
        .unwrap();

    assert!(create_test_service().validate_token(&token).is_err());
}

#[test]
fn test_expired_token() {
    let service = JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expires_minutes: -10,
    });
    let token = service
        .generate_access_token(Uuid::new_v4(), Uuid::new_v4(), "employee")
        .unwrap();

    assert!(matches!(
        service.validate_token(&token),
        Err(JwtError::Expired)
    ));
}

#[test]
fn test_config_from_settings() {
    let settings = JwtSettings {
        secret: "s3cret".to_string(),
        access_token_expiry_secs: 3600,
    };
    let config = JwtConfig::from(&settings);
    assert_eq!(config.secret, "s3cret");
    assert_eq!(config.access_token_expires_minutes, 60);
    assert_eq!(JwtService::new(config).access_token_expires_in(), 3600);
}
