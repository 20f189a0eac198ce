//! Bearer token authentication.
//!
//! Development: sha-256 password hashes and random in-memory tokens.
//! Production: replace with argon2 + JWT (jsonwebtoken crate + an IdP).

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use coach_core::types::Role;
use coach_core::{CoachError, CoachResult};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::handlers::CoachState;
use crate::models::{ErrorResponse, LoginRequest, LoginResponse, RegisterRequest};
use crate::store::CoachStore;

/// Prefix for issued bearer tokens.
const TOKEN_PREFIX: &str = "sc_";

const MIN_PASSWORD_LENGTH: usize = 8;

/// Name given to the branch created automatically at registration.
const DEFAULT_BRANCH_NAME: &str = "Main Branch";

pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generate a random bearer token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    format!(
        "{}{}",
        TOKEN_PREFIX,
        bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>()
    )
}

fn issue_session(
    store: &CoachStore,
    user: crate::models::User,
    token_ttl_hours: i64,
) -> LoginResponse {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(token_ttl_hours);
    store.create_session(&token, user.id, expires_at);
    LoginResponse {
        token,
        user,
        expires_at,
    }
}

/// Create an organization, its default branch, and an admin user, then log
/// them straight in.
pub fn register(
    store: &CoachStore,
    req: &RegisterRequest,
    token_ttl_hours: i64,
) -> CoachResult<LoginResponse> {
    if req.password.len() < MIN_PASSWORD_LENGTH {
        return Err(CoachError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if store.find_user_by_email(&req.email).is_some() {
        return Err(CoachError::Validation(
            "A user with this email already exists".to_string(),
        ));
    }

    let organization = store.create_organization(&req.organization_name);
    let branch = store.create_branch(organization.id, DEFAULT_BRANCH_NAME);
    let user = store.create_user(
        organization.id,
        &req.email,
        &hash_password(&req.password),
        &req.full_name,
        Role::Admin,
        Some(branch.id),
    );

    Ok(issue_session(store, user, token_ttl_hours))
}

/// Validate a login request and return a bearer token.
pub fn authenticate(
    store: &CoachStore,
    req: &LoginRequest,
    token_ttl_hours: i64,
) -> CoachResult<LoginResponse> {
    let user = store
        .find_user_by_email(&req.email)
        .ok_or_else(|| CoachError::Auth("Invalid credentials".to_string()))?;

    if !user.is_active || user.hashed_password != hash_password(&req.password) {
        return Err(CoachError::Auth("Invalid credentials".to_string()));
    }

    Ok(issue_session(store, user, token_ttl_hours))
}

/// Axum middleware layer that resolves the bearer token to a user and
/// stashes it in request extensions. Skips auth for registration, login,
/// and health checks.
pub async fn auth_middleware(
    State(state): State<CoachState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if path.ends_with("/auth/login") || path.ends_with("/auth/register") || path.starts_with("/health")
    {
        return next.run(req).await;
    }

    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(value) if value.starts_with("Bearer ") => {
            let token = &value[7..];
            match state.store.validate_session(token) {
                Some(user) => {
                    req.extensions_mut().insert(user);
                    next.run(req).await
                }
                None => (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "invalid_token".to_string(),
                        message: "Invalid or expired bearer token".to_string(),
                    }),
                )
                    .into_response(),
            }
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "missing_auth".to_string(),
                message: "Authorization header with Bearer token required".to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            full_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            password: "correct horse".to_string(),
            organization_name: "Verma Insurance".to_string(),
        }
    }

    #[test]
    fn register_then_login_round_trip() {
        let store = CoachStore::new();
        let registered = register(&store, &register_request(), 24).unwrap();
        assert!(registered.token.starts_with(TOKEN_PREFIX));
        assert!(store.validate_session(&registered.token).is_some());

        let logged_in = authenticate(
            &store,
            &LoginRequest {
                email: "ASHA@example.com".to_string(),
                password: "correct horse".to_string(),
            },
            24,
        )
        .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[test]
    fn register_creates_a_default_branch() {
        let store = CoachStore::new();
        let response = register(&store, &register_request(), 24).unwrap();

        let branches = store.list_branches(response.user.organization_id);
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name, DEFAULT_BRANCH_NAME);
        assert_eq!(response.user.current_branch_id, Some(branches[0].id));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = CoachStore::new();
        register(&store, &register_request(), 24).unwrap();
        assert!(register(&store, &register_request(), 24).is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let store = CoachStore::new();
        let mut req = register_request();
        req.password = "short".to_string();
        assert!(register(&store, &req, 24).is_err());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let store = CoachStore::new();
        register(&store, &register_request(), 24).unwrap();

        let result = authenticate(
            &store,
            &LoginRequest {
                email: "asha@example.com".to_string(),
                password: "wrong horse".to_string(),
            },
            24,
        );
        assert!(result.is_err());
    }
}
