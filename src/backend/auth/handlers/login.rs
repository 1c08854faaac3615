/**
 * Login Handler
 *
 * This module implements the authentication handler for POST /api/auth/login.
 *
 * # Security
 *
 * - Unknown email and wrong password return the same 401
 * - Password verification uses bcrypt
 * - Passwords are never logged or returned in responses
 */
use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::AuthResponse;
use crate::backend::auth::passwords::verify_password;
use crate::backend::error::{ApiJson, ApiResult, BackendError};
use crate::backend::server::state::AppState;
use crate::shared::marketplace::{normalize_email, LoginRequest};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - Email or password missing
/// * `401 Unauthorized` - Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = normalize_email(&request.email);
    if email.is_empty() || request.password.is_empty() {
        return Err(BackendError::bad_request("Email and password are required"));
    }

    let account = state.store.account_by_email(&email).await?.ok_or_else(|| {
        tracing::warn!("[Auth] Login for unknown email {}", email);
        BackendError::unauthorized(INVALID_CREDENTIALS)
    })?;

    if !verify_password(&request.password, &account.password_hash).await? {
        tracing::warn!("[Auth] Wrong password for {}", email);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(&account)?;
    tracing::info!("[Auth] Logged in: {}", account.email);

    Ok(Json(AuthResponse::new(token, account.profile())))
}
