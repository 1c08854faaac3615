/**
 * Register Handler
 *
 * This module implements the account registration handler for
 * POST /api/auth/register.
 *
 * # Registration Process
 *
 * 1. Validate name, email format and password length
 * 2. Normalize the email (trimmed, lowercase)
 * 3. Hash the password using bcrypt
 * 4. Create the account, rejecting a duplicate email with 409
 * 5. Generate a JWT token and return it with the profile
 */
use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::AuthResponse;
use crate::backend::auth::passwords::hash_password;
use crate::backend::error::{ApiJson, ApiResult, BackendError};
use crate::backend::server::state::AppState;
use crate::backend::store::StoreError;
use crate::shared::marketplace::{Account, RegisterRequest};

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - Missing name, malformed email or short password
/// * `409 Conflict` - An account with this email already exists
/// * `500 Internal Server Error` - Hashing, storage or token signing failed
///
/// # Example Request
///
/// ```http
/// POST /api/auth/register HTTP/1.1
/// Content-Type: application/json
///
/// {"name": "Ada", "email": "ada@example.com", "password": "secret1"}
/// ```
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let (name, email) = request.validate()?;
    tracing::info!("[Auth] Register request for {}", email);

    if state.store.account_by_email(&email).await?.is_some() {
        tracing::warn!("[Auth] Email already registered: {}", email);
        return Err(BackendError::handler(
            StatusCode::CONFLICT,
            "User already exists with this email",
        ));
    }

    let password_hash = hash_password(&request.password, state.config.bcrypt_cost).await?;

    // A concurrent registration can still win the race; the store reports it
    let account = match state
        .store
        .create_account(Account::new(name, email, password_hash))
        .await
    {
        Ok(account) => account,
        Err(StoreError::Conflict(message)) => {
            return Err(BackendError::handler(StatusCode::CONFLICT, message))
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.tokens.issue(&account)?;
    tracing::info!("[Auth] Account created: {} ({})", account.name, account.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(token, account.profile())),
    ))
}
