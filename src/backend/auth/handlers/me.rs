/**
 * Current Account Handlers
 *
 * GET /api/auth/me and GET/PUT /api/user/profile. All of them sit behind
 * the auth middleware.
 */
use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::error::{ApiJson, ApiResult, BackendError};
use crate::backend::middleware::AuthUser;
use crate::backend::store::{DynStore, StoreError};
use crate::shared::marketplace::{Account, UpdateProfileRequest};

async fn load_account(store: &DynStore, user: &AuthUser) -> ApiResult<Account> {
    store
        .account_by_id(user.0.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))
}

/// GET /api/auth/me
pub async fn get_me(State(store): State<DynStore>, user: AuthUser) -> ApiResult<Json<UserResponse>> {
    let account = load_account(&store, &user).await?;
    Ok(Json(UserResponse::new(account.profile())))
}

/// GET /api/user/profile
pub async fn get_profile(
    State(store): State<DynStore>,
    user: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let account = load_account(&store, &user).await?;
    Ok(Json(UserResponse::new(account.profile())))
}

/// PUT /api/user/profile
///
/// Both `name` and `email` are required. An email used by another account
/// is a 400, matching the other profile validation failures.
pub async fn update_profile(
    State(store): State<DynStore>,
    user: AuthUser,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let (name, email) = request.validate()?;

    let account = match store.update_profile(user.0.user_id, &name, &email).await {
        Ok(account) => account,
        Err(StoreError::Conflict(message)) => return Err(BackendError::bad_request(message)),
        Err(e) => return Err(e.into()),
    };

    tracing::info!("[Auth] Profile updated for {}", account.id);
    Ok(Json(
        UserResponse::new(account.profile()).with_message("Profile updated successfully"),
    ))
}
