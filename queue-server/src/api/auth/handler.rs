//! Authentication Handlers
//!
//! Handles login, registration and the profile endpoint

use std::time::Duration;

use axum::{
    Json,
    extract::{Extension, State},
};

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_USERNAME_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::client::{LoginRequest, LoginResponse};
use shared::models::{UserCreate, UserInfo, UserRole};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/login
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let account = user::find_by_username(&state.pool, &req.username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let account = match account {
        Some(u) => {
            if !u.is_active {
                return Err(AppError::forbidden("Account has been disabled".to_string()));
            }

            let password_valid = verify_password(&u.hash_pass, &req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

            if !password_valid {
                tracing::warn!(username = %req.username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .jwt_service
        .generate_token(&account)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = %account.role,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        user: account.info(),
    }))
}

/// POST /api/auth/register - 创建账号 (管理员)
pub async fn register(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserInfo>> {
    validate_required_text(&payload.username, "username", MAX_USERNAME_LEN)?;
    validate_required_text(&payload.password, "password", MAX_PASSWORD_LEN)?;
    validate_required_text(&payload.display_name, "display_name", MAX_NAME_LEN)?;

    let hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let created = user::create(
        &state.pool,
        &payload.username,
        &hash,
        &payload.display_name,
        payload.role.unwrap_or(UserRole::Staff),
    )
    .await?;

    tracing::info!(
        user_id = created.id,
        username = %created.username,
        role = %created.role,
        created_by = %current_user.username,
        "User registered"
    );

    Ok(Json(created.info()))
}

/// GET /api/auth/profile - 当前登录用户
pub async fn profile(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserInfo>> {
    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", current_user.id)))?;
    Ok(Json(account.info()))
}
