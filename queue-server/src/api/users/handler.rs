//! User Administration Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, validate_optional_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{UserInfo, UserRole, UserUpdate};

/// GET /api/users - 用户列表
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<UserInfo>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users.iter().map(|u| u.info()).collect()))
}

/// PUT /api/users/:id - 更新用户
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserInfo>> {
    validate_optional_text(&payload.display_name, "display_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.password, "password", MAX_PASSWORD_LEN)?;

    let existing = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

    // Demoting or deactivating the last active admin would lock everyone out
    let loses_admin = existing.role == UserRole::Admin
        && (payload.role == Some(UserRole::Staff) || payload.is_active == Some(false));
    if loses_admin && user::count_active_admins(&state.pool).await? <= 1 {
        return Err(AppError::invalid_state(
            "Cannot demote or deactivate the last administrator".to_string(),
        ));
    }

    let hash = match &payload.password {
        Some(password) => Some(
            hash_password(password)
                .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?,
        ),
        None => None,
    };

    let updated = user::update(
        &state.pool,
        id,
        payload.display_name.as_deref(),
        hash.as_deref(),
        payload.role,
        payload.is_active,
    )
    .await?;

    tracing::info!(
        user_id = id,
        username = %updated.username,
        updated_by = %current_user.username,
        "User updated"
    );

    Ok(Json(updated.info()))
}

/// DELETE /api/users/:id - 删除用户
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if id == current_user.id {
        return Err(AppError::invalid_state(
            "Cannot delete your own account".to_string(),
        ));
    }

    let existing = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

    if existing.role == UserRole::Admin && user::count_active_admins(&state.pool).await? <= 1 {
        return Err(AppError::invalid_state(
            "Cannot delete the last administrator".to_string(),
        ));
    }

    let deleted = user::delete(&state.pool, id).await?;

    tracing::info!(
        user_id = id,
        username = %existing.username,
        deleted_by = %current_user.username,
        "User deleted"
    );

    Ok(Json(deleted))
}
