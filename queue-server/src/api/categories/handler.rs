//! Category API Handlers

use axum::{
    Json,
    extract::{Extension, Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{category, ticket};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_PREFIX_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{Category, CategoryCreate, CategoryDeleteResult, CategoryUpdate};

/// GET /api/categories - 获取启用的分类
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = category::find_active(&state.pool).await?;
    Ok(Json(categories))
}

/// GET /api/categories/all - 获取所有分类 (含停用, 管理员)
pub async fn list_with_inactive(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<Category>>> {
    let categories = category::find_all(&state.pool).await?;
    Ok(Json(categories))
}

/// GET /api/categories/:id - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    let category = category::require(&state.pool, id).await?;
    Ok(Json(category))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<Category>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.prefix, "prefix", MAX_PREFIX_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;

    let category = category::create(&state.pool, payload).await?;
    Ok(Json(category))
}

/// PUT /api/categories/:id - 更新分类 (部分字段合并)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    validate_optional_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.prefix, "prefix", MAX_PREFIX_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;

    let category = category::update(&state.pool, id, payload).await?;
    Ok(Json(category))
}

/// DELETE /api/categories/:id - 永久删除分类
///
/// 仅允许删除已停用的分类；删除级联移除该分类的全部工单。
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryDeleteResult>> {
    let existing = category::require(&state.pool, id).await?;

    if existing.is_active {
        return Err(AppError::invalid_state(format!(
            "Category '{}' is still active; deactivate it before deleting",
            existing.name
        )));
    }

    let tickets_removed = ticket::delete_by_category(&state.pool, id).await?;
    let deleted = category::delete(&state.pool, id).await?;

    tracing::info!(
        category_id = id,
        category = %existing.name,
        tickets_removed,
        operator = %current_user.username,
        "Category deleted"
    );

    Ok(Json(CategoryDeleteResult {
        deleted,
        tickets_removed,
    }))
}
