//! Settings API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Map, Value};

use crate::core::ServerState;
use crate::db::repository::setting;
use crate::utils::AppResult;
use shared::models::overlay_defaults;

/// GET /api/settings - 获取全部设置 (默认值 + 存储覆盖)
pub async fn get_all(State(state): State<ServerState>) -> AppResult<Json<Map<String, Value>>> {
    let rows = setting::find_all(&state.pool).await?;
    Ok(Json(overlay_defaults(&rows)))
}

/// PUT /api/settings - 批量更新
///
/// 每个键独立写入；单个键失败不回滚其他键。
pub async fn update_many(
    State(state): State<ServerState>,
    Json(updates): Json<Map<String, Value>>,
) -> AppResult<Json<Map<String, Value>>> {
    for (key, value) in &updates {
        if let Err(e) = setting::set(&state.pool, key, &value.to_string()).await {
            tracing::warn!(key = %key, error = %e, "Failed to store setting, continuing");
        }
    }

    let rows = setting::find_all(&state.pool).await?;
    Ok(Json(overlay_defaults(&rows)))
}

/// PUT /api/settings/:key - 写入单个键
pub async fn set_one(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> AppResult<Json<Map<String, Value>>> {
    setting::set(&state.pool, &key, &value.to_string()).await?;

    let rows = setting::find_all(&state.pool).await?;
    Ok(Json(overlay_defaults(&rows)))
}
