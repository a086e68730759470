//! Ticket API Handlers
//!
//! Orchestrate the ticket lifecycle: look up the category, run the
//! repository operation, then broadcast the event. Broadcasts are
//! fire-and-forget — the mutation result is returned to the caller no
//! matter what happens to the observers.

use axum::{
    Json,
    extract::{Extension, Path, Query, State, rejection::JsonRejection},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{category, ticket};
use crate::utils::time;
use crate::utils::{AppError, AppResult};
use shared::models::{CurrentTickets, ResetResult, Ticket, TicketCall, TicketCreate, TicketStatus};

/// Query params for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<TicketStatus>,
    pub category_id: Option<i64>,
}

/// POST /api/tickets - 取号 (kiosk, 无需登录)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TicketCreate>,
) -> AppResult<Json<Ticket>> {
    // The category must exist; inactive categories still accept tickets
    let cat = category::require(&state.pool, payload.category_id).await?;

    let day_key = time::today_key(state.config.timezone);
    let ticket = ticket::create(&state.pool, &cat, &day_key).await?;

    tracing::info!(
        ticket_id = ticket.id,
        display_number = %ticket.display_number,
        category = %cat.name,
        "Ticket created"
    );
    state.notifier.created(ticket.clone());

    Ok(Json(ticket))
}

/// GET /api/tickets - 查询工单 (可按状态/分类过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Ticket>>> {
    let tickets = ticket::find_all(&state.pool, query.status, query.category_id).await?;
    Ok(Json(tickets))
}

/// GET /api/tickets/today - 今日全部工单
pub async fn today(State(state): State<ServerState>) -> AppResult<Json<Vec<Ticket>>> {
    let (start, end) = time::today_window(state.config.timezone);
    let tickets = ticket::find_in_window(&state.pool, start, end).await?;
    Ok(Json(tickets))
}

/// GET /api/tickets/current - 当前叫号与等待队列 (display screens)
pub async fn current(State(state): State<ServerState>) -> AppResult<Json<CurrentTickets>> {
    let current = ticket::find_current(&state.pool).await?;

    let next_count =
        crate::db::repository::setting::get_i64(&state.pool, "display_next_count", 5).await?;
    let next = ticket::find_next_waiting(&state.pool, next_count.max(0)).await?;

    Ok(Json(CurrentTickets { current, next }))
}

/// GET /api/tickets/:id - 获取单个工单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let ticket = ticket::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))?;
    Ok(Json(ticket))
}

/// POST /api/tickets/:id/call - 叫号
pub async fn call(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    payload: Result<Json<TicketCall>, JsonRejection>,
) -> AppResult<Json<Ticket>> {
    // The counter payload is optional; a bodyless call keeps the counter unset
    let counter_number = payload.ok().and_then(|Json(p)| p.counter_number);
    let ticket = ticket::call(&state.pool, id, counter_number).await?;

    tracing::info!(
        ticket_id = id,
        display_number = %ticket.display_number,
        counter = ?ticket.counter_number,
        operator = %current_user.username,
        "Ticket called"
    );
    state.notifier.called(ticket.clone());

    Ok(Json(ticket))
}

/// POST /api/tickets/:id/serve - 开始服务
pub async fn serve(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let ticket = ticket::serve(&state.pool, id).await?;
    state.notifier.updated(ticket.clone());
    Ok(Json(ticket))
}

/// POST /api/tickets/:id/complete - 完成服务
pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let ticket = ticket::complete(&state.pool, id).await?;
    state.notifier.completed(ticket.clone());
    Ok(Json(ticket))
}

/// POST /api/tickets/:id/skip - 跳过等待中的工单
pub async fn skip(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let ticket = ticket::skip(&state.pool, id).await?;
    state.notifier.updated(ticket.clone());
    Ok(Json(ticket))
}

/// POST /api/tickets/:id/recall - 重新叫号 (跳过或已完成的工单)
pub async fn recall(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let ticket = ticket::recall(&state.pool, id).await?;

    tracing::info!(
        ticket_id = id,
        display_number = %ticket.display_number,
        operator = %current_user.username,
        "Ticket recalled"
    );
    state.notifier.called(ticket.clone());

    Ok(Json(ticket))
}

/// POST /api/tickets/:id/reannounce - 重新播报 (不改变状态)
pub async fn reannounce(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    let ticket = ticket::reannounce(&state.pool, id).await?;
    state.notifier.reannounce(ticket.clone());
    Ok(Json(ticket))
}

/// POST /api/tickets/reset - 清空所有工单，编号从 1 重新开始
pub async fn reset(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ResetResult>> {
    let removed = ticket::reset_all(&state.pool).await?;

    tracing::info!(removed, operator = %current_user.username, "Queue reset");

    Ok(Json(ResetResult {
        success: true,
        removed,
    }))
}
