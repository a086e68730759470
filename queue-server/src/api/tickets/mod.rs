//! Ticket API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tickets", routes())
}

fn routes() -> Router<ServerState> {
    // 公共路由：取号 (kiosk) 与各类查询
    let public_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/today", get(handler::today))
        .route("/current", get(handler::current))
        .route("/{id}", get(handler::get_by_id));

    // 叫号路由：需要登录 (staff 或 admin)
    let staff_routes = Router::new()
        .route("/{id}/call", post(handler::call))
        .route("/{id}/serve", post(handler::serve))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/skip", post(handler::skip))
        .route("/{id}/recall", post(handler::recall))
        .route("/{id}/reannounce", post(handler::reannounce));

    // 管理路由：清空队列
    let admin_routes = Router::new()
        .route("/reset", post(handler::reset))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(staff_routes).merge(admin_routes)
}
