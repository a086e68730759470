//! Auth API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new().route("/login", post(handler::login));

    let authed_routes = Router::new().route("/profile", get(handler::profile));

    // 注册新账号：仅管理员
    let admin_routes = Router::new()
        .route("/register", post(handler::register))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(authed_routes).merge(admin_routes)
}
