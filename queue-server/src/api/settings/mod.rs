//! Settings API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/", get(handler::get_all));

    let manage_routes = Router::new()
        .route("/", put(handler::update_many))
        .route("/{key}", put(handler::set_one))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
