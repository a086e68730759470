//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 认证相关接口
//! - [`categories`] - 分类管理接口
//! - [`tickets`] - 工单（排队号）接口
//! - [`settings`] - 设置接口
//! - [`users`] - 用户管理接口
//! - [`events`] - WebSocket 事件推送

use axum::Router;

use crate::core::ServerState;

pub mod auth;
pub mod categories;
pub mod events;
pub mod health;
pub mod settings;
pub mod tickets;
pub mod users;

/// Build the Axum router (without state or middleware)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(auth::router())
        .merge(health::router())
        .merge(categories::router())
        .merge(tickets::router())
        .merge(settings::router())
        .merge(users::router())
        .merge(events::router())
}
