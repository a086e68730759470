//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 公共路由判断
///
/// The kiosk and the display screens are unauthenticated clients: ticket
/// creation and every read endpoint stay public, as do login, health and
/// the WebSocket upgrade. Everything else under `/api/` requires a token.
pub fn is_public_route(method: &Method, path: &str) -> bool {
    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if method == Method::OPTIONS {
        return true;
    }

    // 非 API 路由跳过认证 (/health, /ws — 让未知路径正常返回 404)
    if !path.starts_with("/api/") {
        return true;
    }

    match path {
        "/api/auth/login" => true,
        // Kiosk draws tickets without logging in; listing is public too
        "/api/tickets" => method == Method::GET || method == Method::POST,
        "/api/settings" => method == Method::GET,
        "/api/categories" => method == Method::GET,
        // Admin-only listing including inactive categories
        "/api/categories/all" => false,
        p if p.starts_with("/api/tickets/") => method == Method::GET,
        p if p.starts_with("/api/categories/") => method == Method::GET,
        _ => false,
    }
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service.clone();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 验证令牌
    match jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed JWT claims: {}", e)))?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 管理员检查中间件 - 在 require_auth 之后应用
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            username = user.username.clone(),
            user_role = user.role.to_string()
        );
        return Err(AppError::forbidden(
            "Administrator role required".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
