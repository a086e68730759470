//! Server State

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtService, hash_password};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{setting, user};
use crate::notify::TicketNotifier;
use crate::utils::{AppError, AppResult};
use shared::models::UserRole;

/// Username and fallback password for the seeded administrator account
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc/连接池实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | notifier | TicketNotifier | 工单事件广播 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 工单事件广播
    pub notifier: TicketNotifier,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/queue.db) + 迁移
    /// 3. 默认设置与默认管理员账号
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("queue.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;
        let pool = db.pool;

        setting::initialize_defaults(&pool).await?;
        seed_default_admin(&pool).await?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config: config.clone(),
            pool,
            jwt_service,
            notifier: TicketNotifier::new(),
        })
    }
}

/// Seed the administrator account when no users exist yet.
///
/// The password comes from DEFAULT_ADMIN_PASSWORD (env) or falls back to
/// a well-known value that must be changed after first login.
async fn seed_default_admin(pool: &SqlitePool) -> AppResult<()> {
    if user::count(pool).await? > 0 {
        return Ok(());
    }

    let password = std::env::var("DEFAULT_ADMIN_PASSWORD")
        .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());
    let hash = hash_password(&password)
        .map_err(|e| AppError::internal(format!("Failed to hash admin password: {e}")))?;

    user::create(
        pool,
        DEFAULT_ADMIN_USERNAME,
        &hash,
        "Administrator",
        UserRole::Admin,
    )
    .await?;

    tracing::warn!(
        username = DEFAULT_ADMIN_USERNAME,
        "Seeded default administrator account — change its password after first login"
    );
    Ok(())
}
