//! Queue Server - 排队叫号系统服务端
//!
//! Walk-in queue management: customers draw a sequence number within a
//! service category at the kiosk, staff call/serve/skip tickets from a
//! counter, and display screens follow along over a WebSocket.
//!
//! # 模块结构
//!
//! ```text
//! queue-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 认证、密码哈希、中间件
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # SQLite 连接与仓储层
//! ├── notify/        # 工单事件广播
//! ├── services/      # 后台服务 (每日自动重置)
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use notify::{TicketEvent, TicketNotifier};
pub use self::core::{Config, Server, ServerState, build_router};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   ____
  / __ \__  _____  __  _____
 / / / / / / / _ \/ / / / _ \
/ /_/ / /_/ /  __/ /_/ /  __/
\___\_\__,_/\___/\__,_/\___/
    _____
   / ___/___  ______   _____  _____
   \__ \/ _ \/ ___/ | / / _ \/ ___/
  ___/ /  __/ /   | |/ /  __/ /
 /____/\___/_/    |___/\___/_/
    "#
    );
}
