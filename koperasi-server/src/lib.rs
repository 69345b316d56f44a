//! Koperasi Savings Server - 储蓄互助会管理后端
//!
//! Admin backend for a cooperative (koperasi) savings program: members,
//! savings products, installment payments, and mid-term product upgrades.
//!
//! # 模块结构
//!
//! ```text
//! koperasi-server/src/
//! ├── core/            # 配置、状态、HTTP 服务器
//! ├── utils/           # 错误、日志、校验
//! ├── db/              # SQLite 连接池与仓储层
//! ├── reconciliation/  # 分期对账引擎 (core business logic)
//! └── api/             # HTTP 路由和处理器
//! ```
//!
//! The reconciliation engine is the heart of the system: given a member's
//! product, upgrade history, and scattered partial/rejected/approved
//! payment records it determines the next due period, the amount still
//! owed, and how an upgrade retroactively changes the per-period
//! requirement.

pub mod api;
pub mod core;
pub mod db;
pub mod reconciliation;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};
pub use utils::logger::init_logger;
