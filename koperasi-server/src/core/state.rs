use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是服务器的核心数据结构，使用 Arc 实现浅拷贝。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | member_locks | 每会员互斥锁 (升级执行 vs 付款提交串行化) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// Per-member mutexes serializing upgrade execution against payment
    /// submission; read paths never touch these
    member_locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (确保存在)
    /// 2. 数据库 (work_dir/koperasi.db, 自动迁移)
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let work_dir = PathBuf::from(&config.work_dir);
        std::fs::create_dir_all(&work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db_path = work_dir.join("koperasi.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self::from_pool(config.clone(), db_service.pool))
    }

    /// 从现有连接池构造状态 (测试场景用内存库)
    pub fn from_pool(config: Config, pool: SqlitePool) -> Self {
        Self {
            config,
            pool,
            member_locks: Arc::new(DashMap::new()),
        }
    }

    /// 获取指定会员的互斥锁
    ///
    /// Lock registry grows with the member set; entries are tiny and an
    /// internal admin tool never has enough members for that to matter.
    pub fn member_lock(&self, member_id: i64) -> Arc<Mutex<()>> {
        self.member_locks
            .entry(member_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
