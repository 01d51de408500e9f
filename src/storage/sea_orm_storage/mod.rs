//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod api_keys;
mod assignments;
mod recurring;
mod users;

use crate::config::AppConfig;
use crate::errors::{HWTrackerError, Result};
use crate::utils::clock::{Clock, SystemClock};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl SeaOrmStorage {
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;
        Self::connect(&db_url, config.database.pool_size, config.database.timeout).await
    }

    /// 连接数据库并运行迁移
    pub async fn connect(db_url: &str, pool_size: u32, timeout: u64) -> Result<Self> {
        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(db_url, pool_size, timeout).await?
        } else {
            Self::connect_generic(db_url, pool_size, timeout).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| HWTrackerError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self {
            db,
            clock: Arc::new(SystemClock),
        })
    }

    /// 替换写入 `created_at` / `updated_at` 时使用的时钟
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub(crate) fn now_timestamp(&self) -> i64 {
        self.clock.now().timestamp()
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| HWTrackerError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size.max(1))
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout))
            .connect_with(opt)
            .await
            .map_err(|e| HWTrackerError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(5.min(pool_size))
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| HWTrackerError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(HWTrackerError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    api_keys::ApiKey,
    assignments::{
        entities::{Assignment, AssignmentFilter, NewAssignment},
        requests::AssignmentListQuery,
        responses::AssignmentListResponse,
    },
    recurring::{NewRecurringAssignment, RecurringAssignment},
    statistics::StatisticsFilter,
    users::{
        entities::{User, UserRole},
        requests::UserListQuery,
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<User> {
        self.create_user_impl(email, name, password_hash, role).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(&self, query: UserListQuery) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user_role(&self, id: i64, role: UserRole) -> Result<Option<User>> {
        self.update_user_role_impl(id, role).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // API 密钥模块
    async fn create_api_key(&self, user_id: i64, name: &str, key_hash: &str) -> Result<ApiKey> {
        self.create_api_key_impl(user_id, name, key_hash).await
    }

    async fn get_user_by_api_key_hash(&self, key_hash: &str) -> Result<Option<User>> {
        self.get_user_by_api_key_hash_impl(key_hash).await
    }

    async fn touch_api_key_last_used(&self, key_hash: &str) -> Result<bool> {
        self.touch_api_key_last_used_impl(key_hash).await
    }

    async fn get_api_key_by_id(&self, id: i64) -> Result<Option<ApiKey>> {
        self.get_api_key_by_id_impl(id).await
    }

    async fn list_api_keys(&self) -> Result<Vec<ApiKey>> {
        self.list_api_keys_impl().await
    }

    async fn delete_api_key(&self, id: i64) -> Result<bool> {
        self.delete_api_key_impl(id).await
    }

    async fn count_api_keys(&self) -> Result<u64> {
        self.count_api_keys_impl().await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn update_assignment(&self, assignment: &Assignment) -> Result<Assignment> {
        self.update_assignment_impl(assignment).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<bool> {
        self.delete_assignment_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        query: AssignmentListQuery,
    ) -> Result<AssignmentListResponse> {
        self.list_assignments_with_pagination_impl(query).await
    }

    async fn list_assignments_due_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Assignment>> {
        self.list_assignments_due_between_impl(user_id, from, to)
            .await
    }

    async fn count_assignments(
        &self,
        user_id: i64,
        filter: Option<AssignmentFilter>,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        self.count_assignments_impl(user_id, filter, now).await
    }

    async fn list_assignments_by_recurring_id(
        &self,
        recurring_id: i64,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<Assignment>> {
        self.list_assignments_by_recurring_id_impl(recurring_id, from)
            .await
    }

    async fn count_pending_by_recurring_id(&self, recurring_id: i64) -> Result<u64> {
        self.count_pending_by_recurring_id_impl(recurring_id).await
    }

    async fn get_latest_assignment_by_recurring_id(
        &self,
        recurring_id: i64,
    ) -> Result<Option<Assignment>> {
        self.get_latest_assignment_by_recurring_id_impl(recurring_id)
            .await
    }

    async fn list_assignments_for_statistics(
        &self,
        user_id: i64,
        filter: &StatisticsFilter,
    ) -> Result<Vec<Assignment>> {
        self.list_assignments_for_statistics_impl(user_id, filter)
            .await
    }

    async fn set_archived_by_subject(
        &self,
        user_id: i64,
        subject: &str,
        archived: bool,
    ) -> Result<u64> {
        self.set_archived_by_subject_impl(user_id, subject, archived)
            .await
    }

    async fn list_subjects(&self, user_id: i64) -> Result<Vec<String>> {
        self.list_subjects_impl(user_id).await
    }

    // 周期作业模块
    async fn create_recurring_assignment(
        &self,
        recurring: NewRecurringAssignment,
    ) -> Result<RecurringAssignment> {
        self.create_recurring_assignment_impl(recurring).await
    }

    async fn get_recurring_assignment_by_id(
        &self,
        id: i64,
    ) -> Result<Option<RecurringAssignment>> {
        self.get_recurring_assignment_by_id_impl(id).await
    }

    async fn update_recurring_assignment(
        &self,
        recurring: &RecurringAssignment,
    ) -> Result<RecurringAssignment> {
        self.update_recurring_assignment_impl(recurring).await
    }

    async fn delete_recurring_assignment(&self, id: i64) -> Result<bool> {
        self.delete_recurring_assignment_impl(id).await
    }

    async fn list_recurring_assignments_by_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<RecurringAssignment>> {
        self.list_recurring_assignments_by_user_impl(user_id).await
    }

    async fn list_recurring_assignments_for_generation(&self) -> Result<Vec<RecurringAssignment>> {
        self.list_recurring_assignments_for_generation_impl().await
    }
}
