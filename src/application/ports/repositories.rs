//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// User Repository
// ============================================================================

/// 聊天平台上的用户资料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            username: None,
            first_name: None,
            last_name: None,
        }
    }
}

/// 用户实体（用于持久化）
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub profile: UserProfile,
    pub request_count: i64,
    pub last_request_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    /// 新增用户或刷新资料（保留计数器）
    async fn upsert(&self, profile: &UserProfile) -> Result<(), RepositoryError>;

    /// 根据 ID 查找用户
    async fn find_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, RepositoryError>;

    /// 请求计数 +1 并更新最后请求时间
    async fn record_request(&self, user_id: i64, at: DateTime<Utc>)
        -> Result<(), RepositoryError>;
}

// ============================================================================
// Request Repository
// ============================================================================

/// 一次成功的生成请求
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub id: Uuid,
    pub user_id: i64,
    pub theme: String,
    pub joke: String,
    pub tokens_used: i64,
    pub created_at: DateTime<Utc>,
}

/// 主题热度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCount {
    pub theme: String,
    pub count: i64,
}

/// 全局统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalStats {
    pub total_users: i64,
    pub total_requests: i64,
    pub active_days: i64,
}

/// 单日统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_requests: i64,
    pub unique_users: i64,
}

/// Request Repository Port
#[async_trait]
pub trait RequestRepositoryPort: Send + Sync {
    /// 保存请求记录
    async fn save(&self, request: &RequestRecord) -> Result<(), RepositoryError>;

    /// 用户在指定日期（UTC）的请求数
    async fn count_for_user_on(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<i64, RepositoryError>;

    /// 热门主题（不含随机主题），按次数降序
    async fn top_themes(&self, limit: u32) -> Result<Vec<ThemeCount>, RepositoryError>;

    /// 全局统计
    async fn global_stats(&self) -> Result<GlobalStats, RepositoryError>;

    /// 指定日期（UTC）的统计
    async fn daily_stats(&self, date: NaiveDate) -> Result<DailyStats, RepositoryError>;
}
