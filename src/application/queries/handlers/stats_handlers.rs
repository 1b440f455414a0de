//! Stats Query Handlers

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    DailyStats, GlobalStats, RequestRepositoryPort, ThemeCount, UserRecord, UserRepositoryPort,
};
use crate::application::queries::{GetDailyStats, GetGlobalStats, GetTopThemes, GetUserStats};

// ============================================================================
// Response DTOs
// ============================================================================

/// 用户统计响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatsResponse {
    pub request_count: i64,
    pub last_request_at: Option<DateTime<Utc>>,
}

impl From<UserRecord> for UserStatsResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            request_count: record.request_count,
            last_request_at: record.last_request_at,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetUserStats Handler
pub struct GetUserStatsHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl GetUserStatsHandler {
    pub fn new(user_repo: Arc<dyn UserRepositoryPort>) -> Self {
        Self { user_repo }
    }

    /// 用户不存在或尚未生成过笑话时返回 `None`
    pub async fn handle(
        &self,
        query: GetUserStats,
    ) -> Result<Option<UserStatsResponse>, ApplicationError> {
        let user = self.user_repo.find_by_id(query.user_id).await?;
        Ok(user
            .filter(|user| user.request_count > 0)
            .map(UserStatsResponse::from))
    }
}

/// GetTopThemes Handler
pub struct GetTopThemesHandler {
    request_repo: Arc<dyn RequestRepositoryPort>,
}

impl GetTopThemesHandler {
    pub fn new(request_repo: Arc<dyn RequestRepositoryPort>) -> Self {
        Self { request_repo }
    }

    pub async fn handle(&self, query: GetTopThemes) -> Result<Vec<ThemeCount>, ApplicationError> {
        if query.limit == 0 {
            return Err(ApplicationError::validation("Top themes limit must be positive"));
        }
        Ok(self.request_repo.top_themes(query.limit).await?)
    }
}

/// GetGlobalStats Handler
pub struct GetGlobalStatsHandler {
    request_repo: Arc<dyn RequestRepositoryPort>,
}

impl GetGlobalStatsHandler {
    pub fn new(request_repo: Arc<dyn RequestRepositoryPort>) -> Self {
        Self { request_repo }
    }

    pub async fn handle(&self, _query: GetGlobalStats) -> Result<GlobalStats, ApplicationError> {
        Ok(self.request_repo.global_stats().await?)
    }
}

/// GetDailyStats Handler
pub struct GetDailyStatsHandler {
    request_repo: Arc<dyn RequestRepositoryPort>,
}

impl GetDailyStatsHandler {
    pub fn new(request_repo: Arc<dyn RequestRepositoryPort>) -> Self {
        Self { request_repo }
    }

    pub async fn handle(&self, query: GetDailyStats) -> Result<DailyStats, ApplicationError> {
        let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
        Ok(self.request_repo.daily_stats(date).await?)
    }
}
