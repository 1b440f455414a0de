//! Stats Queries - 使用统计查询

use chrono::NaiveDate;

/// 获取用户统计
#[derive(Debug, Clone)]
pub struct GetUserStats {
    pub user_id: i64,
}

/// 获取热门主题
#[derive(Debug, Clone)]
pub struct GetTopThemes {
    pub limit: u32,
}

/// 获取全局统计
#[derive(Debug, Clone)]
pub struct GetGlobalStats;

/// 获取单日统计（`date` 为空时取今天）
#[derive(Debug, Clone, Default)]
pub struct GetDailyStats {
    pub date: Option<NaiveDate>,
}
