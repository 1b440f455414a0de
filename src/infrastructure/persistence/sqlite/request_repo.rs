//! SQLite Request Repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::FromRow;

use super::database::{format_date, format_timestamp};
use super::DbPool;
use crate::application::ports::{
    DailyStats, GlobalStats, RepositoryError, RequestRecord, RequestRepositoryPort, ThemeCount,
};
use crate::domain::joke::RANDOM_THEME_KEY;

/// SQLite Request Repository
pub struct SqliteRequestRepository {
    pool: DbPool,
}

impl SqliteRequestRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ThemeCountRow {
    theme: String,
    count: i64,
}

#[derive(FromRow)]
struct GlobalStatsRow {
    total_users: i64,
    total_requests: i64,
    active_days: i64,
}

#[derive(FromRow)]
struct DailyStatsRow {
    total_requests: i64,
    unique_users: i64,
}

#[async_trait]
impl RequestRepositoryPort for SqliteRequestRepository {
    async fn save(&self, request: &RequestRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO requests (id, user_id, theme, joke, tokens_used, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.id.to_string())
        .bind(request.user_id)
        .bind(&request.theme)
        .bind(&request.joke)
        .bind(request.tokens_used)
        .bind(format_timestamp(&request.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn count_for_user_on(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM requests WHERE user_id = ? AND substr(created_at, 1, 10) = ?",
        )
        .bind(user_id)
        .bind(format_date(date))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(count)
    }

    async fn top_themes(&self, limit: u32) -> Result<Vec<ThemeCount>, RepositoryError> {
        let rows: Vec<ThemeCountRow> = sqlx::query_as(
            r#"
            SELECT theme, COUNT(*) AS count
            FROM requests
            WHERE theme != ?
            GROUP BY theme
            ORDER BY count DESC, theme ASC
            LIMIT ?
            "#,
        )
        .bind(RANDOM_THEME_KEY)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| ThemeCount {
                theme: row.theme,
                count: row.count,
            })
            .collect())
    }

    async fn global_stats(&self) -> Result<GlobalStats, RepositoryError> {
        let row: GlobalStatsRow = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM requests) AS total_requests,
                (SELECT COUNT(DISTINCT substr(created_at, 1, 10)) FROM requests) AS active_days
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(GlobalStats {
            total_users: row.total_users,
            total_requests: row.total_requests,
            active_days: row.active_days,
        })
    }

    async fn daily_stats(&self, date: NaiveDate) -> Result<DailyStats, RepositoryError> {
        let row: DailyStatsRow = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS total_requests,
                COUNT(DISTINCT user_id) AS unique_users
            FROM requests
            WHERE substr(created_at, 1, 10) = ?
            "#,
        )
        .bind(format_date(date))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(DailyStats {
            date,
            total_requests: row.total_requests,
            unique_users: row.unique_users,
        })
    }
}
