//! Health Check Worker - 周期性存活探测
//!
//! 定期检查数据库与生成服务，只记录日志，不影响主流程

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{JokeGeneratorPort, RequestRepositoryPort};

/// Worker 配置
#[derive(Debug, Clone)]
pub struct HealthCheckConfig {
    /// 启动后首次检查前的等待时间
    pub first_delay: Duration,
    /// 检查间隔
    pub interval: Duration,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            first_delay: Duration::from_secs(10),
            interval: Duration::from_secs(1800),
        }
    }
}

/// 单次检查结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    /// 数据库可用时为总请求数
    pub total_requests: Option<i64>,
    pub generator_ok: bool,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.total_requests.is_some() && self.generator_ok
    }
}

/// 健康检查 Worker
pub struct HealthCheckWorker {
    config: HealthCheckConfig,
    request_repo: Arc<dyn RequestRepositoryPort>,
    generator: Arc<dyn JokeGeneratorPort>,
}

impl HealthCheckWorker {
    pub fn new(
        config: HealthCheckConfig,
        request_repo: Arc<dyn RequestRepositoryPort>,
        generator: Arc<dyn JokeGeneratorPort>,
    ) -> Self {
        Self {
            config,
            request_repo,
            generator,
        }
    }

    /// 启动 Worker（永不返回）
    pub async fn run(self) {
        tracing::info!(
            first_delay_secs = self.config.first_delay.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "HealthCheckWorker started"
        );

        tokio::time::sleep(self.config.first_delay).await;

        let mut ticker = tokio::time::interval(self.config.interval);
        loop {
            ticker.tick().await;
            self.check_once().await;
        }
    }

    /// 执行一次检查并记录结果
    pub async fn check_once(&self) -> HealthReport {
        let total_requests = match self.request_repo.global_stats().await {
            Ok(stats) => Some(stats.total_requests),
            Err(e) => {
                tracing::error!(error = %e, "Health check: database unavailable");
                None
            }
        };

        let generator_ok = self.generator.health_check().await;
        if !generator_ok {
            tracing::error!("Health check: joke generator unavailable");
        }

        let report = HealthReport {
            total_requests,
            generator_ok,
        };

        if report.is_healthy() {
            tracing::info!(
                total_requests = report.total_requests,
                "Health check passed"
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::{FakeFailure, FakeJokeGenerator, FakeJokeGeneratorConfig};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, DbPool, SqliteRequestRepository,
    };

    async fn pool() -> DbPool {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn worker(pool: DbPool, generator: FakeJokeGenerator) -> HealthCheckWorker {
        HealthCheckWorker::new(
            HealthCheckConfig::default(),
            Arc::new(SqliteRequestRepository::new(pool)),
            Arc::new(generator),
        )
    }

    #[tokio::test]
    async fn test_healthy() {
        let worker = worker(
            pool().await,
            FakeJokeGenerator::new(FakeJokeGeneratorConfig::default()),
        );

        let report = worker.check_once().await;
        assert_eq!(report.total_requests, Some(0));
        assert!(report.generator_ok);
        assert!(report.is_healthy());
    }

    #[tokio::test]
    async fn test_generator_down() {
        let worker = worker(
            pool().await,
            FakeJokeGenerator::new(FakeJokeGeneratorConfig::default())
                .failing(FakeFailure::Timeout),
        );

        let report = worker.check_once().await;
        assert!(!report.generator_ok);
        assert!(!report.is_healthy());
    }

    #[tokio::test]
    async fn test_database_down() {
        let pool = pool().await;
        pool.close().await;
        let worker = worker(
            pool,
            FakeJokeGenerator::new(FakeJokeGeneratorConfig::default()),
        );

        let report = worker.check_once().await;
        assert_eq!(report.total_requests, None);
        assert!(!report.is_healthy());
    }
}
