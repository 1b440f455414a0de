//! Worker Layer - Background Tasks
//!
//! 实现 HealthCheckWorker，周期性探测数据库与生成服务

mod health_check;

pub use health_check::{HealthCheckConfig, HealthCheckWorker, HealthReport};
