//! Anekdotych - 生成俄语笑话的 Telegram 机器人
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Joke Context: 主题校验、提示词、文本清理
//! - Text Segmenter: 按句子/单词拆分超长消息
//! - Replies: 面向用户的文案
//!
//! 应用层 (application/):
//! - Ports: 端口定义（JokeGenerator, MessageSender, Repositories）
//! - Delivery: 拆分 + 带重试的发送
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - Telegram: 命令路由、键盘、消息发送
//! - Adapters: OpenRouter 客户端, Fake 生成器
//! - Persistence: SQLite 存储
//! - Worker: HealthCheckWorker 周期性健康检查

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
