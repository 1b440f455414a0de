//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（JokeGenerator、MessageSender、Repository）
//! - delivery: 长消息拆分与带重试的发送
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod delivery;
pub mod error;
pub mod ports;
pub mod queries;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use commands::{
    handlers::{RegisterUserHandler, RequestJokeHandler},
    RegisterUser, RequestJoke, RequestJokeOutcome,
};

pub use delivery::{DeliveryError, MessageDelivery, RetryPolicy};

pub use error::ApplicationError;

pub use ports::{
    // Generator
    GeneratedJoke,
    GenerationError,
    JokeGeneratorPort,
    // Sender
    MessageSenderPort,
    SendError,
    // Repositories
    DailyStats,
    GlobalStats,
    RepositoryError,
    RequestRecord,
    RequestRepositoryPort,
    ThemeCount,
    UserProfile,
    UserRecord,
    UserRepositoryPort,
};

pub use queries::{
    handlers::{
        GetDailyStatsHandler, GetGlobalStatsHandler, GetTopThemesHandler, GetUserStatsHandler,
        UserStatsResponse,
    },
    GetDailyStats, GetGlobalStats, GetTopThemes, GetUserStats,
};
