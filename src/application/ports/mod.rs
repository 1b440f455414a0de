//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod joke_generator;
mod message_sender;
mod repositories;

pub use joke_generator::{GeneratedJoke, GenerationError, JokeGeneratorPort};
pub use message_sender::{MessageSenderPort, SendError};
pub use repositories::{
    DailyStats, GlobalStats, RepositoryError, RequestRecord, RequestRepositoryPort, ThemeCount,
    UserProfile, UserRecord, UserRepositoryPort,
};
