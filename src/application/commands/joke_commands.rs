//! Joke Commands - 笑话生成相关命令

use uuid::Uuid;

use crate::application::ports::{GenerationError, UserProfile};
use crate::domain::joke::JokeTheme;

/// 请求生成笑话命令
#[derive(Debug, Clone)]
pub struct RequestJoke {
    /// 回复的目标聊天
    pub chat_id: i64,
    /// 发起请求的用户
    pub profile: UserProfile,
    pub theme: JokeTheme,
}

/// 请求处理结果
#[derive(Debug)]
pub enum RequestJokeOutcome {
    /// 笑话已生成并发送
    Delivered {
        request_id: Uuid,
        parts: usize,
        tokens_used: i64,
    },
    /// 超出每日限额，未调用生成服务
    LimitExceeded { used: i64, limit: u32 },
    /// 生成失败，已向用户发送错误提示
    GenerationFailed(GenerationError),
}
