//! Joke Generator Port - 笑话生成抽象
//!
//! 定义文本补全服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 服务端限流（HTTP 429）
    #[error("Rate limited by completion service")]
    RateLimited,

    #[error("Completion service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Completion is empty")]
    EmptyCompletion,
}

impl GenerationError {
    /// 展示给用户的错误提示
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::RateLimited => {
                "❌ Ошибка API (429): Превышен лимит запросов".to_string()
            }
            GenerationError::Api { status, .. } => format!("❌ Ошибка API ({})", status),
            GenerationError::Timeout => "❌ Ошибка: сервис не ответил вовремя".to_string(),
            GenerationError::Network(_) => "❌ Ошибка: нет связи с сервисом анекдотов".to_string(),
            GenerationError::MalformedResponse(_) | GenerationError::EmptyCompletion => {
                "❌ Ошибка: не удалось получить анекдот".to_string()
            }
        }
    }
}

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedJoke {
    /// 清理后的笑话文本
    pub text: String,
    /// 本次调用消耗的 token 数
    pub tokens_used: i64,
}

/// Joke Generator Port
///
/// 外部文本补全服务的抽象接口
#[async_trait]
pub trait JokeGeneratorPort: Send + Sync {
    /// 按主题生成一个笑话
    async fn generate(&self, theme: &str) -> Result<GeneratedJoke, GenerationError>;

    /// 检查生成服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
