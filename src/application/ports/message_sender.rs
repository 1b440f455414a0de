//! Message Sender Port - 消息发送抽象

use async_trait::async_trait;
use thiserror::Error;

/// 发送错误
#[derive(Debug, Clone, Error)]
pub enum SendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Chat API error: {0}")]
    Api(String),
}

/// Message Sender Port
///
/// 向聊天发送一条纯文本消息
#[async_trait]
pub trait MessageSenderPort: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError>;

    /// 发送一条附带主菜单的消息
    async fn send_menu(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.send_text(chat_id, text).await // 默认不带菜单
    }
}
