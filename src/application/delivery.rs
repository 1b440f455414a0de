//! Message Delivery - 长消息拆分与带重试的发送
//!
//! 生成的文本先经过文本分割器拆分，再按顺序逐条发送；
//! 每条消息最多尝试 `max_attempts` 次，全部失败后返回 `DeliveryError`。

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::application::ports::{MessageSenderPort, SendError};
use crate::domain::segment;

/// 默认最大尝试次数
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（至少 1 次）
    pub max_attempts: u32,
    /// 两次尝试之间的等待时间
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 立即重试（无等待）
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

/// 投递错误
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Failed to send message after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: SendError },
}

/// 消息形式
#[derive(Debug, Clone, Copy)]
enum Outgoing {
    Text,
    /// 附带主菜单
    Menu,
}

/// 消息投递服务
pub struct MessageDelivery {
    sender: Arc<dyn MessageSenderPort>,
    policy: RetryPolicy,
    max_message_length: usize,
}

impl MessageDelivery {
    pub fn new(
        sender: Arc<dyn MessageSenderPort>,
        policy: RetryPolicy,
        max_message_length: usize,
    ) -> Self {
        Self {
            sender,
            policy,
            max_message_length,
        }
    }

    /// 发送单条消息（带重试）
    pub async fn send(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        self.send_with_retry(chat_id, text, Outgoing::Text).await
    }

    /// 发送附带主菜单的单条消息（带重试）
    pub async fn send_menu(&self, chat_id: i64, text: &str) -> Result<(), DeliveryError> {
        self.send_with_retry(chat_id, text, Outgoing::Menu).await
    }

    async fn send_with_retry(
        &self,
        chat_id: i64,
        text: &str,
        outgoing: Outgoing,
    ) -> Result<(), DeliveryError> {
        let mut attempt = 1;
        loop {
            let result = match outgoing {
                Outgoing::Text => self.sender.send_text(chat_id, text).await,
                Outgoing::Menu => self.sender.send_menu(chat_id, text).await,
            };
            match result {
                Ok(()) => return Ok(()),
                Err(err) if attempt >= self.policy.max_attempts => {
                    tracing::error!(
                        chat_id,
                        attempts = attempt,
                        error = %err,
                        "Failed to send message, giving up"
                    );
                    return Err(DeliveryError::RetriesExhausted {
                        attempts: attempt,
                        last_error: err,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        chat_id,
                        attempt,
                        error = %err,
                        "Send attempt failed, retrying"
                    );
                    if !self.policy.delay.is_zero() {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// 拆分并按顺序发送长文本
    ///
    /// 空白片段不会被发送。任一片段重试耗尽后立即返回错误，后续片段不再发送。
    /// 返回实际发送的片段数。
    pub async fn deliver(&self, chat_id: i64, text: &str) -> Result<usize, DeliveryError> {
        let chunks: Vec<String> = segment(text, self.max_message_length)
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect();

        if chunks.is_empty() {
            tracing::debug!(chat_id, "Nothing to deliver, text is blank");
            return Ok(0);
        }

        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            self.send(chat_id, chunk).await?;
            tracing::debug!(
                chat_id,
                part = index + 1,
                total,
                chars = chunk.chars().count(),
                "Message part sent"
            );
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingSender;

    fn delivery(sender: Arc<RecordingSender>, max_attempts: u32, max_len: usize) -> MessageDelivery {
        MessageDelivery::new(sender, RetryPolicy::immediate(max_attempts), max_len)
    }

    #[test]
    fn test_retry_policy_has_at_least_one_attempt() {
        assert_eq!(RetryPolicy::immediate(0).max_attempts, 1);
        assert_eq!(RetryPolicy::default().max_attempts, 3);
    }

    #[tokio::test]
    async fn test_send_succeeds_after_transient_failures() {
        let sender = Arc::new(RecordingSender::failing_first(2));
        let delivery = delivery(sender.clone(), 3, 100);

        delivery.send(1, "hello").await.unwrap();

        assert_eq!(sender.attempts(), 3);
        assert_eq!(sender.sent(), vec![(1, "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_send_gives_up_after_max_attempts() {
        let sender = Arc::new(RecordingSender::failing_first(5));
        let delivery = delivery(sender.clone(), 3, 100);

        let err = delivery.send(1, "hello").await.unwrap_err();

        let DeliveryError::RetriesExhausted { attempts, .. } = err;
        assert_eq!(attempts, 3);
        assert_eq!(sender.attempts(), 3);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_deliver_sends_chunks_in_order() {
        let sender = Arc::new(RecordingSender::new());
        let delivery = delivery(sender.clone(), 3, 5);

        let sent = delivery.deliver(42, "A. B. C.").await.unwrap();

        assert_eq!(sent, 2);
        assert_eq!(
            sender.sent(),
            vec![(42, "A. B.".to_string()), (42, "C.".to_string())]
        );
    }

    #[tokio::test]
    async fn test_deliver_skips_blank_text() {
        let sender = Arc::new(RecordingSender::new());
        let delivery = delivery(sender.clone(), 3, 100);

        assert_eq!(delivery.deliver(1, "").await.unwrap(), 0);
        assert_eq!(delivery.deliver(1, "   ").await.unwrap(), 0);
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn test_deliver_stops_at_first_exhausted_chunk() {
        let sender = Arc::new(RecordingSender::failing_first(10));
        let delivery = delivery(sender.clone(), 2, 5);

        assert!(delivery.deliver(1, "A. B. C.").await.is_err());
        // 第一个片段耗尽重试后不再尝试第二个
        assert_eq!(sender.attempts(), 2);
    }

    #[tokio::test]
    async fn test_menu_message_is_retried() {
        let sender = Arc::new(RecordingSender::failing_first(2));
        let delivery = delivery(sender.clone(), 3, 100);

        delivery.send_menu(9, "Привет!").await.unwrap();

        assert_eq!(sender.attempts(), 3);
        assert_eq!(sender.menus(), vec![(9, "Привет!".to_string())]);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_menu_message_gives_up_after_max_attempts() {
        let sender = Arc::new(RecordingSender::failing_first(5));
        let delivery = delivery(sender.clone(), 2, 100);

        assert!(delivery.send_menu(9, "Привет!").await.is_err());
        assert_eq!(sender.attempts(), 2);
        assert!(sender.menus().is_empty());
    }
}
