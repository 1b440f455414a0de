//! 测试用的端口实现

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{MessageSenderPort, SendError};

/// 记录所有发送内容的 MessageSender，可配置前 N 次发送失败
#[derive(Default)]
pub struct RecordingSender {
    fail_first: usize,
    attempts: AtomicUsize,
    sent: Mutex<Vec<(i64, String)>>,
    menus: Mutex<Vec<(i64, String)>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(fail_first: usize) -> Self {
        Self {
            fail_first,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }

    /// 通过 `send_menu` 发送的消息
    pub fn menus(&self) -> Vec<(i64, String)> {
        self.menus.lock().unwrap().clone()
    }

    fn attempt(&self) -> Result<(), SendError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.fail_first {
            return Err(SendError::Network("connection reset".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageSenderPort for RecordingSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.attempt()?;
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_menu(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.attempt()?;
        self.menus.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
