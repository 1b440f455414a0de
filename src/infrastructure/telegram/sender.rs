//! Telegram Sender - MessageSenderPort 的 Telegram 实现

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::RequestError;

use super::keyboard::main_keyboard;
use crate::application::ports::{MessageSenderPort, SendError};

/// 通过 Bot API 发送纯文本消息，菜单消息附带主键盘
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn map_request_error(err: RequestError) -> SendError {
    match err {
        RequestError::Network(e) => SendError::Network(e.to_string()),
        RequestError::Io(e) => SendError::Network(e.to_string()),
        other => SendError::Api(other.to_string()),
    }
}

#[async_trait]
impl MessageSenderPort for TelegramSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map(|_| ())
            .map_err(map_request_error)
    }

    async fn send_menu(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(main_keyboard())
            .await
            .map(|_| ())
            .map_err(map_request_error)
    }
}
