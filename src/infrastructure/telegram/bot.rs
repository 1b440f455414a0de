//! Telegram Bot - Dispatcher 构建与长轮询

use std::sync::Arc;

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::commands::Command;
use super::error::HandlerError;
use super::handlers::{command_handler, text_handler};
use super::state::BotState;

/// Telegram 机器人
pub struct TelegramBot {
    bot: Bot,
    state: Arc<BotState>,
}

impl TelegramBot {
    pub fn new(bot: Bot, state: Arc<BotState>) -> Self {
        Self { bot, state }
    }

    /// 更新路由：先匹配命令，其余文本交给文本处理器
    pub fn schema() -> UpdateHandler<HandlerError> {
        Update::filter_message()
            .branch(
                dptree::entry()
                    .filter_command::<Command>()
                    .endpoint(command_handler),
            )
            .branch(
                dptree::filter(|msg: Message| msg.text().is_some()).endpoint(text_handler),
            )
    }

    /// 启动长轮询，直到收到 Ctrl-C
    pub async fn run(self) {
        if let Err(e) = self.bot.set_my_commands(Command::bot_commands()).await {
            tracing::warn!(error = %e, "Failed to register bot commands");
        }

        tracing::info!("Telegram bot polling started");

        Dispatcher::builder(self.bot, Self::schema())
            .dependencies(dptree::deps![self.state])
            .default_handler(|update| async move {
                tracing::debug!("Unhandled update: {:?}", update);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        tracing::info!("Telegram bot stopped");
    }
}
