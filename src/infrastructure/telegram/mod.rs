//! Telegram 前端
//!
//! 包含：
//! - commands: 命令定义
//! - keyboard: 主菜单键盘
//! - handlers: 命令与文本处理
//! - sender: MessageSenderPort 的 Telegram 实现
//! - state: 机器人状态
//! - bot: Dispatcher 与长轮询

mod bot;
mod commands;
mod error;
mod handlers;
mod keyboard;
mod sender;
mod state;

pub use bot::TelegramBot;
pub use commands::Command;
pub use error::{HandlerError, HandlerResult};
pub use keyboard::{main_keyboard, KeyboardAction};
pub use sender::TelegramSender;
pub use state::{BotSettings, BotState};
