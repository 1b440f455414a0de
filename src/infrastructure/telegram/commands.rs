//! Bot Commands - Telegram 命令定义

use teloxide::utils::command::BotCommands;

/// 支持的命令
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Команды бота Анекдотыч:")]
pub enum Command {
    #[command(description = "начать работу")]
    Start,
    #[command(description = "помощь")]
    Help,
    #[command(description = "анекдот на тему, например: /joke программисты")]
    Joke(String),
    #[command(description = "случайный анекдот")]
    Random,
    #[command(description = "ваша статистика")]
    Stats,
    #[command(description = "популярные темы")]
    Top,
    #[command(hide)]
    Admin,
}
