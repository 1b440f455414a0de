//! Update Handlers
//!
//! 命令与纯文本消息的处理入口。处理失败时记录日志并向用户发送通用错误提示，
//! 不会把错误抛回 Dispatcher。

use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::User;

use super::commands::Command;
use super::error::{HandlerError, HandlerResult};
use super::keyboard::KeyboardAction;
use super::state::BotState;
use crate::application::{
    GetDailyStats, GetGlobalStats, GetTopThemes, GetUserStats, RegisterUser, RequestJoke,
    RequestJokeOutcome, UserProfile,
};
use crate::domain::joke::{JokeTheme, Theme, ThemeError, MIN_THEME_CHARS};
use crate::domain::replies;

/// 纯文本消息的解读结果
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TextIntent {
    /// 键盘按钮
    Action(KeyboardAction),
    /// 有效主题
    Theme(Theme),
    /// 主题校验失败
    Invalid(ThemeError),
    Ignore,
}

/// 解读纯文本消息
///
/// 未知命令与过短文本直接忽略
pub(crate) fn classify_text(text: &str) -> TextIntent {
    if let Some(action) = KeyboardAction::from_label(text) {
        return TextIntent::Action(action);
    }

    let text = text.trim();
    if text.starts_with('/') || text.chars().count() < MIN_THEME_CHARS {
        return TextIntent::Ignore;
    }

    match Theme::parse(text) {
        Ok(theme) => TextIntent::Theme(theme),
        Err(err) => TextIntent::Invalid(err),
    }
}

fn profile_of(user: &User) -> UserProfile {
    UserProfile {
        user_id: user.id.0 as i64,
        username: user.username.clone(),
        first_name: Some(user.first_name.clone()),
        last_name: user.last_name.clone(),
    }
}

/// 命令入口
pub async fn command_handler(
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    tracing::debug!(chat_id = msg.chat.id.0, user_id = user.id.0, command = ?cmd, "Command received");

    if let Err(err) = run_command(&state, msg.chat.id, user, cmd).await {
        report_failure(&state, msg.chat.id, &err).await;
    }
    Ok(())
}

/// 纯文本入口
pub async fn text_handler(msg: Message, state: Arc<BotState>) -> HandlerResult {
    let (Some(user), Some(text)) = (msg.from.as_ref(), msg.text()) else {
        return Ok(());
    };

    let result = match classify_text(text) {
        TextIntent::Ignore => Ok(()),
        TextIntent::Action(action) => run_action(&state, msg.chat.id, user, action).await,
        TextIntent::Theme(theme) => {
            request_joke(&state, msg.chat.id, user, JokeTheme::Custom(theme)).await
        }
        TextIntent::Invalid(err) => {
            send(&state, msg.chat.id, &replies::invalid_theme(&err.to_string())).await
        }
    };

    if let Err(err) = result {
        report_failure(&state, msg.chat.id, &err).await;
    }
    Ok(())
}

async fn run_command(
    state: &BotState,
    chat_id: ChatId,
    user: &User,
    cmd: Command,
) -> HandlerResult {
    match cmd {
        Command::Start => start(state, chat_id, user).await,
        Command::Help => run_action(state, chat_id, user, KeyboardAction::Help).await,
        Command::Joke(raw) => {
            if raw.trim().is_empty() {
                return send(state, chat_id, replies::MISSING_THEME).await;
            }
            match Theme::parse(&raw) {
                Ok(theme) => request_joke(state, chat_id, user, JokeTheme::Custom(theme)).await,
                Err(err) => send(state, chat_id, &replies::invalid_theme(&err.to_string())).await,
            }
        }
        Command::Random => run_action(state, chat_id, user, KeyboardAction::Random).await,
        Command::Stats => run_action(state, chat_id, user, KeyboardAction::Stats).await,
        Command::Top => run_action(state, chat_id, user, KeyboardAction::Top).await,
        Command::Admin => admin_panel(state, chat_id, user).await,
    }
}

async fn run_action(
    state: &BotState,
    chat_id: ChatId,
    user: &User,
    action: KeyboardAction,
) -> HandlerResult {
    match action {
        KeyboardAction::AskTheme => send(state, chat_id, replies::ASK_FOR_THEME).await,
        KeyboardAction::Random => request_joke(state, chat_id, user, JokeTheme::Random).await,
        KeyboardAction::Stats => user_stats(state, chat_id, user).await,
        KeyboardAction::Top => top_themes(state, chat_id).await,
        KeyboardAction::Help => {
            let text = replies::help(state.settings.daily_limit, state.settings.cooldown_secs);
            send_menu(state, chat_id, &text).await
        }
    }
}

async fn start(state: &BotState, chat_id: ChatId, user: &User) -> HandlerResult {
    state
        .register_user_handler
        .handle(RegisterUser {
            profile: profile_of(user),
        })
        .await?;

    let text = replies::welcome(&user.first_name, state.settings.daily_limit);
    send_menu(state, chat_id, &text).await
}

async fn request_joke(
    state: &BotState,
    chat_id: ChatId,
    user: &User,
    theme: JokeTheme,
) -> HandlerResult {
    let outcome = state
        .request_joke_handler
        .handle(RequestJoke {
            chat_id: chat_id.0,
            profile: profile_of(user),
            theme,
        })
        .await?;

    match outcome {
        RequestJokeOutcome::Delivered { request_id, parts, .. } => {
            tracing::debug!(%request_id, parts, "Joke request completed");
        }
        RequestJokeOutcome::LimitExceeded { used, limit } => {
            tracing::debug!(user_id = user.id.0, used, limit, "Joke request rejected");
        }
        RequestJokeOutcome::GenerationFailed(err) => {
            tracing::debug!(user_id = user.id.0, error = %err, "Joke request failed");
        }
    }
    Ok(())
}

async fn user_stats(state: &BotState, chat_id: ChatId, user: &User) -> HandlerResult {
    let stats = state
        .get_user_stats_handler
        .handle(GetUserStats {
            user_id: profile_of(user).user_id,
        })
        .await?;

    let text = match stats {
        Some(stats) => replies::user_stats(
            stats.request_count,
            stats.last_request_at,
            state.settings.daily_limit,
        ),
        None => replies::NO_STATS.to_string(),
    };
    send(state, chat_id, &text).await
}

async fn top_themes(state: &BotState, chat_id: ChatId) -> HandlerResult {
    let query = GetTopThemes {
        limit: state.settings.top_themes_limit,
    };
    let text = match state.get_top_themes_handler.handle(query).await {
        Ok(themes) => {
            let rows: Vec<(String, i64)> = themes
                .into_iter()
                .map(|entry| (entry.theme, entry.count))
                .collect();
            replies::top_themes(&rows)
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to load top themes");
            replies::TOP_THEMES_UNAVAILABLE.to_string()
        }
    };
    send(state, chat_id, &text).await
}

async fn admin_panel(state: &BotState, chat_id: ChatId, user: &User) -> HandlerResult {
    let user_id = profile_of(user).user_id;
    if !state.settings.is_admin(user_id) {
        tracing::warn!(user_id, "Admin command from non-admin user");
        return send(state, chat_id, replies::ADMIN_ONLY).await;
    }

    let global = state.get_global_stats_handler.handle(GetGlobalStats).await;
    let today = state
        .get_daily_stats_handler
        .handle(GetDailyStats {
            date: Some(Utc::now().date_naive()),
        })
        .await;

    let text = match (global, today) {
        (Ok(global), Ok(today)) => replies::admin_panel(
            global.total_users,
            global.total_requests,
            global.active_days,
            today.total_requests,
            today.unique_users,
        ),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!(error = %err, "Failed to load admin stats");
            replies::ADMIN_STATS_UNAVAILABLE.to_string()
        }
    };
    send(state, chat_id, &text).await
}

async fn send(state: &BotState, chat_id: ChatId, text: &str) -> HandlerResult {
    state.delivery.send(chat_id.0, text).await?;
    Ok(())
}

async fn send_menu(state: &BotState, chat_id: ChatId, text: &str) -> HandlerResult {
    state.delivery.send_menu(chat_id.0, text).await?;
    Ok(())
}

async fn report_failure(state: &BotState, chat_id: ChatId, err: &HandlerError) {
    tracing::error!(chat_id = chat_id.0, error = %err, "Failed to handle update");

    if let Err(send_err) = state.delivery.send(chat_id.0, replies::UNEXPECTED_ERROR).await {
        tracing::warn!(chat_id = chat_id.0, error = %send_err, "Failed to send error notice");
    }
}
