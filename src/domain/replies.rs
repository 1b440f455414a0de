//! Bot Replies - 面向用户的回复文本
//!
//! 所有文本只依赖基础类型，由应用层和 Telegram 层共同使用

use chrono::{DateTime, Utc};

/// 欢迎语
pub fn welcome(first_name: &str, daily_limit: u32) -> String {
    format!(
        "🤖 Привет, {first_name}! Я бот Анекдотыч!

🎭 Я генерирую смешные анекдоты на разные темы с помощью AI.

✨ Возможности:
• Статистика ваших запросов (/stats)
• Топ популярных тем (/top)
• Ограничение: {daily_limit} запросов в день

📝 Команды:
/joke [тема] - Анекдот на тему
/random - Случайный анекдот
/stats - Ваша статистика
/top - Популярные темы
/help - Помощь

💡 Просто напишите тему для анекдота!"
    )
}

/// 帮助
pub fn help(daily_limit: u32, cooldown_secs: u64) -> String {
    format!(
        "📖 Помощь по боту Анекдотыч:

🎭 Основные команды:
/start - Начать работу
/joke [тема] - Анекдот на тему
/random - Случайный анекдот
/stats - Ваша статистика
/top - Популярные темы

📊 Лимиты:
• {daily_limit} запросов в день на пользователя
• {cooldown_secs} секунд между запросами

💡 Примеры:
/joke программисты
/joke студенты
/joke семья
/joke животные

🤖 Или просто напишите тему в чат!"
    )
}

/// 用户统计
pub fn user_stats(
    request_count: i64,
    last_request_at: Option<DateTime<Utc>>,
    daily_limit: u32,
) -> String {
    let last_request = last_request_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "еще нет".to_string());

    format!(
        "📊 Ваша статистика:

🔄 Всего запросов: {request_count}
⏰ Последний запрос: {last_request}
📅 Лимит: {daily_limit} в день

🎭 Продолжайте наслаждаться анекдотами!"
    )
}

pub const NO_STATS: &str = "📊 Вы еще не создали ни одного анекдота! Попробуйте команду /joke";

/// 热门主题排行
pub fn top_themes(themes: &[(String, i64)]) -> String {
    if themes.is_empty() {
        return "📊 Пока нет статистики по темам. Будьте первым!".to_string();
    }

    let mut text = String::from("🏆 Топ популярных тем:\n");
    for (i, (theme, count)) in themes.iter().enumerate() {
        let marker = match i {
            0 => "🎯",
            1 | 2 => "🔸",
            _ => "•",
        };
        text.push_str(&format!("\n{marker} {theme} - {count} запросов"));
    }
    text
}

pub const TOP_THEMES_UNAVAILABLE: &str = "🏆 Топ популярных тем:\n\n❌ Статистика временно недоступна";

/// 管理面板
pub fn admin_panel(
    total_users: i64,
    total_requests: i64,
    active_days: i64,
    today_requests: i64,
    today_users: i64,
) -> String {
    format!(
        "👑 Админ-панель:

👥 Всего пользователей: {total_users}
🔄 Всего запросов: {total_requests}
📅 Активных дней: {active_days}

📈 Сегодня: {today_requests} запросов от {today_users} пользователей

⚙️ Бот работает стабильно!"
    )
}

pub const ADMIN_STATS_UNAVAILABLE: &str = "👑 Админ-панель:\n\n❌ Ошибка получения статистики";

pub const ADMIN_ONLY: &str = "❌ Эта команда только для администраторов";

/// 超出每日限额
pub fn limit_exceeded(daily_limit: u32) -> String {
    format!(
        "⚠️ Вы превысили дневной лимит ({daily_limit} запросов). Попробуйте завтра!"
    )
}

/// 生成中提示
pub fn generating(emoji: &str, theme: &str) -> String {
    format!("{emoji} Генерирую анекдот на тему '{theme}'...")
}

pub const GENERATING_RANDOM: &str = "🎲 Генерирую случайный анекдот...";

pub const MISSING_THEME: &str = "🎭 Укажите тему для анекдота!\nПример: /joke программисты";

pub const ASK_FOR_THEME: &str = "🎭 Напишите тему для анекдота в чат!\nНапример: программисты";

/// 主题无效
pub fn invalid_theme(reason: &str) -> String {
    format!("⚠️ {reason}")
}

pub const UNEXPECTED_ERROR: &str = "😞 Произошла непредвиденная ошибка. Попробуйте позже.";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_top_themes_markers() {
        let themes = vec![
            ("кошки".to_string(), 10),
            ("собаки".to_string(), 8),
            ("работа".to_string(), 5),
            ("школа".to_string(), 1),
        ];
        let text = top_themes(&themes);
        assert!(text.contains("🎯 кошки - 10 запросов"));
        assert!(text.contains("🔸 собаки - 8 запросов"));
        assert!(text.contains("🔸 работа - 5 запросов"));
        assert!(text.contains("• школа - 1 запросов"));
    }

    #[test]
    fn test_top_themes_empty() {
        assert!(top_themes(&[]).contains("Будьте первым"));
    }

    #[test]
    fn test_user_stats_formats_last_request() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 10).unwrap();
        let text = user_stats(7, Some(at), 50);
        assert!(text.contains("Всего запросов: 7"));
        assert!(text.contains("2024-05-01 13:45"));

        let text = user_stats(0, None, 50);
        assert!(text.contains("еще нет"));
    }

    #[test]
    fn test_limit_and_generating_texts() {
        assert!(limit_exceeded(50).contains("(50 запросов)"));
        assert_eq!(
            generating("🐱", "кошки"),
            "🐱 Генерирую анекдот на тему 'кошки'..."
        );
    }
}
