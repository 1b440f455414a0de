//! Joke Context - Theme Value Objects

use rand::seq::SliceRandom;
use std::fmt;

use super::ThemeError;

/// 主题最少字符数
pub const MIN_THEME_CHARS: usize = 2;
/// 主题最多字符数
pub const MAX_THEME_CHARS: usize = 100;
/// 主题最多单词数
pub const MAX_THEME_WORDS: usize = 10;

/// 随机笑话在统计中使用的主题名
pub const RANDOM_THEME_KEY: &str = "random";

/// 随机笑话的主题池
pub const RANDOM_THEMES: &[&str] = &[
    "программисты",
    "студенты",
    "семья",
    "работа",
    "животные",
    "школа",
    "друзья",
    "технологии",
    "еда",
    "отпуск",
    "спорт",
    "музыка",
    "математика",
    "физика",
    "рыбалка",
    "погода",
    "деньги",
    "хобби",
    "кошки",
    "собаки",
    "путешествия",
    "шоппинг",
];

/// 关键词 → emoji（按顺序匹配，命中第一个即返回）
const THEME_EMOJIS: &[(&str, &str)] = &[
    ("программист", "💻"),
    ("студент", "🎓"),
    ("семья", "👨‍👩‍👧‍👦"),
    ("работа", "💼"),
    ("животные", "🐾"),
    ("школа", "🏫"),
    ("друг", "👥"),
    ("технология", "🔧"),
    ("еда", "🍕"),
    ("отпуск", "🏖️"),
    ("спорт", "⚽"),
    ("музыка", "🎵"),
    ("математика", "📐"),
    ("физика", "⚛️"),
    ("рыбалка", "🎣"),
    ("погода", "🌤️"),
    ("деньги", "💰"),
    ("хобби", "🎨"),
    ("кот", "🐱"),
    ("собака", "🐶"),
    ("путешествия", "✈️"),
    ("шоппинг", "🛍️"),
];

/// 默认 emoji
pub const DEFAULT_THEME_EMOJI: &str = "🎭";

#[inline]
fn is_forbidden_char(ch: char) -> bool {
    matches!(ch, '<' | '>' | '{' | '}' | '|' | '\\' | '^' | '`')
}

/// 经过校验的用户主题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme(String);

impl Theme {
    /// 校验并创建主题（自动去除首尾空白）
    pub fn parse(raw: &str) -> Result<Self, ThemeError> {
        let theme = raw.trim();
        if theme.is_empty() {
            return Err(ThemeError::Empty);
        }

        let chars = theme.chars().count();
        if chars > MAX_THEME_CHARS {
            return Err(ThemeError::TooLong {
                max: MAX_THEME_CHARS,
            });
        }
        if chars < MIN_THEME_CHARS {
            return Err(ThemeError::TooShort {
                min: MIN_THEME_CHARS,
            });
        }

        if theme.chars().any(is_forbidden_char) {
            return Err(ThemeError::ForbiddenCharacters);
        }

        if theme.split_whitespace().count() > MAX_THEME_WORDS {
            return Err(ThemeError::TooManyWords {
                max: MAX_THEME_WORDS,
            });
        }

        Ok(Self(theme.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 笑话请求的主题
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JokeTheme {
    /// 用户指定的主题
    Custom(Theme),
    /// 从主题池随机挑选
    Random,
}

impl JokeTheme {
    /// 写入请求记录时使用的主题名
    pub fn storage_key(&self) -> &str {
        match self {
            JokeTheme::Custom(theme) => theme.as_str(),
            JokeTheme::Random => RANDOM_THEME_KEY,
        }
    }

    /// 生成提示词时使用的具体主题
    pub fn resolve(&self) -> String {
        match self {
            JokeTheme::Custom(theme) => theme.as_str().to_string(),
            JokeTheme::Random => random_theme().to_string(),
        }
    }
}

/// 从主题池随机挑选一个主题
pub fn random_theme() -> &'static str {
    RANDOM_THEMES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(RANDOM_THEMES[0])
}

/// 主题对应的 emoji
pub fn theme_emoji(theme: &str) -> &'static str {
    let lower = theme.to_lowercase();
    THEME_EMOJIS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_THEME_EMOJI)
}
