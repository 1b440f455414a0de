//! Joke Context - 笑话限界上下文
//!
//! 职责:
//! - 主题校验与随机主题
//! - 提示词构建
//! - 生成文本清理

mod errors;
mod prompt;
mod theme;

pub use errors::ThemeError;
pub use prompt::{clean_joke_text, user_prompt, SYSTEM_PROMPT};
pub use theme::{
    random_theme, theme_emoji, JokeTheme, Theme, DEFAULT_THEME_EMOJI, MIN_THEME_CHARS,
    RANDOM_THEMES, RANDOM_THEME_KEY,
};
