//! Reply Keyboard - 主菜单键盘
//!
//! 按钮只携带文字标签，由文本处理器映射回对应动作

use teloxide::types::{KeyboardButton, KeyboardMarkup};

/// 键盘按钮对应的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardAction {
    /// 提示用户输入主题
    AskTheme,
    Random,
    Stats,
    Top,
    Help,
}

impl KeyboardAction {
    const ALL: [KeyboardAction; 5] = [
        KeyboardAction::AskTheme,
        KeyboardAction::Random,
        KeyboardAction::Stats,
        KeyboardAction::Top,
        KeyboardAction::Help,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            KeyboardAction::AskTheme => "🎭 Анекдот на тему",
            KeyboardAction::Random => "🎲 Случайный",
            KeyboardAction::Stats => "📊 Моя статистика",
            KeyboardAction::Top => "🏆 Топ тем",
            KeyboardAction::Help => "❓ Помощь",
        }
    }

    /// 根据按钮文字识别动作
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|action| action.label() == text)
    }
}

fn button(action: KeyboardAction) -> KeyboardButton {
    KeyboardButton::new(action.label())
}

/// 主菜单键盘
pub fn main_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![button(KeyboardAction::AskTheme), button(KeyboardAction::Random)],
        vec![button(KeyboardAction::Stats), button(KeyboardAction::Top)],
        vec![button(KeyboardAction::Help)],
    ])
    .resize_keyboard()
}
