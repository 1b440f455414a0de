//! Joke Context - Errors

use thiserror::Error;

/// 主题校验错误
///
/// 错误信息直接展示给用户
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    #[error("Тема не может быть пустой")]
    Empty,

    #[error("Тема слишком короткая (минимум {min} символа)")]
    TooShort { min: usize },

    #[error("Тема слишком длинная (максимум {max} символов)")]
    TooLong { max: usize },

    #[error("Тема содержит запрещенные символы")]
    ForbiddenCharacters,

    #[error("Слишком много слов в теме (максимум {max})")]
    TooManyWords { max: usize },
}
