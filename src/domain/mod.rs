//! Domain Layer - 领域层
//!
//! 包含:
//! - Joke Context: 主题、提示词、生成文本清理
//! - 文本分割器（长消息拆分）
//! - 回复文本

pub mod joke;
pub mod replies;

mod text_segmenter;

pub use text_segmenter::{segment, DEFAULT_MAX_MESSAGE_LENGTH};
