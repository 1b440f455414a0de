//! Bot Error Handling

use teloxide::RequestError;
use thiserror::Error;

use crate::application::{ApplicationError, DeliveryError};

/// 更新处理过程中的错误
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] RequestError),
}

pub type HandlerResult = Result<(), HandlerError>;
