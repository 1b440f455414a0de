//! Joke Command Handlers
//!
//! 处理流程：
//! 1. 登记用户
//! 2. 检查每日限额
//! 3. 发送“生成中”提示
//! 4. 调用生成服务（失败时发送错误提示）
//! 5. 记录请求并拆分发送笑话

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::commands::{RequestJoke, RequestJokeOutcome};
use crate::application::delivery::MessageDelivery;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    JokeGeneratorPort, RequestRecord, RequestRepositoryPort, UserRepositoryPort,
};
use crate::domain::joke::{theme_emoji, JokeTheme};
use crate::domain::replies;

/// RequestJoke Handler
pub struct RequestJokeHandler {
    generator: Arc<dyn JokeGeneratorPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
    request_repo: Arc<dyn RequestRepositoryPort>,
    delivery: Arc<MessageDelivery>,
    daily_limit: u32,
}

impl RequestJokeHandler {
    pub fn new(
        generator: Arc<dyn JokeGeneratorPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
        request_repo: Arc<dyn RequestRepositoryPort>,
        delivery: Arc<MessageDelivery>,
        daily_limit: u32,
    ) -> Self {
        Self {
            generator,
            user_repo,
            request_repo,
            delivery,
            daily_limit,
        }
    }

    pub async fn handle(&self, command: RequestJoke) -> Result<RequestJokeOutcome, ApplicationError> {
        let chat_id = command.chat_id;
        let user_id = command.profile.user_id;

        self.user_repo.upsert(&command.profile).await?;

        let today = Utc::now().date_naive();
        let used = self.request_repo.count_for_user_on(user_id, today).await?;
        if used >= i64::from(self.daily_limit) {
            tracing::info!(user_id, used, limit = self.daily_limit, "Daily limit reached");
            self.delivery
                .send(chat_id, &replies::limit_exceeded(self.daily_limit))
                .await?;
            return Ok(RequestJokeOutcome::LimitExceeded {
                used,
                limit: self.daily_limit,
            });
        }

        let notice = match &command.theme {
            JokeTheme::Custom(theme) => {
                replies::generating(theme_emoji(theme.as_str()), theme.as_str())
            }
            JokeTheme::Random => replies::GENERATING_RANDOM.to_string(),
        };
        self.delivery.send(chat_id, &notice).await?;

        let prompt_theme = command.theme.resolve();
        let joke = match self.generator.generate(&prompt_theme).await {
            Ok(joke) => joke,
            Err(err) => {
                tracing::warn!(
                    user_id,
                    theme = %prompt_theme,
                    error = %err,
                    "Joke generation failed"
                );
                self.delivery.send(chat_id, &err.user_message()).await?;
                return Ok(RequestJokeOutcome::GenerationFailed(err));
            }
        };

        let now = Utc::now();
        let request = RequestRecord {
            id: Uuid::new_v4(),
            user_id,
            theme: command.theme.storage_key().to_string(),
            joke: joke.text.clone(),
            tokens_used: joke.tokens_used,
            created_at: now,
        };
        self.request_repo.save(&request).await?;
        self.user_repo.record_request(user_id, now).await?;

        let parts = self.delivery.deliver(chat_id, &joke.text).await?;

        tracing::info!(
            request_id = %request.id,
            user_id,
            theme = %request.theme,
            tokens_used = joke.tokens_used,
            parts,
            "Joke delivered"
        );

        Ok(RequestJokeOutcome::Delivered {
            request_id: request.id,
            parts,
            tokens_used: joke.tokens_used,
        })
    }
}
