//! Fake Joke Generator - 不访问网络的生成器
//!
//! 始终返回配置的固定笑话（`{theme}` 会被替换为请求主题），
//! 也可以配置为始终失败。用于测试和离线运行。

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application::ports::{GeneratedJoke, GenerationError, JokeGeneratorPort};
use crate::domain::joke::clean_joke_text;

/// Fake Generator 配置
#[derive(Debug, Clone)]
pub struct FakeJokeGeneratorConfig {
    /// 固定返回的笑话模板
    pub joke: String,
    /// 固定返回的 token 数
    pub tokens_used: i64,
    /// 模拟生成延迟（毫秒）
    pub delay_ms: u64,
}

impl Default for FakeJokeGeneratorConfig {
    fn default() -> Self {
        Self {
            joke: "Приходит {theme} в магазин и спрашивает:\n- У вас есть батарейки?\n- Есть.\n- А без них можно?".to_string(),
            tokens_used: 0,
            delay_ms: 0,
        }
    }
}

/// 预设的失败类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    RateLimited,
    Api(u16),
    Timeout,
}

impl FakeFailure {
    fn to_error(self) -> GenerationError {
        match self {
            FakeFailure::RateLimited => GenerationError::RateLimited,
            FakeFailure::Api(status) => GenerationError::Api {
                status,
                body: "fake failure".to_string(),
            },
            FakeFailure::Timeout => GenerationError::Timeout,
        }
    }
}

/// Fake Joke Generator
pub struct FakeJokeGenerator {
    config: FakeJokeGeneratorConfig,
    failure: Option<FakeFailure>,
    calls: AtomicUsize,
    last_theme: Mutex<Option<String>>,
}

impl FakeJokeGenerator {
    pub fn new(config: FakeJokeGeneratorConfig) -> Self {
        tracing::info!(
            tokens_used = config.tokens_used,
            delay_ms = config.delay_ms,
            "FakeJokeGenerator initialized"
        );
        Self {
            config,
            failure: None,
            calls: AtomicUsize::new(0),
            last_theme: Mutex::new(None),
        }
    }

    /// 每次调用都返回指定错误
    pub fn failing(mut self, failure: FakeFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// 已被调用的次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 最近一次请求的主题
    pub fn last_theme(&self) -> Option<String> {
        self.last_theme
            .lock()
            .ok()
            .and_then(|theme| theme.clone())
    }
}

#[async_trait]
impl JokeGeneratorPort for FakeJokeGenerator {
    async fn generate(&self, theme: &str) -> Result<GeneratedJoke, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_theme.lock() {
            *last = Some(theme.to_string());
        }

        tracing::debug!(theme = %theme, "FakeJokeGenerator: returning fixed joke");

        if self.config.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.delay_ms)).await;
        }

        if let Some(failure) = self.failure {
            return Err(failure.to_error());
        }

        let text = clean_joke_text(&self.config.joke.replace("{theme}", theme));
        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        Ok(GeneratedJoke {
            text,
            tokens_used: self.config.tokens_used,
        })
    }

    async fn health_check(&self) -> bool {
        self.failure.is_none()
    }
}
