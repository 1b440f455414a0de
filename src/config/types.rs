//! Configuration Types
//!
//! 定义所有配置结构体

use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::DEFAULT_MAX_MESSAGE_LENGTH;
use crate::infrastructure::adapters::{FakeJokeGeneratorConfig, OpenRouterClientConfig};
use crate::infrastructure::persistence::sqlite::DatabaseConfig as PoolConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Telegram 配置
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// 笑话生成服务配置
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// 限额与消息发送配置
    #[serde(default)]
    pub limits: LimitsConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 健康检查配置
    #[serde(default)]
    pub health: HealthConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// Telegram 配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    /// Bot Token
    #[serde(default)]
    pub token: String,

    /// 管理员 user id，可写为数组或逗号分隔的字符串
    #[serde(default, deserialize_with = "deserialize_id_list")]
    pub admin_ids: Vec<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdList {
    List(Vec<i64>),
    One(i64),
    Text(String),
}

fn deserialize_id_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match IdList::deserialize(deserializer)? {
        IdList::List(ids) => Ok(ids),
        IdList::One(id) => Ok(vec![id]),
        IdList::Text(text) => parse_id_list(&text).map_err(serde::de::Error::custom),
    }
}

/// 解析逗号分隔的 id 列表（忽略空项）
pub fn parse_id_list(text: &str) -> Result<Vec<i64>, String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<i64>()
                .map_err(|_| format!("Invalid user id: {}", item))
        })
        .collect()
}

/// 生成服务后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorBackend {
    /// OpenRouter chat completions
    #[default]
    OpenRouter,
    /// 固定文本，不访问网络
    Fake,
}

/// 笑话生成服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub backend: GeneratorBackend,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// 请求超时（秒）
    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,

    /// 相邻两次生成请求的最小间隔（秒）
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,

    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_title")]
    pub title: String,

    /// fake 后端返回的笑话模板
    #[serde(default)]
    pub fake_joke: Option<String>,
}

fn default_api_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "deepseek/deepseek-chat".to_string()
}

fn default_max_tokens() -> u32 {
    250
}

fn default_temperature() -> f32 {
    0.85
}

fn default_top_p() -> f32 {
    0.9
}

fn default_generator_timeout() -> u64 {
    30
}

fn default_cooldown() -> u64 {
    5
}

fn default_referer() -> String {
    "https://t.me/anekdotych_bot".to_string()
}

fn default_title() -> String {
    "Anekdotych Telegram Bot".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            backend: GeneratorBackend::default(),
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_generator_timeout(),
            cooldown_secs: default_cooldown(),
            referer: default_referer(),
            title: default_title(),
            fake_joke: None,
        }
    }
}

impl GeneratorConfig {
    /// 转换为 OpenRouter 客户端配置
    pub fn to_openrouter_config(&self) -> OpenRouterClientConfig {
        OpenRouterClientConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            timeout_secs: self.timeout_secs,
            cooldown: Duration::from_secs(self.cooldown_secs),
            referer: self.referer.clone(),
            title: self.title.clone(),
        }
    }

    /// 转换为 fake 生成器配置
    pub fn to_fake_config(&self) -> FakeJokeGeneratorConfig {
        let mut config = FakeJokeGeneratorConfig::default();
        if let Some(joke) = &self.fake_joke {
            config.joke = joke.clone();
        }
        config
    }
}

/// 限额与消息发送配置
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// 每个用户每日最多请求数
    #[serde(default = "default_max_requests")]
    pub max_requests_per_user: u32,

    /// 单条消息最大长度（字符）
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// 单条消息最多发送尝试次数
    #[serde(default = "default_send_attempts")]
    pub send_max_attempts: u32,

    /// 发送重试间隔（毫秒）
    #[serde(default)]
    pub send_retry_delay_ms: u64,

    /// /top 显示的主题数量
    #[serde(default = "default_top_themes")]
    pub top_themes_limit: u32,
}

fn default_max_requests() -> u32 {
    50
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}

fn default_send_attempts() -> u32 {
    3
}

fn default_top_themes() -> u32 {
    10
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests_per_user: default_max_requests(),
            max_message_length: default_max_message_length(),
            send_max_attempts: default_send_attempts(),
            send_retry_delay_ms: 0,
            top_themes_limit: default_top_themes(),
        }
    }
}

impl LimitsConfig {
    pub fn send_retry_delay(&self) -> Duration {
        Duration::from_millis(self.send_retry_delay_ms)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/anekdotych.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 数据库文件所在目录
    pub fn parent_dir(&self) -> Option<PathBuf> {
        PathBuf::from(&self.path)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(PathBuf::from)
    }

    /// 转换为连接池配置（文件不存在时自动创建）
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig {
            database_url: format!("sqlite:{}?mode=rwc", self.path),
            max_connections: self.max_connections,
        }
    }
}

/// 健康检查配置
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,

    /// 检查间隔（秒）
    #[serde(default = "default_health_interval")]
    pub interval_secs: u64,

    /// 启动后首次检查的延迟（秒）
    #[serde(default = "default_health_first_delay")]
    pub first_delay_secs: u64,
}

fn default_health_enabled() -> bool {
    true
}

fn default_health_interval() -> u64 {
    1800
}

fn default_health_first_delay() -> u64 {
    10
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            interval_secs: default_health_interval(),
            first_delay_secs: default_health_first_delay(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
