//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, GeneratorBackend};
use crate::domain::DEFAULT_MAX_MESSAGE_LENGTH;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 兼容旧部署的环境变量
const LEGACY_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
const LEGACY_API_KEY_VAR: &str = "DEEPSEEK_API_KEY";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `ANEKDOTYCH_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// 前缀变量未设置时，回退到 `TELEGRAM_TOKEN` 与 `DEEPSEEK_API_KEY`。
///
/// # 环境变量示例
/// - `ANEKDOTYCH_TELEGRAM__TOKEN=123:abc`
/// - `ANEKDOTYCH_TELEGRAM__ADMIN_IDS=1001,1002`
/// - `ANEKDOTYCH_GENERATOR__BACKEND=fake`
/// - `ANEKDOTYCH_LIMITS__MAX_REQUESTS_PER_USER=20`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("generator.backend", "openrouter")?
        .set_default("generator.timeout_secs", 30)?
        .set_default("generator.cooldown_secs", 5)?
        .set_default("limits.max_requests_per_user", 50)?
        .set_default(
            "limits.max_message_length",
            DEFAULT_MAX_MESSAGE_LENGTH as i64,
        )?
        .set_default("limits.send_max_attempts", 3)?
        .set_default("limits.send_retry_delay_ms", 0)?
        .set_default("limits.top_themes_limit", 10)?
        .set_default("database.path", "data/anekdotych.db")?
        .set_default("database.max_connections", 5)?
        .set_default("health.enabled", true)?
        .set_default("health.interval_secs", 1800)?
        .set_default("health.first_delay_secs", 10)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: ANEKDOTYCH_GENERATOR__API_KEY=sk-...
    builder = builder.add_source(
        Environment::with_prefix("ANEKDOTYCH")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let mut app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    apply_legacy_env(&mut app_config, |name| std::env::var(name).ok());

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 用旧变量名补全空缺的密钥
fn apply_legacy_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if config.telegram.token.is_empty() {
        if let Some(token) = lookup(LEGACY_TOKEN_VAR).filter(|v| !v.is_empty()) {
            config.telegram.token = token;
        }
    }
    if config.generator.api_key.is_empty() {
        if let Some(key) = lookup(LEGACY_API_KEY_VAR).filter(|v| !v.is_empty()) {
            config.generator.api_key = key;
        }
    }
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.telegram.token.is_empty() {
        return Err(ConfigError::ValidationError(
            "Telegram token is required".to_string(),
        ));
    }

    if config.generator.backend == GeneratorBackend::OpenRouter {
        if config.generator.api_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "Generator API key is required for the openrouter backend".to_string(),
            ));
        }
        if config.generator.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "Generator API URL cannot be empty".to_string(),
            ));
        }
    }

    if config.generator.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Generator timeout cannot be 0".to_string(),
        ));
    }

    let limits = &config.limits;
    if limits.max_requests_per_user == 0 {
        return Err(ConfigError::ValidationError(
            "Daily request limit cannot be 0".to_string(),
        ));
    }
    if limits.max_message_length == 0 {
        return Err(ConfigError::ValidationError(
            "Max message length cannot be 0".to_string(),
        ));
    }
    if limits.send_max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "Send attempts cannot be 0".to_string(),
        ));
    }
    if limits.top_themes_limit == 0 {
        return Err(ConfigError::ValidationError(
            "Top themes limit cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.health.enabled && config.health.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Health check interval cannot be 0 when enabled".to_string(),
        ));
    }

    Ok(())
}

/// 隐藏密钥，只保留前 4 个字符
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Telegram Token: {}", mask_secret(&config.telegram.token));
    tracing::info!("Admins: {:?}", config.telegram.admin_ids);
    tracing::info!("Generator Backend: {:?}", config.generator.backend);
    if config.generator.backend == GeneratorBackend::OpenRouter {
        tracing::info!("Generator URL: {}", config.generator.api_url);
        tracing::info!("Generator Model: {}", config.generator.model);
        tracing::info!("Generator API Key: {}", mask_secret(&config.generator.api_key));
        tracing::info!("Generator Timeout: {}s", config.generator.timeout_secs);
        tracing::info!("Generator Cooldown: {}s", config.generator.cooldown_secs);
    }
    tracing::info!("Daily Limit: {}", config.limits.max_requests_per_user);
    tracing::info!("Max Message Length: {}", config.limits.max_message_length);
    tracing::info!(
        "Send Retries: {} attempts, {}ms delay",
        config.limits.send_max_attempts,
        config.limits.send_retry_delay_ms
    );
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Health Check Enabled: {}", config.health.enabled);
    if config.health.enabled {
        tracing::info!("Health Check Interval: {}s", config.health.interval_secs);
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.telegram.token = "123:abc".to_string();
        config.generator.api_key = "sk-test".to_string();
        config
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validation_error_for_missing_token() {
        let mut config = valid_config();
        config.telegram.token = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_api_key_only_required_for_openrouter() {
        let mut config = valid_config();
        config.generator.api_key = String::new();
        assert!(validate_config(&config).is_err());

        config.generator.backend = GeneratorBackend::Fake;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_limits() {
        let mut config = valid_config();
        config.limits.max_message_length = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.limits.send_max_attempts = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid_config();
        config.limits.max_requests_per_user = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_legacy_env_fills_missing_secrets() {
        let mut config = AppConfig::default();
        apply_legacy_env(&mut config, |name| match name {
            "TELEGRAM_TOKEN" => Some("legacy-token".to_string()),
            "DEEPSEEK_API_KEY" => Some("legacy-key".to_string()),
            _ => None,
        });
        assert_eq!(config.telegram.token, "legacy-token");
        assert_eq!(config.generator.api_key, "legacy-key");
    }

    #[test]
    fn test_legacy_env_does_not_override() {
        let mut config = valid_config();
        apply_legacy_env(&mut config, |_| Some("legacy".to_string()));
        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.generator.api_key, "sk-test");
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "<unset>");
        assert_eq!(mask_secret("sk-abcdef"), "sk-a****");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[telegram]
token = "123:abc"
admin_ids = "1001, 1002"

[generator]
backend = "fake"
fake_joke = "Про {{theme}}."

[limits]
max_requests_per_user = 7
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.telegram.admin_ids, vec![1001, 1002]);
        assert_eq!(config.generator.backend, GeneratorBackend::Fake);
        assert_eq!(config.generator.fake_joke.as_deref(), Some("Про {theme}."));
        assert_eq!(config.limits.max_requests_per_user, 7);
        assert_eq!(config.limits.max_message_length, 4096);
        assert_eq!(config.database.path, "data/anekdotych.db");
    }

    #[test]
    fn test_obsolete_telegram_keys_are_ignored() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[telegram]
token = "123:abc"
bot_username = "anekdotych_bot"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.telegram.token, "123:abc");
        assert!(config.telegram.admin_ids.is_empty());
        assert_eq!(
            config.limits.max_message_length,
            DEFAULT_MAX_MESSAGE_LENGTH
        );
    }
}
