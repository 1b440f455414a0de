//! Anekdotych - 生成俄语笑话的 Telegram 机器人
//!
//! - Domain: joke/, text_segmenter, replies
//! - Application: commands, queries, ports, delivery
//! - Infrastructure: telegram, adapters, persistence, worker

use std::sync::Arc;
use std::time::Duration;

use anekdotych::application::{JokeGeneratorPort, MessageDelivery, RetryPolicy};
use anekdotych::config::{load_config, print_config, AppConfig, GeneratorBackend};
use anekdotych::infrastructure::adapters::{FakeJokeGenerator, OpenRouterClient};
use anekdotych::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, SqliteRequestRepository, SqliteUserRepository,
};
use anekdotych::infrastructure::telegram::{BotSettings, BotState, TelegramBot, TelegramSender};
use anekdotych::infrastructure::worker::{HealthCheckConfig, HealthCheckWorker};
use teloxide::Bot;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},anekdotych={}",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_generator(config: &AppConfig) -> anyhow::Result<Arc<dyn JokeGeneratorPort>> {
    let generator: Arc<dyn JokeGeneratorPort> = match config.generator.backend {
        GeneratorBackend::OpenRouter => Arc::new(OpenRouterClient::new(
            config.generator.to_openrouter_config(),
        )?),
        GeneratorBackend::Fake => {
            tracing::warn!("Using fake joke generator, no requests will reach the LLM");
            Arc::new(FakeJokeGenerator::new(config.generator.to_fake_config()))
        }
    };
    Ok(generator)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 中的变量只在未设置时生效
    dotenvy::dotenv().ok();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Anekdotych - Telegram joke bot");
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = config.database.parent_dir() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let pool = create_pool(&config.database.to_pool_config()).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let request_repo = Arc::new(SqliteRequestRepository::new(pool.clone()));

    // 创建笑话生成器
    let generator = build_generator(&config)?;

    // 创建 Telegram 客户端与消息投递
    let bot = Bot::new(&config.telegram.token);
    let sender = Arc::new(TelegramSender::new(bot.clone()));
    let policy = RetryPolicy::new(
        config.limits.send_max_attempts,
        config.limits.send_retry_delay(),
    );
    let delivery = Arc::new(MessageDelivery::new(
        sender,
        policy,
        config.limits.max_message_length,
    ));

    // 启动健康检查 Worker
    if config.health.enabled {
        let worker = HealthCheckWorker::new(
            HealthCheckConfig {
                first_delay: Duration::from_secs(config.health.first_delay_secs),
                interval: Duration::from_secs(config.health.interval_secs),
            },
            request_repo.clone(),
            generator.clone(),
        );
        tokio::spawn(worker.run());
    }

    let settings = BotSettings {
        admin_ids: config.telegram.admin_ids.clone(),
        daily_limit: config.limits.max_requests_per_user,
        cooldown_secs: config.generator.cooldown_secs,
        top_themes_limit: config.limits.top_themes_limit,
    };
    let state = Arc::new(BotState::new(
        settings,
        generator,
        user_repo,
        request_repo,
        delivery,
    ));

    tracing::info!("Starting Telegram bot...");

    // 长轮询直到 Ctrl-C
    TelegramBot::new(bot, state).run().await;

    pool.close().await;
    tracing::info!("Bot shutdown complete");

    Ok(())
}
