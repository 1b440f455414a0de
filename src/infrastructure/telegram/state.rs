//! Bot State
//!
//! 包含所有 Command/Query Handlers 及运行参数，作为 dptree 依赖注入

use std::sync::Arc;

use crate::application::{
    // Command handlers
    RegisterUserHandler, RequestJokeHandler,
    // Query handlers
    GetDailyStatsHandler, GetGlobalStatsHandler, GetTopThemesHandler, GetUserStatsHandler,
    // Ports
    JokeGeneratorPort, MessageDelivery, RequestRepositoryPort, UserRepositoryPort,
};

/// 机器人运行参数
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// 管理员 Telegram user id
    pub admin_ids: Vec<i64>,
    /// 每个用户每日最多请求数
    pub daily_limit: u32,
    /// 两次生成请求之间的最小间隔（秒）
    pub cooldown_secs: u64,
    /// /top 显示的主题数量
    pub top_themes_limit: u32,
}

impl BotSettings {
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

/// 机器人状态
pub struct BotState {
    pub settings: BotSettings,
    pub delivery: Arc<MessageDelivery>,

    // ========== Command Handlers ==========
    pub register_user_handler: RegisterUserHandler,
    pub request_joke_handler: RequestJokeHandler,

    // ========== Query Handlers ==========
    pub get_user_stats_handler: GetUserStatsHandler,
    pub get_top_themes_handler: GetTopThemesHandler,
    pub get_global_stats_handler: GetGlobalStatsHandler,
    pub get_daily_stats_handler: GetDailyStatsHandler,
}

impl BotState {
    /// 创建机器人状态
    pub fn new(
        settings: BotSettings,
        generator: Arc<dyn JokeGeneratorPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
        request_repo: Arc<dyn RequestRepositoryPort>,
        delivery: Arc<MessageDelivery>,
    ) -> Self {
        Self {
            // Command handlers
            register_user_handler: RegisterUserHandler::new(user_repo.clone()),
            request_joke_handler: RequestJokeHandler::new(
                generator,
                user_repo.clone(),
                request_repo.clone(),
                delivery.clone(),
                settings.daily_limit,
            ),

            // Query handlers
            get_user_stats_handler: GetUserStatsHandler::new(user_repo),
            get_top_themes_handler: GetTopThemesHandler::new(request_repo.clone()),
            get_global_stats_handler: GetGlobalStatsHandler::new(request_repo.clone()),
            get_daily_stats_handler: GetDailyStatsHandler::new(request_repo),

            settings,
            delivery,
        }
    }
}
