//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod request_repo;
mod user_repo;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool};
pub use request_repo::*;
pub use user_repo::*;
