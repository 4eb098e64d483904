use anyhow::Result;
use sqlx::{Sqlite, migrate::MigrateDatabase, sqlite::SqlitePool};

pub mod match_repository;
pub mod models;
pub mod player_repository;
pub mod reminder_repository;

pub use match_repository::MatchRepository;
pub use player_repository::PlayerRepository;
pub use reminder_repository::ReminderRepository;

pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        log::info!("Creating database {}", database_url);
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePool::connect(database_url).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
