use std::sync::Arc;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::AppConfig;
use crate::metabolic::MetabolicRateCalculator;

pub type DbPool = SqlitePool;

/// Application state shared by all commands
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
  /// Supplied by the embedding application; no formula lives in this crate
  pub calculator: Arc<dyn MetabolicRateCalculator + Send + Sync>,
}

/// Initialize the database connection pool and run migrations
pub async fn initialize_db(config: &AppConfig) -> Result<DbPool, sqlx::Error> {
  info!(url = %config.database_url, "Initializing database");

  // Create connection pool
  let pool = SqlitePoolOptions::new()
    .max_connections(config.max_connections)
    .connect(&config.database_url)
    .await?;

  // Run migrations
  sqlx::migrate!("./migrations").run(&pool).await?;

  info!("Database initialized successfully");

  Ok(pool)
}
