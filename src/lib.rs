pub mod chart;
pub mod commands;
pub mod config;
pub mod db;
pub mod downsample;
pub mod import;
pub mod metabolic;
pub mod models;
pub mod rounding;
pub mod store;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use config::{AppConfig, ConfigError};
use db::AppState;
use metabolic::MetabolicRateCalculator;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error("Failed to initialize database: {0}")]
  Database(#[from] sqlx::Error),
}

/// Install the global fmt subscriber. Later calls are no-ops.
pub fn init_tracing(filter: &str) {
  let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Load configuration, start logging and open the database
pub async fn run<C>(calculator: C) -> Result<AppState, StartupError>
where
  C: MetabolicRateCalculator + Send + Sync + 'static,
{
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;
  init_tracing(&config.log_filter);

  let db = db::initialize_db(&config).await?;
  tracing::info!("Database ready");

  Ok(AppState {
    db,
    config,
    calculator: Arc::new(calculator),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::fixed_calculator;
  use serial_test::serial;

  fn startup_vars(chart_points: &'static str) -> Vec<(&'static str, Option<&'static str>)> {
    vec![
      ("BODYLOG_DATABASE_URL", Some("sqlite::memory:")),
      ("BODYLOG_MAX_CONNECTIONS", Some("1")),
      ("BODYLOG_CHART_POINTS", Some(chart_points)),
      ("BODYLOG_DOWNSAMPLE", None),
      ("BODYLOG_LOG", Some("bodylog=debug")),
    ]
  }

  #[test]
  fn test_init_tracing_tolerates_bad_filter_and_repeat_calls() {
    init_tracing("bodylog=[not a filter");
    init_tracing("info");
  }

  #[test]
  #[serial]
  fn test_run_opens_migrated_database() {
    temp_env::with_vars(startup_vars("20"), || {
      let runtime = tokio::runtime::Runtime::new().unwrap();
      runtime.block_on(async {
        let state = run(fixed_calculator(1900.0)).await.unwrap();
        assert_eq!(state.config.database_url, "sqlite::memory:");
        assert_eq!(state.config.chart.target_points, 20);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM measurements")
          .fetch_one(&state.db)
          .await
          .unwrap();
        assert_eq!(count, 0);
        assert_eq!(state.calculator.calculate(models::ActivityLevel::Low, 80.0, 40.0), 1900.0);

        state.db.close().await;
      });
    });
  }

  #[test]
  #[serial]
  fn test_run_rejects_invalid_config() {
    temp_env::with_vars(startup_vars("2"), || {
      let runtime = tokio::runtime::Runtime::new().unwrap();
      let result = runtime.block_on(run(fixed_calculator(1900.0)));
      assert!(matches!(result, Err(StartupError::Config(_))));
    });
  }
}
