//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - CSV fixtures
//! - Helper assertions

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db::AppState;
use crate::downsample::ChartMeasurement;
use crate::models::{ActivityLevel, Measurement, NewMeasurement, NewProfile};
use crate::store::{create_profile, insert_measurement};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// App state over an in-memory database with default settings
pub async fn mock_app_state() -> AppState {
  AppState {
    db: setup_test_db().await,
    config: AppConfig::default(),
    calculator: Arc::new(fixed_calculator(1900.0)),
  }
}

/// Seed a profile (medium activity, 75kg target), returns its id
pub async fn seed_test_profile(pool: &SqlitePool) -> i64 {
  create_profile(
    pool,
    &NewProfile {
      name: "Test Profile".to_string(),
      activity_level: Some(ActivityLevel::Medium),
      target_weight: Some(75.0),
    },
  )
  .await
  .expect("Failed to seed profile")
}

/// Seed one reading per day, going back `count` days
pub async fn seed_test_measurements(pool: &SqlitePool, profile_id: i64, count: usize) -> Vec<i64> {
  let mut conn = pool.acquire().await.expect("Failed to acquire connection");
  let mut ids = Vec::new();

  for i in 0..count {
    let mut measurement = mock_new_measurement(datetime_days_ago(i as i64), 82.0 - (i % 5) as f64 * 0.4);
    measurement.body_fat_percent = Some(22.0 + (i % 3) as f64 * 0.5);
    measurement.muscle_mass_percent = (i % 2 == 0).then_some(38.5);

    let id = insert_measurement(&mut conn, profile_id, &measurement)
      .await
      .expect("Failed to insert test measurement");
    ids.push(id);
  }

  ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Calculator returning the same estimate for every input
pub fn fixed_calculator(kcal: f64) -> impl Fn(ActivityLevel, f64, f64) -> f64 + Send + Sync + 'static {
  move |_, _, _| kcal
}

/// A weight-only reading
pub fn mock_new_measurement(timestamp: DateTime<Utc>, weight: f64) -> NewMeasurement {
  NewMeasurement {
    timestamp,
    weight,
    body_fat_percent: None,
    body_water_percent: None,
    muscle_mass_percent: None,
    body_mass_index: None,
    metabolic_rate: None,
    activity_level: None,
    notes: None,
  }
}

/// A stored weight-only reading
pub fn mock_measurement(id: i64, timestamp: DateTime<Utc>, weight: f64) -> Measurement {
  Measurement {
    id,
    profile_id: 1,
    timestamp,
    weight,
    body_fat_percent: None,
    body_water_percent: None,
    muscle_mass_percent: None,
    body_mass_index: None,
    metabolic_rate: None,
    activity_level: None,
    notes: None,
    created_at: None,
  }
}

/// A weight-only chart point
pub fn chart_point_at(timestamp: DateTime<Utc>, weight: f64) -> ChartMeasurement {
  ChartMeasurement {
    timestamp,
    weight,
    body_fat_percent: None,
    body_water_percent: None,
    muscle_mass_percent: None,
    body_mass_index: None,
    metabolic_rate: None,
  }
}

/// One chart point per day starting 2020-01-01 07:00 UTC
pub fn daily_series(weights: &[f64]) -> Vec<ChartMeasurement> {
  let start = Utc
    .with_ymd_and_hms(2020, 1, 1, 7, 0, 0)
    .single()
    .expect("valid start date");
  weights
    .iter()
    .enumerate()
    .map(|(i, w)| chart_point_at(start + Duration::days(i as i64), *w))
    .collect()
}

/// ---------------------------------------------------------------------------
/// CSV Fixtures
/// ---------------------------------------------------------------------------

pub const SAMPLE_HEADER: &str = "Datum;Uhrzeit;Gewicht;Körperfett;Wasser;Muskelmasse;BMI;Notizen";

/// Encode test CSV the way the scale writes it
pub fn encode_latin9(text: &str) -> Vec<u8> {
  let (bytes, _, had_errors) = encoding_rs::ISO_8859_15.encode(text);
  assert!(!had_errors, "fixture not representable in ISO-8859-15");
  bytes.into_owned()
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('profiles', 'measurements')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 2, "Expected 2 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_measurements_returns_correct_count() {
    let pool = setup_test_db().await;
    let profile_id = seed_test_profile(&pool).await;

    let ids = seed_test_measurements(&pool, profile_id, 5).await;
    assert_eq!(ids.len(), 5);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM measurements")
      .fetch_one(&pool)
      .await
      .expect("Failed to count measurements");

    assert_eq!(count, 5);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_daily_series_spacing() {
    let series = daily_series(&[70.0, 70.5, 71.0]);
    assert_eq!(series.len(), 3);
    assert_eq!((series[2].timestamp - series[0].timestamp).num_days(), 2);
    crate::assert_approx_eq!(series[1].weight, 70.5, 1e-9);
  }

  #[test]
  fn test_encode_latin9_single_byte_umlaut() {
    let bytes = encode_latin9("Körperfett");
    assert_eq!(bytes.len(), "Körperfett".chars().count());
    assert_eq!(bytes[1], 0xF6);
  }
}
