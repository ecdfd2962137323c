//! Profile and measurement persistence
//!
//! Thin queries only. Inserts take a bare connection so the import can run them
//! inside its transaction.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use crate::models::{ActivityLevel, Measurement, NewMeasurement, NewProfile, Profile};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Profile not found: {0}")]
  ProfileNotFound(i64),

  #[error("Corrupt row: {0}")]
  Corrupt(String),
}

/// ---------------------------------------------------------------------------
/// Profiles
/// ---------------------------------------------------------------------------

pub async fn create_profile(pool: &SqlitePool, profile: &NewProfile) -> Result<i64, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO profiles (name, activity_level, target_weight)
    VALUES (?1, ?2, ?3)
    "#,
  )
  .bind(&profile.name)
  .bind(profile.activity_level.map(|l| l.to_string()))
  .bind(profile.target_weight)
  .execute(pool)
  .await?;

  Ok(result.last_insert_rowid())
}

pub async fn load_profile(pool: &SqlitePool, id: i64) -> Result<Profile, StoreError> {
  let row = sqlx::query(
    r#"
    SELECT id, name, activity_level, target_weight, created_at
    FROM profiles
    WHERE id = ?1
    "#,
  )
  .bind(id)
  .fetch_optional(pool)
  .await?
  .ok_or(StoreError::ProfileNotFound(id))?;

  Ok(Profile {
    id: row.try_get("id")?,
    name: row.try_get("name")?,
    activity_level: parse_activity_level(&row)?,
    target_weight: row.try_get("target_weight")?,
    created_at: row.try_get("created_at")?,
  })
}

/// ---------------------------------------------------------------------------
/// Measurements
/// ---------------------------------------------------------------------------

/// Insert one measurement, returns the new row id
pub async fn insert_measurement(
  conn: &mut SqliteConnection,
  profile_id: i64,
  measurement: &NewMeasurement,
) -> Result<i64, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO measurements (
      profile_id, timestamp, weight, body_fat_percent, body_water_percent,
      muscle_mass_percent, body_mass_index, metabolic_rate, activity_level, notes
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
  )
  .bind(profile_id)
  .bind(measurement.timestamp)
  .bind(measurement.weight)
  .bind(measurement.body_fat_percent)
  .bind(measurement.body_water_percent)
  .bind(measurement.muscle_mass_percent)
  .bind(measurement.body_mass_index)
  .bind(measurement.metabolic_rate)
  .bind(measurement.activity_level.map(|l| l.to_string()))
  .bind(&measurement.notes)
  .execute(conn)
  .await?;

  Ok(result.last_insert_rowid())
}

/// All measurements of a profile, oldest first
pub async fn list_measurements(pool: &SqlitePool, profile_id: i64) -> Result<Vec<Measurement>, StoreError> {
  let rows = sqlx::query(
    r#"
    SELECT
      id, profile_id, timestamp, weight, body_fat_percent, body_water_percent,
      muscle_mass_percent, body_mass_index, metabolic_rate, activity_level,
      notes, created_at
    FROM measurements
    WHERE profile_id = ?1
    ORDER BY timestamp, id
    "#,
  )
  .bind(profile_id)
  .fetch_all(pool)
  .await?;

  rows.iter().map(measurement_from_row).collect()
}

pub async fn count_measurements(pool: &SqlitePool, profile_id: i64) -> Result<i64, StoreError> {
  let count = sqlx::query_scalar("SELECT COUNT(*) FROM measurements WHERE profile_id = ?1")
    .bind(profile_id)
    .fetch_one(pool)
    .await?;
  Ok(count)
}

fn measurement_from_row(row: &SqliteRow) -> Result<Measurement, StoreError> {
  let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
  Ok(Measurement {
    id: row.try_get("id")?,
    profile_id: row.try_get("profile_id")?,
    timestamp,
    weight: row.try_get("weight")?,
    body_fat_percent: row.try_get("body_fat_percent")?,
    body_water_percent: row.try_get("body_water_percent")?,
    muscle_mass_percent: row.try_get("muscle_mass_percent")?,
    body_mass_index: row.try_get("body_mass_index")?,
    metabolic_rate: row.try_get("metabolic_rate")?,
    activity_level: parse_activity_level(row)?,
    notes: row.try_get("notes")?,
    created_at: row.try_get("created_at")?,
  })
}

fn parse_activity_level(row: &SqliteRow) -> Result<Option<ActivityLevel>, StoreError> {
  let raw: Option<String> = row.try_get("activity_level")?;
  raw
    .map(|s| s.parse::<ActivityLevel>().map_err(StoreError::Corrupt))
    .transpose()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
