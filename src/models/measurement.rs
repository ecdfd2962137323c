use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ActivityLevel;

/// A stored scale reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
  pub id: i64,
  pub profile_id: i64,
  pub timestamp: DateTime<Utc>,
  pub weight: f64,
  pub body_fat_percent: Option<f64>,
  pub body_water_percent: Option<f64>,
  pub muscle_mass_percent: Option<f64>,
  pub body_mass_index: Option<f64>,
  pub metabolic_rate: Option<f64>,
  pub activity_level: Option<ActivityLevel>,
  pub notes: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

/// For inserting new measurements (without id, profile, created_at)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
  pub timestamp: DateTime<Utc>,
  pub weight: f64,
  pub body_fat_percent: Option<f64>,
  pub body_water_percent: Option<f64>,
  pub muscle_mass_percent: Option<f64>,
  pub body_mass_index: Option<f64>,
  pub metabolic_rate: Option<f64>,
  pub activity_level: Option<ActivityLevel>,
  pub notes: Option<String>,
}
