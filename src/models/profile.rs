use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Self-reported activity category, feeds the metabolic rate estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
  VeryLow,
  Low,
  Medium,
  High,
  VeryHigh,
}

impl std::fmt::Display for ActivityLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::VeryLow => write!(f, "very_low"),
      Self::Low => write!(f, "low"),
      Self::Medium => write!(f, "medium"),
      Self::High => write!(f, "high"),
      Self::VeryHigh => write!(f, "very_high"),
    }
  }
}

impl std::str::FromStr for ActivityLevel {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "very_low" => Ok(Self::VeryLow),
      "low" => Ok(Self::Low),
      "medium" => Ok(Self::Medium),
      "high" => Ok(Self::High),
      "very_high" => Ok(Self::VeryHigh),
      _ => Err(format!("Unknown activity level: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub id: i64,
  pub name: String,
  pub activity_level: Option<ActivityLevel>,
  /// Target weight in kg, drawn as a flat reference line on the chart
  pub target_weight: Option<f64>,
  pub created_at: Option<DateTime<Utc>>,
}

/// For inserting new profiles (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
  pub name: String,
  pub activity_level: Option<ActivityLevel>,
  pub target_weight: Option<f64>,
}
