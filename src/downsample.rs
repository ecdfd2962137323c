//! Time-bucketed downsampling for measurement charts
//!
//! A long measurement history is compressed into at most `target_count` points.
//! Buckets have a fixed width derived from the series span; each bucket turns
//! into one point labelled with the bucket's start and carrying the mean of its
//! members.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Measurement;
use crate::rounding::{mean, round_to_digits};

/// ---------------------------------------------------------------------------
/// Chart Measurement
/// ---------------------------------------------------------------------------

/// The numeric part of a measurement, as plotted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMeasurement {
  pub timestamp: DateTime<Utc>,
  pub weight: f64,
  pub body_fat_percent: Option<f64>,
  pub body_water_percent: Option<f64>,
  pub muscle_mass_percent: Option<f64>,
  pub body_mass_index: Option<f64>,
  pub metabolic_rate: Option<f64>,
}

impl From<&Measurement> for ChartMeasurement {
  fn from(m: &Measurement) -> Self {
    Self {
      timestamp: m.timestamp,
      weight: m.weight,
      body_fat_percent: m.body_fat_percent,
      body_water_percent: m.body_water_percent,
      muscle_mass_percent: m.muscle_mass_percent,
      body_mass_index: m.body_mass_index,
      metabolic_rate: m.metabolic_rate,
    }
  }
}

/// A single value at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
  pub x: DateTime<Utc>,
  pub y: f64,
}

/// ---------------------------------------------------------------------------
/// Method Selection
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DownsampleMethod {
  /// Plot every measurement
  None,
  /// Fixed-width bucket average
  #[default]
  Simple,
  /// Largest-triangle-three-buckets, performed by the renderer
  Lttb,
}

impl std::fmt::Display for DownsampleMethod {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::None => write!(f, "none"),
      Self::Simple => write!(f, "simple"),
      Self::Lttb => write!(f, "lttb"),
    }
  }
}

impl std::str::FromStr for DownsampleMethod {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "none" => Ok(Self::None),
      "simple" => Ok(Self::Simple),
      "lttb" => Ok(Self::Lttb),
      _ => Err(format!("Unknown downsample method: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DownsampleError {
  #[error("Target point count must be greater than 2, got {0}")]
  TargetTooSmall(usize),
}

/// ---------------------------------------------------------------------------
/// Downsampling
/// ---------------------------------------------------------------------------

/// Reduce `series` according to `method`. Only `Simple` changes the series here.
pub fn downsample(
  series: &[ChartMeasurement],
  target_count: usize,
  method: DownsampleMethod,
) -> Result<Vec<ChartMeasurement>, DownsampleError> {
  match method {
    DownsampleMethod::Simple => downsample_simple(series, target_count),
    DownsampleMethod::None | DownsampleMethod::Lttb => Ok(series.to_vec()),
  }
}

/// Fixed-width bucket average.
///
/// With `bucket_size = span / (target_count - 1)`, a bucket labelled `t` collects
/// records before `t + bucket_size / 2`. The record that reaches the boundary
/// closes the bucket and starts the next one, whose label and boundary move on by
/// one `bucket_size`.
///
/// A series with no time span collapses into a single point. Bucket widths are at
/// least one second, and once `target_count - 1` buckets are closed the rest of
/// the series goes into the last one, so the output never exceeds `target_count`.
pub fn downsample_simple(
  series: &[ChartMeasurement],
  target_count: usize,
) -> Result<Vec<ChartMeasurement>, DownsampleError> {
  if target_count <= 2 {
    return Err(DownsampleError::TargetTooSmall(target_count));
  }
  let (first, last) = match (series.first(), series.last()) {
    (Some(first), Some(last)) if series.len() > target_count => (first, last),
    _ => return Ok(series.to_vec()),
  };

  let start = first.timestamp;
  let span = (last.timestamp - start).num_seconds();
  if span <= 0 {
    return Ok(vec![average_bucket(start, series)]);
  }

  let bucket_size = Duration::seconds((span / (target_count as i64 - 1)).max(1));
  let half_size = Duration::seconds(bucket_size.num_seconds() / 2);

  let mut points = Vec::with_capacity(target_count);
  let mut bucket_time = start;
  let mut bucket_end = start + half_size;
  let mut bucket_start_index = 0;

  for (index, measurement) in series.iter().enumerate() {
    if points.len() + 1 == target_count {
      break;
    }
    if measurement.timestamp >= bucket_end && index > bucket_start_index {
      points.push(average_bucket(bucket_time, &series[bucket_start_index..index]));
      bucket_time += bucket_size;
      bucket_end += bucket_size;
      bucket_start_index = index;
    }
  }

  // the open bucket always holds at least the record that started it
  points.push(average_bucket(bucket_time, &series[bucket_start_index..]));

  Ok(points)
}

/// Collapse a non-empty bucket into one point
fn average_bucket(timestamp: DateTime<Utc>, entries: &[ChartMeasurement]) -> ChartMeasurement {
  ChartMeasurement {
    timestamp,
    weight: average_by(entries, |m| Some(m.weight)).unwrap_or(f64::NAN),
    body_fat_percent: average_by(entries, |m| m.body_fat_percent),
    body_water_percent: average_by(entries, |m| m.body_water_percent),
    muscle_mass_percent: average_by(entries, |m| m.muscle_mass_percent),
    body_mass_index: average_by(entries, |m| m.body_mass_index),
    metabolic_rate: average_by(entries, |m| m.metabolic_rate),
  }
}

/// Mean of the present values, rounded to one digit
fn average_by<F>(entries: &[ChartMeasurement], selector: F) -> Option<f64>
where
  F: Fn(&ChartMeasurement) -> Option<f64>,
{
  mean(entries.iter().filter_map(selector))
    .filter(|avg| !avg.is_nan())
    .map(|avg| round_to_digits(avg, 1))
}

/// Flat reference line across the visible series
pub fn target_line(series: &[ChartMeasurement], target: Option<f64>) -> Vec<ChartPoint> {
  match (target, series.first(), series.last()) {
    (Some(y), Some(first), Some(last)) => vec![
      ChartPoint { x: first.timestamp, y },
      ChartPoint { x: last.timestamp, y },
    ],
    _ => vec![],
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
