//! Weight chart series
//!
//! Turns stored measurements into the per-metric point lists a chart widget
//! draws. Absent values simply produce no point in their series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ChartConfig;
use crate::downsample::{downsample, target_line, ChartMeasurement, ChartPoint, DownsampleError, DownsampleMethod};
use crate::models::Measurement;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightChart {
  pub weight: Vec<ChartPoint>,
  pub target_weight: Vec<ChartPoint>,
  pub body_fat_percent: Vec<ChartPoint>,
  pub body_water_percent: Vec<ChartPoint>,
  pub muscle_mass_percent: Vec<ChartPoint>,
  pub body_mass_index: Vec<ChartPoint>,
  pub metabolic_rate: Vec<ChartPoint>,
  /// Point budget the renderer should enforce itself (largest-triangle mode)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub renderer_threshold: Option<usize>,
}

pub fn build_weight_chart(
  measurements: &[Measurement],
  target_weight: Option<f64>,
  config: &ChartConfig,
) -> Result<WeightChart, DownsampleError> {
  let series: Vec<ChartMeasurement> = measurements.iter().map(ChartMeasurement::from).collect();
  let entries = downsample(&series, config.target_points, config.method)?;

  debug!(
    input = series.len(),
    output = entries.len(),
    method = %config.method,
    "Prepared weight chart"
  );

  let mut chart = WeightChart {
    target_weight: target_line(&entries, target_weight),
    renderer_threshold: (config.method == DownsampleMethod::Lttb).then_some(config.target_points),
    ..Default::default()
  };

  for entry in &entries {
    let x = entry.timestamp;
    chart.weight.push(ChartPoint { x, y: entry.weight });
    push_present(&mut chart.body_fat_percent, x, entry.body_fat_percent);
    push_present(&mut chart.body_water_percent, x, entry.body_water_percent);
    push_present(&mut chart.muscle_mass_percent, x, entry.muscle_mass_percent);
    push_present(&mut chart.body_mass_index, x, entry.body_mass_index);
    push_present(&mut chart.metabolic_rate, x, entry.metabolic_rate);
  }

  Ok(chart)
}

fn push_present(points: &mut Vec<ChartPoint>, x: DateTime<Utc>, value: Option<f64>) {
  if let Some(y) = value {
    points.push(ChartPoint { x, y });
  }
}
