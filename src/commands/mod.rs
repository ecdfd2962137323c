pub mod import;

use crate::chart::{build_weight_chart, WeightChart};
use crate::db::AppState;
use crate::models::Measurement;
use crate::store::{list_measurements, load_profile};

pub async fn get_measurements(
  state: &AppState,
  profile_id: i64,
) -> Result<Vec<Measurement>, String> {
  list_measurements(&state.db, profile_id)
    .await
    .map_err(|e| format!("Failed to fetch measurements: {}", e))
}

/// Chart series for a profile, downsampled per configuration, with the
/// profile's target weight as reference line
pub async fn get_weight_chart(
  state: &AppState,
  profile_id: i64,
) -> Result<WeightChart, String> {
  let profile = load_profile(&state.db, profile_id)
    .await
    .map_err(|e| format!("Failed to load profile: {}", e))?;
  let measurements = get_measurements(state, profile_id).await?;

  build_weight_chart(&measurements, profile.target_weight, &state.config.chart)
    .map_err(|e| format!("Failed to build chart: {}", e))
}
