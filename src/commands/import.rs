//! Import command: CSV upload into a profile

use serde::Serialize;

use crate::db::AppState;
use crate::import::{import_csv, ImportError};
use crate::models::ActivityLevel;
use crate::store::load_profile;

#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
  pub profile_id: i64,
  pub imported: usize,
}

/// Import a scale export. Without an explicit activity level the profile's
/// own level is used for the metabolic rate.
pub async fn import_measurements(
  state: &AppState,
  profile_id: i64,
  csv_data: &[u8],
  activity_level: Option<String>,
) -> Result<ImportResult, ImportError> {
  let activity_level = match activity_level {
    Some(raw) => Some(raw.parse::<ActivityLevel>().map_err(ImportError::InvalidActivityLevel)?),
    None => load_profile(&state.db, profile_id).await?.activity_level,
  };

  let imported = import_csv(
    &state.db,
    csv_data,
    profile_id,
    activity_level,
    state.calculator.as_ref(),
  )
  .await?;

  Ok(ImportResult {
    profile_id,
    imported,
  })
}
