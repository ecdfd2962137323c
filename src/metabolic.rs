//! Metabolic rate seam
//!
//! The estimate itself is owned by the embedding application. Import only needs
//! something it can ask for kcal given an activity level, a weight and a muscle
//! mass share.

use crate::models::ActivityLevel;

pub trait MetabolicRateCalculator {
  /// Estimated daily energy expenditure in kcal
  fn calculate(&self, activity_level: ActivityLevel, weight_kg: f64, muscle_mass_percent: f64) -> f64;
}

impl<F> MetabolicRateCalculator for F
where
  F: Fn(ActivityLevel, f64, f64) -> f64,
{
  fn calculate(&self, activity_level: ActivityLevel, weight_kg: f64, muscle_mass_percent: f64) -> f64 {
    self(activity_level, weight_kg, muscle_mass_percent)
  }
}
