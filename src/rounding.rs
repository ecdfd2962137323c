/// Scaled values are snapped to this many steps per unit before rounding, so a
/// mean like 70.45 stored as 70.4499... still counts as a half.
const SNAP_STEPS: f64 = 1e6;

/// Round to `digits` decimal places, halves going up
pub fn round_to_digits(value: f64, digits: u32) -> f64 {
  let factor = 10f64.powi(digits as i32);
  let scaled = (value * factor * SNAP_STEPS).round() / SNAP_STEPS;
  (scaled + 0.5).floor() / factor
}

/// Arithmetic mean, `None` for an empty input
pub fn mean<I>(values: I) -> Option<f64>
where
  I: IntoIterator<Item = f64>,
{
  let (sum, count) = values
    .into_iter()
    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
  if count == 0 {
    None
  } else {
    Some(sum / count as f64)
  }
}
