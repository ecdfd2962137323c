pub mod measurement;
pub mod profile;

pub use measurement::{Measurement, NewMeasurement};
pub use profile::{ActivityLevel, NewProfile, Profile};
