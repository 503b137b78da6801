//! Feature Assembly
//!
//! Turns validated request payloads into ordered feature vectors for the
//! three cardiac risk models, applying the unit conversions each model was
//! trained with.

mod conversions;
mod features;
mod inputs;

pub use conversions::{body_mass_index, round_to, years_to_days, DAYS_PER_YEAR};
pub use features::{FeatureVector, ModelFeatures};
pub use inputs::{AcuteInput, LifestyleFeatures, LifestyleInput, SyntheticInput};
