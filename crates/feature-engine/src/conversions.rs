//! Unit Conversions

/// Days per year used by the lifestyle model's training data
pub const DAYS_PER_YEAR: i64 = 365;

/// Convert an age in whole years to days
pub fn years_to_days(years: i64) -> i64 {
    years * DAYS_PER_YEAR
}

/// Body mass index from height (cm) and weight (kg)
///
/// Callers validate height beforehand; a zero height yields infinity.
pub fn body_mass_index(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
