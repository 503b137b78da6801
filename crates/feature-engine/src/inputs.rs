//! Model Input Payloads
//!
//! One payload per model. The optional `phone_number` travels with the
//! request but is never part of the model input or its stored snapshot.

use crate::conversions::{body_mass_index, years_to_days};
use crate::features::ModelFeatures;
use data_validator::{Validate, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Clinical measurements for the acute heart attack model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcuteInput {
    pub age: i32,
    pub sex: i32,
    /// Chest pain type
    pub cp: i32,
    /// Resting blood pressure
    pub trestbps: i32,
    /// Serum cholesterol
    pub chol: i32,
    /// Fasting blood sugar > 120 mg/dl
    pub fbs: i32,
    pub restecg: i32,
    /// Maximum heart rate achieved
    pub thalach: i32,
    /// Exercise induced angina
    pub exang: i32,
    /// ST depression induced by exercise
    pub oldpeak: f64,
    pub slope: i32,
    /// Major vessels colored by fluoroscopy
    pub ca: i32,
    pub thal: i32,
    #[serde(default, skip_serializing)]
    pub phone_number: Option<String>,
}

impl ModelFeatures for AcuteInput {
    const COLUMNS: &'static [&'static str] = &[
        "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
        "slope", "ca", "thal",
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            f64::from(self.age),
            f64::from(self.sex),
            f64::from(self.cp),
            f64::from(self.trestbps),
            f64::from(self.chol),
            f64::from(self.fbs),
            f64::from(self.restecg),
            f64::from(self.thalach),
            f64::from(self.exang),
            self.oldpeak,
            f64::from(self.slope),
            f64::from(self.ca),
            f64::from(self.thal),
        ]
    }
}

impl Validate for AcuteInput {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationError> {
        validator.validate_age(f64::from(self.age))?;
        validator.validate_flag("sex", i64::from(self.sex))?;
        validator.validate_flag("fbs", i64::from(self.fbs))?;
        validator.validate_flag("exang", i64::from(self.exang))?;
        validator.validate_blood_pressure("trestbps", f64::from(self.trestbps))?;
        for (field, value) in [
            ("cp", self.cp),
            ("chol", self.chol),
            ("restecg", self.restecg),
            ("thalach", self.thalach),
            ("slope", self.slope),
            ("ca", self.ca),
            ("thal", self.thal),
        ] {
            validator.validate_non_negative(field, f64::from(value))?;
        }
        validator.validate_finite("oldpeak", self.oldpeak)?;
        validator.validate_phone(self.phone_number.as_deref())
    }
}

/// Lifestyle questionnaire as submitted (age in years)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleInput {
    pub age: i32,
    pub gender: i32,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// Systolic blood pressure
    pub ap_hi: i32,
    /// Diastolic blood pressure
    pub ap_lo: i32,
    pub cholesterol: i32,
    pub gluc: i32,
    pub smoke: i32,
    pub alco: i32,
    pub active: i32,
    #[serde(default, skip_serializing)]
    pub phone_number: Option<String>,
}

impl LifestyleInput {
    /// Apply the training-set conventions: age in days, derived BMI
    pub fn features(&self) -> LifestyleFeatures {
        LifestyleFeatures {
            age: years_to_days(i64::from(self.age)),
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            ap_hi: self.ap_hi,
            ap_lo: self.ap_lo,
            cholesterol: self.cholesterol,
            gluc: self.gluc,
            smoke: self.smoke,
            alco: self.alco,
            active: self.active,
            bmi: body_mass_index(self.height, self.weight),
        }
    }
}

impl Validate for LifestyleInput {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationError> {
        validator.validate_age(f64::from(self.age))?;
        validator.validate_non_negative("gender", f64::from(self.gender))?;
        validator.validate_height(self.height)?;
        validator.validate_weight(self.weight)?;
        validator.validate_blood_pressure("ap_hi", f64::from(self.ap_hi))?;
        validator.validate_blood_pressure("ap_lo", f64::from(self.ap_lo))?;
        validator.validate_range("cholesterol", f64::from(self.cholesterol), (1.0, 3.0))?;
        validator.validate_range("gluc", f64::from(self.gluc), (1.0, 3.0))?;
        validator.validate_flag("smoke", i64::from(self.smoke))?;
        validator.validate_flag("alco", i64::from(self.alco))?;
        validator.validate_flag("active", i64::from(self.active))?;
        validator.validate_phone(self.phone_number.as_deref())
    }
}

/// Lifestyle model input after conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifestyleFeatures {
    /// Age in days
    pub age: i64,
    pub gender: i32,
    pub height: f64,
    pub weight: f64,
    pub ap_hi: i32,
    pub ap_lo: i32,
    pub cholesterol: i32,
    pub gluc: i32,
    pub smoke: i32,
    pub alco: i32,
    pub active: i32,
    pub bmi: f64,
}

impl ModelFeatures for LifestyleFeatures {
    const COLUMNS: &'static [&'static str] = &[
        "age",
        "gender",
        "height",
        "weight",
        "ap_hi",
        "ap_lo",
        "cholesterol",
        "gluc",
        "smoke",
        "alco",
        "active",
        "bmi",
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.age as f64,
            f64::from(self.gender),
            self.height,
            self.weight,
            f64::from(self.ap_hi),
            f64::from(self.ap_lo),
            f64::from(self.cholesterol),
            f64::from(self.gluc),
            f64::from(self.smoke),
            f64::from(self.alco),
            f64::from(self.active),
            self.bmi,
        ]
    }
}

/// Wearable-style signals for the synthetic risk score model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticInput {
    pub stress_level: i32,
    pub sleep_hours: f64,
    pub daily_steps: i32,
    /// Litres per day
    pub water_intake: f64,
    /// Heart rate variability (ms)
    pub hrv: i32,
    pub age: i32,
    pub bmi: f64,
}

impl ModelFeatures for SyntheticInput {
    const COLUMNS: &'static [&'static str] = &[
        "stress_level",
        "sleep_hours",
        "daily_steps",
        "water_intake",
        "hrv",
        "age",
        "bmi",
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            f64::from(self.stress_level),
            self.sleep_hours,
            f64::from(self.daily_steps),
            self.water_intake,
            f64::from(self.hrv),
            f64::from(self.age),
            self.bmi,
        ]
    }
}

impl Validate for SyntheticInput {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationError> {
        validator.validate_non_negative("stress_level", f64::from(self.stress_level))?;
        validator.validate_range("sleep_hours", self.sleep_hours, (0.0, 24.0))?;
        validator.validate_non_negative("daily_steps", f64::from(self.daily_steps))?;
        validator.validate_non_negative("water_intake", self.water_intake)?;
        validator.validate_non_negative("hrv", f64::from(self.hrv))?;
        validator.validate_age(f64::from(self.age))?;
        validator.validate_range("bmi", self.bmi, (1.0, 200.0))
    }
}
