//! Profile and History Routes

use axum::{extract::State, Json};
use data_validator::{Validate, ValidationError, Validator};
use feature_engine::{body_mass_index, round_to};
use serde::{Deserialize, Serialize};
use storage::{PredictionRecord, ProfileData, ProfileRecord};
use tracing::info;

use crate::error::ApiResult;
use crate::extract::{CurrentUser, ValidJson};
use crate::SharedState;

fn default_glucose() -> i32 {
    1
}

fn default_active() -> i32 {
    1
}

/// Profile submission; BMI is always derived server-side
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub age: i32,
    pub gender: String,
    /// Height in centimetres
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    #[serde(default)]
    pub medical_conditions: Option<String>,
    pub stress_level: i32,
    #[serde(default = "default_glucose")]
    pub glucose: i32,
    #[serde(default)]
    pub smoke: i32,
    #[serde(default)]
    pub alco: i32,
    #[serde(default = "default_active")]
    pub active: i32,
}

impl Validate for ProfileRequest {
    fn validate(&self, validator: &Validator) -> Result<(), ValidationError> {
        validator.validate_age(f64::from(self.age))?;
        validator.validate_not_blank("gender", &self.gender)?;
        validator.validate_height(self.height)?;
        validator.validate_weight(self.weight)?;
        validator.validate_non_negative("stress_level", f64::from(self.stress_level))?;
        validator.validate_range("glucose", f64::from(self.glucose), (1.0, 3.0))?;
        validator.validate_flag("smoke", i64::from(self.smoke))?;
        validator.validate_flag("alco", i64::from(self.alco))?;
        validator.validate_flag("active", i64::from(self.active))
    }
}

impl ProfileRequest {
    fn into_profile_data(self) -> ProfileData {
        let bmi = round_to(body_mass_index(self.height, self.weight), 2);
        ProfileData {
            age: self.age,
            gender: self.gender,
            height: self.height,
            weight: self.weight,
            bmi,
            medical_conditions: self.medical_conditions,
            stress_level: self.stress_level,
            glucose: self.glucose,
            smoke: self.smoke,
            alco: self.alco,
            active: self.active,
        }
    }
}

/// History entry
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub id: i64,
    /// RFC 3339
    pub timestamp: String,
    pub risk_label: String,
    pub risk_probability: f64,
    pub model_type: String,
}

impl From<PredictionRecord> for HistoryItem {
    fn from(record: PredictionRecord) -> Self {
        let timestamp = chrono::DateTime::from_timestamp_millis(record.timestamp_ms)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        Self {
            id: record.id,
            timestamp,
            risk_label: record.risk_label,
            risk_probability: record.risk_probability,
            model_type: record.model_type,
        }
    }
}

/// Get my profile (JSON null when none exists)
pub async fn get_profile(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Option<ProfileRecord>>> {
    let profile = state.repository.get_profile(user.id).await?;
    Ok(Json(profile))
}

/// Create or replace my profile
pub async fn upsert_profile(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    ValidJson(request): ValidJson<ProfileRequest>,
) -> ApiResult<Json<ProfileRecord>> {
    let profile = state
        .repository
        .upsert_profile(user.id, &request.into_profile_data())
        .await?;
    info!("Saved profile for user {}", user.id);
    Ok(Json(profile))
}

/// My predictions, newest first
pub async fn history(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<HistoryItem>>> {
    let records = state.repository.get_predictions(user.id).await?;
    Ok(Json(records.into_iter().map(HistoryItem::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ProfileRequest {
        serde_json::from_str(
            r#"{"age": 40, "gender": "female", "height": 170, "weight": 70, "stress_level": 4}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let request = request();
        assert_eq!(request.glucose, 1);
        assert_eq!(request.smoke, 0);
        assert_eq!(request.alco, 0);
        assert_eq!(request.active, 1);
        assert!(request.medical_conditions.is_none());
    }

    #[test]
    fn test_bmi_derived_and_rounded() {
        let data = request().into_profile_data();
        assert_eq!(data.bmi, 24.22);
    }

    #[test]
    fn test_history_timestamp_rfc3339() {
        let item = HistoryItem::from(PredictionRecord {
            id: 7,
            user_id: 1,
            model_type: "acute".to_string(),
            input_data: "{}".to_string(),
            risk_probability: 0.3,
            risk_label: "Moderate".to_string(),
            timestamp_ms: 0,
        });
        assert_eq!(item.timestamp, "1970-01-01T00:00:00+00:00");
    }
}
