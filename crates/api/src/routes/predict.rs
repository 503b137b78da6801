//! Prediction Routes

use axum::{extract::State, Json};
use feature_engine::{AcuteInput, LifestyleInput, SyntheticInput};
use serde::Serialize;

use crate::dispatcher::{self, Assessment};
use crate::error::ApiResult;
use crate::extract::{CurrentUser, ValidJson};
use crate::SharedState;

/// Response for the acute endpoint
#[derive(Debug, Serialize)]
pub struct AcuteResponse {
    pub risk_probability: f64,
    pub risk_label: String,
    pub alert_sent: bool,
}

/// Response for the lifestyle and synthetic endpoints
#[derive(Debug, Serialize)]
pub struct RiskResponse {
    pub risk_probability: f64,
    pub risk_label: String,
}

impl From<Assessment> for RiskResponse {
    fn from(assessment: Assessment) -> Self {
        Self {
            risk_probability: assessment.risk_probability,
            risk_label: assessment.label().to_string(),
        }
    }
}

/// Acute heart attack risk from clinical measurements
pub async fn acute(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<AcuteInput>,
) -> ApiResult<Json<AcuteResponse>> {
    let outcome = dispatcher::predict_acute(&state, &user, &input).await?;
    Ok(Json(AcuteResponse {
        risk_probability: outcome.assessment.risk_probability,
        risk_label: outcome.assessment.label().to_string(),
        alert_sent: outcome.alert_sent,
    }))
}

/// Cardiovascular risk from lifestyle answers
pub async fn lifestyle(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    ValidJson(input): ValidJson<LifestyleInput>,
) -> ApiResult<Json<RiskResponse>> {
    let assessment = dispatcher::predict_lifestyle(&state, &user, &input).await?;
    Ok(Json(assessment.into()))
}

/// Anonymous synthetic risk score
pub async fn synthetic(
    State(state): State<SharedState>,
    ValidJson(input): ValidJson<SyntheticInput>,
) -> ApiResult<Json<RiskResponse>> {
    let assessment = dispatcher::predict_synthetic(&state, &input).await?;
    Ok(Json(assessment.into()))
}
