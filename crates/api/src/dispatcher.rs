//! Prediction Dispatcher
//!
//! Routes a validated payload to its model, bands the result, and performs
//! the side effects (history, SMS) that must never fail the request.

use alerting::RiskBand;
use feature_engine::{AcuteInput, FeatureVector, LifestyleInput, ModelFeatures, SyntheticInput};
use inference_engine::{ModelKind, ModelRegistry};
use serde::Serialize;
use storage::{NewPrediction, Repository, UserRecord};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::AppState;

/// A banded model result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub risk_probability: f64,
    pub band: RiskBand,
}

impl Assessment {
    /// Label for the band
    pub fn label(&self) -> &'static str {
        self.band.label()
    }
}

/// Result of an acute prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcuteOutcome {
    pub assessment: Assessment,
    /// Whether an SMS alert was dispatched
    pub alert_sent: bool,
}

/// Run a model off the async workers and band its output
///
/// Synthetic scores are clamped into [0, 1] first; any other value without a
/// band is treated as a failed inference.
pub async fn assess(
    models: &ModelRegistry,
    kind: ModelKind,
    features: FeatureVector,
) -> Result<Assessment, ApiError> {
    let models = models.clone();
    let raw = tokio::task::spawn_blocking(move || models.predict(kind, &features))
        .await
        .map_err(|e| ApiError::Internal(format!("inference task failed: {}", e)))??;
    let risk_probability = match kind {
        ModelKind::Synthetic => raw.clamp(0.0, 1.0),
        ModelKind::Acute | ModelKind::Lifestyle => raw,
    };

    let band = RiskBand::from_probability(risk_probability).ok_or_else(|| {
        ApiError::Inference(format!(
            "model {} returned out-of-range probability {}",
            kind, risk_probability
        ))
    })?;

    metrics::counter!("predictions_total", "model" => kind.as_str()).increment(1);
    debug!("Model {} scored {:.4} ({})", kind, risk_probability, band.as_str());
    Ok(Assessment {
        risk_probability,
        band,
    })
}

/// Append a history record, logging instead of failing
pub async fn record_history(
    repository: &Repository,
    user_id: i64,
    kind: ModelKind,
    snapshot: serde_json::Value,
    assessment: &Assessment,
) {
    let record = NewPrediction {
        user_id,
        model_type: kind.as_str().to_string(),
        input_data: snapshot.to_string(),
        risk_probability: assessment.risk_probability,
        risk_label: assessment.label().to_string(),
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
    };

    if let Err(e) = repository.insert_prediction(&record).await {
        warn!("History save failed for user {}: {}", user_id, e);
    }
}

/// Acute model: history plus an SMS alert above the threshold
///
/// The alert goes to the phone number in the request, else the one on file.
/// `alert_sent` reports that the threshold was crossed; delivery problems
/// only reach the logs.
pub async fn predict_acute(
    state: &AppState,
    user: &UserRecord,
    input: &AcuteInput,
) -> Result<AcuteOutcome, ApiError> {
    let kind = ModelKind::Acute;
    let assessment = assess(&state.models, kind, input.to_vector()).await?;
    record_history(&state.repository, user.id, kind, input.snapshot(), &assessment).await;

    let recipient = input
        .phone_number
        .as_deref()
        .or(user.phone_number.as_deref());
    let alert_sent = state.alerts.should_fire(assessment.risk_probability);
    match state
        .alerts
        .notify(recipient, kind.display_name(), assessment.risk_probability)
        .await
    {
        Ok(true) => metrics::counter!("alerts_sent_total").increment(1),
        Ok(false) => {}
        Err(e) => warn!("SMS alert failed for user {}: {}", user.id, e),
    }

    info!(
        "Acute prediction for user {}: {:.4} (alert_sent={})",
        user.id, assessment.risk_probability, alert_sent
    );
    Ok(AcuteOutcome {
        assessment,
        alert_sent,
    })
}

/// Lifestyle model: years to days, derived BMI, history
pub async fn predict_lifestyle(
    state: &AppState,
    user: &UserRecord,
    input: &LifestyleInput,
) -> Result<Assessment, ApiError> {
    let kind = ModelKind::Lifestyle;
    let features = input.features();
    let assessment = assess(&state.models, kind, features.to_vector()).await?;
    record_history(&state.repository, user.id, kind, features.snapshot(), &assessment).await;

    info!(
        "Lifestyle prediction for user {}: {:.4}",
        user.id, assessment.risk_probability
    );
    Ok(assessment)
}

/// Synthetic model: anonymous, nothing persisted
pub async fn predict_synthetic(
    state: &AppState,
    input: &SyntheticInput,
) -> Result<Assessment, ApiError> {
    assess(&state.models, ModelKind::Synthetic, input.to_vector()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::{InferenceError, RiskModel};
    use std::sync::Arc;

    struct Fixed(f64);

    impl RiskModel for Fixed {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    fn registry(kind: ModelKind, value: f64) -> ModelRegistry {
        ModelRegistry::new().with_model(kind, Arc::new(Fixed(value)))
    }

    fn features() -> FeatureVector {
        FeatureVector::new(&["x"], vec![0.0])
    }

    #[tokio::test]
    async fn test_synthetic_clamped() {
        let high = assess(&registry(ModelKind::Synthetic, 1.7), ModelKind::Synthetic, features())
            .await
            .unwrap();
        assert_eq!(high.risk_probability, 1.0);
        assert_eq!(high.band, RiskBand::Extreme);

        let low = assess(&registry(ModelKind::Synthetic, -0.4), ModelKind::Synthetic, features())
            .await
            .unwrap();
        assert_eq!(low.risk_probability, 0.0);
        assert_eq!(low.band, RiskBand::None);
    }

    #[tokio::test]
    async fn test_negative_classifier_output_is_inference_error() {
        let result = assess(&registry(ModelKind::Acute, -0.2), ModelKind::Acute, features()).await;
        assert!(matches!(result, Err(ApiError::Inference(_))));
    }

    #[tokio::test]
    async fn test_missing_model_is_unavailable() {
        let result = assess(&ModelRegistry::new(), ModelKind::Lifestyle, features()).await;
        assert!(matches!(result, Err(ApiError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_band_follows_probability() {
        let assessment = assess(&registry(ModelKind::Acute, 0.65), ModelKind::Acute, features())
            .await
            .unwrap();
        assert_eq!(assessment.band, RiskBand::High);
        assert_eq!(assessment.label(), "High cardiac risk. Medical consultation advised.");
    }
}
