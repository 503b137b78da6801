//! Model Registry
//!
//! Holds one slot per model kind. Slots are filled once at startup; a slot
//! whose artifact failed to load stays empty for the process lifetime.

use crate::engine::{ModelOutput, OnnxModel, RiskModel};
use crate::InferenceError;
use feature_engine::{AcuteInput, FeatureVector, LifestyleFeatures, ModelFeatures, SyntheticInput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// The three cardiac risk models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// UCI heart disease classifier
    Acute,
    /// Cardiovascular lifestyle classifier
    Lifestyle,
    /// Synthetic wearable-signal regressor
    Synthetic,
}

impl ModelKind {
    /// All model kinds, in startup load order
    pub const ALL: [ModelKind; 3] = [ModelKind::Acute, ModelKind::Lifestyle, ModelKind::Synthetic];

    /// Get string representation (stored as the history model type tag)
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Acute => "acute",
            ModelKind::Lifestyle => "lifestyle",
            ModelKind::Synthetic => "synthetic",
        }
    }

    /// Name used in alert messages
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Acute => "Acute Heart Attack",
            ModelKind::Lifestyle => "Lifestyle Cardiac",
            ModelKind::Synthetic => "Synthetic",
        }
    }

    /// How the model's output is decoded
    pub fn output(&self) -> ModelOutput {
        match self {
            ModelKind::Acute | ModelKind::Lifestyle => ModelOutput::PositiveClassProbability,
            ModelKind::Synthetic => ModelOutput::Score,
        }
    }

    /// Number of input columns the model expects
    pub fn input_width(&self) -> usize {
        match self {
            ModelKind::Acute => AcuteInput::COLUMNS.len(),
            ModelKind::Lifestyle => LifestyleFeatures::COLUMNS.len(),
            ModelKind::Synthetic => SyntheticInput::COLUMNS.len(),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact locations, one per model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub acute_path: Option<PathBuf>,
    pub lifestyle_path: Option<PathBuf>,
    pub synthetic_path: Option<PathBuf>,
}

impl ModelPaths {
    /// Path configured for a model kind
    pub fn path(&self, kind: ModelKind) -> Option<&Path> {
        match kind {
            ModelKind::Acute => self.acute_path.as_deref(),
            ModelKind::Lifestyle => self.lifestyle_path.as_deref(),
            ModelKind::Synthetic => self.synthetic_path.as_deref(),
        }
    }
}

/// Read-only set of loaded models
#[derive(Clone, Default)]
pub struct ModelRegistry {
    slots: HashMap<ModelKind, Arc<dyn RiskModel>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured artifact, leaving failed slots empty
    pub fn load(paths: &ModelPaths) -> Self {
        let mut registry = Self::new();

        for kind in ModelKind::ALL {
            let Some(path) = paths.path(kind) else {
                warn!("No artifact configured for {} model", kind);
                continue;
            };

            match OnnxModel::load(path, kind.input_width(), kind.output()) {
                Ok(model) => {
                    info!("Model {} loaded from {}", kind, path.display());
                    registry.slots.insert(kind, Arc::new(model));
                }
                Err(e) => {
                    error!("Model {} failed to load: {}", kind, e);
                }
            }
        }

        registry
    }

    /// Install a model into a slot
    pub fn with_model(mut self, kind: ModelKind, model: Arc<dyn RiskModel>) -> Self {
        self.slots.insert(kind, model);
        self
    }

    /// Check if a model slot is filled
    pub fn is_loaded(&self, kind: ModelKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Availability of every slot
    pub fn status(&self) -> Vec<(ModelKind, bool)> {
        ModelKind::ALL
            .iter()
            .map(|kind| (*kind, self.is_loaded(*kind)))
            .collect()
    }

    /// Run inference on a feature vector
    pub fn predict(&self, kind: ModelKind, features: &FeatureVector) -> Result<f64, InferenceError> {
        let model = self
            .slots
            .get(&kind)
            .ok_or(InferenceError::ModelUnavailable(kind))?;

        let start = Instant::now();
        let value = model.predict(features)?;
        debug!("Model {} inference completed in {:?}", kind, start.elapsed());

        if !value.is_finite() {
            return Err(InferenceError::InvalidOutput(format!(
                "model {} returned non-finite value {}",
                kind, value
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);

    impl RiskModel for Fixed {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
            Ok(self.0)
        }
    }

    fn features() -> FeatureVector {
        FeatureVector::new(&["a"], vec![1.0])
    }

    #[test]
    fn test_empty_slot_is_unavailable() {
        let registry = ModelRegistry::new();
        let result = registry.predict(ModelKind::Acute, &features());
        assert!(matches!(
            result,
            Err(InferenceError::ModelUnavailable(ModelKind::Acute))
        ));
    }

    #[test]
    fn test_loaded_slot_predicts() {
        let registry = ModelRegistry::new().with_model(ModelKind::Synthetic, Arc::new(Fixed(0.3)));
        assert!(registry.is_loaded(ModelKind::Synthetic));
        assert!(!registry.is_loaded(ModelKind::Lifestyle));
        assert_eq!(registry.predict(ModelKind::Synthetic, &features()).unwrap(), 0.3);
    }

    #[test]
    fn test_non_finite_output_rejected() {
        let registry = ModelRegistry::new().with_model(ModelKind::Acute, Arc::new(Fixed(f64::NAN)));
        assert!(matches!(
            registry.predict(ModelKind::Acute, &features()),
            Err(InferenceError::InvalidOutput(_))
        ));
    }

    #[test]
    fn test_missing_artifacts_leave_slots_empty() {
        let paths = ModelPaths {
            acute_path: Some(PathBuf::from("/nonexistent/model_uci.onnx")),
            lifestyle_path: None,
            synthetic_path: None,
        };
        let registry = ModelRegistry::load(&paths);
        assert_eq!(
            registry.status(),
            vec![
                (ModelKind::Acute, false),
                (ModelKind::Lifestyle, false),
                (ModelKind::Synthetic, false),
            ]
        );
    }

    #[test]
    fn test_kind_tags_and_widths() {
        assert_eq!(ModelKind::Lifestyle.to_string(), "lifestyle");
        assert_eq!(ModelKind::Acute.display_name(), "Acute Heart Attack");
        assert_eq!(ModelKind::Acute.input_width(), 13);
        assert_eq!(ModelKind::Lifestyle.input_width(), 12);
        assert_eq!(ModelKind::Synthetic.input_width(), 7);
    }
}
