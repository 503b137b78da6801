//! ONNX Model Implementation

use crate::InferenceError;
use feature_engine::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

/// A loaded model that scores a single feature vector
pub trait RiskModel: Send + Sync {
    /// Return the model's risk value for these features
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError>;
}

/// How to read the model's output tensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelOutput {
    /// Classifier exporting class probabilities as its last output
    PositiveClassProbability,
    /// Regressor exporting a single score as its first output
    Score,
}

impl ModelOutput {
    /// Pick the risk value out of a flattened output tensor
    pub fn select(self, values: &[f32]) -> Option<f64> {
        let value = match self {
            // [p] for sigmoid heads, [p0, p1] for two-class probability rows
            ModelOutput::PositiveClassProbability => match values {
                [p] => *p,
                [_, p] => *p,
                _ => return None,
            },
            ModelOutput::Score => *values.first()?,
        };
        Some(f64::from(value))
    }
}

/// ONNX model executed with tract
pub struct OnnxModel {
    /// Artifact path
    path: PathBuf,
    /// Number of input columns
    input_width: usize,
    /// Output decoding
    output: ModelOutput,
    /// Optimized execution plan
    plan: TypedRunnableModel<TypedModel>,
}

impl OnnxModel {
    /// Load and optimize an ONNX artifact for `[1, input_width]` f32 input
    pub fn load(
        path: impl AsRef<Path>,
        input_width: usize,
        output: ModelOutput,
    ) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading ONNX model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, input_width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Model loaded successfully: {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            input_width,
            output,
            plan,
        })
    }
}

impl RiskModel for OnnxModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if features.len() != self.input_width {
            return Err(InferenceError::InvalidInputShape {
                expected: self.input_width,
                actual: features.len(),
            });
        }

        let input = Tensor::from_shape(&[1, self.input_width], &features.as_f32())
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let tensor = match self.output {
            ModelOutput::PositiveClassProbability => outputs.last(),
            ModelOutput::Score => outputs.first(),
        }
        .ok_or_else(|| InferenceError::InvalidOutput("model produced no outputs".to_string()))?;

        let values = tensor
            .cast_to::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
        let values = values
            .as_slice::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))?;
        debug!("Model {} raw output: {:?}", self.path.display(), values);

        self.output.select(values).ok_or_else(|| {
            InferenceError::InvalidOutput(format!("unexpected output length {}", values.len()))
        })
    }
}
