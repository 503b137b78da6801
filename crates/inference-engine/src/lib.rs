//! ONNX Inference Engine
//!
//! Loads the pre-trained cardiac risk models with tract-onnx and serves
//! read-only inference over them.

mod engine;
mod registry;

pub use engine::{OnnxModel, ModelOutput, RiskModel};
pub use registry::{ModelKind, ModelPaths, ModelRegistry};

use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Model {0} not loaded")]
    ModelUnavailable(ModelKind),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
}
