//! Model Module - Classifier adapter and feature normalizer
//!
//! Artifact decoding, inference and risk bands live apart so a new model
//! family only touches `artifact` and `inference`.

pub mod artifact;
pub mod inference;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod scaler;
pub mod threshold;

// Re-export common types
pub use inference::{
    ClassLabel, ClassificationResult, InferenceEngine, LoadOptions, ModelMetadata, ProbabilityPair,
    RiskClassifier,
};
pub use scaler::{normalize, FittedScaler};
pub use threshold::RiskBands;
