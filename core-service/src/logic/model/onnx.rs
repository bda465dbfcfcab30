//! ONNX Runtime backend
//!
//! For classifiers exported with skl2onnx (`zipmap=False`): one float input
//! of shape [N, 8], an int64 `label` output and a float `probabilities`
//! output of shape [N, 2].
//!
//! A classifier exported without its scaler should carry the custom metadata
//! entry `expects_scaled_input` (`true` / `false`). Without it the configured
//! scaler, if any, is applied.

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::artifact::ArtifactBytes;
use super::inference::{ClassLabel, InferenceEngine, ModelMetadata};
use crate::logic::error::{ModelLoadError, PredictionError};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

const LABEL_OUTPUT: &str = "label";
const PROBABILITY_OUTPUT: &str = "probabilities";
const SCALED_INPUT_KEY: &str = "expects_scaled_input";

/// ONNX session wrapped for shared read-only use
pub struct OnnxClassifier {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    metadata: ModelMetadata,
}

impl OnnxClassifier {
    /// Build a session from artifact bytes and probe its output shape
    pub fn from_artifact(artifact: &ArtifactBytes) -> Result<Self, ModelLoadError> {
        log::info!("Loading ONNX model from memory ({} bytes)", artifact.bytes.len());

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Corrupt(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Corrupt(format!("Failed to set optimization: {}", e)))?
            .commit_from_memory(&artifact.bytes)
            .map_err(|e| ModelLoadError::Corrupt(format!("Failed to load model: {}", e)))?;

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        for required in [LABEL_OUTPUT, PROBABILITY_OUTPUT] {
            if !output_names.iter().any(|n| n == required) {
                return Err(ModelLoadError::Incompatible(format!(
                    "missing '{}' output (outputs: {:?})",
                    required, output_names
                )));
            }
        }

        let declared = session
            .metadata()
            .and_then(|meta| meta.custom(SCALED_INPUT_KEY))
            .map_err(|e| ModelLoadError::Corrupt(format!("Failed to read model metadata: {}", e)))?;
        let expects_scaled_input = parse_scaled_input_flag(declared.as_deref())?;

        let classifier = Self {
            session: Mutex::new(session),
            metadata: ModelMetadata {
                model_path: artifact.path.clone(),
                model_type: "onnx".to_string(),
                features: FEATURE_COUNT,
                expects_scaled_input,
                trained_on_records: None,
                sha256: artifact.sha256.clone(),
                loaded_at: chrono::Utc::now(),
            },
        };

        // Probe: an 8-feature input must yield a two-class distribution
        classifier
            .run(&FeatureVector::new())
            .map_err(|e| ModelLoadError::Incompatible(format!("probe inference failed: {}", e.0)))?;

        log::info!("ONNX model loaded successfully");
        Ok(classifier)
    }

    fn run(&self, features: &FeatureVector) -> Result<(i64, [f64; 2]), PredictionError> {
        let input: Vec<f32> = features.as_slice().iter().map(|&v| v as f32).collect();
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), input)
            .map_err(|e| PredictionError(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| PredictionError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PredictionError(format!("Inference failed: {}", e)))?;

        let label = outputs
            .get(LABEL_OUTPUT)
            .ok_or_else(|| PredictionError("No label output".to_string()))?
            .try_extract_tensor::<i64>()
            .map_err(|e| PredictionError(format!("Extract error: {}", e)))?
            .1
            .first()
            .copied()
            .ok_or_else(|| PredictionError("Empty label output".to_string()))?;

        let probabilities = outputs
            .get(PROBABILITY_OUTPUT)
            .ok_or_else(|| PredictionError("No probabilities output".to_string()))?
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError(format!("Extract error: {}", e)))?
            .1;

        if probabilities.len() != 2 {
            return Err(PredictionError(format!(
                "expected 2 class probabilities, got {}",
                probabilities.len()
            )));
        }

        Ok((label, [probabilities[0] as f64, probabilities[1] as f64]))
    }
}

/// Interpret the `expects_scaled_input` metadata value
fn parse_scaled_input_flag(value: Option<&str>) -> Result<Option<bool>, ModelLoadError> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) if v == "true" || v == "1" => Ok(Some(true)),
        Some(v) if v == "false" || v == "0" => Ok(Some(false)),
        Some(other) => Err(ModelLoadError::Incompatible(format!(
            "metadata {} = '{}' is not a boolean",
            SCALED_INPUT_KEY, other
        ))),
    }
}

impl InferenceEngine for OnnxClassifier {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel, PredictionError> {
        let (label, _) = self.run(features)?;
        ClassLabel::from_index(label)
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictionError> {
        let (_, probabilities) = self.run(features)?;
        Ok(probabilities)
    }

    fn classify(&self, features: &FeatureVector) -> Result<(ClassLabel, [f64; 2]), PredictionError> {
        let (label, probabilities) = self.run(features)?;
        Ok((ClassLabel::from_index(label)?, probabilities))
    }
}
