//! Inference Engine - Risk Classifier Adapter
//!
//! Wraps the trained model oracle behind `InferenceEngine`.
//! `RiskClassifier` validates input and output, nothing else: probabilities
//! are passed through exactly as the model produced them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::artifact::{model_read_error, read_artifact, verify_checksum, ModelArtifact};
use crate::logic::error::{ModelLoadError, PredictionError, RiskResult};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Tolerance for p0 + p1 == 1
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String, // "logistic_regression" or "onnx"
    pub features: usize,
    /// Whether the model was fitted on scaled features. `None` when the
    /// artifact does not say; a configured scaler is then applied.
    pub expects_scaled_input: Option<bool>,
    pub trained_on_records: Option<u64>,
    pub sha256: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Hard class decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassLabel {
    NonDiabetic = 0,
    Diabetic = 1,
}

impl ClassLabel {
    pub fn from_index(index: i64) -> Result<Self, PredictionError> {
        match index {
            0 => Ok(ClassLabel::NonDiabetic),
            1 => Ok(ClassLabel::Diabetic),
            other => Err(PredictionError(format!("model returned unknown class {}", other))),
        }
    }
}

/// Class probabilities (p0, p1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityPair {
    pub negative: f64,
    pub positive: f64,
}

impl ProbabilityPair {
    /// Checked constructor: finite, within [0, 1], summing to 1
    pub fn new(negative: f64, positive: f64) -> Result<Self, PredictionError> {
        let in_unit = |p: f64| p.is_finite() && (0.0..=1.0).contains(&p);
        if !in_unit(negative) || !in_unit(positive) {
            return Err(PredictionError(format!(
                "probabilities out of range: ({}, {})",
                negative, positive
            )));
        }
        if (negative + positive - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(PredictionError(format!(
                "probabilities do not sum to 1: ({}, {})",
                negative, positive
            )));
        }
        Ok(Self { negative, positive })
    }

    /// Pair from the positive-class probability alone
    pub fn from_positive(positive: f64) -> Result<Self, PredictionError> {
        Self::new(1.0 - positive, positive)
    }
}

/// Output of one scoring operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub predicted_class: ClassLabel,
    pub probability_pair: ProbabilityPair,
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// Trait for model oracles (built-in JSON models, ONNX, test doubles)
pub trait InferenceEngine: Send + Sync {
    fn metadata(&self) -> &ModelMetadata;
    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel, PredictionError>;
    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictionError>;

    /// Class and probabilities together. Engines that produce both from a
    /// single evaluation should override this.
    fn classify(&self, features: &FeatureVector) -> Result<(ClassLabel, [f64; 2]), PredictionError> {
        Ok((self.predict(features)?, self.predict_proba(features)?))
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

/// Logistic regression loaded from a JSON artifact
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
    metadata: ModelMetadata,
}

impl LogisticRegression {
    pub fn from_artifact(artifact: &ModelArtifact, metadata: ModelMetadata) -> Self {
        let mut coefficients = [0.0; FEATURE_COUNT];
        coefficients.copy_from_slice(&artifact.coefficients);
        Self {
            coefficients,
            intercept: artifact.intercept,
            metadata,
        }
    }

    fn decision_function(&self, features: &FeatureVector) -> f64 {
        self.coefficients
            .iter()
            .zip(features.as_slice())
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl InferenceEngine for LogisticRegression {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Positive iff the decision function is strictly positive
    fn predict(&self, features: &FeatureVector) -> Result<ClassLabel, PredictionError> {
        let z = self.decision_function(features);
        if !z.is_finite() {
            return Err(PredictionError(format!("non-finite decision value {}", z)));
        }
        Ok(if z > 0.0 { ClassLabel::Diabetic } else { ClassLabel::NonDiabetic })
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<[f64; 2], PredictionError> {
        let z = self.decision_function(features);
        if !z.is_finite() {
            return Err(PredictionError(format!("non-finite decision value {}", z)));
        }
        let p1 = sigmoid(z);
        Ok([1.0 - p1, p1])
    }
}

// ============================================================================
// RISK CLASSIFIER ADAPTER
// ============================================================================

/// Options applied while loading a model artifact
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Pinned SHA-256 digest of the artifact bytes
    pub expected_sha256: Option<String>,
}

/// The classifier adapter used by the pipeline
pub struct RiskClassifier {
    engine: Box<dyn InferenceEngine>,
}

impl std::fmt::Debug for RiskClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskClassifier")
            .field("metadata", self.engine.metadata())
            .finish()
    }
}

impl RiskClassifier {
    /// Load a model artifact from file
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, ModelLoadError> {
        log::info!("Loading model from: {}", path.display());

        let artifact = read_artifact(path).map_err(|e| model_read_error(path, e))?;

        if let Some(expected) = &options.expected_sha256 {
            verify_checksum(&artifact, expected)?;
            log::info!("Model checksum verified");
        }

        if path.extension().and_then(|e| e.to_str()) == Some("onnx") {
            return Self::load_onnx(&artifact);
        }

        let model = ModelArtifact::decode(&artifact.bytes)?;
        let metadata = ModelMetadata {
            model_path: artifact.path.clone(),
            model_type: "logistic_regression".to_string(),
            features: FEATURE_COUNT,
            expects_scaled_input: Some(model.expects_scaled_input),
            trained_on_records: model.trained_on_records,
            sha256: artifact.sha256.clone(),
            loaded_at: chrono::Utc::now(),
        };

        log::info!(
            "Model loaded: {} ({} features, scaled input: {:?})",
            metadata.model_type,
            metadata.features,
            metadata.expects_scaled_input
        );

        Ok(Self::from_engine(Box::new(LogisticRegression::from_artifact(&model, metadata))))
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(artifact: &super::artifact::ArtifactBytes) -> Result<Self, ModelLoadError> {
        let engine = super::onnx::OnnxClassifier::from_artifact(artifact)?;
        Ok(Self::from_engine(Box::new(engine)))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(artifact: &super::artifact::ArtifactBytes) -> Result<Self, ModelLoadError> {
        Err(ModelLoadError::Unsupported(format!(
            "{} is an ONNX model; rebuild with the `onnx` feature",
            artifact.path
        )))
    }

    /// Wrap an already-constructed engine
    pub fn from_engine(engine: Box<dyn InferenceEngine>) -> Self {
        Self { engine }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        self.engine.metadata()
    }

    /// Hard class decision for raw values
    pub fn predict(&self, features: &[f64]) -> RiskResult<ClassLabel> {
        let vector = FeatureVector::from_slice(features)?;
        Ok(self.predict_vector(&vector)?)
    }

    /// Class probabilities for raw values
    pub fn predict_probability(&self, features: &[f64]) -> RiskResult<ProbabilityPair> {
        let vector = FeatureVector::from_slice(features)?;
        Ok(self.predict_probability_vector(&vector)?)
    }

    pub fn predict_vector(&self, features: &FeatureVector) -> Result<ClassLabel, PredictionError> {
        self.engine.predict(features)
    }

    pub fn predict_probability_vector(&self, features: &FeatureVector) -> Result<ProbabilityPair, PredictionError> {
        let [p0, p1] = self.engine.predict_proba(features)?;
        ProbabilityPair::new(p0, p1)
    }

    /// Class and probabilities in one pass
    pub fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult, PredictionError> {
        let (predicted_class, [p0, p1]) = self.engine.classify(features)?;
        let probability_pair = ProbabilityPair::new(p0, p1)?;
        Ok(ClassificationResult { predicted_class, probability_pair })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::error::{InvalidInputError, RiskError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) fn test_metadata() -> ModelMetadata {
        ModelMetadata {
            model_path: "<memory>".to_string(),
            model_type: "test".to_string(),
            features: FEATURE_COUNT,
            expects_scaled_input: Some(false),
            trained_on_records: None,
            sha256: String::new(),
            loaded_at: chrono::Utc::now(),
        }
    }

    struct CountingEngine {
        calls: Arc<AtomicUsize>,
        metadata: ModelMetadata,
    }

    impl InferenceEngine for CountingEngine {
        fn metadata(&self) -> &ModelMetadata {
            &self.metadata
        }

        fn predict(&self, _: &FeatureVector) -> Result<ClassLabel, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ClassLabel::NonDiabetic)
        }

        fn predict_proba(&self, _: &FeatureVector) -> Result<[f64; 2], PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok([0.8, 0.2])
        }
    }

    struct BrokenEngine(ModelMetadata);

    impl InferenceEngine for BrokenEngine {
        fn metadata(&self) -> &ModelMetadata {
            &self.0
        }

        fn predict(&self, _: &FeatureVector) -> Result<ClassLabel, PredictionError> {
            Ok(ClassLabel::Diabetic)
        }

        fn predict_proba(&self, _: &FeatureVector) -> Result<[f64; 2], PredictionError> {
            Ok([0.7, 0.7])
        }
    }

    fn logistic(coefficients: [f64; FEATURE_COUNT], intercept: f64) -> LogisticRegression {
        LogisticRegression {
            coefficients,
            intercept,
            metadata: test_metadata(),
        }
    }

    #[test]
    fn test_wrong_dimension_never_reaches_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = RiskClassifier::from_engine(Box::new(CountingEngine {
            calls: calls.clone(),
            metadata: test_metadata(),
        }));

        for len in [7usize, 9] {
            let values = vec![1.0; len];
            let err = classifier.predict(&values).unwrap_err();
            assert_eq!(
                err,
                RiskError::InvalidInput(InvalidInputError::Dimension { expected: 8, actual: len })
            );
            assert!(classifier.predict_probability(&values).is_err());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(classifier.predict(&[1.0; 8]).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Engine whose class and probabilities come out of one evaluation
    struct SinglePassEngine {
        evaluations: Arc<AtomicUsize>,
        metadata: ModelMetadata,
    }

    impl InferenceEngine for SinglePassEngine {
        fn metadata(&self) -> &ModelMetadata {
            &self.metadata
        }

        fn predict(&self, _: &FeatureVector) -> Result<ClassLabel, PredictionError> {
            Err(PredictionError("predict called separately".to_string()))
        }

        fn predict_proba(&self, _: &FeatureVector) -> Result<[f64; 2], PredictionError> {
            Err(PredictionError("predict_proba called separately".to_string()))
        }

        fn classify(&self, _: &FeatureVector) -> Result<(ClassLabel, [f64; 2]), PredictionError> {
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            Ok((ClassLabel::Diabetic, [0.1, 0.9]))
        }
    }

    #[test]
    fn test_classify_evaluates_engine_once() {
        let evaluations = Arc::new(AtomicUsize::new(0));
        let classifier = RiskClassifier::from_engine(Box::new(SinglePassEngine {
            evaluations: evaluations.clone(),
            metadata: test_metadata(),
        }));

        let result = classifier.classify(&FeatureVector::new()).unwrap();
        assert_eq!(result.predicted_class, ClassLabel::Diabetic);
        assert_eq!(result.probability_pair.positive, 0.9);
        assert_eq!(evaluations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_classify_uses_both_methods() {
        let calls = Arc::new(AtomicUsize::new(0));
        let classifier = RiskClassifier::from_engine(Box::new(CountingEngine {
            calls: calls.clone(),
            metadata: test_metadata(),
        }));

        classifier.classify(&FeatureVector::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_determinism() {
        let classifier = RiskClassifier::from_engine(Box::new(logistic(
            [0.12, 0.035, -0.013, 0.0006, -0.0012, 0.09, 0.94, 0.015],
            -8.4,
        )));
        let features = [2.0, 140.0, 72.0, 30.0, 100.0, 33.5, 0.6, 45.0];

        let first = (classifier.predict(&features).unwrap(), classifier.predict_probability(&features).unwrap());
        for _ in 0..10 {
            assert_eq!(classifier.predict(&features).unwrap(), first.0);
            assert_eq!(classifier.predict_probability(&features).unwrap(), first.1);
        }
    }

    #[test]
    fn test_predict_agrees_with_argmax() {
        let model = logistic([0.0, 0.05, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], -6.0);
        let classifier = RiskClassifier::from_engine(Box::new(model));

        for glucose in [0.0, 60.0, 119.0, 121.0, 200.0] {
            let vector = FeatureVector::from_values([0.0, glucose, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
            let result = classifier.classify(&vector).unwrap();
            let positive_wins = result.probability_pair.positive > result.probability_pair.negative;
            assert_eq!(result.predicted_class == ClassLabel::Diabetic, positive_wins);
        }
    }

    #[test]
    fn test_exact_tie_is_negative() {
        let classifier = RiskClassifier::from_engine(Box::new(logistic([0.0; FEATURE_COUNT], 0.0)));
        let vector = FeatureVector::new();
        let result = classifier.classify(&vector).unwrap();

        assert_eq!(result.probability_pair, ProbabilityPair { negative: 0.5, positive: 0.5 });
        assert_eq!(result.predicted_class, ClassLabel::NonDiabetic);
    }

    #[test]
    fn test_sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn test_invalid_model_output_is_prediction_error() {
        let classifier = RiskClassifier::from_engine(Box::new(BrokenEngine(test_metadata())));
        let err = classifier.classify(&FeatureVector::new()).unwrap_err();
        assert!(err.0.contains("sum to 1"));
    }

    #[test]
    fn test_probability_pair_validation() {
        assert!(ProbabilityPair::new(0.3, 0.7).is_ok());
        assert!(ProbabilityPair::new(-0.1, 1.1).is_err());
        assert!(ProbabilityPair::new(f64::NAN, 0.5).is_err());
        assert_eq!(ProbabilityPair::from_positive(0.25).unwrap().negative, 0.75);
    }

    #[test]
    fn test_load_missing_artifact() {
        let err = RiskClassifier::load(Path::new("/nonexistent/model.json"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ModelLoadError::NotFound(_)));
    }

    #[test]
    fn test_class_label_from_index() {
        assert_eq!(ClassLabel::from_index(1).unwrap(), ClassLabel::Diabetic);
        assert_eq!(ClassLabel::from_index(0).unwrap(), ClassLabel::NonDiabetic);
        assert!(ClassLabel::from_index(2).is_err());
    }
}
