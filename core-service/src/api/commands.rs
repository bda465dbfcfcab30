//! Commands - boundary between the form collector and the risk core
//!
//! Every command returns `Result<T, String>`: errors are already turned into
//! messages fit for the user. Nothing below this layer prints.

use serde::{Deserialize, Serialize};

use super::engine_status::{EngineStatus, ModelStatus, NormalizerStatus};
use crate::logic::config::AppConfig;
use crate::logic::error::{InvalidInputError, ModelLoadError, RiskError};
use crate::logic::features::layout::LayoutInfo;
use crate::logic::features::{FeatureVector, FeatureVectorBuilder, FieldSpec, FEATURE_COUNT, FIELD_SPECS};
use crate::logic::model::{FittedScaler, LoadOptions, RiskClassifier};
use crate::logic::pipeline::{PredictionReport, RiskService, ScalerState};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One filled-in form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormInput {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree_function: f64,
    pub age: f64,
}

impl Default for FormInput {
    fn default() -> Self {
        let d = |i: usize| FIELD_SPECS[i].default;
        Self {
            pregnancies: d(0),
            glucose: d(1),
            blood_pressure: d(2),
            skin_thickness: d(3),
            insulin: d(4),
            bmi: d(5),
            diabetes_pedigree_function: d(6),
            age: d(7),
        }
    }
}

impl FormInput {
    /// Range-checked feature vector
    pub fn to_vector(&self) -> Result<FeatureVector, InvalidInputError> {
        let vector = FeatureVectorBuilder::new()
            .pregnancies(self.pregnancies)
            .glucose(self.glucose)
            .blood_pressure(self.blood_pressure)
            .skin_thickness(self.skin_thickness)
            .insulin(self.insulin)
            .bmi(self.bmi)
            .diabetes_pedigree_function(self.diabetes_pedigree_function)
            .age(self.age)
            .build();
        vector.validate_ranges()?;
        Ok(vector)
    }
}

/// Outcome of checking the configured artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyReport {
    pub model_path: String,
    pub model_ok: bool,
    pub model_sha256: Option<String>,
    pub model_error: Option<String>,
    pub scaler_path: Option<String>,
    pub scaler_ok: Option<bool>,
    pub scaler_error: Option<String>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.model_ok && self.scaler_ok.unwrap_or(true)
    }
}

// ============================================================================
// PREDICTION COMMANDS
// ============================================================================

/// Score a filled-in form
pub fn assess(service: &RiskService, form: &FormInput) -> Result<PredictionReport, String> {
    let vector = form
        .to_vector()
        .map_err(|e| RiskError::from(e).user_message())?;
    service.assess(&vector).map_err(|e| e.user_message())
}

/// Score a raw list of values in layout order
pub fn assess_values(service: &RiskService, values: &[f64]) -> Result<PredictionReport, String> {
    let vector = FeatureVector::from_slice(values)
        .and_then(|v| v.validate_ranges().map(|_| v))
        .map_err(|e| RiskError::from(e).user_message())?;
    service.assess(&vector).map_err(|e| e.user_message())
}

/// Parse one submission: numbers separated by commas and/or whitespace
pub fn parse_submission(line: &str) -> Result<Vec<f64>, InvalidInputError> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| InvalidInputError::Unparsable(token.to_string()))
        })
        .collect()
}

/// Parse and score one submission line
pub fn assess_line(service: &RiskService, line: &str) -> Result<PredictionReport, String> {
    let values = parse_submission(line).map_err(|e| RiskError::from(e).user_message())?;
    assess_values(service, &values)
}

// ============================================================================
// STATUS COMMANDS
// ============================================================================

/// Layout with domains and defaults
pub fn list_fields() -> Vec<FieldSpec> {
    FIELD_SPECS.to_vec()
}

pub fn get_engine_status(service: &RiskService) -> EngineStatus {
    let model = match service.metadata() {
        Some(meta) => ModelStatus {
            loaded: true,
            engine: Some(meta.model_type.clone()),
            model_path: Some(meta.model_path.clone()),
            sha256: Some(meta.sha256.clone()),
            expects_scaled_input: meta.expects_scaled_input,
            trained_on_records: meta.trained_on_records,
            loaded_at: Some(meta.loaded_at.to_rfc3339()),
            disabled_reason: None,
        },
        None => ModelStatus {
            loaded: false,
            engine: None,
            model_path: None,
            sha256: None,
            expects_scaled_input: None,
            trained_on_records: None,
            loaded_at: None,
            disabled_reason: service.disabled_reason().map(ModelLoadError::to_string),
        },
    };

    let normalizer = match service.scaler_state() {
        ScalerState::NotConfigured => NormalizerStatus {
            configured: false,
            kind: None,
            applied: false,
            error: None,
        },
        ScalerState::Loaded(scaler) => NormalizerStatus {
            configured: true,
            kind: Some(scaler.kind().to_string()),
            applied: service.normalization_expected(),
            error: None,
        },
        ScalerState::Failed(e) => NormalizerStatus {
            configured: true,
            kind: None,
            applied: false,
            error: Some(e.to_string()),
        },
    };

    let stats = service.stats();

    EngineStatus {
        layout: LayoutInfo::current(),
        model,
        normalizer,
        bands: service.bands(),
        inference_count: stats.inference_count(),
        failed_requests: stats.failure_count(),
        avg_latency_ms: stats.avg_latency_ms(),
    }
}

/// Load each configured artifact and report the compatibility check
pub fn verify_artifacts(config: &AppConfig) -> VerifyReport {
    let options = LoadOptions {
        expected_sha256: config.model_sha256.clone(),
    };

    let (model_ok, model_sha256, model_error) = match RiskClassifier::load(&config.model_path, &options) {
        Ok(classifier) => (true, Some(classifier.metadata().sha256.clone()), None),
        Err(e) => (false, None, Some(e.to_string())),
    };

    let (scaler_ok, scaler_error) = match &config.scaler_path {
        None => (None, None),
        Some(path) => match FittedScaler::load(path) {
            Ok(_) => (Some(true), None),
            Err(e) => (Some(false), Some(e.to_string())),
        },
    };

    VerifyReport {
        model_path: config.model_path.display().to_string(),
        model_ok,
        model_sha256,
        model_error,
        scaler_path: config.scaler_path.as_ref().map(|p| p.display().to_string()),
        scaler_ok,
        scaler_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{ClassLabel, InferenceEngine, ModelMetadata, RiskBands};
    use crate::logic::error::PredictionError;
    use crate::logic::presenter::RiskTier;
    use std::path::PathBuf;

    struct Fixed(ModelMetadata);

    impl InferenceEngine for Fixed {
        fn metadata(&self) -> &ModelMetadata {
            &self.0
        }
        fn predict(&self, _: &FeatureVector) -> Result<ClassLabel, PredictionError> {
            Ok(ClassLabel::NonDiabetic)
        }
        fn predict_proba(&self, _: &FeatureVector) -> Result<[f64; 2], PredictionError> {
            Ok([0.78, 0.22])
        }
    }

    fn service() -> RiskService {
        let metadata = ModelMetadata {
            model_path: "<fixed>".to_string(),
            model_type: "fixed".to_string(),
            features: FEATURE_COUNT,
            expects_scaled_input: Some(false),
            trained_on_records: Some(768),
            sha256: "00".to_string(),
            loaded_at: chrono::Utc::now(),
        };
        RiskService::from_parts(
            Ok(RiskClassifier::from_engine(Box::new(Fixed(metadata)))),
            ScalerState::NotConfigured,
            RiskBands::STANDARD,
        )
    }

    fn disabled() -> RiskService {
        RiskService::from_parts(
            Err(ModelLoadError::NotFound("models/missing.json".to_string())),
            ScalerState::NotConfigured,
            RiskBands::STANDARD,
        )
    }

    #[test]
    fn test_default_form_scores() {
        let report = assess(&service(), &FormInput::default()).unwrap();
        assert_eq!(report.features.values, [0.0, 120.0, 70.0, 20.0, 79.0, 25.0, 0.5, 33.0]);
        assert_eq!(report.assessment.risk_tier, RiskTier::Low);
    }

    #[test]
    fn test_out_of_range_form_is_reported() {
        let form = FormInput { glucose: 250.0, ..FormInput::default() };
        let message = assess(&service(), &form).unwrap_err();
        assert!(message.starts_with("Please check your input"));
        assert!(message.contains("glucose"));
    }

    #[test]
    fn test_parse_submission() {
        assert_eq!(
            parse_submission("0, 120 70,20 79 25.0 0.5 33").unwrap(),
            vec![0.0, 120.0, 70.0, 20.0, 79.0, 25.0, 0.5, 33.0]
        );
        assert_eq!(
            parse_submission("1 two 3"),
            Err(InvalidInputError::Unparsable("two".to_string()))
        );
    }

    #[test]
    fn test_assess_line_dimension_message() {
        let message = assess_line(&service(), "1 2 3 4 5 6 7").unwrap_err();
        assert!(message.contains("expected 8 feature values, got 7"));
    }

    #[test]
    fn test_disabled_service_reports_load_error() {
        let service = disabled();
        let message = assess(&service, &FormInput::default()).unwrap_err();
        assert!(message.starts_with("Prediction is unavailable"));
        assert!(message.contains("models/missing.json"));

        let status = get_engine_status(&service);
        assert!(!status.model.loaded);
        assert!(status.model.disabled_reason.is_some());
        assert_eq!(status.failed_requests, 1);
    }

    #[test]
    fn test_engine_status_counts() {
        let service = service();
        assess(&service, &FormInput::default()).unwrap();
        assess(&service, &FormInput::default()).unwrap();

        let status = get_engine_status(&service);
        assert!(status.model.loaded);
        assert_eq!(status.model.trained_on_records, Some(768));
        assert_eq!(status.inference_count, 2);
        assert_eq!(status.layout.feature_count, 8);
        assert_eq!(status.layout.feature_names[2], "blood_pressure");
        assert_eq!(status.model.expects_scaled_input, Some(false));
        assert!(!status.normalizer.configured);
    }

    #[test]
    fn test_list_fields() {
        let fields = list_fields();
        assert_eq!(fields.len(), FEATURE_COUNT);
        assert_eq!(fields[7].name, "age");
    }

    #[test]
    fn test_verify_missing_artifacts() {
        let config = AppConfig {
            model_path: PathBuf::from("/nonexistent/model.json"),
            scaler_path: Some(PathBuf::from("/nonexistent/scaler.json")),
            ..AppConfig::default()
        };
        let report = verify_artifacts(&config);
        assert!(!report.is_ok());
        assert!(report.model_error.unwrap().contains("not found"));
        assert_eq!(report.scaler_ok, Some(false));
    }
}
