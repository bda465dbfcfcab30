//! Risk Service - normalizer → classifier → presenter
//!
//! Artifacts are loaded once by [`RiskService::start`]. A model that fails
//! to load leaves the service permanently disabled; every later submission
//! reports the same `ModelLoadError`. There is no retry and no heuristic
//! fallback scorer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::config::AppConfig;
use super::error::{InvalidInputError, ModelLoadError, NormalizationError, RiskError, RiskResult};
use super::features::{FeatureVector, FEATURE_LAYOUT};
use super::model::{
    ClassificationResult, FittedScaler, LoadOptions, ModelMetadata, RiskBands, RiskClassifier,
};
use super::presenter::{RiskAssessment, RiskPresenter};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Everything the renderer needs for one submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    pub request_id: uuid::Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// Raw (unscaled) values as entered
    pub features: FeatureVector,
    pub classification: ClassificationResult,
    pub assessment: RiskAssessment,
    pub inference_time_us: u64,
}

impl PredictionReport {
    pub fn new(
        features: FeatureVector,
        classification: ClassificationResult,
        assessment: RiskAssessment,
        inference_time_us: u64,
    ) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            features,
            classification,
            assessment,
            inference_time_us,
        }
    }
}

/// Classifier availability, fixed at startup
#[derive(Debug)]
pub enum EngineState {
    Ready(RiskClassifier),
    Disabled(ModelLoadError),
}

/// Normalizer availability, fixed at startup
#[derive(Debug, Clone)]
pub enum ScalerState {
    NotConfigured,
    Loaded(FittedScaler),
    Failed(NormalizationError),
}

/// Per-process counters
#[derive(Debug, Default)]
pub struct InferenceStats {
    count: AtomicU64,
    latency_sum_us: AtomicU64,
    failures: AtomicU64,
}

impl InferenceStats {
    fn record_success(&self, elapsed_us: u64) {
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inference_count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f32 {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.count.load(Ordering::Relaxed);
        if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Debug)]
pub struct RiskService {
    engine: EngineState,
    scaler: ScalerState,
    presenter: RiskPresenter,
    stats: InferenceStats,
}

impl RiskService {
    /// Load artifacts named by the configuration. Never fails; see `EngineState`.
    pub fn start(config: &AppConfig) -> Self {
        let options = LoadOptions {
            expected_sha256: config.model_sha256.clone(),
        };

        let engine = RiskClassifier::load(&config.model_path, &options);

        let scaler = match &config.scaler_path {
            None => ScalerState::NotConfigured,
            Some(path) => match FittedScaler::load(path) {
                Ok(scaler) => ScalerState::Loaded(scaler),
                Err(e) => {
                    log::warn!("Scaler load failed: {} - scaled predictions will be refused", e);
                    ScalerState::Failed(e)
                }
            },
        };

        Self::from_parts(engine, scaler, config.bands)
    }

    /// Assemble from already-loaded parts
    pub fn from_parts(
        engine: Result<RiskClassifier, ModelLoadError>,
        scaler: ScalerState,
        bands: RiskBands,
    ) -> Self {
        let engine = match engine {
            Ok(classifier) => {
                let expects_scaled = classifier.metadata().expects_scaled_input;
                match (&scaler, expects_scaled) {
                    (ScalerState::NotConfigured, Some(true)) => {
                        log::warn!("Model expects scaled input but no scaler is configured")
                    }
                    (ScalerState::Loaded(_), Some(false)) => {
                        log::warn!("Model expects raw input - configured scaler will be ignored")
                    }
                    (ScalerState::NotConfigured, None) => {
                        log::info!("Model does not declare input scaling - using raw input")
                    }
                    (_, None) => {
                        log::info!("Model does not declare input scaling - configured scaler is required")
                    }
                    _ => {}
                }
                EngineState::Ready(classifier)
            }
            Err(e) => {
                log::error!("Model load failed: {} - prediction disabled", e);
                EngineState::Disabled(e)
            }
        };

        Self {
            engine,
            scaler,
            presenter: RiskPresenter::new(bands),
            stats: InferenceStats::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.engine, EngineState::Ready(_))
    }

    pub fn disabled_reason(&self) -> Option<&ModelLoadError> {
        match &self.engine {
            EngineState::Disabled(e) => Some(e),
            EngineState::Ready(_) => None,
        }
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        match &self.engine {
            EngineState::Ready(classifier) => Some(classifier.metadata()),
            EngineState::Disabled(_) => None,
        }
    }

    pub fn scaler_state(&self) -> &ScalerState {
        &self.scaler
    }

    pub fn bands(&self) -> RiskBands {
        self.presenter.bands()
    }

    pub fn stats(&self) -> &InferenceStats {
        &self.stats
    }

    /// Whether submissions go through the normalizer.
    ///
    /// A model that does not declare its input scaling gets the configured
    /// scaler; if that scaler failed to load, requests fail.
    pub fn normalization_expected(&self) -> bool {
        match self.metadata().map(|m| m.expects_scaled_input) {
            Some(Some(declared)) => declared,
            Some(None) => !matches!(self.scaler, ScalerState::NotConfigured),
            None => false,
        }
    }

    /// Raw vector → model input
    pub fn prepare(&self, raw: &FeatureVector) -> Result<FeatureVector, NormalizationError> {
        if !self.normalization_expected() {
            return Ok(*raw);
        }

        match &self.scaler {
            ScalerState::Loaded(scaler) => Ok(scaler.apply(raw)),
            ScalerState::NotConfigured => Err(NormalizationError::Missing),
            ScalerState::Failed(e) => Err(e.clone()),
        }
    }

    /// Score one submission
    pub fn assess(&self, raw: &FeatureVector) -> RiskResult<PredictionReport> {
        let result = self.run(raw);
        if let Err(e) = &result {
            self.stats.record_failure();
            log::warn!("Assessment failed: {}", e);
        }
        result
    }

    /// Score one submission given as untrusted raw values
    pub fn assess_values(&self, values: &[f64]) -> RiskResult<PredictionReport> {
        match FeatureVector::from_slice(values) {
            Ok(vector) => self.assess(&vector),
            Err(e) => {
                self.stats.record_failure();
                Err(e.into())
            }
        }
    }

    fn run(&self, raw: &FeatureVector) -> RiskResult<PredictionReport> {
        let classifier = match &self.engine {
            EngineState::Ready(classifier) => classifier,
            EngineState::Disabled(e) => return Err(RiskError::ModelLoad(e.clone())),
        };

        if let Some(i) = raw.values.iter().position(|v| !v.is_finite()) {
            return Err(InvalidInputError::NotFinite { field: FEATURE_LAYOUT[i] }.into());
        }

        let start_time = Instant::now();

        let prepared = self.prepare(raw)?;
        let classification = classifier.classify(&prepared)?;

        let inference_time = start_time.elapsed().as_micros() as u64;
        self.stats.record_success(inference_time);

        let assessment = self.presenter.present(&classification.probability_pair);

        log::debug!("Features: {}", raw.to_log_entry());
        log::debug!(
            "Assessed: p1={:.4} class={:?} tier={:?} ({}us)",
            classification.probability_pair.positive,
            classification.predicted_class,
            assessment.risk_tier,
            inference_time
        );

        Ok(PredictionReport::new(*raw, classification, assessment, inference_time))
    }
}
