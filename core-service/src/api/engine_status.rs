use serde::{Deserialize, Serialize};

use crate::logic::features::layout::LayoutInfo;
use crate::logic::model::RiskBands;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub layout: LayoutInfo,

    pub model: ModelStatus,
    pub normalizer: NormalizerStatus,
    pub bands: RiskBands,

    pub inference_count: u64,
    pub failed_requests: u64,
    pub avg_latency_ms: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub engine: Option<String>, // "logistic_regression" | "onnx"
    pub model_path: Option<String>,
    pub sha256: Option<String>,
    /// `None` when the model does not declare it
    pub expects_scaled_input: Option<bool>,
    pub trained_on_records: Option<u64>,
    pub loaded_at: Option<String>,
    pub disabled_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerStatus {
    pub configured: bool,
    pub kind: Option<String>, // "standard" | "min_max"
    pub applied: bool,
    pub error: Option<String>,
}
