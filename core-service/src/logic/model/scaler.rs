//! Feature Normalizer
//!
//! Applies the transform fitted at training time. Never refits.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::artifact::{read_artifact, SCALER_FORMAT, SUPPORTED_FORMAT_VERSION};
use crate::logic::error::NormalizationError;
use crate::logic::features::layout::check_feature_names;
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Scaler artifact as exported by the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format: String,
    pub format_version: u32,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub params: ScalerParams,
}

/// Fitted parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    /// z-score: (x - mean) / scale
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// (x - data_min) / (data_max - data_min)
    MinMax { data_min: Vec<f64>, data_max: Vec<f64> },
}

/// Validated per-feature affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedScaler {
    offset: [f64; FEATURE_COUNT],
    divisor: [f64; FEATURE_COUNT],
    kind: &'static str,
}

impl FittedScaler {
    /// Load and check a scaler artifact
    pub fn load(path: &Path) -> Result<Self, NormalizationError> {
        log::info!("Loading feature scaler from: {}", path.display());

        let artifact = read_artifact(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NormalizationError::NotFound(path.display().to_string())
            } else {
                NormalizationError::Unreadable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let scaler = Self::from_bytes(&artifact.bytes)?;
        log::info!("Feature scaler loaded ({})", scaler.kind);
        Ok(scaler)
    }

    /// Decode a scaler artifact from memory
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NormalizationError> {
        let artifact: ScalerArtifact = serde_json::from_slice(bytes)
            .map_err(|e| NormalizationError::Corrupt(e.to_string()))?;

        if artifact.format != SCALER_FORMAT {
            return Err(NormalizationError::Incompatible(format!(
                "format '{}' (expected '{}')",
                artifact.format, SCALER_FORMAT
            )));
        }
        if artifact.format_version == 0 || artifact.format_version > SUPPORTED_FORMAT_VERSION {
            return Err(NormalizationError::Incompatible(format!(
                "format version {}",
                artifact.format_version
            )));
        }
        if let Some(names) = &artifact.feature_names {
            check_feature_names(names)
                .map_err(|reason| NormalizationError::Incompatible(format!("scaler {}", reason)))?;
        }

        Self::from_params(&artifact.params)
    }

    /// Build from fitted parameters, checking dimensions and finiteness
    pub fn from_params(params: &ScalerParams) -> Result<Self, NormalizationError> {
        let (kind, offsets, divisors): (&'static str, &[f64], Vec<f64>) = match params {
            ScalerParams::Standard { mean, scale } => {
                check_len("mean", mean)?;
                check_len("scale", scale)?;
                ("standard", mean.as_slice(), scale.clone())
            }
            ScalerParams::MinMax { data_min, data_max } => {
                check_len("data_min", data_min)?;
                check_len("data_max", data_max)?;
                let ranges = data_min.iter().zip(data_max).map(|(lo, hi)| hi - lo).collect();
                ("min_max", data_min.as_slice(), ranges)
            }
        };

        let mut offset = [0.0; FEATURE_COUNT];
        let mut divisor = [1.0; FEATURE_COUNT];

        for i in 0..FEATURE_COUNT {
            if !offsets[i].is_finite() || !divisors[i].is_finite() {
                return Err(NormalizationError::Incompatible(
                    "non-finite scaler parameters".to_string(),
                ));
            }
            offset[i] = offsets[i];
            // Constant features were fitted with zero spread
            divisor[i] = if divisors[i] == 0.0 { 1.0 } else { divisors[i] };
        }

        Ok(Self { offset, divisor, kind })
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Apply the transform
    pub fn apply(&self, raw: &FeatureVector) -> FeatureVector {
        let mut values = *raw.as_array();
        for (i, v) in values.iter_mut().enumerate() {
            *v = (*v - self.offset[i]) / self.divisor[i];
        }
        FeatureVector::from_values(values)
    }
}

fn check_len(name: &str, values: &[f64]) -> Result<(), NormalizationError> {
    if values.len() != FEATURE_COUNT {
        return Err(NormalizationError::Incompatible(format!(
            "{} has {} entries, expected {}",
            name,
            values.len(),
            FEATURE_COUNT
        )));
    }
    Ok(())
}

/// Rescale a raw vector with a fitted scaler
pub fn normalize(raw: &FeatureVector, scaler: &FittedScaler) -> FeatureVector {
    scaler.apply(raw)
}
