//! Artifact files - read, fingerprint, decode
//!
//! Model and scaler artifacts are read whole into memory, hashed with
//! SHA-256 and only then decoded. Decoding never trusts the file: every
//! structural property the pipeline relies on is checked explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::error::ModelLoadError;
use crate::logic::features::layout::{check_feature_names, layout_hash, FEATURE_COUNT};

/// `format` tag of a model artifact
pub const MODEL_FORMAT: &str = "diabetes-risk-model";

/// `format` tag of a scaler artifact
pub const SCALER_FORMAT: &str = "diabetes-risk-scaler";

/// Highest artifact format version this build understands
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Raw artifact bytes with their fingerprint
#[derive(Debug, Clone)]
pub struct ArtifactBytes {
    pub path: String,
    pub bytes: Vec<u8>,
    pub sha256: String,
}

/// Read an artifact file and fingerprint it
pub fn read_artifact(path: &Path) -> std::io::Result<ArtifactBytes> {
    let bytes = std::fs::read(path)?;
    let sha256 = sha256_hex(&bytes);

    log::debug!("Read {} ({} bytes, sha256 {})", path.display(), bytes.len(), sha256);

    Ok(ArtifactBytes {
        path: path.display().to_string(),
        bytes,
        sha256,
    })
}

/// Hex-encoded SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compare against a pinned digest (case-insensitive, whitespace ignored)
pub fn verify_checksum(artifact: &ArtifactBytes, expected: &str) -> Result<(), ModelLoadError> {
    let expected = expected.trim().to_ascii_lowercase();
    if artifact.sha256 != expected {
        return Err(ModelLoadError::ChecksumMismatch {
            expected,
            actual: artifact.sha256.clone(),
        });
    }
    Ok(())
}

/// Map a read failure to the model error taxonomy
pub fn model_read_error(path: &Path, err: std::io::Error) -> ModelLoadError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ModelLoadError::NotFound(path.display().to_string())
    } else {
        ModelLoadError::Unreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

// ============================================================================
// MODEL ARTIFACT
// ============================================================================

/// Model families understood by the JSON artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression,
}

/// Fitted binary classifier as exported by the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub format_version: u32,
    pub kind: ModelKind,
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub expects_scaled_input: bool,
    /// Layout fingerprint the model was exported against, if recorded
    #[serde(default)]
    pub layout_hash: Option<u32>,
    #[serde(default)]
    pub trained_on_records: Option<u64>,
}

impl ModelArtifact {
    /// Decode and check a model artifact
    pub fn decode(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)
            .map_err(|e| ModelLoadError::Corrupt(e.to_string()))?;
        artifact.check_compatibility()?;
        Ok(artifact)
    }

    /// Feature count, feature order, class labels and parameter sanity
    pub fn check_compatibility(&self) -> Result<(), ModelLoadError> {
        if self.format != MODEL_FORMAT {
            return Err(ModelLoadError::Unsupported(format!(
                "format '{}' (expected '{}')",
                self.format, MODEL_FORMAT
            )));
        }
        if self.format_version == 0 || self.format_version > SUPPORTED_FORMAT_VERSION {
            return Err(ModelLoadError::Unsupported(format!(
                "format version {} (supported up to {})",
                self.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }

        check_feature_names(&self.feature_names)
            .map_err(|reason| ModelLoadError::Incompatible(format!("model {}", reason)))?;

        if let Some(hash) = self.layout_hash {
            if hash != layout_hash() {
                return Err(ModelLoadError::Incompatible(format!(
                    "layout hash {:08x} does not match {:08x}",
                    hash,
                    layout_hash()
                )));
            }
        }

        if self.classes != [0, 1] {
            return Err(ModelLoadError::Incompatible(format!(
                "classes {:?}, expected a binary [0, 1] classifier",
                self.classes
            )));
        }

        if self.coefficients.len() != FEATURE_COUNT {
            return Err(ModelLoadError::Incompatible(format!(
                "{} coefficients, expected {}",
                self.coefficients.len(),
                FEATURE_COUNT
            )));
        }

        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelLoadError::Incompatible(
                "non-finite model parameters".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_LAYOUT;

    fn artifact_json() -> serde_json::Value {
        serde_json::json!({
            "format": MODEL_FORMAT,
            "format_version": 1,
            "kind": "logistic_regression",
            "feature_names": FEATURE_LAYOUT,
            "classes": [0, 1],
            "coefficients": [0.1, 0.03, -0.01, 0.0, -0.001, 0.09, 0.9, 0.01],
            "intercept": -8.0,
        })
    }

    fn decode(json: &serde_json::Value) -> Result<ModelArtifact, ModelLoadError> {
        ModelArtifact::decode(json.to_string().as_bytes())
    }

    #[test]
    fn test_decode_valid_artifact() {
        let artifact = decode(&artifact_json()).unwrap();
        assert_eq!(artifact.kind, ModelKind::LogisticRegression);
        assert!(!artifact.expects_scaled_input);
        assert_eq!(artifact.trained_on_records, None);
    }

    #[test]
    fn test_decode_garbage() {
        let err = ModelArtifact::decode(b"\x80\x04\x95 pickle").unwrap_err();
        assert!(matches!(err, ModelLoadError::Corrupt(_)));
    }

    #[test]
    fn test_rejects_wrong_feature_count() {
        let mut json = artifact_json();
        json["coefficients"] = serde_json::json!([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
        assert!(matches!(decode(&json), Err(ModelLoadError::Incompatible(_))));

        let mut json = artifact_json();
        json["feature_names"] = serde_json::json!(&FEATURE_LAYOUT[..7]);
        assert!(matches!(decode(&json), Err(ModelLoadError::Incompatible(_))));
    }

    #[test]
    fn test_rejects_multiclass() {
        let mut json = artifact_json();
        json["classes"] = serde_json::json!([0, 1, 2]);
        assert!(matches!(decode(&json), Err(ModelLoadError::Incompatible(_))));
    }

    #[test]
    fn test_rejects_foreign_format_and_future_version() {
        let mut json = artifact_json();
        json["format"] = serde_json::json!("sklearn-pickle");
        assert!(matches!(decode(&json), Err(ModelLoadError::Unsupported(_))));

        let mut json = artifact_json();
        json["format_version"] = serde_json::json!(SUPPORTED_FORMAT_VERSION + 1);
        assert!(matches!(decode(&json), Err(ModelLoadError::Unsupported(_))));
    }

    #[test]
    fn test_layout_hash_check() {
        let mut json = artifact_json();
        json["layout_hash"] = serde_json::json!(layout_hash());
        assert!(decode(&json).is_ok());

        json["layout_hash"] = serde_json::json!(layout_hash().wrapping_add(1));
        assert!(matches!(decode(&json), Err(ModelLoadError::Incompatible(_))));
    }

    #[test]
    fn test_checksum() {
        let artifact = ArtifactBytes {
            path: "<memory>".to_string(),
            bytes: b"abc".to_vec(),
            sha256: sha256_hex(b"abc"),
        };
        let known = "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD";

        assert!(verify_checksum(&artifact, known).is_ok());
        assert!(matches!(
            verify_checksum(&artifact, &"0".repeat(64)),
            Err(ModelLoadError::ChecksumMismatch { .. })
        ));
    }
}
