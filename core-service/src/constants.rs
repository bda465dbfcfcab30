//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment (or `.env`) and
//! then from the command line.

use std::path::{Path, PathBuf};

use crate::logic::error::ConfigError;

/// Default model artifact path, relative to the artifact root
pub const DEFAULT_MODEL_PATH: &str = "models/diabetes_model.json";

/// Default scaler artifact path, relative to the artifact root
pub const DEFAULT_SCALER_PATH: &str = "models/diabetes_scaler.json";

/// Default risk band preset
pub const DEFAULT_RISK_BANDS: &str = "standard";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Diabetes Risk";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Locate a default artifact.
///
/// Tried in order: the working directory, the directory of the executable,
/// the crate directory. Falls back to the crate directory so the error names
/// a stable path.
pub fn default_artifact_path(relative: &str) -> PathBuf {
    let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(relative);
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(relative)));

    [Some(PathBuf::from(relative)), beside_exe]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_file())
        .unwrap_or(crate_dir)
}

/// Get model artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("DIABETES_MODEL_PATH")
        .unwrap_or_else(|_| default_artifact_path(DEFAULT_MODEL_PATH).display().to_string())
}

/// Get scaler artifact path from environment or use default.
///
/// `none` (or an empty value) disables the scaler.
pub fn get_scaler_path() -> Option<String> {
    match std::env::var("DIABETES_SCALER_PATH") {
        Ok(s) if s.is_empty() || s.eq_ignore_ascii_case("none") => None,
        Ok(s) => Some(s),
        Err(_) => Some(default_artifact_path(DEFAULT_SCALER_PATH).display().to_string()),
    }
}

/// Get pinned model digest from environment
pub fn get_model_sha256() -> Option<String> {
    std::env::var("DIABETES_MODEL_SHA256")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Get risk band preset name from environment or use default
pub fn get_risk_bands() -> String {
    std::env::var("DIABETES_RISK_BANDS")
        .unwrap_or_else(|_| DEFAULT_RISK_BANDS.to_string())
}

/// Get Medium tier lower bound override from environment
pub fn get_medium_from() -> Result<Option<f64>, ConfigError> {
    parse_band_value("DIABETES_MEDIUM_FROM", std::env::var("DIABETES_MEDIUM_FROM").ok())
}

/// Get High tier lower bound override from environment
pub fn get_high_from() -> Result<Option<f64>, ConfigError> {
    parse_band_value("DIABETES_HIGH_FROM", std::env::var("DIABETES_HIGH_FROM").ok())
}

/// Blank means unset; anything else must be a number
pub fn parse_band_value(name: &str, raw: Option<String>) -> Result<Option<f64>, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ConfigError(format!("{} = '{}' is not a number", name, value))),
    }
}

/// Get theme name from environment
pub fn get_theme() -> Option<String> {
    std::env::var("DIABETES_THEME").ok()
}

/// Get widget style name from environment
pub fn get_widget() -> Option<String> {
    std::env::var("DIABETES_WIDGET").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_band_value() {
        assert_eq!(parse_band_value("DIABETES_MEDIUM_FROM", None).unwrap(), None);
        assert_eq!(parse_band_value("DIABETES_MEDIUM_FROM", Some("  ".to_string())).unwrap(), None);
        assert_eq!(parse_band_value("DIABETES_HIGH_FROM", Some(" 0.8".to_string())).unwrap(), Some(0.8));

        let err = parse_band_value("DIABETES_MEDIUM_FROM", Some("abc".to_string())).unwrap_err();
        assert!(err.0.contains("DIABETES_MEDIUM_FROM"));
    }

    #[test]
    fn test_default_artifacts_resolve() {
        let model = default_artifact_path(DEFAULT_MODEL_PATH);
        let scaler = default_artifact_path(DEFAULT_SCALER_PATH);
        assert!(model.is_file(), "{}", model.display());
        assert!(scaler.is_file(), "{}", scaler.display());
    }

    #[test]
    fn test_missing_default_artifact_is_anchored() {
        let path = default_artifact_path("models/does_not_exist.json");
        assert!(path.is_absolute());
        assert!(path.starts_with(env!("CARGO_MANIFEST_DIR")));
    }
}
