//! Application configuration
//!
//! Resolved once at startup: compiled defaults, then environment, then
//! command-line overrides. Immutable afterwards.

use std::path::PathBuf;

use crate::constants;
use crate::logic::error::ConfigError;
use crate::logic::model::RiskBands;
use crate::logic::presenter::{ColorScheme, DisplayConfig, WidgetStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Model artifact path
    pub model_path: PathBuf,

    /// Scaler artifact path, `None` when disabled
    pub scaler_path: Option<PathBuf>,

    /// Pinned SHA-256 of the model artifact
    pub model_sha256: Option<String>,

    /// Risk tier cut points
    pub bands: RiskBands,

    /// Session display settings
    pub display: DisplayConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: constants::default_artifact_path(constants::DEFAULT_MODEL_PATH),
            scaler_path: Some(constants::default_artifact_path(constants::DEFAULT_SCALER_PATH)),
            model_sha256: None,
            bands: RiskBands::default(),
            display: DisplayConfig::default(),
        }
    }
}

/// Values that may override the environment (usually from the CLI)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model_path: Option<PathBuf>,
    pub scaler_path: Option<PathBuf>,
    pub no_scaler: bool,
    pub model_sha256: Option<String>,
    pub bands: Option<String>,
    pub medium_from: Option<f64>,
    pub high_from: Option<f64>,
    pub theme: Option<String>,
    pub widget: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(&Overrides::default())
    }

    /// Environment first, then the given overrides
    pub fn resolve(overrides: &Overrides) -> Result<Self, ConfigError> {
        let model_path = overrides
            .model_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::get_model_path()));

        let scaler_path = if overrides.no_scaler {
            None
        } else {
            overrides
                .scaler_path
                .clone()
                .or_else(|| constants::get_scaler_path().map(PathBuf::from))
        };

        let model_sha256 = overrides
            .model_sha256
            .clone()
            .or_else(constants::get_model_sha256);

        let preset = overrides
            .bands
            .clone()
            .unwrap_or_else(constants::get_risk_bands);
        let medium_from = match overrides.medium_from {
            Some(value) => Some(value),
            None => constants::get_medium_from()?,
        };
        let high_from = match overrides.high_from {
            Some(value) => Some(value),
            None => constants::get_high_from()?,
        };
        let bands = RiskBands::preset(&preset)?.with_overrides(medium_from, high_from)?;

        let color_scheme = match overrides.theme.clone().or_else(constants::get_theme) {
            Some(name) => name.parse::<ColorScheme>()?,
            None => ColorScheme::default(),
        };
        let widget = match overrides.widget.clone().or_else(constants::get_widget) {
            Some(name) => name.parse::<WidgetStyle>()?,
            None => WidgetStyle::default(),
        };

        Ok(Self {
            model_path,
            scaler_path,
            model_sha256,
            bands,
            display: DisplayConfig::new(color_scheme, widget),
        })
    }
}
