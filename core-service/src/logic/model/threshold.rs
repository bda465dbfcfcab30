//! Risk Band Configuration
//!
//! Cut points that turn the positive-class probability into a risk tier.
//! Each cut point belongs to the higher tier.

use serde::{Deserialize, Serialize};

use crate::logic::error::ConfigError;

/// Lower bound of the Medium tier in the standard bands
pub const DEFAULT_MEDIUM_RISK_FROM: f64 = 0.40;

/// Lower bound of the High tier in every observed configuration
pub const DEFAULT_HIGH_RISK_FROM: f64 = 0.70;

/// Lower bound of the Medium tier used alongside the feature scaler
pub const SCALED_VARIANT_MEDIUM_RISK_FROM: f64 = 0.30;

/// Risk band configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskBands {
    /// p1 at or above this is at least Medium
    pub medium_from: f64,

    /// p1 at or above this is High
    pub high_from: f64,
}

impl RiskBands {
    /// 0.40 / 0.70
    pub const STANDARD: RiskBands = RiskBands {
        medium_from: DEFAULT_MEDIUM_RISK_FROM,
        high_from: DEFAULT_HIGH_RISK_FROM,
    };

    /// 0.30 / 0.70
    pub const SCALED_VARIANT: RiskBands = RiskBands {
        medium_from: SCALED_VARIANT_MEDIUM_RISK_FROM,
        high_from: DEFAULT_HIGH_RISK_FROM,
    };

    /// Custom bands; requires `0 < medium_from < high_from <= 1`
    pub fn new(medium_from: f64, high_from: f64) -> Result<Self, ConfigError> {
        let bands = Self { medium_from, high_from };
        bands.validate()?;
        Ok(bands)
    }

    /// Resolve a named preset (`standard`, `scaled-variant`)
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "standard" | "default" => Ok(Self::STANDARD),
            "scaled-variant" | "scaled" => Ok(Self::SCALED_VARIANT),
            other => Err(ConfigError(format!("unknown risk band preset '{}'", other))),
        }
    }

    /// Replace either cut point, re-validating the result
    pub fn with_overrides(self, medium_from: Option<f64>, high_from: Option<f64>) -> Result<Self, ConfigError> {
        Self::new(
            medium_from.unwrap_or(self.medium_from),
            high_from.unwrap_or(self.high_from),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.medium_from > 0.0
            && self.medium_from < self.high_from
            && self.high_from <= 1.0;

        if !ordered || !self.medium_from.is_finite() || !self.high_from.is_finite() {
            return Err(ConfigError(format!(
                "risk bands must satisfy 0 < medium_from < high_from <= 1, got {} / {}",
                self.medium_from, self.high_from
            )));
        }
        Ok(())
    }
}

impl Default for RiskBands {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bands() {
        let bands = RiskBands::default();
        assert_eq!(bands.medium_from, 0.40);
        assert_eq!(bands.high_from, 0.70);
    }

    #[test]
    fn test_presets() {
        assert_eq!(RiskBands::preset("standard").unwrap(), RiskBands::STANDARD);
        assert_eq!(RiskBands::preset("Scaled_Variant").unwrap(), RiskBands::SCALED_VARIANT);
        assert!(RiskBands::preset("aggressive").is_err());
    }

    #[test]
    fn test_invalid_bands() {
        assert!(RiskBands::new(0.7, 0.4).is_err());
        assert!(RiskBands::new(0.0, 0.5).is_err());
        assert!(RiskBands::new(0.5, 1.1).is_err());
        assert!(RiskBands::new(f64::NAN, 0.5).is_err());
        assert!(RiskBands::new(0.5, 1.0).is_ok());
    }

    #[test]
    fn test_overrides() {
        let bands = RiskBands::STANDARD.with_overrides(Some(0.35), None).unwrap();
        assert_eq!(bands.medium_from, 0.35);
        assert_eq!(bands.high_from, 0.70);

        assert!(RiskBands::STANDARD.with_overrides(Some(0.8), None).is_err());
    }
}
