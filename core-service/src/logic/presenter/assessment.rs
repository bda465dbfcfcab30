//! Risk Presenter - probability to tier, indicator and advice
//!
//! Pure mapping. Same input, same output.

use serde::{Deserialize, Serialize};

use crate::logic::model::{ProbabilityPair, RiskBands};

/// Discrete risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }

    pub fn indicator(self) -> Indicator {
        match self {
            RiskTier::Low => Indicator::Green,
            RiskTier::Medium => Indicator::Amber,
            RiskTier::High => Indicator::Red,
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            RiskTier::Low => LOW_RISK_ADVICE,
            RiskTier::Medium => MEDIUM_RISK_ADVICE,
            RiskTier::High => HIGH_RISK_ADVICE,
        }
    }
}

/// Tier color, independent of theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Green,
    Amber,
    Red,
}

pub const LOW_RISK_ADVICE: &str =
    "Maintain healthy habits: keep a balanced diet, stay active and keep up regular check-ups.";
pub const MEDIUM_RISK_ADVICE: &str =
    "Monitor and improve lifestyle: watch your glucose, diet, weight and activity, and recheck soon.";
pub const HIGH_RISK_ADVICE: &str =
    "Consult a doctor promptly for a proper diagnosis and follow-up tests.";

/// Derived, display-ready assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_tier: RiskTier,
    /// Positive-class probability the tier was derived from
    pub probability: f64,
    /// p1 * 100, two decimals, within [0, 100]
    pub display_percentage: f64,
    pub indicator: Indicator,
    pub advice_message: String,
}

/// Maps classifier probabilities to assessments with fixed bands
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskPresenter {
    bands: RiskBands,
}

impl RiskPresenter {
    pub fn new(bands: RiskBands) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> RiskBands {
        self.bands
    }

    /// Tier for a positive-class probability; cut points go to the higher tier
    pub fn tier(&self, p1: f64) -> RiskTier {
        if p1 >= self.bands.high_from {
            RiskTier::High
        } else if p1 >= self.bands.medium_from {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn present(&self, pair: &ProbabilityPair) -> RiskAssessment {
        let p1 = pair.positive;
        let tier = self.tier(p1);

        RiskAssessment {
            risk_tier: tier,
            probability: p1,
            display_percentage: display_percentage(p1),
            indicator: tier.indicator(),
            advice_message: tier.advice().to_string(),
        }
    }
}

/// Present with the standard bands
pub fn present(pair: &ProbabilityPair) -> RiskAssessment {
    RiskPresenter::default().present(pair)
}

/// round(p * 100, 2), clamped to [0, 100]
pub fn display_percentage(p: f64) -> f64 {
    let rounded = (p * 100.0 * 100.0).round() / 100.0;
    // also folds -0.0 into 0.0
    if rounded <= 0.0 {
        0.0
    } else {
        rounded.min(100.0)
    }
}
