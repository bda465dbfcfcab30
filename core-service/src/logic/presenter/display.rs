//! Result rendering
//!
//! `DisplayConfig` is built once per session and passed in; nothing here
//! keeps state between renders.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::assessment::{Indicator, RiskAssessment};
use crate::logic::error::ConfigError;
use crate::logic::model::ClassLabel;
use crate::logic::pipeline::PredictionReport;

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_BOLD: &str = "\x1b[1m";
const GAUGE_WIDTH: usize = 20;

/// Theme choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
    /// No escape codes (pipes, logs)
    Plain,
}

impl FromStr for ColorScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            "plain" | "none" | "no-color" => Ok(ColorScheme::Plain),
            other => Err(ConfigError(format!("unknown theme '{}' (light, dark, plain)", other))),
        }
    }
}

/// How the probability is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetStyle {
    /// Number only
    Number,
    /// Track with a marker at the probability
    Slider,
    /// Filled bar
    #[default]
    ProgressBar,
}

impl FromStr for WidgetStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "number" => Ok(WidgetStyle::Number),
            "slider" => Ok(WidgetStyle::Slider),
            "progress-bar" | "progress" | "bar" => Ok(WidgetStyle::ProgressBar),
            other => Err(ConfigError(format!(
                "unknown widget style '{}' (number, slider, progress-bar)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationStyle {
    pub color_scheme: ColorScheme,
    pub widget: WidgetStyle,
}

/// Immutable per-session display settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub style: PresentationStyle,
}

impl DisplayConfig {
    pub fn new(color_scheme: ColorScheme, widget: WidgetStyle) -> Self {
        Self {
            style: PresentationStyle { color_scheme, widget },
        }
    }

    /// CSS-style color for an indicator under this theme
    pub fn color_hex(&self, indicator: Indicator) -> &'static str {
        match (self.style.color_scheme, indicator) {
            (ColorScheme::Dark, Indicator::Green) => "#66bb6a",
            (ColorScheme::Dark, Indicator::Amber) => "#ffca28",
            (ColorScheme::Dark, Indicator::Red) => "#ef5350",
            (_, Indicator::Green) => "#2e7d32",
            (_, Indicator::Amber) => "#ff8f00",
            (_, Indicator::Red) => "#c62828",
        }
    }

    fn ansi(&self, indicator: Indicator) -> &'static str {
        match (self.style.color_scheme, indicator) {
            (ColorScheme::Plain, _) => "",
            (ColorScheme::Light, Indicator::Green) => "\x1b[32m",
            (ColorScheme::Light, Indicator::Amber) => "\x1b[33m",
            (ColorScheme::Light, Indicator::Red) => "\x1b[31m",
            (ColorScheme::Dark, Indicator::Green) => "\x1b[92m",
            (ColorScheme::Dark, Indicator::Amber) => "\x1b[93m",
            (ColorScheme::Dark, Indicator::Red) => "\x1b[91m",
        }
    }

    fn paint(&self, text: &str, indicator: Indicator) -> String {
        match self.style.color_scheme {
            ColorScheme::Plain => text.to_string(),
            _ => format!("{}{}{}{}", ANSI_BOLD, self.ansi(indicator), text, ANSI_RESET),
        }
    }

    fn gauge(&self, assessment: &RiskAssessment) -> Option<String> {
        let filled = ((assessment.display_percentage / 100.0) * GAUGE_WIDTH as f64).round() as usize;
        let filled = filled.min(GAUGE_WIDTH);

        match self.style.widget {
            WidgetStyle::Number => None,
            WidgetStyle::ProgressBar => {
                let bar = format!("{}{}", "█".repeat(filled), "░".repeat(GAUGE_WIDTH - filled));
                Some(format!("[{}]", self.paint(&bar, assessment.indicator)))
            }
            WidgetStyle::Slider => {
                let marker = filled.min(GAUGE_WIDTH - 1);
                let track: String = (0..GAUGE_WIDTH)
                    .map(|i| if i == marker { '●' } else { '─' })
                    .collect();
                Some(format!("0% ├{}┤ 100%", track))
            }
        }
    }

    /// Human-readable result block
    pub fn render(&self, report: &PredictionReport) -> String {
        let assessment = &report.assessment;
        let mut out = String::new();

        let _ = writeln!(out, "Prediction Result");
        let _ = writeln!(out, "─────────────────");
        let _ = writeln!(
            out,
            "Probability of having diabetes: {:.2}%",
            assessment.display_percentage
        );
        if let Some(gauge) = self.gauge(assessment) {
            let _ = writeln!(out, "{}", gauge);
        }
        let _ = writeln!(
            out,
            "Risk Level: {}",
            self.paint(assessment.risk_tier.label(), assessment.indicator)
        );
        let _ = writeln!(out, "{}", verdict(report.classification.predicted_class));
        let _ = write!(out, "Advice: {}", assessment.advice_message);

        out
    }

    /// Report plus the resolved display colors, for machine consumers
    pub fn render_json(&self, report: &PredictionReport) -> serde_json::Value {
        serde_json::json!({
            "report": report,
            "display": {
                "style": self.style,
                "color": self.color_hex(report.assessment.indicator),
                "risk_label": report.assessment.risk_tier.label(),
            },
        })
    }
}

/// Sentence for the model's hard decision
pub fn verdict(class: ClassLabel) -> &'static str {
    match class {
        ClassLabel::Diabetic => "⚠️ It is likely that you have diabetes. Please consult a doctor.",
        ClassLabel::NonDiabetic => {
            "✅ You are unlikely to have diabetes, but regular check-ups are recommended."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FeatureVector;
    use crate::logic::model::{ClassificationResult, ProbabilityPair};
    use crate::logic::presenter::present;

    fn report(p1: f64, class: ClassLabel) -> PredictionReport {
        let probability_pair = ProbabilityPair::from_positive(p1).unwrap();
        PredictionReport::new(
            FeatureVector::new(),
            ClassificationResult { predicted_class: class, probability_pair },
            present(&probability_pair),
            12,
        )
    }

    #[test]
    fn test_plain_render_has_no_escape_codes() {
        let config = DisplayConfig::new(ColorScheme::Plain, WidgetStyle::Number);
        let text = config.render(&report(0.22, ClassLabel::NonDiabetic));

        assert!(!text.contains('\x1b'));
        assert!(text.contains("Probability of having diabetes: 22.00%"));
        assert!(text.contains("Risk Level: Low Risk"));
        assert!(text.contains("unlikely to have diabetes"));
        assert!(text.to_lowercase().contains("maintain healthy habits"));
    }

    #[test]
    fn test_themes_use_different_colors() {
        let light = DisplayConfig::new(ColorScheme::Light, WidgetStyle::Number);
        let dark = DisplayConfig::new(ColorScheme::Dark, WidgetStyle::Number);
        let high = report(0.95, ClassLabel::Diabetic);

        assert!(light.render(&high).contains("\x1b[31m"));
        assert!(dark.render(&high).contains("\x1b[91m"));
        assert_ne!(light.color_hex(Indicator::Red), dark.color_hex(Indicator::Red));
    }

    #[test]
    fn test_progress_bar_fill() {
        let config = DisplayConfig::new(ColorScheme::Plain, WidgetStyle::ProgressBar);
        let text = config.render(&report(0.55, ClassLabel::Diabetic));

        assert!(text.contains(&format!("[{}{}]", "█".repeat(11), "░".repeat(9))));
        assert!(text.contains("It is likely that you have diabetes"));
    }

    #[test]
    fn test_slider_marker_stays_on_track() {
        let config = DisplayConfig::new(ColorScheme::Plain, WidgetStyle::Slider);
        let text = config.render(&report(1.0, ClassLabel::Diabetic));
        assert!(text.contains("●┤ 100%"));

        let text = config.render(&report(0.0, ClassLabel::NonDiabetic));
        assert!(text.contains("0% ├●"));
    }

    #[test]
    fn test_render_json() {
        let config = DisplayConfig::new(ColorScheme::Dark, WidgetStyle::Slider);
        let json = config.render_json(&report(0.55, ClassLabel::Diabetic));

        assert_eq!(json["display"]["color"], "#ffca28");
        assert_eq!(json["display"]["risk_label"], "Medium Risk");
        assert_eq!(json["report"]["assessment"]["risk_tier"], "medium");
        assert_eq!(json["report"]["classification"]["predicted_class"], "diabetic");
    }

    #[test]
    fn test_parse_style_names() {
        assert_eq!("Dark".parse::<ColorScheme>().unwrap(), ColorScheme::Dark);
        assert_eq!("progress_bar".parse::<WidgetStyle>().unwrap(), WidgetStyle::ProgressBar);
        assert!("sepia".parse::<ColorScheme>().is_err());
        assert!("knob".parse::<WidgetStyle>().is_err());
    }
}
