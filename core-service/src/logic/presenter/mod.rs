//! Presenter Module - tiers, advice and rendering

pub mod assessment;
pub mod display;

pub use assessment::{display_percentage, present, Indicator, RiskAssessment, RiskPresenter, RiskTier};
pub use display::{ColorScheme, DisplayConfig, PresentationStyle, WidgetStyle};
