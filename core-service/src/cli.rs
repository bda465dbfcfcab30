use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::FormInput;
use crate::logic::config::Overrides;

#[derive(Debug, Parser)]
#[command(
    name = "diabetes-risk",
    version,
    about = "Estimate diabetes risk from eight health measurements"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Score one set of measurements
    Predict(PredictArgs),
    /// Read one submission per line from stdin
    Session(SessionArgs),
    /// List the measurements with their ranges and defaults
    Fields,
    /// Show model, normalizer and band configuration
    Status(JsonArgs),
    /// Load the configured artifacts and run the compatibility checks
    Verify(JsonArgs),
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    #[arg(long, global = true, help = "Model artifact (.json, or .onnx with the onnx feature)")]
    pub model: Option<PathBuf>,

    #[arg(long, global = true, help = "Scaler artifact")]
    pub scaler: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false, conflicts_with = "scaler")]
    pub no_scaler: bool,

    #[arg(long, global = true, help = "Expected SHA-256 of the model artifact")]
    pub model_sha256: Option<String>,

    #[arg(long, global = true, help = "Risk band preset: standard|scaled-variant")]
    pub bands: Option<String>,

    #[arg(long, global = true, help = "Lower bound of the Medium tier")]
    pub medium_from: Option<f64>,

    #[arg(long, global = true, help = "Lower bound of the High tier")]
    pub high_from: Option<f64>,

    #[arg(long, global = true, help = "Color scheme: light|dark|plain")]
    pub theme: Option<String>,

    #[arg(long, global = true, help = "Probability widget: number|slider|progress-bar")]
    pub widget: Option<String>,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            model_path: self.model.clone(),
            scaler_path: self.scaler.clone(),
            no_scaler: self.no_scaler,
            model_sha256: self.model_sha256.clone(),
            bands: self.bands.clone(),
            medium_from: self.medium_from,
            high_from: self.high_from,
            theme: self.theme.clone(),
            widget: self.widget.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[arg(long, help = "Number of pregnancies (0-20)")]
    pub pregnancies: Option<f64>,

    #[arg(long, help = "Glucose level (0-200)")]
    pub glucose: Option<f64>,

    #[arg(long, help = "Blood pressure in mm Hg (0-150)")]
    pub blood_pressure: Option<f64>,

    #[arg(long, help = "Skin thickness in mm (0-100)")]
    pub skin_thickness: Option<f64>,

    #[arg(long, help = "Insulin level in IU/ml (0-900)")]
    pub insulin: Option<f64>,

    #[arg(long, help = "Body mass index (0-70)")]
    pub bmi: Option<f64>,

    #[arg(long, help = "Diabetes pedigree function (0-3)")]
    pub pedigree: Option<f64>,

    #[arg(long, help = "Age in years (1-120)")]
    pub age: Option<f64>,

    #[arg(
        long,
        allow_hyphen_values = true,
        conflicts_with_all = [
            "pregnancies", "glucose", "blood_pressure", "skin_thickness",
            "insulin", "bmi", "pedigree", "age",
        ],
        help = "All eight values in layout order, comma or space separated"
    )]
    pub values: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl PredictArgs {
    /// Form with unset fields at their defaults
    pub fn form(&self) -> FormInput {
        let d = FormInput::default();
        FormInput {
            pregnancies: self.pregnancies.unwrap_or(d.pregnancies),
            glucose: self.glucose.unwrap_or(d.glucose),
            blood_pressure: self.blood_pressure.unwrap_or(d.blood_pressure),
            skin_thickness: self.skin_thickness.unwrap_or(d.skin_thickness),
            insulin: self.insulin.unwrap_or(d.insulin),
            bmi: self.bmi.unwrap_or(d.bmi),
            diabetes_pedigree_function: self.pedigree.unwrap_or(d.diabetes_pedigree_function),
            age: self.age.unwrap_or(d.age),
        }
    }
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[arg(long, default_value_t = false, help = "Print one JSON report per line")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct JsonArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
