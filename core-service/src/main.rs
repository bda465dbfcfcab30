//! Diabetes Risk - Main Entry Point
//!
//! Command-line form collector for the risk core.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use diabetes_risk_core::api::{self, commands};
use diabetes_risk_core::cli::{Cli, Commands};
use diabetes_risk_core::constants::{APP_NAME, APP_VERSION};
use diabetes_risk_core::logic::config::AppConfig;
use diabetes_risk_core::logic::features::FEATURE_LAYOUT;
use diabetes_risk_core::logic::pipeline::{PredictionReport, RiskService};
use diabetes_risk_core::logic::presenter::DisplayConfig;

const EXIT_CONFIG: u8 = 1;
const EXIT_UNAVAILABLE: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = AppConfig::resolve(&cli.global.overrides()).context("failed to resolve configuration")?;

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);
    log::debug!("Configuration: {:?}", config);

    match cli.command {
        Commands::Fields => {
            print_fields()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Verify(args) => {
            let report = commands::verify_artifacts(&config);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Model:  {} ... {}", report.model_path, outcome(Some(report.model_ok), &report.model_error));
                if let Some(sha) = &report.model_sha256 {
                    println!("        sha256 {}", sha);
                }
                if let Some(path) = &report.scaler_path {
                    println!("Scaler: {} ... {}", path, outcome(report.scaler_ok, &report.scaler_error));
                }
            }
            Ok(if report.is_ok() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_CONFIG) })
        }
        Commands::Status(args) => {
            let service = RiskService::start(&config);
            let status = commands::get_engine_status(&service);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!(
                    "Feature layout: v{} ({:08x}), {} features",
                    status.layout.version, status.layout.hash, status.layout.feature_count
                );
                match &status.model.disabled_reason {
                    None => println!(
                        "Model: {} from {}",
                        status.model.engine.as_deref().unwrap_or("unknown"),
                        status.model.model_path.as_deref().unwrap_or("-")
                    ),
                    Some(reason) => println!("Model: DISABLED ({})", reason),
                }
                println!(
                    "Normalizer: {}",
                    match (&status.normalizer.kind, &status.normalizer.error) {
                        (_, Some(err)) => format!("failed ({})", err),
                        (Some(kind), None) if status.normalizer.applied => format!("{} (applied)", kind),
                        (Some(kind), None) => format!("{} (not used by this model)", kind),
                        (None, None) => "not configured".to_string(),
                    }
                );
                println!("Risk bands: medium from {:.2}, high from {:.2}", status.bands.medium_from, status.bands.high_from);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Predict(args) => {
            let service = RiskService::start(&config);
            let result = match &args.values {
                Some(line) => commands::assess_line(&service, line),
                None => commands::assess(&service, &args.form()),
            };

            match result {
                Ok(report) => {
                    print_report(&config.display, &report, args.json)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(message) => {
                    eprintln!("{}", message);
                    Ok(ExitCode::from(EXIT_UNAVAILABLE))
                }
            }
        }
        Commands::Session(args) => {
            let service = RiskService::start(&config);
            run_session(&service, &config.display, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn outcome(ok: Option<bool>, error: &Option<String>) -> String {
    match (ok, error) {
        (Some(true), _) => "ok".to_string(),
        (_, Some(e)) => format!("FAILED: {}", e),
        _ => "FAILED".to_string(),
    }
}

fn print_fields() -> Result<()> {
    println!("{:<3} {:<28} {:>7} {:>7} {:>8}", "#", "field", "min", "max", "default");
    for (i, field) in api::list_fields().iter().enumerate() {
        println!(
            "{:<3} {:<28} {:>7} {:>7} {:>8}{}",
            i,
            field.name,
            field.min,
            field.max,
            field.default,
            if field.integer { "  (whole number)" } else { "" }
        );
    }
    Ok(())
}

fn print_report(display: &DisplayConfig, report: &PredictionReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&display.render_json(report))?);
    } else {
        println!("{}", display.render(report));
    }
    Ok(())
}

fn run_session(service: &RiskService, display: &DisplayConfig, json: bool) -> Result<()> {
    if let Some(reason) = service.disabled_reason() {
        eprintln!("Prediction is unavailable for this session: {}", reason);
    }
    eprintln!("Enter {} values per line ({}); 'quit' to exit.", FEATURE_LAYOUT.len(), FEATURE_LAYOUT.join(", "));

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        match commands::assess_line(service, line) {
            Ok(report) => print_report(display, &report, json)?,
            Err(message) if json => {
                println!("{}", serde_json::json!({ "error": message }));
            }
            Err(message) => println!("error: {}", message),
        }
        stdout.flush().context("failed to flush stdout")?;
    }

    let stats = service.stats();
    log::info!(
        "Session ended: {} assessed, {} failed, avg {:.3} ms",
        stats.inference_count(),
        stats.failure_count(),
        stats.avg_latency_ms()
    );
    Ok(())
}
