//! TestScope - environmental test risk scoring CLI
//!
//! Scores a set of test conditions (temperature, humidity, vibration,
//! pressure) two ways: the deterministic per-factor rule and a trained
//! PASS/FAIL classifier.
//!
//! # Subcommands
//!
//! - `factors`: rule-based factors, risk level and bounds warnings
//! - `predict`: classifier prediction (trains a model on first use)
//! - `assess`: both of the above plus recommendations
//! - `train`: run the model selection pipeline and save the winner
//! - `tune`: grid search for one model type
//! - `export`: write synthetic samples to CSV or Parquet
//! - `scenarios` / `standards`: reference presets and standards
//!
//! Logs go to stderr (`RUST_LOG` overrides the `info` default); results go
//! to stdout, as JSON with `--json`.

mod config;
mod context;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use datagen::SyntheticDataGenerator;
use risk::{RiskLevel, recommendations};
use serde::Serialize;
use storage::ExportFormat;
use tracing::info;
use training::ModelTrainer;
use types::{ModelType, RiskFactors, STANDARDS, TestParameters};

use crate::config::AppConfig;
use crate::context::RiskContext;

/// TestScope - environmental test risk scoring
#[derive(Parser, Debug)]
#[command(name = "testscope")]
#[command(about = "Risk scoring for environmental equipment tests")]
#[command(version)]
struct Cli {
    /// Saved model bundle
    #[arg(long, global = true, env = "TESTSCOPE_MODEL_PATH")]
    model_path: Option<PathBuf>,

    /// Training report path
    #[arg(long, global = true, env = "TESTSCOPE_REPORT_PATH")]
    report_path: Option<PathBuf>,

    /// Do not write a training report
    #[arg(long, global = true)]
    no_report: bool,

    /// Seed for data generation and training
    #[arg(long, global = true, env = "TESTSCOPE_SEED")]
    seed: Option<u64>,

    /// Number of synthetic samples to generate
    #[arg(long, global = true, env = "TESTSCOPE_SAMPLES")]
    samples: Option<usize>,

    /// Label noise standard deviation for generated data
    #[arg(long, global = true, env = "TESTSCOPE_NOISE_STD")]
    noise_std: Option<f64>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Test conditions.
#[derive(Args, Debug, Clone, Copy)]
struct ParamArgs {
    /// Temperature in °C
    #[arg(long, default_value_t = 25.0, allow_negative_numbers = true)]
    temperature: f64,

    /// Relative humidity in %
    #[arg(long, default_value_t = 50.0)]
    humidity: f64,

    /// Vibration in g
    #[arg(long, default_value_t = 5.0)]
    vibration: f64,

    /// Pressure in hPa
    #[arg(long, default_value_t = 1013.0)]
    pressure: f64,
}

impl From<ParamArgs> for TestParameters {
    fn from(a: ParamArgs) -> Self {
        TestParameters::new(a.temperature, a.humidity, a.vibration, a.pressure)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rule-based risk factors for a parameter set
    Factors(ParamArgs),
    /// Classifier prediction for a parameter set
    Predict(ParamArgs),
    /// Rule factors, model prediction and recommendations
    Assess(ParamArgs),
    /// Train every model type, keep the best and save it
    Train,
    /// Grid-search hyperparameters for one model type
    Tune {
        /// random_forest or logistic_regression
        #[arg(long, default_value = "random_forest")]
        model_type: ModelType,

        /// Save the tuned model here (never to the model path implicitly)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write synthetic labeled samples to a file
    Export {
        /// Output file
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// csv or parquet (default: from the file extension)
        #[arg(long)]
        format: Option<ExportFormat>,
    },
    /// Preset scenarios for a standard
    Scenarios {
        /// MIL-STD-810, ISO 16750 or IEC 60068
        #[arg(long, default_value = "MIL-STD-810")]
        standard: String,
    },
    /// Standards in scope
    Standards,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = app_config(&cli);
    let json = cli.json;

    match cli.command {
        Commands::Factors(args) => run_factors(args.into(), json),
        Commands::Predict(args) => run_predict(&config, args.into(), json),
        Commands::Assess(args) => run_assess(&config, args.into(), json),
        Commands::Train => run_train(&config, json),
        Commands::Tune { model_type, output } => run_tune(&config, model_type, output, json),
        Commands::Export { output, format } => run_export(&config, output, format, json),
        Commands::Scenarios { standard } => run_scenarios(&standard, json),
        Commands::Standards => run_standards(json),
    }
}

fn app_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(path) = &cli.model_path {
        config = config.model_path(path.clone());
    }
    if let Some(path) = &cli.report_path {
        config = config.report_path(Some(path.clone()));
    }
    if cli.no_report {
        config = config.report_path(None);
    }
    if let Some(seed) = cli.seed {
        config = config.seed(seed);
    }
    if let Some(n) = cli.samples {
        config = config.samples(n);
    }
    if let Some(noise) = cli.noise_std {
        config = config.noise_std(noise);
    }
    config
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_factors(factors: &RiskFactors) {
    println!("  Temperature risk: {:.3}", factors.temperature_risk);
    println!("  Humidity risk:    {:.3}", factors.humidity_risk);
    println!("  Vibration risk:   {:.3}", factors.vibration_risk);
    println!("  Pressure risk:    {:.3}", factors.pressure_risk);
    println!("  Total risk:       {:.3}", factors.total_risk);
}

// ============================================================================
// Rule-based scoring
// ============================================================================

fn run_factors(params: TestParameters, json: bool) -> anyhow::Result<()> {
    let assessment = risk::assess(&params);
    assessment.validation.log();
    if json {
        return print_json(&assessment);
    }

    println!("Parameters: {}", params);
    print_factors(&assessment.factors);
    println!("Risk level: {}", assessment.level);
    for message in assessment.validation.messages() {
        println!("Warning: {}", message);
    }
    Ok(())
}

// ============================================================================
// Model-based scoring
// ============================================================================

fn run_predict(config: &AppConfig, params: TestParameters, json: bool) -> anyhow::Result<()> {
    let ctx = RiskContext::load_or_train(config)?;
    let prediction = ctx.predict(&params)?;
    if json {
        return print_json(&prediction);
    }

    let info = ctx.model_info();
    println!("Model: {}", info.model_type);
    if let Some(metrics) = info.metrics {
        println!("  {}", metrics);
    }
    println!("Parameters: {}", params);
    println!("Prediction: {}", prediction.prediction);
    println!(
        "Risk score: {:.3} ({})",
        prediction.risk_score,
        RiskLevel::from_score(prediction.risk_score)
    );
    println!("Confidence: {:.3}", prediction.confidence);
    println!("Feature importance:");
    for (name, importance) in ctx.feature_importance()? {
        println!("  {:<12} {:.4}", name, importance);
    }
    Ok(())
}

fn run_assess(config: &AppConfig, params: TestParameters, json: bool) -> anyhow::Result<()> {
    let ctx = RiskContext::load_or_train(config)?;
    let assessment = ctx.assess(&params)?;
    if json {
        return print_json(&assessment);
    }

    println!("Parameters: {}", params);
    println!("Rule-based factors ({}):", assessment.rules.level);
    print_factors(&assessment.rules.factors);
    println!(
        "Model: {} (risk {:.3}, {}, confidence {:.3})",
        assessment.prediction.prediction,
        assessment.prediction.risk_score,
        assessment.model_level,
        assessment.prediction.confidence
    );
    for message in assessment.rules.validation.messages() {
        println!("Warning: {}", message);
    }
    println!("Recommendations:");
    for line in assessment.recommendations {
        println!("  - {}", line);
    }
    Ok(())
}

// ============================================================================
// Training
// ============================================================================

fn run_train(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let mut trainer = ModelTrainer::new(config.trainer_config());
    let outcome = trainer
        .full_training_pipeline(config.n_samples)
        .context("training pipeline failed")?;
    if json {
        return print_json(&outcome.results);
    }
    println!("{}", outcome.report);
    println!();
    println!("Saved {} to {}", outcome.best.model_type(), config.model_path.display());
    Ok(())
}

#[derive(Serialize)]
struct TuneSummary {
    model_type: ModelType,
    best_params: String,
    best_score: f64,
    candidates: usize,
    saved_to: Option<PathBuf>,
}

fn run_tune(
    config: &AppConfig,
    model_type: ModelType,
    output: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    let mut trainer = ModelTrainer::new(config.trainer_config());
    let outcome = trainer
        .tune(config.n_samples, model_type)
        .with_context(|| format!("grid search for {} failed", model_type))?;

    if let Some(path) = &output {
        outcome
            .classifier
            .save(path)
            .with_context(|| format!("saving tuned model to {}", path.display()))?;
        info!(path = %path.display(), "Saved tuned model");
    }

    let summary = TuneSummary {
        model_type,
        best_params: outcome.best_spec.describe(),
        best_score: outcome.best_score,
        candidates: outcome.scores.len(),
        saved_to: output,
    };
    if json {
        return print_json(&summary);
    }
    println!("Model: {}", summary.model_type);
    println!("Candidates: {}", summary.candidates);
    println!("Best parameters: {}", summary.best_params);
    println!("Best weighted F1 (5-fold CV): {:.3}", summary.best_score);
    if let Some(path) = &summary.saved_to {
        println!("Saved to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// Export and reference data
// ============================================================================

fn run_export(
    config: &AppConfig,
    output: PathBuf,
    format: Option<ExportFormat>,
    json: bool,
) -> anyhow::Result<()> {
    let format = format.unwrap_or_else(|| ExportFormat::from_path(&output));
    let mut generator = SyntheticDataGenerator::new(config.generator_config(), config.seed);
    let samples = generator.generate(config.n_samples);
    let rows = storage::export_samples(&output, &samples, format)
        .with_context(|| format!("exporting to {}", output.display()))?;
    info!(rows, %format, path = %output.display(), "Exported samples");

    let summary = datagen::summarize(&samples);
    if json {
        return print_json(&summary);
    }
    println!("Wrote {} rows ({}) to {}", rows, format, output.display());
    println!(
        "PASS: {} | FAIL: {} | pass rate {:.1}%",
        summary.pass_count, summary.fail_count, summary.pass_rate
    );
    for (category, count) in &summary.category_distribution {
        println!("  {:<12} {}", category, count);
    }
    if let Some(risk) = summary.risk {
        println!(
            "Risk score: mean {:.3}, median {:.3}, std {:.3}, range [{:.3}, {:.3}]",
            risk.mean, risk.median, risk.std, risk.min, risk.max
        );
    }
    if let Some(duration) = summary.duration {
        println!(
            "Duration: mean {:.0} min, median {:.0} min, total {:.1} h",
            duration.mean, duration.median, duration.total_hours
        );
    }
    Ok(())
}

fn run_scenarios(standard: &str, json: bool) -> anyhow::Result<()> {
    let presets = risk::scenarios(standard);
    if json {
        return print_json(&presets);
    }
    for scenario in presets {
        let factors = scenario.risk_factors();
        println!(
            "{} {} - {} ({} h)",
            scenario.standard, scenario.method, scenario.name, scenario.duration_hours
        );
        println!("  {}", scenario.parameters);
        println!(
            "  total risk {:.3} ({})",
            factors.total_risk,
            RiskLevel::from_score(factors.total_risk)
        );
        if let Some(first) = recommendations(factors.total_risk).first() {
            println!("  {}", first);
        }
    }
    Ok(())
}

fn run_standards(json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&STANDARDS);
    }
    for standard in STANDARDS {
        println!("{}: {}", standard.name, standard.description);
        for (id, description) in standard.methods {
            println!("  {:<16} {}", id, description);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_predict_args() {
        let cli = Cli::try_parse_from([
            "testscope",
            "--seed",
            "7",
            "predict",
            "--temperature",
            "-35",
            "--humidity",
            "90",
        ])
        .unwrap();
        let config = app_config(&cli);
        assert_eq!(config.seed, 7);
        match cli.command {
            Commands::Predict(args) => {
                let params: TestParameters = args.into();
                assert_eq!(params, TestParameters::new(-35.0, 90.0, 5.0, 1013.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_tune_model_type() {
        let cli = Cli::try_parse_from(["testscope", "tune", "--model-type", "logistic_regression"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tune {
                model_type: ModelType::LogisticRegression,
                output: None
            }
        ));
        assert!(Cli::try_parse_from(["testscope", "tune", "--model-type", "svm"]).is_err());
    }

    #[test]
    fn test_no_report_flag() {
        let cli = Cli::try_parse_from(["testscope", "train", "--no-report"]).unwrap();
        assert!(app_config(&cli).report_path.is_none());
    }
}
