//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the log subscriber
//! - parses CLI arguments
//! - runs the requested pipeline
//! - prints reports and writes optional exports

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, EstimatorArgs, FeaturesArgs, FitArgs, PredictArgs, SampleArgs, WoeArgs};
use crate::data::SampleConfig;
use crate::domain::{EstimatorConfig, RunConfig};
use crate::error::AppError;

pub mod pipeline;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_DIRECTIVE: &str = "rfms_risk=info";

/// Entry point for the `rfms` binary.
pub fn run() -> Result<(), AppError> {
    // Load .env if present (RUST_LOG may be set there).
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Sample(args) => handle_sample(args),
        Command::Features(args) => handle_features(args),
        Command::Woe(args) => handle_woe(args),
        Command::Fit(args) => handle_fit(args),
        Command::Predict(args) => handle_predict(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    // Logs go to stderr; stdout carries the reports.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        count: args.count,
        customers: args.customers,
        seed: args.seed,
    };
    let written = pipeline::run_sample(&config, &args.output)?;
    println!("Wrote {written} transactions to {}", args.output.display());
    Ok(())
}

fn handle_features(args: FeaturesArgs) -> Result<(), AppError> {
    let out = pipeline::run_features(&args.input, &args.output)?;
    println!(
        "Wrote {} rows x {} features to {}",
        out.features.matrix.nrows(),
        out.features.matrix.ncols(),
        args.output.display()
    );
    if !out.ingest.row_errors.is_empty() {
        println!("Skipped {} malformed rows.", out.ingest.row_errors.len());
    }
    Ok(())
}

fn handle_woe(args: WoeArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.estimator, &args.features, args.export.clone(), None);
    let run = pipeline::run_woe(&config)?;

    println!("{}", crate::report::format_woe_table(&run.table, config.estimator.smoothing));

    if let Some(path) = &config.export_woe {
        crate::io::export::write_woe_csv(path, &run.table)?;
        info!(path = %path.display(), "WoE table exported");
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args.estimator, &args.features, args.export.clone(), args.model_out.clone());
    let run = pipeline::run_fit(&config)?;

    let tree = run
        .estimator
        .classifier()
        .tree()
        .ok_or_else(|| AppError::new(4, "Fitted estimator has no tree."))?;
    println!("{}", crate::report::format_fit_summary(&config.estimator, &run.labels, tree));
    if args.show_tree {
        println!("{}", crate::report::format_tree(tree, run.estimator.feature_names()));
    }
    println!("{}", crate::report::format_woe_table(&run.table, config.estimator.smoothing));

    if let Some(path) = &config.export_woe {
        crate::io::export::write_woe_csv(path, &run.table)?;
        info!(path = %path.display(), "WoE table exported");
    }
    if let Some(path) = &config.model_out {
        crate::io::model::write_estimator_json(path, &run.estimator)?;
        info!(path = %path.display(), "Estimator saved");
    }
    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let run = pipeline::run_predict(&args.model, &args.features)?;

    println!("{}", crate::report::format_prediction_summary(&run.summary));
    println!(
        "{}",
        crate::report::format_woe_table(&run.table, run.estimator.config().smoothing)
    );

    if let Some(path) = &args.export {
        crate::io::export::write_predictions_csv(path, &run.records)?;
        info!(path = %path.display(), "Predictions exported");
    }
    Ok(())
}

pub fn estimator_config_from_args(args: &EstimatorArgs) -> EstimatorConfig {
    EstimatorConfig {
        threshold: args.threshold,
        max_bins: args.max_bins,
        smoothing: args.smoothing,
        max_depth: args.max_depth,
        min_samples_split: args.min_samples_split,
    }
}

pub fn run_config_from_args(
    estimator: &EstimatorArgs,
    features: &std::path::Path,
    export_woe: Option<std::path::PathBuf>,
    model_out: Option<std::path::PathBuf>,
) -> RunConfig {
    RunConfig {
        estimator: estimator_config_from_args(estimator),
        features_path: features.to_path_buf(),
        export_woe,
        model_out,
    }
}
