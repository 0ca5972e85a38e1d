//! Command-line parsing for the RFMS proxy credit-risk tool.
//!
//! The goal of this module is to keep **argument parsing** separate from
//! command dispatch (`app`) and the scoring code (`fit`, `models`).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_MAX_BINS, DEFAULT_MAX_DEPTH, DEFAULT_MIN_SAMPLES_SPLIT, DEFAULT_SMOOTHING, DEFAULT_THRESHOLD,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rfms", version, about = "RFMS proxy credit-risk scoring with WoE binning")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a synthetic transaction CSV.
    Sample(SampleArgs),
    /// Engineer a numeric feature CSV from a transaction CSV.
    Features(FeaturesArgs),
    /// Print the WoE table of the RFMS score, refitting bins on the given file.
    Woe(WoeArgs),
    /// Fit the risk tree and WoE bin edges, print a summary, save the model.
    Fit(FitArgs),
    /// Score a feature CSV with a saved model.
    Predict(PredictArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Number of transactions to generate.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Number of distinct customers.
    #[arg(long, default_value_t = 100)]
    pub customers: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct FeaturesArgs {
    /// Transaction CSV (Xente schema).
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Output feature CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,
}

/// Estimator settings shared by `woe` and `fit`.
#[derive(Debug, Args, Clone)]
pub struct EstimatorArgs {
    /// RFMS scores below this value are labelled Bad.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Number of quantile bins requested for WoE.
    #[arg(long, default_value_t = DEFAULT_MAX_BINS)]
    pub max_bins: usize,

    /// Additive smoothing in the WoE log ratio.
    #[arg(long, default_value_t = DEFAULT_SMOOTHING)]
    pub smoothing: f64,

    /// Maximum depth of the risk tree.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Minimum node size eligible for a split.
    #[arg(long, default_value_t = DEFAULT_MIN_SAMPLES_SPLIT)]
    pub min_samples_split: usize,
}

#[derive(Debug, Args, Clone)]
pub struct WoeArgs {
    /// Feature CSV (every column numeric).
    #[arg(short, long, value_name = "CSV")]
    pub features: PathBuf,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    /// Export the WoE table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Feature CSV (every column numeric).
    #[arg(short, long, value_name = "CSV")]
    pub features: PathBuf,

    #[command(flatten)]
    pub estimator: EstimatorArgs,

    /// Write the fitted estimator to JSON.
    #[arg(long = "model-out", value_name = "JSON")]
    pub model_out: Option<PathBuf>,

    /// Export the training WoE table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Print the fitted tree.
    #[arg(long)]
    pub show_tree: bool,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    /// Estimator JSON produced by `rfms fit --model-out`.
    #[arg(short, long, value_name = "JSON")]
    pub model: PathBuf,

    /// Feature CSV with the same columns the model was fitted on.
    #[arg(short, long, value_name = "CSV")]
    pub features: PathBuf,

    /// Export per-record predictions to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
