//! Pipelines behind each CLI command.
//!
//! Each `run_*` does the work and returns its outputs; `app` only prints and
//! exports. Keeping the workflows here means they can be tested without a
//! process boundary:
//!
//! transactions -> features -> RFMS score -> proxy label -> tree + WoE bins

use std::path::Path;

use tracing::{info, warn};

use crate::data::{SampleConfig, generate_transactions};
use crate::domain::{RunConfig, ScoredRecord, WoeTable};
use crate::error::AppError;
use crate::features::{EngineeredFeatures, build_feature_matrix};
use crate::fit::DefaultEstimator;
use crate::io::export::{write_features_csv, write_transactions_csv};
use crate::io::ingest::{IngestedFeatures, IngestedTransactions, read_features_csv, read_transactions_csv};
use crate::io::model::read_estimator_json;
use crate::report::{LabelCounts, PredictionSummary, count_labels, summarize_predictions};

/// Outputs of `rfms features`.
#[derive(Debug, Clone)]
pub struct FeaturesOutput {
    pub ingest: IngestedTransactions,
    pub features: EngineeredFeatures,
}

/// Outputs of `rfms woe`.
#[derive(Debug, Clone)]
pub struct WoeOutput {
    pub ingest: IngestedFeatures,
    pub table: WoeTable,
    pub labels: LabelCounts,
}

/// Outputs of `rfms fit`.
#[derive(Debug, Clone)]
pub struct FitOutput {
    pub ingest: IngestedFeatures,
    pub estimator: DefaultEstimator,
    /// WoE of the training data on the fitted edges.
    pub table: WoeTable,
    pub labels: LabelCounts,
}

/// Outputs of `rfms predict`.
#[derive(Debug, Clone)]
pub struct PredictOutput {
    pub ingest: IngestedFeatures,
    pub estimator: DefaultEstimator,
    /// WoE of the scored data on the saved edges.
    pub table: WoeTable,
    pub records: Vec<ScoredRecord>,
    pub summary: PredictionSummary,
}

/// Generate synthetic transactions and write them; returns the row count.
pub fn run_sample(config: &SampleConfig, output: &Path) -> Result<usize, AppError> {
    let transactions = generate_transactions(config)?;
    write_transactions_csv(output, &transactions)?;
    info!(count = transactions.len(), seed = config.seed, "Synthetic transactions written");
    Ok(transactions.len())
}

pub fn run_features(input: &Path, output: &Path) -> Result<FeaturesOutput, AppError> {
    let ingest = read_transactions_csv(input)?;
    let features = build_feature_matrix(&ingest.transactions)?;
    write_features_csv(output, &features.matrix)?;
    info!(
        rows = features.matrix.nrows(),
        features = features.matrix.ncols(),
        "Feature matrix written"
    );
    Ok(FeaturesOutput { ingest, features })
}

/// Refit bins on the given file and compute WoE against proxy labels.
pub fn run_woe(config: &RunConfig) -> Result<WoeOutput, AppError> {
    let ingest = read_features_csv(&config.features_path)?;
    let estimator = DefaultEstimator::new(config.estimator)?;
    let table = estimator.transform(&ingest.matrix)?;
    let labels = count_labels(&estimator.assign_labels(&ingest.matrix)?);
    Ok(WoeOutput { ingest, table, labels })
}

pub fn run_fit(config: &RunConfig) -> Result<FitOutput, AppError> {
    let ingest = read_features_csv(&config.features_path)?;
    let mut estimator = DefaultEstimator::new(config.estimator)?;
    let table = estimator.fit(&ingest.matrix)?;
    let labels = count_labels(&estimator.assign_labels(&ingest.matrix)?);
    Ok(FitOutput {
        ingest,
        estimator,
        table,
        labels,
    })
}

/// Score a feature file with a saved estimator.
pub fn run_predict(model: &Path, features: &Path) -> Result<PredictOutput, AppError> {
    let estimator = read_estimator_json(model)?;
    let ingest = read_features_csv(features)?;

    if ingest.matrix.names() != estimator.feature_names() {
        warn!(
            expected = estimator.feature_names().len(),
            found = ingest.matrix.ncols(),
            "Feature columns differ from the ones the model was fitted on"
        );
    }

    let table = estimator.apply_bins(&ingest.matrix)?;
    let records = estimator.score_records(&ingest.matrix, &table)?;
    let summary = summarize_predictions(&records);
    Ok(PredictOutput {
        ingest,
        estimator,
        table,
        records,
        summary,
    })
}
