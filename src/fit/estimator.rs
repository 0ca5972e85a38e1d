//! `DefaultEstimator`: RFMS proxy labels, the risk tree, and WoE bins.
//!
//! The estimator owns an immutable `EstimatorConfig` plus two pieces of fitted
//! state:
//! - the risk tree (written by `fit_rfms`, read by `predict_risk`)
//! - the bin edges (written by `fit_bins`, read by `apply_bins`)
//!
//! `transform` keeps the refit-on-every-call behavior: it learns fresh edges
//! from whatever matrix it is given. Use `fit_bins` + `apply_bins` to score new
//! data against edges learned on training data.

use tracing::info;

use crate::domain::{BinEdges, EstimatorConfig, EstimatorFile, FeatureMatrix, Label, ScoredRecord, WoeTable};
use crate::error::EstimatorError;
use crate::fit::label::{label, label_as_int};
use crate::fit::score::aggregate_score;
use crate::fit::woe::{WoeBinner, bin_index};
use crate::models::RiskClassifier;

/// Tool name recorded in saved estimator files.
pub const TOOL_NAME: &str = "rfms";

#[derive(Debug, Clone)]
pub struct DefaultEstimator {
    config: EstimatorConfig,
    classifier: RiskClassifier,
    binner: WoeBinner,
    bin_edges: Option<BinEdges>,
    feature_names: Vec<String>,
}

impl DefaultEstimator {
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        config.validate()?;
        Ok(Self {
            classifier: RiskClassifier::from_config(&config),
            binner: WoeBinner::from_config(&config),
            config,
            bin_edges: None,
            feature_names: Vec::new(),
        })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn bin_edges(&self) -> Option<&BinEdges> {
        self.bin_edges.as_ref()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Train the risk tree to reproduce the proxy label from raw features.
    ///
    /// The target is `mean(row) < threshold` over the same matrix.
    pub fn fit_rfms(&mut self, matrix: &FeatureMatrix) -> Result<(), EstimatorError> {
        let scores = aggregate_score(matrix)?;
        let targets = label_as_int(&scores, self.config.threshold);
        self.classifier.fit(matrix, &targets)?;
        self.feature_names = matrix.names().to_vec();

        let n_bad = targets.iter().filter(|&&t| t == 1).count();
        info!(
            records = matrix.nrows(),
            features = matrix.ncols(),
            proxy_bad = n_bad,
            threshold = self.config.threshold,
            "RFMS risk model fitted"
        );
        Ok(())
    }

    /// Predicted risk class per record (`1 == Bad`).
    pub fn predict_risk(&self, matrix: &FeatureMatrix) -> Result<Vec<u8>, EstimatorError> {
        self.classifier.predict(matrix)
    }

    /// Probability of the `Bad` class per record.
    pub fn predict_risk_proba(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, EstimatorError> {
        self.classifier.predict_proba(matrix)
    }

    /// Proxy labels from the RFMS score of each record.
    pub fn assign_labels(&self, matrix: &FeatureMatrix) -> Result<Vec<Label>, EstimatorError> {
        let scores = aggregate_score(matrix)?;
        Ok(label(&scores, self.config.threshold))
    }

    /// WoE of the RFMS score against caller-supplied default flags.
    pub fn compute_woe(&self, matrix: &FeatureMatrix, targets: &[u8]) -> Result<WoeTable, EstimatorError> {
        let scores = aggregate_score(matrix)?;
        self.binner.compute_woe(&scores, targets)
    }

    /// Score → proxy label → default flag → WoE, fitting bin edges on `matrix`
    /// itself every call.
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<WoeTable, EstimatorError> {
        let scores = aggregate_score(matrix)?;
        let targets = label_as_int(&scores, self.config.threshold);
        self.binner.compute_woe(&scores, &targets)
    }

    /// Learn bin edges from the RFMS scores of a training matrix.
    pub fn fit_bins(&mut self, matrix: &FeatureMatrix) -> Result<&BinEdges, EstimatorError> {
        let scores = aggregate_score(matrix)?;
        let edges = self.binner.fit_bins(&scores)?;
        Ok(self.bin_edges.insert(edges))
    }

    /// WoE of `matrix` against the previously fitted edges, using proxy labels.
    pub fn apply_bins(&self, matrix: &FeatureMatrix) -> Result<WoeTable, EstimatorError> {
        let edges = self.bin_edges.as_ref().ok_or(EstimatorError::BinsNotFitted)?;
        let scores = aggregate_score(matrix)?;
        let targets = label_as_int(&scores, self.config.threshold);
        self.binner.apply_bins(edges, &scores, &targets)
    }

    /// Fit both the risk tree and the bin edges; returns the training WoE table.
    ///
    /// Fitted state is replaced only when every step succeeds.
    pub fn fit(&mut self, matrix: &FeatureMatrix) -> Result<WoeTable, EstimatorError> {
        let scores = aggregate_score(matrix)?;
        let targets = label_as_int(&scores, self.config.threshold);

        let mut classifier = RiskClassifier::from_config(&self.config);
        classifier.fit(matrix, &targets)?;
        let edges = self.binner.fit_bins(&scores)?;
        let table = self.binner.apply_bins(&edges, &scores, &targets)?;

        self.classifier = classifier;
        self.bin_edges = Some(edges);
        self.feature_names = matrix.names().to_vec();
        info!(
            records = matrix.nrows(),
            features = matrix.ncols(),
            proxy_bad = targets.iter().filter(|&&t| t == 1).count(),
            bins = table.actual_bin_count,
            "RFMS estimator fitted"
        );
        Ok(table)
    }

    /// Score, proxy label, predicted class and WoE bin for every record.
    ///
    /// WoE values come from `reference`, a table built on the fitted edges.
    pub fn score_records(
        &self,
        matrix: &FeatureMatrix,
        reference: &WoeTable,
    ) -> Result<Vec<ScoredRecord>, EstimatorError> {
        let predicted = self.predict_risk(matrix)?;
        let p_bad = self.predict_risk_proba(matrix)?;
        let edges = self.bin_edges.as_ref().ok_or(EstimatorError::BinsNotFitted)?;
        let scores = aggregate_score(matrix)?;

        Ok(scores
            .iter()
            .enumerate()
            .map(|(i, &score)| {
                let bin = bin_index(edges, score);
                ScoredRecord {
                    score,
                    label: Label::from_score(score, self.config.threshold),
                    predicted: predicted[i],
                    p_bad: p_bad[i],
                    bin,
                    woe: bin.and_then(|b| reference.bins.get(b)).map(|s| s.woe),
                }
            })
            .collect())
    }

    /// Snapshot of config and fitted state for persistence.
    pub fn to_file(&self) -> Result<EstimatorFile, EstimatorError> {
        let tree = self.classifier.tree().ok_or(EstimatorError::ModelNotFitted)?;
        let bin_edges = self.bin_edges.as_ref().ok_or(EstimatorError::BinsNotFitted)?;
        Ok(EstimatorFile {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config: self.config,
            feature_names: self.feature_names.clone(),
            tree: tree.clone(),
            bin_edges: bin_edges.clone(),
        })
    }

    /// Rebuild a fitted estimator from a saved file, validating every part.
    pub fn from_file(file: EstimatorFile) -> Result<Self, EstimatorError> {
        let mut estimator = Self::new(file.config)?;
        if file.feature_names.len() != file.tree.n_features {
            return Err(EstimatorError::invalid(format!(
                "saved file lists {} feature names for a tree over {} features",
                file.feature_names.len(),
                file.tree.n_features
            )));
        }
        validate_edges(&file.bin_edges)?;
        estimator.classifier = RiskClassifier::from_tree(file.tree, &file.config)?;
        estimator.bin_edges = Some(file.bin_edges);
        estimator.feature_names = file.feature_names;
        Ok(estimator)
    }
}

fn validate_edges(edges: &BinEdges) -> Result<(), EstimatorError> {
    if edges.edges.is_empty() {
        return Err(EstimatorError::invalid("saved bin edges are empty"));
    }
    if edges.requested_bins == 0 {
        return Err(EstimatorError::invalid("saved bin edges request zero bins"));
    }
    if edges.edges.iter().any(|e| !e.is_finite()) {
        return Err(EstimatorError::invalid("saved bin edges must be finite"));
    }
    if edges.edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(EstimatorError::invalid("saved bin edges must be strictly increasing"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeNode;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    fn uniform_matrix(n: usize, cols: usize, seed: u64) -> FeatureMatrix {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|_| (0..cols).map(|_| rng.gen_range(0.0..1.0)).collect())
            .collect();
        FeatureMatrix::from_rows(&rows).unwrap()
    }

    fn training_matrix(n: usize, seed: u64) -> FeatureMatrix {
        uniform_matrix(n, 4, seed)
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = EstimatorConfig {
            smoothing: 0.0,
            ..EstimatorConfig::default()
        };
        assert!(DefaultEstimator::new(cfg).is_err());
    }

    #[test]
    fn predict_risk_requires_fit() {
        let est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let x = training_matrix(10, 1);
        assert_eq!(est.predict_risk(&x), Err(EstimatorError::ModelNotFitted));
    }

    #[test]
    fn apply_bins_requires_fit_bins() {
        let est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let x = training_matrix(10, 1);
        assert_eq!(est.apply_bins(&x), Err(EstimatorError::BinsNotFitted));
    }

    #[test]
    fn tree_learns_most_of_the_proxy_rule() {
        let x = uniform_matrix(400, 2, 5);
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        est.fit_rfms(&x).unwrap();

        let expected: Vec<u8> = est.assign_labels(&x).unwrap().into_iter().map(Label::as_int).collect();
        let predicted = est.predict_risk(&x).unwrap();
        let agree = expected.iter().zip(&predicted).filter(|(a, b)| a == b).count();
        // Axis-aligned splits only approximate the diagonal `x0 + x1 < 1` boundary.
        assert!(agree as f64 / expected.len() as f64 > 0.8, "agreement {agree}/400");
    }

    #[test]
    fn transform_matches_compute_woe_on_proxy_labels() {
        let x = training_matrix(100, 9);
        let est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let labels = est.assign_labels(&x).unwrap();
        let y: Vec<u8> = labels.into_iter().map(Label::as_int).collect();
        assert_eq!(est.transform(&x).unwrap(), est.compute_woe(&x, &y).unwrap());
    }

    #[test]
    fn transform_refits_edges_per_call() {
        let est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let a = est.transform(&training_matrix(50, 1)).unwrap();
        let b = est.transform(&training_matrix(50, 2)).unwrap();
        assert_ne!(a.edges, b.edges);
    }

    #[test]
    fn apply_bins_keeps_training_edges() {
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let train = training_matrix(200, 3);
        let edges = est.fit_bins(&train).unwrap().clone();

        let fresh = training_matrix(60, 4);
        let table = est.apply_bins(&fresh).unwrap();
        assert_eq!(table.edges, edges);
        assert_eq!(table.bins.iter().map(|b| b.count).sum::<usize>(), 60);
    }

    #[test]
    fn file_round_trip_preserves_predictions() {
        let x = training_matrix(120, 8);
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let table = est.fit(&x).unwrap();

        let restored = DefaultEstimator::from_file(est.to_file().unwrap()).unwrap();
        assert_eq!(restored.predict_risk(&x).unwrap(), est.predict_risk(&x).unwrap());
        assert_eq!(restored.apply_bins(&x).unwrap(), table);
    }

    #[test]
    fn to_file_requires_fitted_state() {
        let est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        assert_eq!(est.to_file(), Err(EstimatorError::ModelNotFitted));
    }

    #[test]
    fn from_file_rejects_unsorted_edges() {
        let x = training_matrix(50, 2);
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        est.fit(&x).unwrap();
        let mut file = est.to_file().unwrap();
        file.bin_edges.edges = vec![0.5, 0.2];
        assert!(DefaultEstimator::from_file(file).is_err());
    }

    #[test]
    fn failed_refit_keeps_previous_state() {
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        est.fit(&training_matrix(40, 1)).unwrap();
        let before = est.to_file().unwrap();

        // An all-NaN column makes every score NaN, so binning has nothing to cut.
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![f64::NAN, i as f64]).collect();
        let nan_scores = FeatureMatrix::from_rows(&rows).unwrap();
        assert!(matches!(est.fit(&nan_scores), Err(EstimatorError::InvalidInput(_))));

        assert_eq!(est.to_file().unwrap(), before);
        assert_eq!(est.feature_names().len(), 4);
    }

    #[test]
    fn from_file_rejects_out_of_range_leaf() {
        let x = training_matrix(50, 2);
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        est.fit(&x).unwrap();
        let mut file = est.to_file().unwrap();
        file.tree.nodes = vec![TreeNode::Leaf {
            class: 7,
            p_bad: f64::NAN,
            n_samples: 2,
        }];
        assert!(matches!(DefaultEstimator::from_file(file), Err(EstimatorError::InvalidInput(_))));
    }

    #[test]
    fn from_file_rejects_zero_requested_bins() {
        let x = training_matrix(50, 2);
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        est.fit(&x).unwrap();
        let mut file = est.to_file().unwrap();
        file.bin_edges.requested_bins = 0;
        assert!(DefaultEstimator::from_file(file).is_err());
    }

    #[test]
    fn score_records_attach_bin_woe() {
        let x = training_matrix(80, 6);
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let table = est.fit(&x).unwrap();
        let scored = est.score_records(&x, &table).unwrap();
        assert_eq!(scored.len(), 80);
        for r in &scored {
            let bin = r.bin.unwrap();
            assert_eq!(r.woe, Some(table.bins[bin].woe));
            assert_eq!(r.label, Label::from_score(r.score, 0.5));
        }
    }
}
