//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for scoring new feature files

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::EstimatorError;

/// Default good/bad decision boundary on the RFMS score.
pub const DEFAULT_THRESHOLD: f64 = 0.5;
/// Default number of quantile bins requested for WoE.
pub const DEFAULT_MAX_BINS: usize = 5;
/// Smoothing added to both WoE rates so pure bins stay finite.
pub const DEFAULT_SMOOTHING: f64 = 1e-5;
/// Depth bound of the risk classifier.
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;

/// Records × features, all numeric.
///
/// Shape is fixed at construction; ragged input is rejected. Empty and
/// zero-column matrices can be built, but every scoring operation rejects them
/// through [`FeatureMatrix::ensure_usable`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: DMatrix<f64>,
    names: Vec<String>,
}

impl FeatureMatrix {
    /// Build a matrix from row vectors. Columns are named `f0..fN`.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, EstimatorError> {
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        let names = (0..ncols).map(|j| format!("f{j}")).collect();
        Self::with_names(rows, names)
    }

    /// Build a matrix from row vectors with explicit column names.
    pub fn with_names(rows: &[Vec<f64>], names: Vec<String>) -> Result<Self, EstimatorError> {
        let ncols = names.len();
        let mut flat = Vec::with_capacity(rows.len() * ncols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(EstimatorError::invalid(format!(
                    "record {i} has {} values, expected {ncols}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }
        Ok(Self {
            values: DMatrix::from_row_slice(rows.len(), ncols, &flat),
            names,
        })
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[(row, col)]
    }

    /// Copy of record `i` in column order.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.values.row(i).iter().copied().collect()
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        self.values.column(j).iter().copied().collect()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Reject the shapes no operation can score: no records, or no columns.
    pub fn ensure_usable(&self) -> Result<(), EstimatorError> {
        if self.nrows() == 0 {
            return Err(EstimatorError::invalid("feature matrix has no records"));
        }
        if self.ncols() == 0 {
            return Err(EstimatorError::invalid("feature matrix has zero columns"));
        }
        Ok(())
    }
}

/// Proxy credit label derived from the RFMS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Good,
    Bad,
}

impl Label {
    /// `Bad` iff `score < threshold`.
    ///
    /// NaN scores compare false and are labelled `Good`.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score < threshold { Label::Bad } else { Label::Good }
    }

    /// Binary default indicator: `1` for `Bad`, `0` for `Good`.
    pub fn as_int(self) -> u8 {
        match self {
            Label::Good => 0,
            Label::Bad => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Good => "Good",
            Label::Bad => "Bad",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable estimator configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub threshold: f64,
    pub max_bins: usize,
    /// ε in `ln((good_rate + ε) / (bad_rate + ε))`.
    pub smoothing: f64,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_bins: DEFAULT_MAX_BINS,
            smoothing: DEFAULT_SMOOTHING,
            max_depth: DEFAULT_MAX_DEPTH,
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if !self.threshold.is_finite() {
            return Err(EstimatorError::invalid("threshold must be finite"));
        }
        if self.max_bins == 0 {
            return Err(EstimatorError::invalid("max_bins must be >= 1"));
        }
        if !(self.smoothing.is_finite() && self.smoothing > 0.0) {
            return Err(EstimatorError::invalid("smoothing must be finite and > 0"));
        }
        if self.max_depth == 0 {
            return Err(EstimatorError::invalid("max_depth must be >= 1"));
        }
        if self.min_samples_split < 2 {
            return Err(EstimatorError::invalid("min_samples_split must be >= 2"));
        }
        Ok(())
    }
}

/// A score interval. The first bin is `[lower, upper]`; every later bin is
/// `(lower, upper]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
}

impl Bin {
    pub fn contains(&self, score: f64) -> bool {
        if self.index == 0 {
            score >= self.lower && score <= self.upper
        } else {
            score > self.lower && score <= self.upper
        }
    }

    /// Interval in pandas-style notation, e.g. `[0.100, 0.300]` or `(0.300, 0.900]`.
    pub fn label(&self) -> String {
        let open = if self.index == 0 { '[' } else { '(' };
        format!("{open}{:.3}, {:.3}]", self.lower, self.upper)
    }
}

/// Per-bin aggregates and the WoE statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinStatistics {
    pub bin: Bin,
    pub count: usize,
    pub default_count: usize,
    pub non_default_count: usize,
    pub bad_rate: f64,
    pub good_rate: f64,
    pub woe: f64,
}

/// Fitted quantile edges, sorted and de-duplicated.
///
/// `n` distinct edges describe `n - 1` bins; a single edge describes one
/// degenerate bin `[v, v]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    pub edges: Vec<f64>,
    pub requested_bins: usize,
}

impl BinEdges {
    pub fn bin_count(&self) -> usize {
        match self.edges.len() {
            0 => 0,
            1 => 1,
            n => n - 1,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.edges.len() == 1
    }

    pub fn bins(&self) -> Vec<Bin> {
        if self.edges.len() == 1 {
            let v = self.edges[0];
            return vec![Bin { index: 0, lower: v, upper: v }];
        }
        self.edges
            .windows(2)
            .enumerate()
            .map(|(index, w)| Bin {
                index,
                lower: w[0],
                upper: w[1],
            })
            .collect()
    }
}

/// Non-fatal conditions surfaced alongside a WoE table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WoeWarning {
    /// Every finite score was identical, so binning collapsed to one bin with
    /// no discriminative value.
    DegenerateBinning,
    /// Duplicate quantile edges were dropped; fewer bins than requested.
    ReducedBinCount,
}

impl WoeWarning {
    pub fn describe(self) -> &'static str {
        match self {
            WoeWarning::DegenerateBinning => "degenerate binning: all scores identical, single bin",
            WoeWarning::ReducedBinCount => "duplicate quantile edges dropped, fewer bins than requested",
        }
    }
}

/// Output of a WoE computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoeTable {
    /// Bins ordered by score.
    pub bins: Vec<BinStatistics>,
    pub edges: BinEdges,
    pub requested_bins: usize,
    pub actual_bin_count: usize,
    /// Records whose score was NaN and so fell in no bin.
    pub unbinned: usize,
    pub warnings: Vec<WoeWarning>,
}

impl WoeTable {
    pub fn is_degenerate(&self) -> bool {
        self.warnings.contains(&WoeWarning::DegenerateBinning)
    }

    /// WoE per bin, in score order.
    pub fn woe_values(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.woe).collect()
    }
}

/// One node of a fitted decision tree, stored in an arena (root at index 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
    },
    Leaf {
        class: u8,
        /// Fraction of training samples in the leaf with target `1`.
        p_bad: f64,
        n_samples: usize,
    },
}

/// Fitted tree parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTree {
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

impl RiskTree {
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }
}

/// Per-record scoring output of a fitted estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub score: f64,
    pub label: Label,
    pub predicted: u8,
    pub p_bad: f64,
    /// `None` when the score is NaN.
    pub bin: Option<usize>,
    pub woe: Option<f64>,
}

/// A saved estimator (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorFile {
    pub tool: String,
    pub version: String,
    pub config: EstimatorConfig,
    pub feature_names: Vec<String>,
    pub tree: RiskTree,
    pub bin_edges: BinEdges,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub estimator: EstimatorConfig,
    pub features_path: PathBuf,
    pub export_woe: Option<PathBuf>,
    pub model_out: Option<PathBuf>,
}
