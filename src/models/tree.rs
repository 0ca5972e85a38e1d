//! Depth-bounded CART classifier for the binary proxy target.
//!
//! The tree is grown greedily:
//! - at each node, every feature is scanned for the threshold with the largest
//!   weighted Gini decrease (features are scanned in parallel)
//! - candidate thresholds are midpoints between consecutive distinct finite
//!   values; samples with `value <= threshold` go left
//! - growth stops at `max_depth`, at pure nodes, below `min_samples_split`,
//!   or when no split strictly decreases impurity
//!
//! Tie-breaks are fixed so a fit is bit-reproducible: equal decreases prefer
//! the lower feature index, then the lower threshold. A leaf with an even
//! class mix predicts `0`.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{EstimatorConfig, FeatureMatrix, RiskTree, TreeNode};
use crate::error::EstimatorError;
use crate::math::gini_decrease;

/// Splits must beat this decrease to count as an improvement.
const MIN_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

/// Decision-tree risk classifier. Holds no state until [`RiskClassifier::fit`].
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    max_depth: usize,
    min_samples_split: usize,
    tree: Option<RiskTree>,
}

impl RiskClassifier {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            tree: None,
        }
    }

    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(config.max_depth, config.min_samples_split)
    }

    /// Rebuild a classifier from previously fitted parameters.
    pub fn from_tree(tree: RiskTree, config: &EstimatorConfig) -> Result<Self, EstimatorError> {
        validate_tree(&tree)?;
        Ok(Self {
            tree: Some(tree),
            ..Self::from_config(config)
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Option<&RiskTree> {
        self.tree.as_ref()
    }

    /// Train on `matrix` against binary `targets` (`1 == Bad`).
    ///
    /// Replaces any previously fitted tree; there is no incremental fit.
    pub fn fit(&mut self, matrix: &FeatureMatrix, targets: &[u8]) -> Result<(), EstimatorError> {
        matrix.ensure_usable()?;
        if targets.len() != matrix.nrows() {
            return Err(EstimatorError::invalid(format!(
                "target length {} does not match record count {}",
                targets.len(),
                matrix.nrows()
            )));
        }
        if let Some(bad) = targets.iter().find(|&&t| t > 1) {
            return Err(EstimatorError::invalid(format!("targets must be 0 or 1, found {bad}")));
        }
        if self.max_depth == 0 {
            return Err(EstimatorError::invalid("max_depth must be >= 1"));
        }

        let indices: Vec<usize> = (0..matrix.nrows()).collect();
        let mut nodes = Vec::new();
        self.grow(matrix, targets, &indices, 0, &mut nodes);

        let tree = RiskTree {
            n_features: matrix.ncols(),
            nodes,
        };
        debug!(
            records = matrix.nrows(),
            features = matrix.ncols(),
            depth = tree.depth(),
            leaves = tree.leaf_count(),
            "Risk tree fitted"
        );
        self.tree = Some(tree);
        Ok(())
    }

    /// Predicted class per record.
    pub fn predict(&self, matrix: &FeatureMatrix) -> Result<Vec<u8>, EstimatorError> {
        let tree = self.checked_tree(matrix)?;
        Ok((0..matrix.nrows()).map(|i| leaf_for(tree, matrix, i).0).collect())
    }

    /// Probability of class `1` per record (training share of bads in the leaf).
    pub fn predict_proba(&self, matrix: &FeatureMatrix) -> Result<Vec<f64>, EstimatorError> {
        let tree = self.checked_tree(matrix)?;
        Ok((0..matrix.nrows()).map(|i| leaf_for(tree, matrix, i).1).collect())
    }

    fn checked_tree(&self, matrix: &FeatureMatrix) -> Result<&RiskTree, EstimatorError> {
        let Some(tree) = self.tree.as_ref() else {
            return Err(EstimatorError::ModelNotFitted);
        };
        matrix.ensure_usable()?;
        if matrix.ncols() != tree.n_features {
            return Err(EstimatorError::invalid(format!(
                "model was fitted on {} features, got {}",
                tree.n_features,
                matrix.ncols()
            )));
        }
        Ok(tree)
    }

    fn grow(
        &self,
        matrix: &FeatureMatrix,
        targets: &[u8],
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<TreeNode>,
    ) -> usize {
        let n = indices.len();
        let n_bad = indices.iter().filter(|&&i| targets[i] == 1).count();

        let pure = n_bad == 0 || n_bad == n;
        if depth >= self.max_depth || n < self.min_samples_split || pure {
            return push_leaf(nodes, n_bad, n);
        }

        let Some(split) = best_split(matrix, targets, indices) else {
            return push_leaf(nodes, n_bad, n);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| matrix.get(i, split.feature) <= split.threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return push_leaf(nodes, n_bad, n);
        }

        let node_idx = nodes.len();
        // Placeholder until both children have indices.
        nodes.push(TreeNode::Leaf {
            class: 0,
            p_bad: 0.0,
            n_samples: 0,
        });
        let left = self.grow(matrix, targets, &left_idx, depth + 1, nodes);
        let right = self.grow(matrix, targets, &right_idx, depth + 1, nodes);
        nodes[node_idx] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples: n,
        };
        node_idx
    }
}

fn push_leaf(nodes: &mut Vec<TreeNode>, n_bad: usize, n: usize) -> usize {
    let p_bad = if n == 0 { 0.0 } else { n_bad as f64 / n as f64 };
    let class = u8::from(2 * n_bad > n);
    nodes.push(TreeNode::Leaf {
        class,
        p_bad,
        n_samples: n,
    });
    nodes.len() - 1
}

/// Walk from the root to a leaf; returns `(class, p_bad)`.
fn leaf_for(tree: &RiskTree, matrix: &FeatureMatrix, row: usize) -> (u8, f64) {
    let mut idx = 0;
    loop {
        match &tree.nodes[idx] {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                idx = if matrix.get(row, *feature) <= *threshold { *left } else { *right };
            }
            TreeNode::Leaf { class, p_bad, .. } => return (*class, *p_bad),
        }
    }
}

fn best_split(matrix: &FeatureMatrix, targets: &[u8], indices: &[usize]) -> Option<SplitCandidate> {
    // Evaluate each feature independently (parallel); collect keeps feature order.
    let per_feature: Vec<SplitCandidate> = (0..matrix.ncols())
        .into_par_iter()
        .filter_map(|feature| best_split_for_feature(matrix, targets, indices, feature))
        .collect();

    // Deterministic selection: largest decrease; ties keep the lower feature index.
    let mut best: Option<SplitCandidate> = None;
    for c in per_feature {
        match best {
            Some(b) if c.decrease <= b.decrease => {}
            _ => best = Some(c),
        }
    }
    best
}

fn best_split_for_feature(
    matrix: &FeatureMatrix,
    targets: &[u8],
    indices: &[usize],
    feature: usize,
) -> Option<SplitCandidate> {
    let mut pairs: Vec<(f64, u8)> = indices
        .iter()
        .map(|&i| (matrix.get(i, feature), targets[i]))
        .collect();
    // NaN sorts last, matching `NaN <= t == false` (NaN always goes right).
    pairs.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or_else(|| a.0.is_nan().cmp(&b.0.is_nan()))
    });

    let n = pairs.len();
    let total_bad = pairs.iter().filter(|p| p.1 == 1).count();

    let mut best: Option<SplitCandidate> = None;
    let mut left_bad = 0usize;
    for i in 0..n.saturating_sub(1) {
        if pairs[i].1 == 1 {
            left_bad += 1;
        }
        let (v, next) = (pairs[i].0, pairs[i + 1].0);
        if !(v.is_finite() && next.is_finite()) || v == next {
            continue;
        }
        let left_n = i + 1;
        let decrease = gini_decrease(left_bad, left_n, total_bad - left_bad, n - left_n);
        if decrease <= MIN_DECREASE {
            continue;
        }
        // Strict comparison keeps the lowest threshold on ties.
        if best.is_none_or(|b| decrease > b.decrease) {
            best = Some(SplitCandidate {
                feature,
                threshold: midpoint(v, next),
                decrease,
            });
        }
    }
    best
}

/// Threshold between two distinct finite values with `v <= t < next`.
///
/// Halving first avoids overflow; adjacent floats can round up to `next`,
/// in which case `v` itself separates them.
fn midpoint(v: f64, next: f64) -> f64 {
    let mid = v / 2.0 + next / 2.0;
    if mid >= next { v } else { mid }
}

fn validate_tree(tree: &RiskTree) -> Result<(), EstimatorError> {
    if tree.nodes.is_empty() {
        return Err(EstimatorError::invalid("saved tree has no nodes"));
    }
    for (idx, node) in tree.nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
                ..
            } => {
                if *feature >= tree.n_features {
                    return Err(EstimatorError::invalid(format!(
                        "split on feature {feature} but tree has {} features",
                        tree.n_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(EstimatorError::invalid(format!("node {idx} has a non-finite threshold")));
                }
                // Children are always stored after their parent; this also rules out cycles.
                let in_range = |child: usize| child > idx && child < tree.nodes.len();
                if !(in_range(*left) && in_range(*right)) {
                    return Err(EstimatorError::invalid("split child index out of range"));
                }
            }
            TreeNode::Leaf { class, p_bad, .. } => {
                if *class > 1 {
                    return Err(EstimatorError::invalid(format!("leaf {idx} has class {class}, expected 0 or 1")));
                }
                if !(0.0..=1.0).contains(p_bad) {
                    return Err(EstimatorError::invalid(format!("leaf {idx} has p_bad {p_bad} outside [0, 1]")));
                }
            }
        }
    }
    Ok(())
}
