//! Weight-of-Evidence binning of the RFMS score.
//!
//! Given scores and binary default flags we:
//!
//! 1. cut the score range at empirical quantiles (equal-frequency bins),
//!    dropping duplicate edges
//! 2. count records and defaults per bin
//! 3. compute `woe = ln((good_rate + ε) / (bad_rate + ε))`
//!
//! Edges can be learned once (`fit_bins`) and applied to other data
//! (`apply_bins`); `compute_woe` does both on the same scores.

use tracing::{debug, warn};

use crate::domain::{Bin, BinEdges, BinStatistics, EstimatorConfig, WoeTable, WoeWarning};
use crate::error::EstimatorError;
use crate::math::quantile_edges;

/// Quantile binner with WoE smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WoeBinner {
    max_bins: usize,
    smoothing: f64,
}

impl WoeBinner {
    pub fn new(max_bins: usize, smoothing: f64) -> Self {
        Self { max_bins, smoothing }
    }

    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(config.max_bins, config.smoothing)
    }

    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Learn quantile edges over the finite scores.
    pub fn fit_bins(&self, scores: &[f64]) -> Result<BinEdges, EstimatorError> {
        if self.max_bins == 0 {
            return Err(EstimatorError::invalid("max_bins must be >= 1"));
        }
        if scores.is_empty() {
            return Err(EstimatorError::invalid("no scores to bin"));
        }
        let edges = quantile_edges(scores, self.max_bins);
        if edges.is_empty() {
            return Err(EstimatorError::invalid("no finite scores to bin"));
        }
        let edges = BinEdges {
            edges,
            requested_bins: self.max_bins,
        };
        debug!(
            requested = self.max_bins,
            actual = edges.bin_count(),
            "Quantile edges fitted"
        );
        Ok(edges)
    }

    /// Map scores into previously fitted edges and compute per-bin WoE.
    ///
    /// Finite scores outside the fitted range are clamped into the first or
    /// last bin. NaN and infinite scores fall in no bin and are counted in
    /// `WoeTable::unbinned`.
    pub fn apply_bins(&self, edges: &BinEdges, scores: &[f64], targets: &[u8]) -> Result<WoeTable, EstimatorError> {
        if scores.is_empty() {
            return Err(EstimatorError::invalid("no scores to bin"));
        }
        if scores.len() != targets.len() {
            return Err(EstimatorError::invalid(format!(
                "score length {} does not match target length {}",
                scores.len(),
                targets.len()
            )));
        }
        if let Some(bad) = targets.iter().find(|&&t| t > 1) {
            return Err(EstimatorError::invalid(format!("targets must be 0 or 1, found {bad}")));
        }
        if edges.edges.is_empty() {
            return Err(EstimatorError::invalid("bin edges are empty"));
        }

        let bins = edges.bins();
        let mut counts = vec![0usize; bins.len()];
        let mut defaults = vec![0usize; bins.len()];
        let mut unbinned = 0usize;
        for (&score, &target) in scores.iter().zip(targets) {
            match bin_index(edges, score) {
                Some(i) => {
                    counts[i] += 1;
                    defaults[i] += usize::from(target);
                }
                None => unbinned += 1,
            }
        }

        let stats: Vec<BinStatistics> = bins
            .iter()
            .map(|&bin| bin_statistics(bin, counts[bin.index], defaults[bin.index], self.smoothing))
            .collect();

        let mut warnings = Vec::new();
        if edges.is_degenerate() {
            warn!(
                records = scores.len() - unbinned,
                score = edges.edges[0],
                "Degenerate binning: every score is identical"
            );
            warnings.push(WoeWarning::DegenerateBinning);
        } else if edges.bin_count() < edges.requested_bins {
            debug!(
                requested = edges.requested_bins,
                actual = edges.bin_count(),
                "Duplicate quantile edges dropped"
            );
            warnings.push(WoeWarning::ReducedBinCount);
        }

        Ok(WoeTable {
            actual_bin_count: stats.len(),
            requested_bins: edges.requested_bins,
            bins: stats,
            edges: edges.clone(),
            unbinned,
            warnings,
        })
    }

    /// Fit edges on `scores` and compute WoE on the same records.
    pub fn compute_woe(&self, scores: &[f64], targets: &[u8]) -> Result<WoeTable, EstimatorError> {
        if scores.len() != targets.len() {
            return Err(EstimatorError::invalid(format!(
                "score length {} does not match target length {}",
                scores.len(),
                targets.len()
            )));
        }
        let edges = self.fit_bins(scores)?;
        self.apply_bins(&edges, scores, targets)
    }
}

/// Bin index for one score; `None` for NaN and ±inf.
///
/// Bins are right-closed, the first also closed on the left. Finite scores
/// outside the fitted range clamp to the nearest end bin. Edges are learned
/// from finite scores only, so infinite scores stay unbinned.
pub fn bin_index(edges: &BinEdges, score: f64) -> Option<usize> {
    if !score.is_finite() || edges.edges.is_empty() {
        return None;
    }
    if edges.edges.len() == 1 {
        return Some(0);
    }
    let uppers = &edges.edges[1..];
    let idx = uppers.partition_point(|&upper| upper < score);
    Some(idx.min(uppers.len() - 1))
}

/// `ln((good_rate + ε) / (bad_rate + ε))`.
pub fn woe(good_rate: f64, bad_rate: f64, smoothing: f64) -> f64 {
    ((good_rate + smoothing) / (bad_rate + smoothing)).ln()
}

/// Aggregate one bin. An empty bin reports zero rates and zero WoE.
pub fn bin_statistics(bin: Bin, count: usize, default_count: usize, smoothing: f64) -> BinStatistics {
    let non_default_count = count.saturating_sub(default_count);
    let (bad_rate, good_rate, woe_value) = if count == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let bad_rate = default_count as f64 / count as f64;
        let good_rate = non_default_count as f64 / count as f64;
        (bad_rate, good_rate, woe(good_rate, bad_rate, smoothing))
    };
    BinStatistics {
        bin,
        count,
        default_count,
        non_default_count,
        bad_rate,
        good_rate,
        woe: woe_value,
    }
}

/// Information value of the binned score.
///
/// `Σ (dist_good − dist_bad) · ln((dist_good + ε) / (dist_bad + ε))`, where
/// `dist_*` is the bin's share of all goods (bads).
pub fn information_value(table: &WoeTable, smoothing: f64) -> f64 {
    let total_bad: usize = table.bins.iter().map(|b| b.default_count).sum();
    let total_good: usize = table.bins.iter().map(|b| b.non_default_count).sum();
    let share = |part: usize, total: usize| if total == 0 { 0.0 } else { part as f64 / total as f64 };

    table
        .bins
        .iter()
        .map(|b| {
            let dist_good = share(b.non_default_count, total_good);
            let dist_bad = share(b.default_count, total_bad);
            (dist_good - dist_bad) * woe(dist_good, dist_bad, smoothing)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    use crate::domain::DEFAULT_SMOOTHING;
    use crate::fit::label::label_as_int;

    fn binner(max_bins: usize) -> WoeBinner {
        WoeBinner::new(max_bins, DEFAULT_SMOOTHING)
    }

    #[test]
    fn pure_good_bin_has_finite_woe() {
        let bin = Bin { index: 0, lower: 0.0, upper: 1.0 };
        let stats = bin_statistics(bin, 10, 0, 1e-5);
        assert_eq!(stats.bad_rate, 0.0);
        assert_eq!(stats.good_rate, 1.0);
        assert!(stats.woe.is_finite());
        assert_relative_eq!(stats.woe, 100_001f64.ln(), epsilon = 1e-9);
        assert!((stats.woe - 11.51).abs() < 0.01);
    }

    #[test]
    fn pure_bad_bin_is_mirror_image() {
        let bin = Bin { index: 0, lower: 0.0, upper: 1.0 };
        let stats = bin_statistics(bin, 4, 4, 1e-5);
        assert_relative_eq!(stats.woe, -(100_001f64.ln()), epsilon = 1e-9);
    }

    #[test]
    fn five_score_scenario() {
        let scores = [0.1, 0.2, 0.3, 0.4, 0.9];
        let targets = label_as_int(&scores, 0.5);
        let table = binner(2).compute_woe(&scores, &targets).unwrap();

        assert_eq!(table.actual_bin_count, 2);
        assert_eq!(table.edges.edges, vec![0.1, 0.3, 0.9]);
        assert!(table.warnings.is_empty());

        // Median edge is 0.3; the right-closed first bin keeps it.
        let low = &table.bins[0];
        assert_eq!((low.count, low.default_count), (3, 3));
        assert_eq!(low.good_rate, 0.0);

        let high = &table.bins[1];
        assert!(high.bin.contains(0.9));
        assert_eq!((high.count, high.default_count), (2, 1));
        assert!(high.good_rate > 0.0);
        assert!(high.woe > low.woe);
    }

    #[test]
    fn identical_scores_collapse_to_one_flagged_bin() {
        let scores = [0.42; 20];
        let targets = label_as_int(&scores, 0.5);
        let table = binner(5).compute_woe(&scores, &targets).unwrap();
        assert_eq!(table.actual_bin_count, 1);
        assert_eq!(table.bins[0].count, 20);
        assert!(table.is_degenerate());
        assert_eq!(table.requested_bins, 5);
    }

    #[test]
    fn duplicate_edges_reduce_bin_count() {
        let scores = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0];
        let targets = label_as_int(&scores, 0.5);
        let table = binner(5).compute_woe(&scores, &targets).unwrap();
        assert!(table.actual_bin_count < 5);
        assert_eq!(table.actual_bin_count, table.bins.len());
        assert!(table.warnings.contains(&WoeWarning::ReducedBinCount));
        assert_eq!(table.bins.iter().map(|b| b.count).sum::<usize>(), scores.len());
    }

    #[test]
    fn bins_cover_range_without_overlap() {
        let mut rng = StdRng::seed_from_u64(11);
        let scores: Vec<f64> = (0..500).map(|_| rng.gen_range(0.0..1.0)).collect();
        let targets = label_as_int(&scores, 0.5);
        let table = binner(5).compute_woe(&scores, &targets).unwrap();

        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(table.bins.first().unwrap().bin.lower, min);
        assert_eq!(table.bins.last().unwrap().bin.upper, max);
        for w in table.bins.windows(2) {
            assert_eq!(w[0].bin.upper, w[1].bin.lower);
        }
        for &s in &scores {
            let hits = table.bins.iter().filter(|b| b.bin.contains(s)).count();
            assert_eq!(hits, 1, "score {s} in {hits} bins");
        }
        // Equal-frequency: every bin holds 100 records.
        assert!(table.bins.iter().all(|b| b.count == 100));
    }

    #[test]
    fn rates_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(3);
        let scores: Vec<f64> = (0..200).map(|_| rng.gen_range(0.0..1.0)).collect();
        let targets: Vec<u8> = (0..200).map(|_| u8::from(rng.gen_bool(0.3))).collect();
        let table = binner(4).compute_woe(&scores, &targets).unwrap();
        for b in &table.bins {
            assert!(b.count > 0);
            assert_relative_eq!(b.bad_rate + b.good_rate, 1.0, epsilon = 1e-12);
            assert_eq!(b.default_count + b.non_default_count, b.count);
        }
    }

    #[test]
    fn compute_woe_is_deterministic() {
        let scores = [0.3, 0.7, 0.1, 0.55, 0.9, 0.2, 0.45];
        let targets = label_as_int(&scores, 0.5);
        let a = binner(3).compute_woe(&scores, &targets).unwrap();
        let b = binner(3).compute_woe(&scores, &targets).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn apply_clamps_out_of_range_scores() {
        let b = binner(2);
        let edges = b.fit_bins(&[0.1, 0.2, 0.3, 0.4, 0.9]).unwrap();
        assert_eq!(bin_index(&edges, -5.0), Some(0));
        assert_eq!(bin_index(&edges, 0.3), Some(0));
        assert_eq!(bin_index(&edges, 0.31), Some(1));
        assert_eq!(bin_index(&edges, 7.0), Some(1));
        assert_eq!(bin_index(&edges, f64::NAN), None);

        let table = b.apply_bins(&edges, &[-1.0, 2.0, 2.5], &[1, 0, 0]).unwrap();
        assert_eq!(table.bins[0].count, 1);
        assert_eq!(table.bins[1].count, 2);
    }

    #[test]
    fn apply_reports_empty_bins_and_nan() {
        let b = binner(2);
        let edges = b.fit_bins(&[0.1, 0.2, 0.3, 0.4, 0.9]).unwrap();
        let table = b.apply_bins(&edges, &[0.8, f64::NAN], &[0, 0]).unwrap();
        assert_eq!(table.unbinned, 1);
        assert_eq!(table.bins[0].count, 0);
        assert_eq!(table.bins[0].woe, 0.0);
    }

    #[test]
    fn infinite_scores_stay_unbinned() {
        let scores = [0.4, 0.4, 0.4, f64::INFINITY, f64::NEG_INFINITY];
        let targets = label_as_int(&scores, 0.5);
        let table = binner(3).compute_woe(&scores, &targets).unwrap();
        assert_eq!(bin_index(&table.edges, f64::INFINITY), None);
        assert_eq!(table.unbinned, 2);
        assert_eq!(table.bins.iter().map(|b| b.count).sum::<usize>(), 3);
        // Every binned score lies inside its own bin.
        assert!(table.bins[0].bin.contains(0.4));
        assert!(table.is_degenerate());
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let b = binner(3);
        assert!(b.compute_woe(&[], &[]).is_err());
        assert!(b.compute_woe(&[0.1, 0.2], &[1]).is_err());
        assert!(b.compute_woe(&[f64::NAN, f64::NAN], &[0, 0]).is_err());
        assert!(b.compute_woe(&[0.1, 0.2], &[0, 3]).is_err());
        assert!(binner(0).fit_bins(&[0.1]).is_err());
    }

    #[test]
    fn information_value_is_zero_without_separation() {
        // Same 50/50 mix in every bin.
        let scores = [0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.4, 0.4];
        let targets = [0, 1, 0, 1, 0, 1, 0, 1];
        let table = binner(2).compute_woe(&scores, &targets).unwrap();
        assert!(information_value(&table, DEFAULT_SMOOTHING).abs() < 1e-9);

        let separated = label_as_int(&scores, 0.25);
        let table = binner(2).compute_woe(&scores, &separated).unwrap();
        assert!(information_value(&table, DEFAULT_SMOOTHING) > 1.0);
    }
}
