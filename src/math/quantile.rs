//! Empirical quantiles for equal-frequency binning.
//!
//! Quantiles use linear interpolation between order statistics:
//!
//! ```text
//! h = (n - 1) * q
//! Q(q) = x[floor(h)] + (h - floor(h)) * (x[ceil(h)] - x[floor(h)])
//! ```
//!
//! which matches the default estimator of NumPy/pandas, so edges agree with
//! `qcut` on the same data.

/// Quantile `q ∈ [0, 1]` of an ascending-sorted, NaN-free slice.
///
/// Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Edges at `q = i / n_bins` for `i = 0..=n_bins`, over the finite values only.
///
/// Duplicate edges are dropped, so the result may describe fewer than
/// `n_bins` bins. Returns an empty vector when no value is finite.
pub fn quantile_edges(values: &[f64], n_bins: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() || n_bins == 0 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let mut edges: Vec<f64> = Vec::with_capacity(n_bins + 1);
    for i in 0..=n_bins {
        let q = i as f64 / n_bins as f64;
        let Some(edge) = quantile_sorted(&sorted, q) else {
            continue;
        };
        if edges.last().is_none_or(|&last| edge > last) {
            edges.push(edge);
        }
    }
    edges
}
