//! Gini impurity for binary targets.

/// Gini impurity of a node holding `n_bad` positives out of `n` samples.
///
/// `1 - p0² - p1²`; an empty node is pure by convention.
pub fn gini(n_bad: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p1 = n_bad as f64 / n as f64;
    let p0 = 1.0 - p1;
    1.0 - p0 * p0 - p1 * p1
}

/// Impurity decrease of splitting a parent into `(left_bad, left_n)` and
/// `(right_bad, right_n)`, weighted by sample counts.
///
/// Expressed as a total (not per-sample) quantity so it can be compared across
/// candidate splits of the same node without renormalizing.
pub fn gini_decrease(left_bad: usize, left_n: usize, right_bad: usize, right_n: usize) -> f64 {
    let n = left_n + right_n;
    let parent = gini(left_bad + right_bad, n) * n as f64;
    let children = gini(left_bad, left_n) * left_n as f64 + gini(right_bad, right_n) * right_n as f64;
    parent - children
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_nodes_have_zero_impurity() {
        assert_eq!(gini(0, 10), 0.0);
        assert_eq!(gini(10, 10), 0.0);
        assert_eq!(gini(0, 0), 0.0);
    }

    #[test]
    fn balanced_node_is_maximally_impure() {
        assert!((gini(5, 10) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn perfect_split_recovers_parent_impurity() {
        // Parent 5/10 → total impurity 5.0; both children pure.
        assert!((gini_decrease(0, 5, 5, 5) - 5.0).abs() < 1e-12);
        // A split that keeps the class mix unchanged removes nothing.
        assert!(gini_decrease(2, 4, 3, 6).abs() < 1e-12);
    }
}
