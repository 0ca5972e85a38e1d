//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring code stays clean and testable
//! - output changes are localized

use crate::domain::{EstimatorConfig, RiskTree, TreeNode, WoeTable};
use crate::fit::information_value;
use crate::report::{LabelCounts, PredictionSummary};

/// Format a WoE table with its warnings and information value.
pub fn format_woe_table(table: &WoeTable, smoothing: f64) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "WoE bins: requested={} actual={}",
        table.requested_bins, table.actual_bin_count
    ));
    if table.unbinned > 0 {
        out.push_str(&format!(" unbinned={}", table.unbinned));
    }
    out.push('\n');

    out.push_str(
        format!(
            "{:<4} {:<22} {:>8} {:>8} {:>8} {:>9} {:>9} {:>10}\n",
            "bin", "range", "count", "bad", "good", "bad_rate", "good_rate", "woe"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<4} {:-<22} {:-<8} {:-<8} {:-<8} {:-<9} {:-<9} {:-<10}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for s in &table.bins {
        out.push_str(
            format!(
                "{:<4} {:<22} {:>8} {:>8} {:>8} {:>9.4} {:>9.4} {:>10.4}\n",
                s.bin.index,
                s.bin.label(),
                s.count,
                s.default_count,
                s.non_default_count,
                s.bad_rate,
                s.good_rate,
                s.woe,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out.push_str(&format!("Information value: {:.4}\n", information_value(table, smoothing)));
    for w in &table.warnings {
        out.push_str(&format!("warning: {}\n", w.describe()));
    }

    out
}

/// Format the fit summary: config, proxy label balance, tree shape.
pub fn format_fit_summary(config: &EstimatorConfig, labels: &LabelCounts, tree: &RiskTree) -> String {
    let mut out = String::new();

    out.push_str("=== rfms - RFMS proxy credit risk ===\n");
    out.push_str(&format!(
        "Config: threshold={} max_bins={} smoothing={:e} max_depth={} min_samples_split={}\n",
        config.threshold, config.max_bins, config.smoothing, config.max_depth, config.min_samples_split
    ));
    out.push_str(&format!(
        "Records: n={} | proxy bad={} ({:.1}%) | good={}\n",
        labels.total(),
        labels.bad,
        labels.bad_share() * 100.0,
        labels.good
    ));
    out.push_str(&format!(
        "Tree: depth={} leaves={} nodes={}\n",
        tree.depth(),
        tree.leaf_count(),
        tree.nodes.len()
    ));

    out
}

/// Indented rendering of the tree, one node per line.
pub fn format_tree(tree: &RiskTree, feature_names: &[String]) -> String {
    let mut out = String::new();
    if !tree.nodes.is_empty() {
        write_node(tree, feature_names, 0, 0, &mut out);
    }
    out
}

fn write_node(tree: &RiskTree, names: &[String], idx: usize, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match &tree.nodes[idx] {
        TreeNode::Leaf { class, p_bad, n_samples } => {
            out.push_str(&format!("{indent}-> class={class} p_bad={p_bad:.3} n={n_samples}\n"));
        }
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
            n_samples,
        } => {
            let name = names.get(*feature).cloned().unwrap_or_else(|| format!("f{feature}"));
            out.push_str(&format!("{indent}{name} <= {threshold:.6} (n={n_samples})\n"));
            write_node(tree, names, *left, depth + 1, out);
            out.push_str(&format!("{indent}{name} > {threshold:.6}\n"));
            write_node(tree, names, *right, depth + 1, out);
        }
    }
}

pub fn format_prediction_summary(summary: &PredictionSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Scored: n={} | predicted bad={} | proxy bad={} | agreement={:.1}%\n",
        summary.records,
        summary.predicted_bad,
        summary.proxy.bad,
        summary.agreement_rate() * 100.0
    ));
    if summary.unbinned > 0 {
        out.push_str(&format!("Unbinned (NaN score): {}\n", summary.unbinned));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::WoeBinner;

    #[test]
    fn woe_table_lists_every_bin_and_iv() {
        let scores = [0.1, 0.2, 0.3, 0.4, 0.9];
        let targets = [1, 1, 1, 0, 0];
        let table = WoeBinner::new(2, 1e-5).compute_woe(&scores, &targets).unwrap();
        let text = format_woe_table(&table, 1e-5);

        assert!(text.starts_with("WoE bins: requested=2 actual=2\n"));
        assert!(text.contains("[0.100, 0.300]"));
        assert!(text.contains("(0.300, 0.900]"));
        assert!(text.contains("Information value:"));
        assert!(!text.contains("warning:"));
    }

    #[test]
    fn degenerate_table_prints_warning() {
        let scores = [0.5; 6];
        let targets = [0; 6];
        let table = WoeBinner::new(5, 1e-5).compute_woe(&scores, &targets).unwrap();
        let text = format_woe_table(&table, 1e-5);
        assert!(text.contains("warning: degenerate binning"));
    }

    #[test]
    fn tree_rendering_uses_feature_names() {
        let tree = RiskTree {
            n_features: 1,
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                    n_samples: 4,
                },
                TreeNode::Leaf { class: 1, p_bad: 1.0, n_samples: 2 },
                TreeNode::Leaf { class: 0, p_bad: 0.0, n_samples: 2 },
            ],
        };
        let text = format_tree(&tree, &["Amount".to_string()]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Amount <= 0.500000 (n=4)");
        assert_eq!(lines[1], "  -> class=1 p_bad=1.000 n=2");
        assert_eq!(lines[2], "Amount > 0.500000");
    }

    #[test]
    fn fit_summary_reports_label_balance() {
        let tree = RiskTree {
            n_features: 1,
            nodes: vec![TreeNode::Leaf { class: 0, p_bad: 0.0, n_samples: 3 }],
        };
        let text = format_fit_summary(&EstimatorConfig::default(), &LabelCounts { good: 3, bad: 1 }, &tree);
        assert!(text.contains("proxy bad=1 (25.0%)"));
        assert!(text.contains("Tree: depth=0 leaves=1 nodes=1"));
    }
}
