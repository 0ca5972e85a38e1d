//! Reporting utilities: label counts, prediction summaries, terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Label, ScoredRecord};

/// Good/bad tallies of a label vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelCounts {
    pub good: usize,
    pub bad: usize,
}

impl LabelCounts {
    pub fn total(&self) -> usize {
        self.good + self.bad
    }

    pub fn bad_share(&self) -> f64 {
        if self.total() == 0 { 0.0 } else { self.bad as f64 / self.total() as f64 }
    }
}

pub fn count_labels(labels: &[Label]) -> LabelCounts {
    labels.iter().fold(LabelCounts::default(), |mut acc, l| {
        match l {
            Label::Good => acc.good += 1,
            Label::Bad => acc.bad += 1,
        }
        acc
    })
}

/// How the tree's predictions line up with the proxy labels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PredictionSummary {
    pub records: usize,
    pub proxy: LabelCounts,
    pub predicted_bad: usize,
    /// Records where the predicted class equals the proxy label.
    pub agreement: usize,
    pub unbinned: usize,
}

impl PredictionSummary {
    pub fn agreement_rate(&self) -> f64 {
        if self.records == 0 { 0.0 } else { self.agreement as f64 / self.records as f64 }
    }
}

pub fn summarize_predictions(records: &[ScoredRecord]) -> PredictionSummary {
    let labels: Vec<Label> = records.iter().map(|r| r.label).collect();
    PredictionSummary {
        records: records.len(),
        proxy: count_labels(&labels),
        predicted_bad: records.iter().filter(|r| r.predicted == 1).count(),
        agreement: records.iter().filter(|r| r.predicted == r.label.as_int()).count(),
        unbinned: records.iter().filter(|r| r.bin.is_none()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: f64, predicted: u8) -> ScoredRecord {
        ScoredRecord {
            score,
            label: Label::from_score(score, 0.5),
            predicted,
            p_bad: predicted as f64,
            bin: if score.is_nan() { None } else { Some(0) },
            woe: None,
        }
    }

    #[test]
    fn counts_good_and_bad() {
        let c = count_labels(&[Label::Bad, Label::Good, Label::Bad]);
        assert_eq!(c, LabelCounts { good: 1, bad: 2 });
        assert!((c.bad_share() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(count_labels(&[]).bad_share(), 0.0);
    }

    #[test]
    fn prediction_summary_tracks_agreement() {
        let records = [record(0.2, 1), record(0.8, 0), record(0.1, 0), record(f64::NAN, 0)];
        let s = summarize_predictions(&records);
        assert_eq!(s.records, 4);
        assert_eq!(s.proxy, LabelCounts { good: 2, bad: 2 });
        assert_eq!(s.predicted_bad, 1);
        assert_eq!(s.agreement, 3);
        assert_eq!(s.unbinned, 1);
        assert_eq!(s.agreement_rate(), 0.75);
    }
}
