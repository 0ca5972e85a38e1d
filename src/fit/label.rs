//! Proxy good/bad labelling from the RFMS score.

use crate::domain::Label;

/// `Bad` if `score < threshold`, otherwise `Good`.
///
/// NaN scores are labelled `Good`: a NaN never compares below the threshold.
pub fn label(scores: &[f64], threshold: f64) -> Vec<Label> {
    scores.iter().map(|&s| Label::from_score(s, threshold)).collect()
}

/// Binary default indicator per score, `1 == Bad`.
///
/// Used both as the classifier's training target and as the event flag for WoE.
pub fn label_as_int(scores: &[f64], threshold: f64) -> Vec<u8> {
    scores
        .iter()
        .map(|&s| Label::from_score(s, threshold).as_int())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    #[test]
    fn bad_iff_below_threshold() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let s: f64 = rng.gen_range(-2.0..2.0);
            let t: f64 = rng.gen_range(-1.0..1.0);
            let l = Label::from_score(s, t);
            assert_eq!(l == Label::Bad, s < t, "score={s} threshold={t}");
        }
    }

    #[test]
    fn scenario_labels() {
        let scores = [0.1, 0.2, 0.3, 0.4, 0.9];
        assert_eq!(
            label(&scores, 0.5),
            vec![Label::Bad, Label::Bad, Label::Bad, Label::Bad, Label::Good]
        );
        assert_eq!(label_as_int(&scores, 0.5), vec![1, 1, 1, 1, 0]);
    }

    #[test]
    fn nan_scores_are_good() {
        assert_eq!(label(&[f64::NAN], 0.5), vec![Label::Good]);
        assert_eq!(label_as_int(&[f64::NAN], 0.5), vec![0]);
    }

    #[test]
    fn labelling_is_deterministic() {
        let scores = [0.49, 0.5, 0.51, -1.0];
        assert_eq!(label(&scores, 0.5), label(&scores, 0.5));
    }
}
