//! RFMS score: one scalar per record.

use crate::domain::FeatureMatrix;
use crate::error::EstimatorError;

/// Arithmetic mean across columns, per record, in record order.
///
/// A NaN feature makes that record's score NaN. Zero columns (or no records)
/// is rejected rather than producing `0/0`.
pub fn aggregate_score(matrix: &FeatureMatrix) -> Result<Vec<f64>, EstimatorError> {
    matrix.ensure_usable()?;
    Ok(matrix.as_matrix().column_mean().iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_row_mean() {
        let m = FeatureMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(aggregate_score(&m).unwrap(), vec![2.0, 5.0]);
    }

    #[test]
    fn nan_propagates() {
        let m = FeatureMatrix::from_rows(&[vec![1.0, f64::NAN], vec![0.2, 0.4]]).unwrap();
        let s = aggregate_score(&m).unwrap();
        assert!(s[0].is_nan());
        assert!((s[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn zero_columns_is_invalid_input() {
        let m = FeatureMatrix::from_rows(&[vec![], vec![]]).unwrap();
        assert!(matches!(aggregate_score(&m), Err(EstimatorError::InvalidInput(_))));
    }
}
