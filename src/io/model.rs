//! Read/write estimator JSON files.
//!
//! An estimator file is the portable form of a fitted `DefaultEstimator`:
//! - tool name + crate version
//! - the configuration it was fitted with
//! - feature names (column order the tree expects)
//! - the risk tree as a flat node list
//! - the fitted WoE bin edges
//!
//! The schema is defined by `domain::EstimatorFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::EstimatorFile;
use crate::error::AppError;
use crate::fit::{DefaultEstimator, TOOL_NAME};

/// Write a fitted estimator as pretty JSON.
pub fn write_estimator_json(path: &Path, estimator: &DefaultEstimator) -> Result<(), AppError> {
    let snapshot = estimator.to_file()?;
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &snapshot)
        .map_err(|e| AppError::new(2, format!("Failed to write model JSON: {e}")))?;
    Ok(())
}

/// Read a model JSON file and rebuild the estimator it describes.
pub fn read_estimator_json(path: &Path) -> Result<DefaultEstimator, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model JSON '{}': {e}", path.display())))?;
    let snapshot: EstimatorFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid model JSON: {e}")))?;
    if snapshot.tool != TOOL_NAME {
        return Err(AppError::new(
            2,
            format!("Model JSON was written by '{}', expected '{TOOL_NAME}'.", snapshot.tool),
        ));
    }
    Ok(DefaultEstimator::from_file(snapshot)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstimatorConfig, FeatureMatrix};

    fn fitted() -> (DefaultEstimator, FeatureMatrix) {
        let rows: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let a = (i as f64 * 0.37) % 1.0;
                let b = (i as f64 * 0.61) % 1.0;
                vec![a, b]
            })
            .collect();
        let x = FeatureMatrix::from_rows(&rows).unwrap();
        let mut est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        est.fit(&x).unwrap();
        (est, x)
    }

    #[test]
    fn json_round_trip_restores_estimator() {
        let (est, x) = fitted();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        write_estimator_json(&path, &est).unwrap();
        let restored = read_estimator_json(&path).unwrap();

        assert_eq!(restored.config(), est.config());
        assert_eq!(restored.bin_edges(), est.bin_edges());
        assert_eq!(restored.predict_risk(&x).unwrap(), est.predict_risk(&x).unwrap());
    }

    #[test]
    fn unfitted_estimator_is_not_written() {
        let est = DefaultEstimator::new(EstimatorConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = write_estimator_json(&dir.path().join("m.json"), &est).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn foreign_tool_is_rejected() {
        let (est, _) = fitted();
        let mut snapshot = est.to_file().unwrap();
        snapshot.tool = "other-tool".to_string();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        assert_eq!(read_estimator_json(&path).unwrap_err().exit_code(), 2);
    }
}
