//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the numeric input (`FeatureMatrix`) and the proxy label (`Label`)
//! - the immutable estimator configuration (`EstimatorConfig`)
//! - binning outputs (`Bin`, `BinStatistics`, `BinEdges`, `WoeTable`)
//! - fitted tree parameters (`TreeNode`, `RiskTree`) and the saved estimator file

pub mod types;

pub use types::*;
