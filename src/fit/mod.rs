//! RFMS scoring and WoE binning.
//!
//! Responsibilities:
//!
//! - reduce a feature matrix to one RFMS score per record
//! - derive proxy good/bad labels from the score
//! - bin the score and compute Weight of Evidence per bin
//! - tie it together with the risk tree in `DefaultEstimator`

pub mod estimator;
pub mod label;
pub mod score;
pub mod woe;

pub use estimator::*;
pub use label::*;
pub use score::*;
pub use woe::*;
