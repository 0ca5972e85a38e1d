//! Mathematical utilities: empirical quantiles and Gini impurity.

pub mod impurity;
pub mod quantile;

pub use impurity::*;
pub use quantile::*;
