//! Transaction feature engineering.
//!
//! Turns raw transactions into the numeric matrix the estimator consumes:
//!
//! - per-customer amount aggregates merged back onto each transaction
//! - calendar fields from the transaction timestamp
//! - drop-first one-hot encoding of categorical columns
//! - min-max scaling of the numeric columns

pub mod aggregate;
pub mod encode;
pub mod pipeline;
pub mod transaction;

pub use aggregate::*;
pub use encode::*;
pub use pipeline::*;
pub use transaction::*;
