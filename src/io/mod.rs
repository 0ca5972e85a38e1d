//! Input/output helpers.
//!
//! - CSV ingest + row-level validation (`ingest`)
//! - CSV exports for WoE tables, predictions, features (`export`)
//! - estimator JSON read/write (`model`)

pub mod export;
pub mod ingest;
pub mod model;

pub use export::*;
pub use ingest::*;
pub use model::*;
