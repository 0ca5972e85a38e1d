//! Risk classifier.
//!
//! The classifier learns the proxy good/bad rule from raw features so it can
//! score records whose RFMS score is not available on its own.

pub mod tree;

pub use tree::*;
