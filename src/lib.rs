//! `rfms-risk` library crate.
//!
//! Proxy credit-risk scoring for customers without a default history:
//! transactions are engineered into numeric features, reduced to an RFMS
//! score, labelled good/bad against a threshold, learned by a shallow decision
//! tree, and binned into Weight of Evidence.
//!
//! The binary (`rfms`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the estimator can be embedded in other services

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
