//! Core domain types and logic.

pub mod artifact;
pub mod config_validation;
pub mod dataset;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod portfolio;
pub mod precompute;
pub mod returns;
pub mod strategy;
