//! Port traits for the collaborators around the computation core.

pub mod artifact_port;
pub mod config_port;
pub mod price_port;
pub mod report_port;
