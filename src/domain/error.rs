//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for stratbench.
///
/// Only configuration problems and unusable input surface here. Short
/// histories, zero average losses and missing observations are absorbed by
/// the numeric policies in the strategy and returns modules.
#[derive(Debug, thiserror::Error)]
pub enum StratbenchError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid parameters for {strategy}: {reason}")]
    InvalidParameter { strategy: String, reason: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("duplicate observation for {instrument} on {date}")]
    DuplicateObservation { instrument: String, date: NaiveDate },

    #[error("artifact error: {reason}")]
    Artifact { reason: String },

    #[error("strategy {suffix} is not present in the artifact")]
    MissingStrategy { suffix: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratbenchError> for std::process::ExitCode {
    fn from(err: &StratbenchError) -> Self {
        let code: u8 = match err {
            StratbenchError::Io(_) => 1,
            StratbenchError::ConfigParse { .. }
            | StratbenchError::ConfigInvalid { .. }
            | StratbenchError::UnknownStrategy { .. }
            | StratbenchError::InvalidParameter { .. } => 2,
            StratbenchError::Data { .. } | StratbenchError::DuplicateObservation { .. } => 3,
            StratbenchError::Artifact { .. } | StratbenchError::MissingStrategy { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
