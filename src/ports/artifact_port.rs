//! Persistence ports for the precomputed wide table.

use crate::domain::error::StratbenchError;
use crate::domain::precompute::WideTable;

pub trait ArtifactSink {
    fn write(&self, table: &WideTable) -> Result<(), StratbenchError>;
}

pub trait ArtifactSource: Send + Sync {
    fn read(&self) -> Result<WideTable, StratbenchError>;

    /// Human-readable location, used in log lines.
    fn describe(&self) -> String;
}
