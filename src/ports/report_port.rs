//! Tabular report output port trait.

use crate::domain::error::StratbenchError;
use crate::domain::portfolio::PortfolioPoint;
use crate::domain::returns::StrategyFrame;
use std::path::Path;

/// Port for writing strategy results.
pub trait ReportPort {
    /// Long-format table with every derived column.
    fn write_frame(
        &self,
        frame: &StrategyFrame,
        output_path: &Path,
    ) -> Result<(), StratbenchError>;

    fn write_curve(
        &self,
        curve: &[PortfolioPoint],
        output_path: &Path,
    ) -> Result<(), StratbenchError>;
}
