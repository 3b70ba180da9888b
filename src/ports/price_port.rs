//! Price ingestion port trait.

use crate::domain::dataset::Dataset;
use crate::domain::error::StratbenchError;
use chrono::NaiveDate;

/// Supplies the canonical dataset: closes normalised to 1.0 at each
/// instrument's first observation, sorted by (instrument, date).
pub trait PriceSource {
    fn list_instruments(&self) -> Result<Vec<String>, StratbenchError>;

    fn load(
        &self,
        instruments: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Dataset, StratbenchError>;
}
