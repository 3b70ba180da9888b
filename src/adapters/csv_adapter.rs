//! CSV price ingestion adapter.
//!
//! One `<INSTRUMENT>.csv` file per instrument with at least a `Date` and a
//! `Close` column. Lines whose date cell does not parse (the secondary header
//! rows some downloaders emit) are skipped.

use crate::domain::dataset::{Dataset, PriceRow};
use crate::domain::error::StratbenchError;
use crate::ports::price_port::PriceSource;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceSource {
    base_path: PathBuf,
}

impl CsvPriceSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument))
    }

    /// Raw (date, close) pairs of one file, sorted by date.
    fn read_closes(&self, instrument: &str) -> Result<Vec<(NaiveDate, f64)>, StratbenchError> {
        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| StratbenchError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| StratbenchError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?
            .clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| StratbenchError::Data {
                    reason: format!("{}: missing {} column", path.display(), name),
                })
        };
        let date_idx = column("date")?;
        let close_idx = column("close")?;

        let mut closes = Vec::new();
        let mut skipped = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| StratbenchError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let Some(date) = record.get(date_idx).and_then(parse_date) else {
                skipped += 1;
                continue;
            };

            let raw = record.get(close_idx).unwrap_or("").trim();
            let close: f64 = raw.parse().map_err(|_| StratbenchError::Data {
                reason: format!(
                    "{}: invalid close value {:?} on {}",
                    path.display(),
                    raw,
                    date
                ),
            })?;
            closes.push((date, close));
        }

        if skipped > 0 {
            tracing::debug!(instrument, skipped, "skipped rows without a date");
        }

        closes.sort_by_key(|(date, _)| *date);
        Ok(closes)
    }
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    let day = cell.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

impl PriceSource for CsvPriceSource {
    fn list_instruments(&self) -> Result<Vec<String>, StratbenchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StratbenchError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut instruments = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(".csv") {
                if !stem.is_empty() {
                    instruments.push(stem.to_string());
                }
            }
        }

        instruments.sort();
        Ok(instruments)
    }

    fn load(
        &self,
        instruments: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Dataset, StratbenchError> {
        let mut rows = Vec::new();

        for instrument in instruments {
            let closes: Vec<(NaiveDate, f64)> = self
                .read_closes(instrument)?
                .into_iter()
                .filter(|(d, _)| {
                    start_date.is_none_or(|s| *d >= s) && end_date.is_none_or(|e| *d <= e)
                })
                .collect();

            let Some(&(first_date, base)) = closes.first() else {
                tracing::warn!(instrument = %instrument, "no observations in range, skipping");
                continue;
            };
            if !base.is_finite() || base == 0.0 {
                return Err(StratbenchError::Data {
                    reason: format!(
                        "{}: first close on {} is {}, cannot normalise",
                        instrument, first_date, base
                    ),
                });
            }

            tracing::debug!(instrument = %instrument, rows = closes.len(), "loaded prices");
            rows.extend(
                closes
                    .into_iter()
                    .map(|(date, close)| PriceRow::new(date, instrument.as_str(), close / base)),
            );
        }

        Dataset::from_rows(rows)
    }
}
