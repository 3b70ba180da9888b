//! Canonical price dataset partitioned by instrument.
//!
//! A [`Dataset`] is the read-only input of every strategy: rows sorted by
//! (instrument, date) with no duplicate dates inside an instrument. All
//! indicator and return computations operate on one [`Partition`] at a time.

use crate::domain::error::StratbenchError;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// One (date, instrument) observation with a normalised close.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub instrument: String,
    pub close: f64,
}

impl PriceRow {
    pub fn new(date: NaiveDate, instrument: impl Into<String>, close: f64) -> Self {
        Self {
            date,
            instrument: instrument.into(),
            close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    rows: Vec<PriceRow>,
    /// Start offset of each partition in `rows`, plus a trailing `rows.len()`.
    bounds: Vec<usize>,
}

/// A borrowed view of one instrument's rows, ordered by date.
#[derive(Debug, Clone, Copy)]
pub struct Partition<'a> {
    pub instrument: &'a str,
    pub rows: &'a [PriceRow],
}

impl Partition<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}

impl Dataset {
    /// Builds a dataset from rows in any order.
    ///
    /// Rows are sorted by (instrument, date). Duplicate dates within an
    /// instrument and non-finite closes are rejected.
    pub fn from_rows(mut rows: Vec<PriceRow>) -> Result<Self, StratbenchError> {
        if let Some(bad) = rows.iter().find(|r| !r.close.is_finite()) {
            return Err(StratbenchError::Data {
                reason: format!(
                    "non-finite close for {} on {}",
                    bad.instrument, bad.date
                ),
            });
        }

        rows.sort_by(|a, b| {
            a.instrument
                .cmp(&b.instrument)
                .then_with(|| a.date.cmp(&b.date))
        });

        let mut bounds = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            if i == 0 || rows[i - 1].instrument != row.instrument {
                bounds.push(i);
            } else if rows[i - 1].date == row.date {
                return Err(StratbenchError::DuplicateObservation {
                    instrument: row.instrument.clone(),
                    date: row.date,
                });
            }
        }
        bounds.push(rows.len());

        Ok(Self { rows, bounds })
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn partition_count(&self) -> usize {
        self.bounds.len().saturating_sub(1)
    }

    pub fn partitions(&self) -> impl Iterator<Item = Partition<'_>> + '_ {
        self.bounds.windows(2).map(move |w| {
            let rows = &self.rows[w[0]..w[1]];
            Partition {
                instrument: &rows[0].instrument,
                rows,
            }
        })
    }

    pub fn partition(&self, instrument: &str) -> Option<Partition<'_>> {
        self.partitions().find(|p| p.instrument == instrument)
    }

    pub fn instruments(&self) -> Vec<&str> {
        self.partitions().map(|p| p.instrument).collect()
    }

    /// Distinct dates across all instruments, ascending.
    pub fn timeline(&self) -> Vec<NaiveDate> {
        let unique: BTreeSet<NaiveDate> = self.rows.iter().map(|r| r.date).collect();
        unique.into_iter().collect()
    }
}
