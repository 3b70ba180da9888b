#![allow(dead_code)]

use chrono::NaiveDate;
use std::path::Path;
pub use stratbench::domain::dataset::{Dataset, PriceRow};
use stratbench::domain::error::StratbenchError;
use stratbench::ports::price_port::PriceSource;
use std::collections::BTreeMap;

pub fn date(day_offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(day_offset)
}

/// One instrument with consecutive daily closes starting 2024-01-01.
pub fn series(instrument: &str, closes: &[f64]) -> Vec<PriceRow> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceRow::new(date(i as u64), instrument, c))
        .collect()
}

pub fn dataset<C: AsRef<[f64]>>(parts: &[(&str, C)]) -> Dataset {
    let rows = parts
        .iter()
        .flat_map(|(instrument, closes)| series(instrument, closes.as_ref()))
        .collect();
    Dataset::from_rows(rows).unwrap()
}

/// Closes following a geometric walk driven by `returns`, starting at 1.0.
pub fn walk(returns: &[f64]) -> Vec<f64> {
    let mut close = 1.0;
    let mut out = vec![close];
    for r in returns {
        close *= 1.0 + r;
        out.push(close);
    }
    out
}

pub fn write_price_csv(dir: &Path, instrument: &str, closes: &[f64]) {
    let mut content = String::from("Date,Close\n");
    for (i, c) in closes.iter().enumerate() {
        content.push_str(&format!("{},{}\n", date(i as u64), c));
    }
    std::fs::write(dir.join(format!("{}.csv", instrument)), content).unwrap();
}

pub struct MockPriceSource {
    pub data: BTreeMap<String, Vec<(NaiveDate, f64)>>,
}

impl MockPriceSource {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    pub fn with_closes(mut self, instrument: &str, closes: &[f64]) -> Self {
        let rows = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| (date(i as u64), c))
            .collect();
        self.data.insert(instrument.to_string(), rows);
        self
    }
}

impl PriceSource for MockPriceSource {
    fn list_instruments(&self) -> Result<Vec<String>, StratbenchError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn load(
        &self,
        instruments: &[String],
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Dataset, StratbenchError> {
        let mut rows = Vec::new();
        for instrument in instruments {
            let closes = self.data.get(instrument).ok_or_else(|| StratbenchError::Data {
                reason: format!("no data for {}", instrument),
            })?;
            rows.extend(
                closes
                    .iter()
                    .filter(|(d, _)| {
                        start_date.is_none_or(|s| *d >= s) && end_date.is_none_or(|e| *d <= e)
                    })
                    .map(|(d, c)| PriceRow::new(*d, instrument.as_str(), *c)),
            );
        }
        Dataset::from_rows(rows)
    }
}
