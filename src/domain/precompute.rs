//! Multi-strategy precomputation.
//!
//! Runs a fixed set of strategies over the whole universe once and outer-joins
//! their per-row outputs on (instrument, date) into a [`WideTable`]. A consumer
//! can then pick any strategy by suffix and recompute only the portfolio curve
//! for a date range.

use crate::domain::dataset::Dataset;
use crate::domain::error::StratbenchError;
use crate::domain::portfolio::{PortfolioPoint, equal_weight_curve};
use crate::domain::returns::StrategyFrame;
use crate::domain::strategy::factory::default_for;
use crate::domain::strategy::{Strategy, StrategyKind};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// The per-strategy columns kept in the artifact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyColumns {
    pub signal: i8,
    pub position: i8,
    pub strategy_return: Option<f64>,
    pub cumulative_strategy_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub date: NaiveDate,
    pub instrument: String,
    pub close: Option<f64>,
    /// One entry per suffix in [`WideTable::suffixes`]; `None` where that
    /// strategy produced no row for this key.
    pub strategies: Vec<Option<StrategyColumns>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WideTable {
    pub suffixes: Vec<String>,
    /// Sorted by (instrument, date).
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn strategy_index(&self, suffix: &str) -> Result<usize, StratbenchError> {
        self.suffixes
            .iter()
            .position(|s| s == suffix)
            .ok_or_else(|| StratbenchError::MissingStrategy {
                suffix: suffix.to_string(),
            })
    }

    /// Equal-weighted curve of one precomputed strategy over
    /// `start <= date <= end`.
    pub fn portfolio_curve(
        &self,
        suffix: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioPoint>, StratbenchError> {
        let idx = self.strategy_index(suffix)?;
        let observations = self
            .rows
            .iter()
            .filter(|r| start.is_none_or(|s| r.date >= s) && end.is_none_or(|e| r.date <= e))
            .map(|r| (r.date, r.strategies[idx].and_then(|c| c.strategy_return)));
        Ok(equal_weight_curve(observations))
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.date).min()?;
        let max = self.rows.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    pub fn instruments(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if out.last() != Some(&row.instrument.as_str()) {
                out.push(&row.instrument);
            }
        }
        out
    }
}

/// The standard configuration set: buy & hold, MA(50,200), RSI(14,30,70),
/// momentum(126, 0).
pub fn default_strategy_set() -> Vec<Strategy> {
    StrategyKind::ALL.iter().map(|k| default_for(*k)).collect()
}

#[derive(Debug)]
pub struct Precomputed {
    pub table: WideTable,
    pub frames: Vec<(String, StrategyFrame)>,
}

/// Runs each strategy independently and joins the results.
///
/// Two strategies with the same suffix are a configuration error since their
/// columns would collide.
pub fn precompute(
    dataset: &Dataset,
    strategies: &[Strategy],
) -> Result<Precomputed, StratbenchError> {
    let mut suffixes: Vec<String> = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        let suffix = strategy.suffix();
        if suffixes.contains(&suffix) {
            return Err(StratbenchError::ConfigInvalid {
                section: "precompute".into(),
                key: "strategies".into(),
                reason: format!("strategy {} listed twice", suffix),
            });
        }
        suffixes.push(suffix);
    }

    tracing::info!(
        strategies = strategies.len(),
        instruments = dataset.partition_count(),
        rows = dataset.len(),
        "precomputing strategy set"
    );

    let frames: Vec<(String, StrategyFrame)> = strategies
        .par_iter()
        .zip(suffixes.par_iter())
        .map(|(strategy, suffix)| (suffix.clone(), strategy.run(dataset)))
        .collect();

    let table = outer_join(&frames);
    Ok(Precomputed { table, frames })
}

/// Outer join on (instrument, date); absent combinations stay `None`.
pub fn outer_join(frames: &[(String, StrategyFrame)]) -> WideTable {
    let width = frames.len();
    let mut joined: BTreeMap<(String, NaiveDate), WideRow> = BTreeMap::new();

    for (idx, (_, frame)) in frames.iter().enumerate() {
        for row in &frame.rows {
            let entry = joined
                .entry((row.instrument.clone(), row.date))
                .or_insert_with(|| WideRow {
                    date: row.date,
                    instrument: row.instrument.clone(),
                    close: None,
                    strategies: vec![None; width],
                });
            if entry.close.is_none() {
                entry.close = Some(row.close);
            }
            entry.strategies[idx] = Some(StrategyColumns {
                signal: row.signal,
                position: row.position,
                strategy_return: row.strategy_return,
                cumulative_strategy_return: row.cumulative_strategy_return,
            });
        }
    }

    WideTable {
        suffixes: frames.iter().map(|(s, _)| s.clone()).collect(),
        rows: joined.into_values().collect(),
    }
}
