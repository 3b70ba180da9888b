//! Shared returns pipeline.
//!
//! Every strategy goes through the same steps once its positions are known:
//! per-instrument period return, strategy return (position x period return),
//! per-instrument compounding, then the equal-weighted portfolio curve merged
//! back onto each row by date.

use crate::domain::indicator::percent_change;
use crate::domain::portfolio::{PortfolioPoint, equal_weight_curve, point_on};
use crate::domain::strategy::{SignalFrame, SignalRow};
use chrono::NaiveDate;
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRow {
    pub date: NaiveDate,
    pub instrument: String,
    pub close: f64,
    pub signal: i8,
    pub position: i8,
    pub period_return: Option<f64>,
    pub strategy_return: Option<f64>,
    pub cumulative_strategy_return: f64,
    pub portfolio_daily_return: Option<f64>,
    pub portfolio_cumulative_return: f64,
}

/// Result of running one strategy over a dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyFrame {
    pub rows: Vec<StrategyRow>,
    pub portfolio: Vec<PortfolioPoint>,
}

impl StrategyFrame {
    pub fn partition(&self, instrument: &str) -> Vec<&StrategyRow> {
        self.rows
            .iter()
            .filter(|r| r.instrument == instrument)
            .collect()
    }

    /// Final per-instrument cumulative strategy return, in instrument order.
    pub fn final_cumulative(&self) -> Vec<(&str, f64)> {
        self.rows
            .chunk_by(|a, b| a.instrument == b.instrument)
            .filter_map(|part| {
                part.last()
                    .map(|r| (r.instrument.as_str(), r.cumulative_strategy_return))
            })
            .collect()
    }
}

pub fn compute_returns(frame: &SignalFrame) -> StrategyFrame {
    let partitions: Vec<&[SignalRow]> = frame.partitions().collect();
    let per_instrument: Vec<Vec<(Option<f64>, Option<f64>, f64)>> = partitions
        .par_iter()
        .map(|rows| instrument_returns(rows))
        .collect();

    let portfolio = equal_weight_curve(
        partitions
            .iter()
            .zip(&per_instrument)
            .flat_map(|(rows, rets)| rows.iter().zip(rets).map(|(r, ret)| (r.date, ret.1))),
    );

    let mut rows = Vec::with_capacity(frame.rows.len());
    for (part, rets) in partitions.iter().zip(per_instrument) {
        for (row, (period_return, strategy_return, cumulative)) in part.iter().zip(rets) {
            let point = point_on(&portfolio, row.date);
            rows.push(StrategyRow {
                date: row.date,
                instrument: row.instrument.clone(),
                close: row.close,
                signal: row.signal,
                position: row.position,
                period_return,
                strategy_return,
                cumulative_strategy_return: cumulative,
                portfolio_daily_return: point.and_then(|p| p.daily_return),
                portfolio_cumulative_return: point.map_or(1.0, |p| p.cumulative_return),
            });
        }
    }

    StrategyFrame { rows, portfolio }
}

/// (period_return, strategy_return, cumulative_strategy_return) per row of
/// one instrument. Undefined strategy returns compound as zero.
fn instrument_returns(rows: &[SignalRow]) -> Vec<(Option<f64>, Option<f64>, f64)> {
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
    let period_returns = percent_change(&closes, 1);

    let mut cumulative = 1.0;
    rows.iter()
        .zip(period_returns)
        .map(|(row, period_return)| {
            let strategy_return = period_return.map(|r| f64::from(row.position) * r);
            cumulative *= 1.0 + strategy_return.unwrap_or(0.0);
            (period_return, strategy_return, cumulative)
        })
        .collect()
}
