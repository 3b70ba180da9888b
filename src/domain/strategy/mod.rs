//! Strategy abstraction.
//!
//! A strategy only decides a signal in {-1, 0, 1} for every row. The shared
//! pipeline lags that signal by one row per instrument to get the position
//! and then hands the frame to [`compute_returns`](crate::domain::returns::compute_returns).

pub mod buy_and_hold;
pub mod factory;
pub mod ma_crossover;
pub mod momentum;
pub mod rsi_reversion;

pub use buy_and_hold::BuyAndHold;
pub use ma_crossover::MovingAverageCrossover;
pub use momentum::TimeSeriesMomentum;
pub use rsi_reversion::RsiMeanReversion;

use crate::domain::dataset::{Dataset, Partition};
use crate::domain::error::StratbenchError;
use crate::domain::returns::{StrategyFrame, compute_returns};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

pub const LONG: i8 = 1;
pub const FLAT: i8 = 0;
pub const SHORT: i8 = -1;

/// Per-instrument signal generation.
pub trait SignalGenerator: Send + Sync {
    /// One signal per row of `partition`. Rows whose inputs are still in
    /// warm-up must be `FLAT`.
    fn partition_signals(&self, partition: Partition<'_>) -> Vec<i8>;

    /// Signals aligned with `dataset.rows()`.
    fn signals(&self, dataset: &Dataset) -> Vec<i8> {
        per_partition(dataset, |p| self.partition_signals(p))
    }
}

/// Runs `f` over every partition in parallel and concatenates the results in
/// partition order.
pub(crate) fn per_partition<T, F>(dataset: &Dataset, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(Partition<'_>) -> Vec<T> + Sync,
{
    let partitions: Vec<Partition<'_>> = dataset.partitions().collect();
    partitions
        .par_iter()
        .map(|p| f(*p))
        .collect::<Vec<Vec<T>>>()
        .into_iter()
        .flatten()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    BuyAndHold,
    MovingAverageCrossover,
    RsiMeanReversion,
    TimeSeriesMomentum,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::BuyAndHold,
        StrategyKind::MovingAverageCrossover,
        StrategyKind::RsiMeanReversion,
        StrategyKind::TimeSeriesMomentum,
    ];

    /// Registry key used by the factory and in config files.
    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::BuyAndHold => "buy_and_hold",
            StrategyKind::MovingAverageCrossover => "mavg",
            StrategyKind::RsiMeanReversion => "rsi",
            StrategyKind::TimeSeriesMomentum => "momentum",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StrategyKind {
    type Err = StratbenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.key() == name)
            .ok_or_else(|| StratbenchError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    BuyAndHold(BuyAndHold),
    MovingAverageCrossover(MovingAverageCrossover),
    RsiMeanReversion(RsiMeanReversion),
    TimeSeriesMomentum(TimeSeriesMomentum),
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::BuyAndHold(_) => StrategyKind::BuyAndHold,
            Strategy::MovingAverageCrossover(_) => StrategyKind::MovingAverageCrossover,
            Strategy::RsiMeanReversion(_) => StrategyKind::RsiMeanReversion,
            Strategy::TimeSeriesMomentum(_) => StrategyKind::TimeSeriesMomentum,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Strategy::BuyAndHold(_) => "Buy & Hold",
            Strategy::MovingAverageCrossover(_) => "MA Crossover",
            Strategy::RsiMeanReversion(_) => "RSI Oversold/Overbought",
            Strategy::TimeSeriesMomentum(_) => "Momentum (ROC)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::BuyAndHold(_) => "Passive benchmark, always long",
            Strategy::MovingAverageCrossover(_) => {
                "Trend following: long when the short MA is above the long MA, short when below"
            }
            Strategy::RsiMeanReversion(_) => {
                "Mean reversion: long when oversold, short when overbought"
            }
            Strategy::TimeSeriesMomentum(_) => {
                "Time-series momentum: long when the lookback return beats the threshold"
            }
        }
    }

    /// Column suffix identifying this configuration in a wide artifact.
    pub fn suffix(&self) -> String {
        match self {
            Strategy::BuyAndHold(_) => "buy_and_hold".to_string(),
            Strategy::MovingAverageCrossover(s) => {
                format!("mavg_{}_{}", s.short_window(), s.long_window())
            }
            Strategy::RsiMeanReversion(s) => format!(
                "rsi_{}_{}_{}",
                s.period(),
                s.buy_level(),
                s.sell_level()
            ),
            Strategy::TimeSeriesMomentum(s) => match s.top_n() {
                Some(n) => format!("momentum_{}_{}_top{}", s.lookback(), s.threshold(), n),
                None => format!("momentum_{}_{}", s.lookback(), s.threshold()),
            },
        }
    }

    fn generator(&self) -> &dyn SignalGenerator {
        match self {
            Strategy::BuyAndHold(s) => s,
            Strategy::MovingAverageCrossover(s) => s,
            Strategy::RsiMeanReversion(s) => s,
            Strategy::TimeSeriesMomentum(s) => s,
        }
    }

    /// Attaches `signal` and the one-row-lagged `position` to every row.
    pub fn compute_signals(&self, dataset: &Dataset) -> SignalFrame {
        let signals = self.generator().signals(dataset);
        tracing::debug!(
            strategy = %self.suffix(),
            rows = dataset.len(),
            instruments = dataset.partition_count(),
            "computed signals"
        );
        SignalFrame::from_signals(dataset, &signals)
    }

    pub fn run(&self, dataset: &Dataset) -> StrategyFrame {
        compute_returns(&self.compute_signals(dataset))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name(), self.suffix())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub instrument: String,
    pub close: f64,
    pub signal: i8,
    pub position: i8,
}

/// Dataset rows with signals and positions, same order as the input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalFrame {
    pub rows: Vec<SignalRow>,
}

impl SignalFrame {
    fn from_signals(dataset: &Dataset, signals: &[i8]) -> Self {
        debug_assert_eq!(signals.len(), dataset.len());

        let mut rows = Vec::with_capacity(dataset.len());
        let mut offset = 0;
        for partition in dataset.partitions() {
            let part_signals = &signals[offset..offset + partition.len()];
            let positions = lag_signals(part_signals);
            for ((row, &signal), position) in
                partition.rows.iter().zip(part_signals).zip(positions)
            {
                rows.push(SignalRow {
                    date: row.date,
                    instrument: row.instrument.clone(),
                    close: row.close,
                    signal,
                    position,
                });
            }
            offset += partition.len();
        }

        Self { rows }
    }

    /// Consecutive runs of rows sharing an instrument.
    pub fn partitions(&self) -> impl Iterator<Item = &[SignalRow]> + '_ {
        self.rows.chunk_by(|a, b| a.instrument == b.instrument)
    }
}

/// position[0] = FLAT, position[t] = signal[t-1].
pub fn lag_signals(signals: &[i8]) -> Vec<i8> {
    let mut positions = Vec::with_capacity(signals.len());
    if !signals.is_empty() {
        positions.push(FLAT);
        positions.extend_from_slice(&signals[..signals.len() - 1]);
    }
    positions
}

/// Maps an optional comparison of two indicator values to a signal.
pub(crate) fn compare_signal(left: Option<f64>, right: Option<f64>) -> i8 {
    match (left, right) {
        (Some(l), Some(r)) if l > r => LONG,
        (Some(l), Some(r)) if l < r => SHORT,
        _ => FLAT,
    }
}
