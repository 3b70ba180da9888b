//! RSI mean reversion: long below `buy_level`, short above `sell_level`.

use super::{FLAT, LONG, SHORT, SignalGenerator};
use crate::domain::dataset::Partition;
use crate::domain::error::StratbenchError;
use crate::domain::indicator::calculate_rsi;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_BUY_LEVEL: f64 = 30.0;
pub const DEFAULT_SELL_LEVEL: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RsiMeanReversion {
    period: usize,
    buy_level: f64,
    sell_level: f64,
}

impl RsiMeanReversion {
    pub fn new(period: usize, buy_level: f64, sell_level: f64) -> Result<Self, StratbenchError> {
        let invalid = |reason: String| StratbenchError::InvalidParameter {
            strategy: "rsi".into(),
            reason,
        };

        if period == 0 {
            return Err(invalid("period must be positive".into()));
        }
        if !(0.0..=100.0).contains(&buy_level) || !(0.0..=100.0).contains(&sell_level) {
            return Err(invalid(format!(
                "levels must lie in [0, 100], got buy={} sell={}",
                buy_level, sell_level
            )));
        }
        if buy_level >= sell_level {
            return Err(invalid(format!(
                "buy_level ({}) must be below sell_level ({})",
                buy_level, sell_level
            )));
        }

        Ok(Self {
            period,
            buy_level,
            sell_level,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn buy_level(&self) -> f64 {
        self.buy_level
    }

    pub fn sell_level(&self) -> f64 {
        self.sell_level
    }

    fn signal_for(&self, rsi: Option<f64>) -> i8 {
        match rsi {
            Some(v) if v < self.buy_level => LONG,
            Some(v) if v > self.sell_level => SHORT,
            _ => FLAT,
        }
    }
}

impl Default for RsiMeanReversion {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            buy_level: DEFAULT_BUY_LEVEL,
            sell_level: DEFAULT_SELL_LEVEL,
        }
    }
}

impl SignalGenerator for RsiMeanReversion {
    fn partition_signals(&self, partition: Partition<'_>) -> Vec<i8> {
        if partition.len() <= self.period {
            tracing::debug!(
                instrument = partition.instrument,
                rows = partition.len(),
                period = self.period,
                "RSI period exceeds history, instrument stays flat"
            );
        }

        calculate_rsi(&partition.closes(), self.period)
            .into_iter()
            .map(|rsi| self.signal_for(rsi))
            .collect()
    }
}
