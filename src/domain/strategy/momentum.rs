//! Time-series momentum.
//!
//! momentum[i] = C[i] / C[i-lookback] - 1. Long when momentum beats the
//! threshold, otherwise flat; never short. With `top_n` set, a row also has
//! to be among the `top_n` strongest instruments on its date.

use super::{FLAT, LONG, SignalGenerator, per_partition};
use crate::domain::dataset::{Dataset, Partition};
use crate::domain::error::StratbenchError;
use crate::domain::indicator::{percent_change, rank_within_group};

pub const DEFAULT_LOOKBACK: usize = 126;
pub const DEFAULT_THRESHOLD: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesMomentum {
    lookback: usize,
    threshold: f64,
    top_n: Option<usize>,
}

impl TimeSeriesMomentum {
    pub fn new(lookback: usize, threshold: f64) -> Result<Self, StratbenchError> {
        if lookback == 0 {
            return Err(invalid("lookback must be positive".into()));
        }
        if !threshold.is_finite() {
            return Err(invalid(format!("threshold must be finite, got {}", threshold)));
        }
        Ok(Self {
            lookback,
            threshold,
            top_n: None,
        })
    }

    /// Restricts longs to the `n` instruments with the highest momentum per date.
    pub fn with_top_n(mut self, n: usize) -> Result<Self, StratbenchError> {
        if n == 0 {
            return Err(invalid("top_n must be positive".into()));
        }
        self.top_n = Some(n);
        Ok(self)
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn top_n(&self) -> Option<usize> {
        self.top_n
    }

    fn momentum(&self, partition: Partition<'_>) -> Vec<Option<f64>> {
        if partition.len() <= self.lookback {
            tracing::debug!(
                instrument = partition.instrument,
                rows = partition.len(),
                lookback = self.lookback,
                "lookback exceeds history, instrument stays flat"
            );
        }
        percent_change(&partition.closes(), self.lookback)
    }

    fn threshold_signal(&self, momentum: Option<f64>) -> i8 {
        match momentum {
            Some(m) if m > self.threshold => LONG,
            _ => FLAT,
        }
    }
}

impl Default for TimeSeriesMomentum {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            threshold: DEFAULT_THRESHOLD,
            top_n: None,
        }
    }
}

fn invalid(reason: String) -> StratbenchError {
    StratbenchError::InvalidParameter {
        strategy: "momentum".into(),
        reason,
    }
}

impl SignalGenerator for TimeSeriesMomentum {
    fn partition_signals(&self, partition: Partition<'_>) -> Vec<i8> {
        self.momentum(partition)
            .into_iter()
            .map(|m| self.threshold_signal(m))
            .collect()
    }

    fn signals(&self, dataset: &Dataset) -> Vec<i8> {
        let Some(top_n) = self.top_n else {
            return per_partition(dataset, |p| self.partition_signals(p));
        };

        let momentum = per_partition(dataset, |p| self.momentum(p));
        let dates: Vec<_> = dataset.rows().iter().map(|r| r.date).collect();
        let ranks = rank_within_group(&momentum, &dates, true);

        momentum
            .into_iter()
            .zip(ranks)
            .map(|(m, rank)| match rank {
                Some(r) if r <= top_n => self.threshold_signal(m),
                _ => FLAT,
            })
            .collect()
    }
}
