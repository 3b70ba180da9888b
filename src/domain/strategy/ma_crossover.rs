//! Moving average crossover.
//!
//! Long while SMA(short) > SMA(long), short while SMA(short) < SMA(long),
//! flat when they are equal or either is still warming up.

use super::{SignalGenerator, compare_signal};
use crate::domain::dataset::Partition;
use crate::domain::error::StratbenchError;
use crate::domain::indicator::rolling_mean;

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageCrossover {
    short_window: usize,
    long_window: usize,
}

impl MovingAverageCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self, StratbenchError> {
        if short_window == 0 {
            return Err(invalid("short_window must be positive"));
        }
        if short_window >= long_window {
            return Err(invalid(&format!(
                "short_window ({}) must be less than long_window ({})",
                short_window, long_window
            )));
        }
        Ok(Self {
            short_window,
            long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }
}

impl Default for MovingAverageCrossover {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
        }
    }
}

fn invalid(reason: &str) -> StratbenchError {
    StratbenchError::InvalidParameter {
        strategy: "mavg".into(),
        reason: reason.into(),
    }
}

impl SignalGenerator for MovingAverageCrossover {
    fn partition_signals(&self, partition: Partition<'_>) -> Vec<i8> {
        if partition.len() < self.long_window {
            tracing::debug!(
                instrument = partition.instrument,
                rows = partition.len(),
                window = self.long_window,
                "long window exceeds history, instrument stays flat"
            );
        }

        let closes = partition.closes();
        let short_ma = rolling_mean(&closes, self.short_window);
        let long_ma = rolling_mean(&closes, self.long_window);

        short_ma
            .into_iter()
            .zip(long_ma)
            .map(|(s, l)| compare_signal(s, l))
            .collect()
    }
}
