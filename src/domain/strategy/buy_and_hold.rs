//! Passive benchmark: long on every row.

use super::{LONG, SignalGenerator};
use crate::domain::dataset::Partition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuyAndHold;

impl SignalGenerator for BuyAndHold {
    fn partition_signals(&self, partition: Partition<'_>) -> Vec<i8> {
        vec![LONG; partition.len()]
    }
}
