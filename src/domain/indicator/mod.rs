//! Technical indicator library.
//!
//! Every function takes one instrument's ordered values and returns a new
//! series of the same length. `None` marks an undefined value (warm-up or a
//! zero divisor). None of these functions look at more than one partition;
//! callers iterate partitions themselves.

pub mod ema;
pub mod rank;
pub mod roc;
pub mod rsi;
pub mod sma;

pub use ema::exponential_average;
pub use rank::rank_within_group;
pub use roc::percent_change;
pub use rsi::calculate_rsi;
pub use sma::rolling_mean;

/// How much weight a recursive average gives each new observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// alpha = 2 / (span + 1)
    Span(usize),
    /// alpha = 1 / (1 + com)
    CenterOfMass(f64),
    /// Wilder's smoothing over `n` observations: alpha = 1 / n.
    Wilder(usize),
}

impl Smoothing {
    pub fn alpha(&self) -> f64 {
        match *self {
            Smoothing::Span(span) => 2.0 / (span.max(1) as f64 + 1.0),
            Smoothing::CenterOfMass(com) => 1.0 / (1.0 + com.max(0.0)),
            Smoothing::Wilder(n) => 1.0 / n.max(1) as f64,
        }
    }
}
