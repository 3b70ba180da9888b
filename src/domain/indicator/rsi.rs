//! RSI (Relative Strength Index) with Wilder's smoothing.
//!
//! gain[i] = max(C[i] - C[i-1], 0), loss[i] = max(C[i-1] - C[i], 0)
//! avg_gain/avg_loss: simple mean of the first n changes, then
//! avg = (prev_avg * (n-1) + current) / n.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n values are undefined (n price changes are needed).

use super::Smoothing;
use super::ema::exponential_average;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 {
            gains.push(None);
            losses.push(None);
        } else {
            let change = closes[i] - closes[i - 1];
            gains.push(Some(change.max(0.0)));
            losses.push(Some((-change).max(0.0)));
        }
    }

    let avg_gain = exponential_average(&gains, Smoothing::Wilder(period), period);
    let avg_loss = exponential_average(&losses, Smoothing::Wilder(period), period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => Some(rsi_from_averages(*g, *l)),
            _ => None,
        })
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
