//! Summary statistics of a portfolio curve.

use super::portfolio::PortfolioPoint;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    /// Longest run of consecutive points below a previous peak.
    pub max_drawdown_duration: usize,
    pub trading_days: usize,
}

impl Metrics {
    pub fn compute(curve: &[PortfolioPoint], risk_free_rate: f64) -> Self {
        let final_value = curve.last().map(|p| p.cumulative_return).unwrap_or(1.0);
        let total_return = final_value - 1.0;

        let trading_days = curve.len();
        let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && final_value > 0.0 {
            final_value.powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(curve);

        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let returns: Vec<f64> = curve.iter().filter_map(|p| p.daily_return).collect();
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(&returns, daily_rf);

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            trading_days,
        }
    }
}

fn compute_drawdown(curve: &[PortfolioPoint]) -> (f64, usize) {
    let Some(first) = curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.cumulative_return.max(1.0);
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0usize;
    let mut current_dd_duration = 0usize;

    for point in curve {
        let value = point.cumulative_return;
        if value >= peak {
            peak = value;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
            current_dd_duration += 1;
            if current_dd_duration > max_dd_duration {
                max_dd_duration = current_dd_duration;
            }
        }
    }

    (max_dd, max_dd_duration)
}

fn compute_risk_adjusted(returns: &[f64], daily_rf: f64) -> (f64, f64) {
    if returns.len() < 2 {
        return (0.0, 0.0);
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;

    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    // Identical returns still leave rounding residue in the variance.
    let tolerance = f64::EPSILON * mean.abs().max(daily_rf.abs()).max(1.0);

    let excess_return = mean - daily_rf;

    let sharpe = if stddev > tolerance {
        (excess_return / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside_sq_sum: f64 = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum();
    let downside_stddev = (downside_sq_sum / n).sqrt();

    let sortino = if downside_stddev > tolerance {
        (excess_return / downside_stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (sharpe, sortino)
}
