//! Strategy factory keyed by registry name.
//!
//! Parameters come from the INI section named after the strategy key
//! (`[mavg]`, `[rsi]`, `[momentum]`). Absent keys take the defaults; keys that
//! are present but unparsable are configuration errors.

use super::{
    BuyAndHold, MovingAverageCrossover, RsiMeanReversion, Strategy, StrategyKind,
    TimeSeriesMomentum, ma_crossover, momentum, rsi_reversion,
};
use crate::domain::error::StratbenchError;
use crate::ports::config_port::ConfigPort;

pub fn create(name: &str, config: &dyn ConfigPort) -> Result<Strategy, StratbenchError> {
    let kind: StrategyKind = name.parse()?;
    let section = kind.key();

    let strategy = match kind {
        StrategyKind::BuyAndHold => Strategy::BuyAndHold(BuyAndHold),
        StrategyKind::MovingAverageCrossover => {
            let short = read_usize(config, section, "short_window")?
                .unwrap_or(ma_crossover::DEFAULT_SHORT_WINDOW);
            let long = read_usize(config, section, "long_window")?
                .unwrap_or(ma_crossover::DEFAULT_LONG_WINDOW);
            Strategy::MovingAverageCrossover(MovingAverageCrossover::new(short, long)?)
        }
        StrategyKind::RsiMeanReversion => {
            let period =
                read_usize(config, section, "period")?.unwrap_or(rsi_reversion::DEFAULT_PERIOD);
            let buy = read_f64(config, section, "buy_level")?
                .unwrap_or(rsi_reversion::DEFAULT_BUY_LEVEL);
            let sell = read_f64(config, section, "sell_level")?
                .unwrap_or(rsi_reversion::DEFAULT_SELL_LEVEL);
            Strategy::RsiMeanReversion(RsiMeanReversion::new(period, buy, sell)?)
        }
        StrategyKind::TimeSeriesMomentum => {
            let lookback =
                read_usize(config, section, "lookback")?.unwrap_or(momentum::DEFAULT_LOOKBACK);
            let threshold = read_f64(config, section, "threshold")?
                .unwrap_or(momentum::DEFAULT_THRESHOLD);
            let mut strat = TimeSeriesMomentum::new(lookback, threshold)?;
            if let Some(n) = read_usize(config, section, "top_n")? {
                strat = strat.with_top_n(n)?;
            }
            Strategy::TimeSeriesMomentum(strat)
        }
    };

    Ok(strategy)
}

pub fn create_default(name: &str) -> Result<Strategy, StratbenchError> {
    let kind: StrategyKind = name.parse()?;
    Ok(default_for(kind))
}

pub fn default_for(kind: StrategyKind) -> Strategy {
    match kind {
        StrategyKind::BuyAndHold => Strategy::BuyAndHold(BuyAndHold),
        StrategyKind::MovingAverageCrossover => {
            Strategy::MovingAverageCrossover(MovingAverageCrossover::default())
        }
        StrategyKind::RsiMeanReversion => Strategy::RsiMeanReversion(RsiMeanReversion::default()),
        StrategyKind::TimeSeriesMomentum => {
            Strategy::TimeSeriesMomentum(TimeSeriesMomentum::default())
        }
    }
}

fn read_raw(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<usize>, StratbenchError> {
    read_raw(config, section, key)
        .map(|v| {
            v.parse::<usize>()
                .map_err(|_| StratbenchError::ConfigInvalid {
                    section: section.into(),
                    key: key.into(),
                    reason: format!("expected a non-negative integer, got {:?}", v),
                })
        })
        .transpose()
}

pub(crate) fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, StratbenchError> {
    read_raw(config, section, key)
        .map(|v| match v.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(n),
            _ => Err(StratbenchError::ConfigInvalid {
                section: section.into(),
                key: key.into(),
                reason: format!("expected a number, got {:?}", v),
            }),
        })
        .transpose()
}
