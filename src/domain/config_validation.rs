//! Configuration validation.
//!
//! Turns the raw INI keys into typed settings before any data is loaded, so
//! a bad file fails fast with the offending section and key.

use crate::domain::error::StratbenchError;
use crate::domain::strategy::factory::{self, read_f64};
use crate::domain::strategy::{Strategy, StrategyKind};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_ARTIFACT_PATH: &str = "precomputed_signals.csv";
pub const DEFAULT_LOG_LEVEL: &str = "info";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

const KNOWN_SECTIONS: [&str; 7] = [
    "data",
    "precompute",
    "mavg",
    "rsi",
    "momentum",
    "report",
    "logging",
];

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    /// `None` means every instrument file found in `dir`.
    pub instruments: Option<Vec<String>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Checks every section the CLI reads and builds each configured strategy.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    for section in unknown_sections(config) {
        tracing::warn!(section = %section, "ignoring unknown config section");
    }
    data_settings(config)?;
    configured_strategies(config)?;
    risk_free_rate(config)?;
    log_level(config)?;
    Ok(())
}

/// Sections no part of stratbench reads; usually a typo.
pub fn unknown_sections(config: &dyn ConfigPort) -> Vec<String> {
    config
        .sections()
        .into_iter()
        .filter(|s| s != "default" && !KNOWN_SECTIONS.contains(&s.as_str()))
        .collect()
}

pub fn data_settings(config: &dyn ConfigPort) -> Result<DataSettings, StratbenchError> {
    let dir = non_empty(config, "data", "dir").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

    let instruments = non_empty(config, "data", "instruments")
        .map(|list| parse_instruments(&list))
        .transpose()?;

    let start_date = parse_date(config, "data", "start_date")?;
    let end_date = parse_date(config, "data", "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(StratbenchError::ConfigInvalid {
                section: "data".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
    }

    Ok(DataSettings {
        dir: PathBuf::from(dir),
        instruments,
        start_date,
        end_date,
    })
}

/// Comma separated instrument list: trimmed, upper-cased, no empty tokens,
/// no duplicates.
pub fn parse_instruments(input: &str) -> Result<Vec<String>, StratbenchError> {
    let mut instruments = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(StratbenchError::ConfigInvalid {
                section: "data".to_string(),
                key: "instruments".to_string(),
                reason: "empty token in instrument list".to_string(),
            });
        }
        let instrument = trimmed.to_uppercase();
        if !seen.insert(instrument.clone()) {
            return Err(StratbenchError::ConfigInvalid {
                section: "data".to_string(),
                key: "instruments".to_string(),
                reason: format!("duplicate instrument: {}", instrument),
            });
        }
        instruments.push(instrument);
    }

    Ok(instruments)
}

/// The `[precompute] strategies` list built through the factory, or every
/// registered strategy when the key is absent.
pub fn configured_strategies(config: &dyn ConfigPort) -> Result<Vec<Strategy>, StratbenchError> {
    let names: Vec<String> = match non_empty(config, "precompute", "strategies") {
        Some(list) => {
            let mut names = Vec::new();
            for token in list.split(',') {
                let name = token.trim();
                if name.is_empty() {
                    return Err(StratbenchError::ConfigInvalid {
                        section: "precompute".to_string(),
                        key: "strategies".to_string(),
                        reason: "empty token in strategy list".to_string(),
                    });
                }
                names.push(name.to_string());
            }
            names
        }
        None => StrategyKind::ALL.iter().map(|k| k.key().to_string()).collect(),
    };

    names
        .iter()
        .map(|name| factory::create(name, config))
        .collect()
}

pub fn artifact_path(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        non_empty(config, "precompute", "output")
            .unwrap_or_else(|| DEFAULT_ARTIFACT_PATH.to_string()),
    )
}

pub fn risk_free_rate(config: &dyn ConfigPort) -> Result<f64, StratbenchError> {
    let value = read_f64(config, "report", "risk_free_rate")?.unwrap_or(0.0);
    check_risk_free_rate(value)
}

/// Annual risk-free rate in [0, 1); NaN is rejected.
pub fn check_risk_free_rate(value: f64) -> Result<f64, StratbenchError> {
    if !(0.0..1.0).contains(&value) {
        return Err(StratbenchError::ConfigInvalid {
            section: "report".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(value)
}

pub fn log_level(config: &dyn ConfigPort) -> Result<String, StratbenchError> {
    let level = non_empty(config, "logging", "level")
        .map(|l| l.to_lowercase())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(StratbenchError::ConfigInvalid {
            section: "logging".to_string(),
            key: "level".to_string(),
            reason: format!("expected one of {}, got {:?}", LOG_LEVELS.join("/"), level),
        });
    }
    Ok(level)
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    field: &str,
) -> Result<Option<NaiveDate>, StratbenchError> {
    non_empty(config, section, field)
        .map(|s| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                StratbenchError::ConfigInvalid {
                    section: section.to_string(),
                    key: field.to_string(),
                    reason: format!("invalid {} format, expected YYYY-MM-DD", field),
                }
            })
        })
        .transpose()
}
