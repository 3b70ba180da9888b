//! Wide-table artifact stored as a single CSV file.
//!
//! Layout: `date,instrument,close` followed, for each strategy suffix `s`, by
//! `signal_s,pos_s,strat_rtn_s,cumulative_rtn_s`. Missing values are empty
//! cells. A strategy with no row for a key leaves all four cells empty.

use crate::domain::error::StratbenchError;
use crate::domain::precompute::{StrategyColumns, WideRow, WideTable};
use crate::ports::artifact_port::{ArtifactSink, ArtifactSource};
use chrono::NaiveDate;
use std::path::PathBuf;

const KEY_COLUMNS: [&str; 3] = ["date", "instrument", "close"];
const GROUP_PREFIXES: [&str; 4] = ["signal_", "pos_", "strat_rtn_", "cumulative_rtn_"];

pub struct CsvArtifactStore {
    path: PathBuf,
}

impl CsvArtifactStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn artifact_err(&self, reason: impl std::fmt::Display) -> StratbenchError {
        StratbenchError::Artifact {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }
}

fn header(suffixes: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = KEY_COLUMNS.iter().map(|c| c.to_string()).collect();
    for suffix in suffixes {
        columns.extend(GROUP_PREFIXES.iter().map(|p| format!("{}{}", p, suffix)));
    }
    columns
}

/// Recovers the suffix list from a header row.
fn parse_header(columns: &[&str]) -> Result<Vec<String>, String> {
    if columns.len() < KEY_COLUMNS.len() || columns[..KEY_COLUMNS.len()] != KEY_COLUMNS {
        return Err(format!("header must start with {}", KEY_COLUMNS.join(",")));
    }
    let rest = &columns[KEY_COLUMNS.len()..];
    if rest.len() % GROUP_PREFIXES.len() != 0 {
        return Err(format!("{} strategy columns do not form complete groups", rest.len()));
    }

    let mut suffixes = Vec::with_capacity(rest.len() / GROUP_PREFIXES.len());
    for group in rest.chunks(GROUP_PREFIXES.len()) {
        let suffix = group[0]
            .strip_prefix(GROUP_PREFIXES[0])
            .ok_or_else(|| format!("expected a signal_ column, got {}", group[0]))?;
        for (column, prefix) in group.iter().zip(GROUP_PREFIXES).skip(1) {
            if column.strip_prefix(prefix) != Some(suffix) {
                return Err(format!("expected {}{}, got {}", prefix, suffix, column));
            }
        }
        if suffixes.iter().any(|s| s == suffix) {
            return Err(format!("strategy {} appears twice", suffix));
        }
        suffixes.push(suffix.to_string());
    }
    Ok(suffixes)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_opt<T: std::str::FromStr>(cell: &str, column: &str) -> Result<Option<T>, String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse()
        .map(Some)
        .map_err(|_| format!("invalid {} value {:?}", column, cell))
}

fn parse_group(cells: &[&str], suffix: &str) -> Result<Option<StrategyColumns>, String> {
    let signal: Option<i8> = parse_opt(cells[0], &format!("signal_{}", suffix))?;
    let Some(signal) = signal else {
        return Ok(None);
    };
    let position: i8 = parse_opt(cells[1], &format!("pos_{}", suffix))?
        .ok_or_else(|| format!("pos_{} is empty while signal_{} is set", suffix, suffix))?;
    let strategy_return = parse_opt(cells[2], &format!("strat_rtn_{}", suffix))?;
    let cumulative_strategy_return = parse_opt(cells[3], &format!("cumulative_rtn_{}", suffix))?
        .ok_or_else(|| format!("cumulative_rtn_{} is empty", suffix))?;

    Ok(Some(StrategyColumns {
        signal,
        position,
        strategy_return,
        cumulative_strategy_return,
    }))
}

impl ArtifactSink for CsvArtifactStore {
    fn write(&self, table: &WideTable) -> Result<(), StratbenchError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut wtr = csv::Writer::from_path(&self.path).map_err(|e| self.artifact_err(e))?;
        wtr.write_record(header(&table.suffixes))
            .map_err(|e| self.artifact_err(e))?;

        for row in &table.rows {
            let mut record = vec![
                row.date.format("%Y-%m-%d").to_string(),
                row.instrument.clone(),
                fmt_opt(row.close),
            ];
            for cols in &row.strategies {
                match cols {
                    Some(c) => record.extend([
                        c.signal.to_string(),
                        c.position.to_string(),
                        fmt_opt(c.strategy_return),
                        c.cumulative_strategy_return.to_string(),
                    ]),
                    None => record.extend(std::iter::repeat_n(String::new(), 4)),
                }
            }
            wtr.write_record(&record).map_err(|e| self.artifact_err(e))?;
        }

        wtr.flush()?;
        tracing::info!(
            path = %self.path.display(),
            rows = table.rows.len(),
            strategies = table.suffixes.len(),
            "wrote artifact"
        );
        Ok(())
    }
}

impl ArtifactSource for CsvArtifactStore {
    fn read(&self) -> Result<WideTable, StratbenchError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| self.artifact_err(e))?;
        let headers = rdr.headers().map_err(|e| self.artifact_err(e))?.clone();
        let columns: Vec<&str> = headers.iter().map(str::trim).collect();
        let suffixes = parse_header(&columns).map_err(|e| self.artifact_err(e))?;

        let mut rows = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.artifact_err(e))?;
            let cells: Vec<&str> = record.iter().collect();
            let row = parse_row(&cells, &suffixes)
                .map_err(|e| self.artifact_err(format!("record {}: {}", line + 1, e)))?;
            rows.push(row);
        }

        rows.sort_by(|a, b| (&a.instrument, a.date).cmp(&(&b.instrument, b.date)));
        Ok(WideTable { suffixes, rows })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn parse_row(cells: &[&str], suffixes: &[String]) -> Result<WideRow, String> {
    let date = NaiveDate::parse_from_str(cells[0].trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date {:?}", cells[0]))?;
    let instrument = cells[1].trim().to_string();
    if instrument.is_empty() {
        return Err("empty instrument".to_string());
    }
    let close = parse_opt(cells[2], "close")?;

    let strategies = cells[KEY_COLUMNS.len()..]
        .chunks(GROUP_PREFIXES.len())
        .zip(suffixes)
        .map(|(group, suffix)| parse_group(group, suffix))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(WideRow {
        date,
        instrument,
        close,
        strategies,
    })
}
