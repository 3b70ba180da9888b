//! CSV report writer for single-strategy runs and portfolio curves.

use crate::domain::error::StratbenchError;
use crate::domain::portfolio::PortfolioPoint;
use crate::domain::returns::StrategyFrame;
use crate::ports::report_port::ReportPort;
use std::path::Path;

const FRAME_HEADER: [&str; 10] = [
    "date",
    "instrument",
    "close",
    "signal",
    "position",
    "period_return",
    "strategy_return",
    "cumulative_strategy_return",
    "portfolio_daily_return",
    "portfolio_cumulative_return",
];

const CURVE_HEADER: [&str; 3] = ["date", "daily_return", "cumulative_return"];

pub struct CsvReportAdapter;

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn csv_err(e: csv::Error) -> StratbenchError {
    StratbenchError::Io(std::io::Error::other(e))
}

impl ReportPort for CsvReportAdapter {
    fn write_frame(
        &self,
        frame: &StrategyFrame,
        output_path: &Path,
    ) -> Result<(), StratbenchError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_err)?;
        wtr.write_record(FRAME_HEADER).map_err(csv_err)?;
        for row in &frame.rows {
            wtr.write_record([
                row.date.format("%Y-%m-%d").to_string(),
                row.instrument.clone(),
                row.close.to_string(),
                row.signal.to_string(),
                row.position.to_string(),
                fmt_opt(row.period_return),
                fmt_opt(row.strategy_return),
                row.cumulative_strategy_return.to_string(),
                fmt_opt(row.portfolio_daily_return),
                row.portfolio_cumulative_return.to_string(),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;
        tracing::info!(path = %output_path.display(), rows = frame.rows.len(), "wrote report");
        Ok(())
    }

    fn write_curve(
        &self,
        curve: &[PortfolioPoint],
        output_path: &Path,
    ) -> Result<(), StratbenchError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(csv_err)?;
        wtr.write_record(CURVE_HEADER).map_err(csv_err)?;
        for point in curve {
            wtr.write_record([
                point.date.format("%Y-%m-%d").to_string(),
                fmt_opt(point.daily_return),
                point.cumulative_return.to_string(),
            ])
            .map_err(csv_err)?;
        }
        wtr.flush()?;
        tracing::info!(path = %output_path.display(), points = curve.len(), "wrote curve");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::equal_weight_curve;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn curve_report_has_one_line_per_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("curve.csv");
        let curve = equal_weight_curve(vec![(d(1), None), (d(2), Some(0.5))]);

        CsvReportAdapter.write_curve(&curve, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec!["date,daily_return,cumulative_return", "2024-01-01,,1", "2024-01-02,0.5,1.5"]
        );
    }

    #[test]
    fn frame_report_has_every_column() {
        use crate::domain::dataset::{Dataset, PriceRow};
        use crate::domain::strategy::{BuyAndHold, Strategy};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("frame.csv");
        let ds = Dataset::from_rows(vec![
            PriceRow::new(d(1), "AAPL", 1.0),
            PriceRow::new(d(2), "AAPL", 1.5),
        ])
        .unwrap();
        let frame = Strategy::BuyAndHold(BuyAndHold).run(&ds);

        CsvReportAdapter.write_frame(&frame, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], FRAME_HEADER.join(","));
        assert_eq!(lines[1], "2024-01-01,AAPL,1,1,0,,,1,,1");
        assert_eq!(lines[2], "2024-01-02,AAPL,1.5,1,1,0.5,0.5,1.5,0.5,1.5");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let curve = equal_weight_curve(vec![(d(1), Some(0.1))]);
        let result = CsvReportAdapter.write_curve(&curve, Path::new("/nonexistent/dir/curve.csv"));
        assert!(result.is_err());
    }
}
