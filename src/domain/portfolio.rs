//! Equal-weighted portfolio curve.
//!
//! For each date the daily return is the plain mean of every defined
//! per-instrument strategy return on that date. Instruments with no row, or
//! an undefined return, on a date are left out of that date's mean rather
//! than counted as zero. The cumulative curve compounds (1 + daily) over
//! ordered dates starting from 1.0; a date with no defined return holds the
//! curve flat.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioPoint {
    pub date: NaiveDate,
    pub daily_return: Option<f64>,
    pub cumulative_return: f64,
}

pub fn equal_weight_curve<I>(observations: I) -> Vec<PortfolioPoint>
where
    I: IntoIterator<Item = (NaiveDate, Option<f64>)>,
{
    let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for (date, ret) in observations {
        let entry = by_date.entry(date).or_insert((0.0, 0));
        if let Some(r) = ret {
            entry.0 += r;
            entry.1 += 1;
        }
    }

    let mut cumulative = 1.0;
    by_date
        .into_iter()
        .map(|(date, (sum, count))| {
            let daily_return = (count > 0).then(|| sum / count as f64);
            cumulative *= 1.0 + daily_return.unwrap_or(0.0);
            PortfolioPoint {
                date,
                daily_return,
                cumulative_return: cumulative,
            }
        })
        .collect()
}

/// Looks up the point for `date` in a curve sorted by date.
pub fn point_on(curve: &[PortfolioPoint], date: NaiveDate) -> Option<&PortfolioPoint> {
    curve
        .binary_search_by_key(&date, |p| p.date)
        .ok()
        .map(|i| &curve[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn equal_weighting() {
        let curve = equal_weight_curve(vec![(d(2), Some(0.02)), (d(2), Some(0.04))]);
        assert_eq!(curve.len(), 1);
        assert_relative_eq!(curve[0].daily_return.unwrap(), 0.03);
        assert_relative_eq!(curve[0].cumulative_return, 1.03);
    }

    #[test]
    fn undefined_returns_are_excluded_not_zeroed() {
        let curve = equal_weight_curve(vec![(d(2), Some(0.04)), (d(2), None)]);
        assert_relative_eq!(curve[0].daily_return.unwrap(), 0.04);
    }

    #[test]
    fn date_without_defined_returns_holds_flat() {
        let curve = equal_weight_curve(vec![
            (d(1), None),
            (d(1), None),
            (d(2), Some(0.1)),
            (d(3), Some(-0.5)),
        ]);
        assert_eq!(curve[0].daily_return, None);
        assert_relative_eq!(curve[0].cumulative_return, 1.0);
        assert_relative_eq!(curve[1].cumulative_return, 1.1);
        assert_relative_eq!(curve[2].cumulative_return, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn dates_are_ordered() {
        let curve = equal_weight_curve(vec![(d(3), Some(0.0)), (d(1), Some(0.0)), (d(2), None)]);
        let dates: Vec<NaiveDate> = curve.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn point_lookup() {
        let curve = equal_weight_curve(vec![(d(1), Some(0.1)), (d(3), Some(0.1))]);
        assert!(point_on(&curve, d(2)).is_none());
        let point = point_on(&curve, d(3)).unwrap();
        assert_relative_eq!(point.cumulative_return, 1.21, epsilon = 1e-12);
    }

    #[test]
    fn empty_input() {
        assert!(equal_weight_curve(Vec::new()).is_empty());
    }
}
