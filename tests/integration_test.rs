//! End-to-end tests of the signal and returns pipeline over in-memory data.

mod common;

use approx::assert_relative_eq;
use common::*;
use proptest::prelude::*;
use stratbench::domain::error::StratbenchError;
use stratbench::domain::indicator::calculate_rsi;
use stratbench::domain::precompute::precompute;
use stratbench::domain::strategy::{
    BuyAndHold, MovingAverageCrossover, RsiMeanReversion, Strategy, TimeSeriesMomentum, factory,
};
use stratbench::ports::price_port::PriceSource;

fn positions(strategy: &Strategy, ds: &Dataset) -> Vec<i8> {
    strategy
        .compute_signals(ds)
        .rows
        .iter()
        .map(|r| r.position)
        .collect()
}

fn signals(strategy: &Strategy, ds: &Dataset) -> Vec<i8> {
    strategy
        .compute_signals(ds)
        .rows
        .iter()
        .map(|r| r.signal)
        .collect()
}

mod benchmark {
    use super::*;

    #[test]
    fn buy_and_hold_round_trip_ends_at_one() {
        let ds = dataset(&[("AAPL", [1.0, 1.05, 1.0, 1.1, 1.0])]);
        let strategy = Strategy::BuyAndHold(BuyAndHold);
        let frame = strategy.run(&ds);

        assert_eq!(positions(&strategy, &ds), vec![0, 1, 1, 1, 1]);
        assert_eq!(frame.rows[0].strategy_return, None);
        assert_relative_eq!(frame.rows[1].strategy_return.unwrap(), 0.05, epsilon = 1e-12);
        let later: Vec<f64> = frame.rows[2..].iter().map(|r| r.strategy_return.unwrap()).collect();
        assert_relative_eq!(later[0], 1.0 / 1.05 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(later[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(later[2], 1.0 / 1.1 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.rows[4].cumulative_strategy_return, 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            frame.rows[4].portfolio_cumulative_return,
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn single_row_instrument() {
        let ds = dataset(&[("AAPL", [1.0])]);
        let frame = Strategy::BuyAndHold(BuyAndHold).run(&ds);
        assert_eq!(frame.rows.len(), 1);
        assert_eq!(frame.rows[0].position, 0);
        assert_relative_eq!(frame.rows[0].cumulative_strategy_return, 1.0);
    }
}

mod crossover {
    use super::*;

    #[test]
    fn boundary_crossing_with_lag() {
        let ds = dataset(&[("MSFT", [10.0, 11.0, 12.0, 13.0, 9.0])]);
        let strategy =
            Strategy::MovingAverageCrossover(MovingAverageCrossover::new(2, 3).unwrap());

        assert_eq!(signals(&strategy, &ds), vec![0, 0, 1, 1, -1]);
        assert_eq!(positions(&strategy, &ds), vec![0, 0, 0, 1, 1]);

        let frame = strategy.run(&ds);
        assert_relative_eq!(
            frame.rows[4].strategy_return.unwrap(),
            9.0 / 13.0 - 1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            frame.rows[4].cumulative_strategy_return,
            (13.0 / 12.0) * (9.0 / 13.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn history_shorter_than_long_window_stays_flat() {
        let ds = dataset(&[("MSFT", [1.0, 1.1, 1.2])]);
        let strategy = Strategy::MovingAverageCrossover(MovingAverageCrossover::default());
        let frame = strategy.run(&ds);
        assert!(frame.rows.iter().all(|r| r.signal == 0 && r.position == 0));
        assert_relative_eq!(frame.rows[2].cumulative_strategy_return, 1.0);
    }

    #[test]
    fn windows_do_not_cross_instruments() {
        let together = dataset(&[
            ("AAPL", [5.0, 6.0, 7.0, 8.0]),
            ("MSFT", [1.0, 0.9, 0.8, 0.7]),
        ]);
        let alone = dataset(&[("MSFT", [1.0, 0.9, 0.8, 0.7])]);
        let strategy =
            Strategy::MovingAverageCrossover(MovingAverageCrossover::new(1, 2).unwrap());

        let joint = signals(&strategy, &together);
        assert_eq!(&joint[4..], signals(&strategy, &alone).as_slice());
        assert_eq!(joint[4], 0);
    }
}

mod oscillator {
    use super::*;

    #[test]
    fn rising_prices_are_overbought() {
        let ds = dataset(&[("NVDA", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0])]);
        let strategy = Strategy::RsiMeanReversion(RsiMeanReversion::new(3, 30.0, 70.0).unwrap());
        assert_eq!(signals(&strategy, &ds), vec![0, 0, 0, -1, -1, -1]);
        assert_eq!(positions(&strategy, &ds), vec![0, 0, 0, 0, -1, -1]);
    }

    #[test]
    fn falling_prices_are_oversold() {
        let ds = dataset(&[("NVDA", [6.0, 5.0, 4.0, 3.0, 2.0])]);
        let strategy = Strategy::RsiMeanReversion(RsiMeanReversion::new(3, 30.0, 70.0).unwrap());
        assert_eq!(signals(&strategy, &ds), vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn flat_prices_hit_upper_bound() {
        let rsi = calculate_rsi(&[1.0; 6], 3);
        assert!(rsi[..3].iter().all(|v| v.is_none()));
        for value in &rsi[3..] {
            assert_relative_eq!(value.unwrap(), 100.0);
        }
    }
}

mod momentum {
    use super::*;

    #[test]
    fn threshold_rule() {
        let ds = dataset(&[("AMZN", [1.0, 1.1, 1.2, 1.1, 1.0])]);
        let strategy = Strategy::TimeSeriesMomentum(TimeSeriesMomentum::new(2, 0.0).unwrap());
        assert_eq!(signals(&strategy, &ds), vec![0, 0, 1, 0, 0]);
    }

    #[test]
    fn top_n_keeps_strongest_only() {
        let ds = dataset(&[
            ("AAPL", [1.0, 1.1]),
            ("MSFT", [1.0, 1.2]),
            ("TSLA", [1.0, 0.9]),
        ]);
        let plain = Strategy::TimeSeriesMomentum(TimeSeriesMomentum::new(1, 0.0).unwrap());
        let ranked = Strategy::TimeSeriesMomentum(
            TimeSeriesMomentum::new(1, 0.0)
                .unwrap()
                .with_top_n(1)
                .unwrap(),
        );

        assert_eq!(signals(&plain, &ds), vec![0, 1, 0, 1, 0, 0]);
        assert_eq!(signals(&ranked, &ds), vec![0, 0, 0, 1, 0, 0]);
    }
}

mod portfolio {
    use super::*;

    #[test]
    fn equal_weighting_across_instruments() {
        let ds = dataset(&[("AAPL", [1.0, 1.0, 1.02]), ("MSFT", [1.0, 1.0, 1.04])]);
        let frame = Strategy::BuyAndHold(BuyAndHold).run(&ds);

        assert_eq!(frame.portfolio.len(), 3);
        assert_eq!(frame.portfolio[0].daily_return, None);
        assert_relative_eq!(frame.portfolio[1].daily_return.unwrap(), 0.0);
        assert_relative_eq!(frame.portfolio[2].daily_return.unwrap(), 0.03, epsilon = 1e-12);
        assert_relative_eq!(frame.portfolio[2].cumulative_return, 1.03, epsilon = 1e-12);
    }

    #[test]
    fn late_listing_does_not_dilute_earlier_dates() {
        let mut rows = series("AAPL", &[1.0, 1.1, 1.21]);
        rows.push(PriceRow::new(date(2), "MSFT", 1.0));
        let ds = Dataset::from_rows(rows).unwrap();
        let frame = Strategy::BuyAndHold(BuyAndHold).run(&ds);

        // MSFT's only row has no return, so day 2 is AAPL alone.
        assert_relative_eq!(frame.portfolio[2].daily_return.unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(frame.portfolio[2].cumulative_return, 1.21, epsilon = 1e-12);
    }
}

mod registry {
    use super::*;

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = factory::create_default("bollinger").unwrap_err();
        assert!(matches!(err, StratbenchError::UnknownStrategy { name } if name == "bollinger"));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(matches!(
            MovingAverageCrossover::new(50, 20).unwrap_err(),
            StratbenchError::InvalidParameter { .. }
        ));
        assert!(RsiMeanReversion::new(14, 70.0, 30.0).is_err());
        assert!(TimeSeriesMomentum::new(0, 0.0).is_err());
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn precompute_from_price_source() {
        let source = MockPriceSource::new()
            .with_closes("AAPL", &walk(&[0.01, -0.02, 0.03, 0.01, -0.01, 0.02]))
            .with_closes("MSFT", &walk(&[-0.01, 0.02, 0.0, 0.01, 0.02, -0.03]));
        let instruments = source.list_instruments().unwrap();
        let ds = source.load(&instruments, None, None).unwrap();

        let strategies = vec![
            Strategy::BuyAndHold(BuyAndHold),
            Strategy::MovingAverageCrossover(MovingAverageCrossover::new(2, 3).unwrap()),
            Strategy::RsiMeanReversion(RsiMeanReversion::new(2, 30.0, 70.0).unwrap()),
            Strategy::TimeSeriesMomentum(TimeSeriesMomentum::new(2, 0.0).unwrap()),
        ];
        let out = precompute(&ds, &strategies).unwrap();

        assert_eq!(out.table.rows.len(), 14);
        assert_eq!(out.table.suffixes.len(), 4);
        for (idx, (suffix, frame)) in out.frames.iter().enumerate() {
            let curve = out.table.portfolio_curve(suffix, None, None).unwrap();
            assert_eq!(curve.len(), frame.portfolio.len());
            for (a, b) in curve.iter().zip(&frame.portfolio) {
                assert_relative_eq!(a.cumulative_return, b.cumulative_return, epsilon = 1e-12);
            }
            assert!(out.table.rows.iter().all(|r| r.strategies[idx].is_some()));
        }
    }

    #[test]
    fn date_filtered_source() {
        let source = MockPriceSource::new().with_closes("AAPL", &[1.0, 2.0, 3.0, 4.0]);
        let ds = source
            .load(&["AAPL".to_string()], Some(date(1)), Some(date(2)))
            .unwrap();
        assert_eq!(ds.len(), 2);
    }
}

fn closes_strategy() -> impl proptest::strategy::Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.5f64..2.0, 2..60)
}

proptest! {
    #[test]
    fn positions_never_use_same_day_signal(closes in closes_strategy(), cut in 1usize..60) {
        let cut = cut.min(closes.len());
        let strategy =
            Strategy::MovingAverageCrossover(MovingAverageCrossover::new(2, 5).unwrap());

        let full = strategy.compute_signals(&dataset(&[("AAPL", closes.as_slice())]));
        let prefix = strategy.compute_signals(&dataset(&[("AAPL", &closes[..cut])]));

        prop_assert_eq!(full.rows[0].position, 0);
        for t in 1..full.rows.len() {
            prop_assert_eq!(full.rows[t].position, full.rows[t - 1].signal);
        }
        for (a, b) in prefix.rows.iter().zip(&full.rows) {
            prop_assert_eq!(a.signal, b.signal);
            prop_assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn later_prices_do_not_move_earlier_positions(
        aapl in closes_strategy(),
        msft in closes_strategy(),
        shock in 0.5f64..2.0,
    ) {
        let n = aapl.len().min(msft.len());
        let (aapl, msft) = (&aapl[..n], &msft[..n]);
        let cut = n / 2;

        let mut shocked = msft.to_vec();
        for close in &mut shocked[cut..] {
            *close *= shock;
        }

        let strategies = [
            Strategy::RsiMeanReversion(RsiMeanReversion::new(3, 30.0, 70.0).unwrap()),
            Strategy::TimeSeriesMomentum(
                TimeSeriesMomentum::new(2, 0.0).unwrap().with_top_n(1).unwrap(),
            ),
        ];
        for strategy in &strategies {
            let base = positions(strategy, &dataset(&[("AAPL", aapl), ("MSFT", msft)]));
            let moved = positions(strategy, &dataset(&[("AAPL", aapl), ("MSFT", shocked.as_slice())]));
            // Rows are ordered AAPL then MSFT; positions up to `cut` only see earlier closes.
            for offset in [0, n] {
                prop_assert_eq!(&base[offset..offset + cut], &moved[offset..offset + cut]);
            }
        }
    }

    #[test]
    fn rsi_stays_within_bounds(closes in closes_strategy(), period in 1usize..20) {
        for value in calculate_rsi(&closes, period).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn buy_and_hold_compounds_to_price_ratio(closes in closes_strategy()) {
        let frame = Strategy::BuyAndHold(BuyAndHold).run(&dataset(&[("AAPL", closes.as_slice())]));
        let last = frame.rows.last().unwrap();
        let expected = closes[closes.len() - 1] / closes[0];
        prop_assert!((last.cumulative_strategy_return - expected).abs() < 1e-9 * expected.max(1.0));
    }

    #[test]
    fn portfolio_curve_is_product_of_daily_returns(
        a in prop::collection::vec(-0.1f64..0.1, 1..30),
        b in prop::collection::vec(-0.1f64..0.1, 1..30),
    ) {
        let ds = dataset(&[("AAPL", &walk(&a)), ("MSFT", &walk(&b))]);
        let frame = Strategy::BuyAndHold(BuyAndHold).run(&ds);

        let mut cumulative = 1.0;
        for point in &frame.portfolio {
            cumulative *= 1.0 + point.daily_return.unwrap_or(0.0);
            prop_assert!((point.cumulative_return - cumulative).abs() < 1e-12);
        }
    }
}
