//! Property-based tests for the laws every run must satisfy, whatever the input:
//! 1. Returns and equity round-trip
//! 2. Drawdown bounds and their link to `max_drawdown`
//! 3. Rolling output length
//! 4. Regression against an identical benchmark
//! 5. Undefined ratios on flat series

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use analytics::returns::simple_returns;
use analytics::validation::{DateRange, validate_series};
use analytics::{AnalyticsEngine, PlotSeries, RunOptions, reconstruct_equity, rolling_apply, stats};
use configuration::Settings;
use core_types::{MetricId, Observation};

fn engine() -> AnalyticsEngine {
    let mut settings = Settings::default();
    settings.annualization.periods_per_year = Some(252.0);
    settings.rolling.window = Some(5);
    AnalyticsEngine::new(&settings).unwrap()
}

fn to_observations(values: &[f64]) -> Vec<Observation> {
    let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Observation::new(start + Duration::days(i as i64), *v))
        .collect()
}

/// Strategy to generate a strictly positive price path from bounded daily moves.
fn price_path() -> impl Strategy<Value = Vec<f64>> {
    (10.0..1_000.0f64, prop::collection::vec(-0.05..0.05f64, 2..120)).prop_map(|(start, moves)| {
        let mut level = start;
        let mut path = vec![level];
        for m in moves {
            level *= 1.0 + m;
            path.push(level);
        }
        path
    })
}

proptest! {
    #[test]
    fn equity_round_trips_through_returns(path in price_path()) {
        let series = validate_series(&to_observations(&path), &DateRange::default()).unwrap();
        let rebuilt = reconstruct_equity(&simple_returns(&series), path[0]);
        prop_assert_eq!(rebuilt.len(), path.len());
        for (original, rebuilt) in path.iter().zip(&rebuilt) {
            prop_assert!((original - rebuilt).abs() <= 1e-9 * original.abs().max(1.0));
        }
    }

    #[test]
    fn drawdown_is_bounded_and_matches_max_drawdown(path in price_path()) {
        let bundle = engine().run(&to_observations(&path), None, &RunOptions::default()).unwrap();
        let Ok(PlotSeries::Values(drawdown)) = bundle.plot_series("drawdown") else {
            panic!("drawdown series missing");
        };
        prop_assert!(drawdown.iter().all(|p| p.value <= 0.0));
        prop_assert_eq!(drawdown[0].value, 0.0);
        let min = drawdown.iter().map(|p| p.value).fold(0.0, f64::min);
        prop_assert_eq!(bundle.metric(MetricId::MaxDrawdown), Some(min));
    }

    #[test]
    fn rolling_length_is_left_truncated(path in price_path(), window in 2usize..150) {
        let series = validate_series(&to_observations(&path), &DateRange::default()).unwrap();
        let returns = simple_returns(&series);
        let rolling = rolling_apply(&returns, window, |w| stats::annualized_volatility(w, 252.0));
        let expected = if window <= returns.len() { returns.len() - window + 1 } else { 0 };
        prop_assert_eq!(rolling.len(), expected);
        prop_assert_eq!(rolling.dates.len(), rolling.values.len());
    }

    #[test]
    fn identical_benchmark_regresses_onto_itself(path in price_path()) {
        let observations = to_observations(&path);
        let returns: Vec<f64> = path.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        prop_assume!(returns.len() >= 2 && stats::sample_std(&returns).unwrap_or(0.0) > 1e-6);

        let bundle = engine()
            .run(&observations, Some(&observations), &RunOptions::default())
            .unwrap();
        prop_assert!((bundle.metric(MetricId::Beta).unwrap() - 1.0).abs() < 1e-6);
        prop_assert!(bundle.metric(MetricId::Alpha).unwrap().abs() < 1e-6);
        prop_assert!((bundle.metric(MetricId::Correlation).unwrap() - 1.0).abs() < 1e-6);
        prop_assert_eq!(bundle.metric(MetricId::InformationRatio), None);
    }

    #[test]
    fn flat_series_has_no_risk_adjusted_ratios(level in 1.0..10_000.0f64, len in 2usize..60) {
        let bundle = engine()
            .run(&to_observations(&vec![level; len]), None, &RunOptions::default())
            .unwrap();
        prop_assert_eq!(bundle.metric(MetricId::SharpeRatio), None);
        prop_assert_eq!(bundle.metric(MetricId::SortinoRatio), None);
        prop_assert_eq!(bundle.metric(MetricId::CalmarRatio), None);
        prop_assert_eq!(bundle.metric(MetricId::TotalReturn), Some(0.0));
    }

    #[test]
    fn benchmark_metrics_are_undefined_without_a_benchmark(path in price_path()) {
        let bundle = engine().run(&to_observations(&path), None, &RunOptions::default()).unwrap();
        for id in MetricId::ALL.iter().filter(|id| id.requires_benchmark()) {
            prop_assert_eq!(bundle.metric(*id), None);
        }
    }
}
