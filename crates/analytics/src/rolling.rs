//! The Rolling-Window Engine.
//!
//! Each rolling statistic is the point formula from [`crate::stats`] applied to
//! every full window of returns, so a rolling value always equals the point
//! value of the same slice.

use crate::annualization::{default_window, trailing_window};
use crate::returns::max_drawdown_duration;
use crate::stats;
use configuration::RollingSettings;
use core_types::{ConfigurationError, ReturnSeries, RollingMetric, RollingSeries};
use std::collections::BTreeMap;

/// Applies `f` to every full window of `returns`.
///
/// The result is left-truncated and dated by each window's last return. A
/// window shorter than 2 or longer than the input yields an empty series.
pub fn rolling_apply<F>(returns: &ReturnSeries, window: usize, f: F) -> RollingSeries
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window < 2 || window > returns.len() {
        return RollingSeries::empty(window);
    }
    let values = returns.values();
    let dates = returns.dates();
    RollingSeries {
        window,
        dates: dates[window - 1..].to_vec(),
        values: values
            .windows(window)
            .map(|slice| f(slice).filter(|v| v.is_finite()))
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RollingEngine {
    window: usize,
    metrics: Vec<RollingMetric>,
    trailing_months: Vec<u32>,
    periods_per_year: f64,
    var_confidence: f64,
}

impl RollingEngine {
    /// Builds the engine for one run. Without an explicit window the default is
    /// one year of periods under `periods_per_year`.
    pub fn new(
        settings: &RollingSettings,
        periods_per_year: f64,
        var_confidence: f64,
    ) -> Result<Self, ConfigurationError> {
        settings.validate()?;
        let window = settings.window.unwrap_or_else(|| default_window(periods_per_year));
        if window < 2 {
            return Err(ConfigurationError::InvalidWindow(window));
        }
        Ok(Self {
            window,
            metrics: settings.metrics.clone(),
            trailing_months: settings.trailing_months.clone(),
            periods_per_year,
            var_confidence,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Every configured rolling series, keyed by plot series name.
    pub fn compute(&self, returns: &ReturnSeries) -> BTreeMap<String, RollingSeries> {
        let ppy = self.periods_per_year;
        let confidence = self.var_confidence;
        let window = self.window;
        let mut out = BTreeMap::new();

        for metric in &self.metrics {
            let series = match metric {
                RollingMetric::Sharpe => {
                    rolling_apply(returns, window, |w| stats::sharpe_ratio(w, ppy))
                }
                RollingMetric::Sortino => {
                    rolling_apply(returns, window, |w| stats::sortino_ratio(w, ppy))
                }
                RollingMetric::Volatility => {
                    rolling_apply(returns, window, |w| stats::annualized_volatility(w, ppy))
                }
                RollingMetric::ValueAtRisk => {
                    rolling_apply(returns, window, |w| stats::value_at_risk(w, confidence))
                }
                RollingMetric::Skewness => rolling_apply(returns, window, stats::skewness),
                RollingMetric::DrawdownDuration => {
                    rolling_apply(returns, window, |w| Some(max_drawdown_duration(w) as f64))
                }
                RollingMetric::TrailingReturn => {
                    for &months in &self.trailing_months {
                        let horizon = trailing_window(months, ppy);
                        let series = rolling_apply(returns, horizon, |w| Some(stats::compound(w)));
                        out.insert(RollingMetric::trailing_series_name(months), series);
                    }
                    continue;
                }
            };
            out.insert(metric.series_name().to_string(), series);
        }

        let empty = out.values().filter(|s| s.is_empty()).count();
        if empty > 0 {
            tracing::debug!(
                empty,
                observations = returns.len(),
                "Rolling windows longer than the series"
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use core_types::Observation;

    fn returns(values: &[f64]) -> ReturnSeries {
        let start = NaiveDate::from_ymd_opt(2022, 1, 4).unwrap();
        ReturnSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Observation::new(start + Duration::days(i as i64), *v))
                .collect(),
        )
    }

    fn settings(window: usize) -> RollingSettings {
        RollingSettings { window: Some(window), ..RollingSettings::default() }
    }

    #[test]
    fn output_is_left_truncated() {
        let r = returns(&[0.01, -0.02, 0.015, 0.03, -0.01]);
        let series = rolling_apply(&r, 3, |w| stats::mean(w));
        assert_eq!(series.len(), 3);
        assert_eq!(series.dates[0], r.dates()[2]);
        let expected = (0.01 - 0.02 + 0.015) / 3.0;
        assert!((series.values[0].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn oversized_window_is_empty_not_an_error() {
        let r = returns(&[0.01, 0.02]);
        assert!(rolling_apply(&r, 3, stats::skewness).is_empty());
    }

    #[test]
    fn undefined_windows_are_kept_as_none() {
        let r = returns(&[0.0, 0.0, 0.0, 0.01, -0.01]);
        let series = rolling_apply(&r, 3, |w| stats::sharpe_ratio(w, 252.0));
        assert_eq!(series.len(), 3);
        assert_eq!(series.values[0], None);
        assert!(series.values[2].is_some());
    }

    #[test]
    fn rolling_value_equals_point_value_of_the_slice() {
        let values = [0.01, -0.02, 0.015, 0.03, -0.01, 0.005, 0.002];
        let engine = RollingEngine::new(&settings(4), 252.0, 0.95).unwrap();
        let out = engine.compute(&returns(&values));
        let sharpe = &out["rolling_sharpe"];
        for (i, value) in sharpe.values.iter().enumerate() {
            assert_eq!(*value, stats::sharpe_ratio(&values[i..i + 4], 252.0));
        }
    }

    #[test]
    fn produces_every_configured_series() {
        let r = returns(&[0.01; 80]);
        let engine = RollingEngine::new(&settings(5), 252.0, 0.95).unwrap();
        let out = engine.compute(&r);
        for name in settings(5).series_names() {
            assert!(out.contains_key(&name), "missing {name}");
        }
        assert_eq!(out["trailing_return_3m"].window, 63);
        assert_eq!(out["trailing_return_3m"].len(), 80 - 63 + 1);
        assert!(out["trailing_return_12m"].is_empty());
        assert_eq!(out["rolling_drawdown_duration"].values[0], Some(0.0));
    }

    #[test]
    fn tiny_windows_are_rejected() {
        assert_eq!(
            RollingEngine::new(&settings(1), 252.0, 0.95),
            Err(ConfigurationError::InvalidWindow(1))
        );
    }

    #[test]
    fn default_window_follows_the_annualization_factor() {
        let engine = RollingEngine::new(&RollingSettings::default(), 12.0, 0.95).unwrap();
        assert_eq!(engine.window(), 12);
    }
}
