use crate::annualization::resolve_periods_per_year;
use crate::bundle::{Metadata, PlotSeries, ResultsBundle};
use crate::calculator::PointStatistics;
use crate::error::AnalyticsError;
use crate::returns::{self, Period};
use crate::rolling::RollingEngine;
use crate::validation::{DateRange, align, validate_benchmark, validate_series};
use chrono::NaiveDate;
use configuration::Settings;
use core_types::series::{
    BENCHMARK_SERIES, DRAWDOWN_DURATION_SERIES, DRAWDOWN_SERIES, EQUITY_SERIES,
    MONTHLY_RETURNS_SERIES, RETURNS_SERIES, YEARLY_RETURNS_SERIES,
};
use core_types::{ConfigurationError, DataError, Observation};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Optional bounds and capital base for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunOptions {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Value the equity curve starts from. Defaults to the first observed value,
    /// i.e. a scaling factor of 1.0.
    pub initial_capital: Option<f64>,
}

/// One independent run for [`AnalyticsEngine::run_batch`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub strategy: Vec<Observation>,
    pub benchmark: Option<Vec<Observation>>,
    pub options: RunOptions,
}

/// A stateless calculator turning raw series into a [`ResultsBundle`].
///
/// Holds only validated, immutable settings, so one instance can serve any
/// number of concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    settings: Settings,
}

impl AnalyticsEngine {
    pub fn new(settings: &Settings) -> Result<Self, ConfigurationError> {
        settings.validate_computation()?;
        Ok(Self { settings: settings.clone() })
    }

    /// The main entry point: validates the inputs and computes every metric
    /// and plot series for one strategy.
    ///
    /// Malformed input fails with [`DataError`]. A benchmark that cannot be
    /// aligned is dropped and its metrics stay undefined.
    #[tracing::instrument(
        name = "analytics_run",
        skip_all,
        fields(observations = strategy.len(), has_benchmark = benchmark.is_some())
    )]
    pub fn run(
        &self,
        strategy: &[Observation],
        benchmark: Option<&[Observation]>,
        options: &RunOptions,
    ) -> Result<ResultsBundle, AnalyticsError> {
        if let Some(capital) = options.initial_capital {
            if !capital.is_finite() || capital <= 0.0 {
                return Err(DataError::InvalidCapital(capital).into());
            }
        }

        // --- Validation & alignment ---
        let range = DateRange::new(options.start_date, options.end_date)?;
        let values = validate_series(strategy, &range)?;
        let benchmark = match benchmark {
            Some(raw) => validate_benchmark(raw, &range)?,
            None => None,
        };
        let alignment = benchmark.as_ref().and_then(|b| align(&values, b));

        // --- Returns engine ---
        let returns = returns::simple_returns(&values);
        let initial_capital = options.initial_capital.unwrap_or(values.first().value);
        let equity = returns::equity_curve(&values, initial_capital);
        let drawdown = returns::drawdown_series(values.points());
        let durations = returns::drawdown_durations(&values.values());
        let drawdown_periods = returns::drawdown_periods(values.points());

        // --- Point and rolling statistics ---
        let periods_per_year =
            resolve_periods_per_year(self.settings.annualization.periods_per_year, &values.dates());
        let var_confidence = self.settings.risk.var_confidence;
        let rolling = RollingEngine::new(&self.settings.rolling, periods_per_year, var_confidence)?;

        let metrics = PointStatistics::new(periods_per_year, var_confidence).calculate(
            &values,
            &returns,
            &drawdown_periods,
            alignment.as_ref(),
        );

        // --- Plot series ---
        let mut series = BTreeMap::new();
        let duration_points = values
            .points()
            .iter()
            .zip(&durations)
            .map(|(p, d)| Observation::new(p.date, *d as f64))
            .collect();
        series.insert(DRAWDOWN_DURATION_SERIES.to_string(), PlotSeries::Values(duration_points));
        series.insert(RETURNS_SERIES.to_string(), PlotSeries::Values(returns.points().to_vec()));
        series.insert(
            MONTHLY_RETURNS_SERIES.to_string(),
            PlotSeries::Values(returns::resample(&returns, Period::Month).points().to_vec()),
        );
        series.insert(
            YEARLY_RETURNS_SERIES.to_string(),
            PlotSeries::Values(returns::resample(&returns, Period::Year).points().to_vec()),
        );
        if let Some(alignment) = &alignment {
            series.insert(
                BENCHMARK_SERIES.to_string(),
                PlotSeries::Values(returns::equity_curve(&alignment.benchmark, initial_capital)),
            );
        }
        for (name, rolling_series) in rolling.compute(&returns) {
            series.insert(name, PlotSeries::Rolling(rolling_series));
        }

        let final_value = equity.last().map_or(initial_capital, |p| p.value);
        series.insert(EQUITY_SERIES.to_string(), PlotSeries::Values(equity));
        series.insert(DRAWDOWN_SERIES.to_string(), PlotSeries::Values(drawdown));

        let metadata = Metadata {
            start_date: values.start_date(),
            end_date: values.end_date(),
            initial_capital,
            final_value,
            has_benchmark: alignment.is_some(),
            periods_per_year,
            rolling_window: rolling.window(),
            observations: values.len(),
        };

        tracing::info!(
            start = %metadata.start_date,
            end = %metadata.end_date,
            periods_per_year,
            has_benchmark = metadata.has_benchmark,
            "Analytics run complete"
        );

        Ok(ResultsBundle::assemble(metrics, series, metadata, drawdown_periods))
    }

    /// Evaluates independent runs in parallel. Results come back in input order.
    pub fn run_batch(&self, requests: &[RunRequest]) -> Vec<Result<ResultsBundle, AnalyticsError>> {
        tracing::debug!(runs = requests.len(), "Starting batch");
        requests
            .par_iter()
            .map(|request| {
                self.run(&request.strategy, request.benchmark.as_deref(), &request.options)
            })
            .collect()
    }
}
