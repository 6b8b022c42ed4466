//! The Point-Statistic Calculator.
//!
//! Fills a [`MetricSet`] from a validated series, its returns and, when a
//! benchmark could be aligned, the aligned pair. Every sub-calculation writes
//! its own group of metrics and leaves the rest untouched.

use crate::metrics::MetricSet;
use crate::returns::{self, DrawdownPeriod, Period};
use crate::stats::{self, Market};
use crate::validation::Alignment;
use core_types::{MetricId, ReturnSeries, ValueSeries};

/// A stateless calculator for the scalar metric catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStatistics {
    periods_per_year: f64,
    var_confidence: f64,
}

impl PointStatistics {
    pub fn new(periods_per_year: f64, var_confidence: f64) -> Self {
        Self { periods_per_year, var_confidence }
    }

    /// Computes the full catalog. Metrics that cannot be computed stay `None`.
    pub fn calculate(
        &self,
        values: &ValueSeries,
        returns: &ReturnSeries,
        drawdown_periods: &[DrawdownPeriod],
        alignment: Option<&Alignment>,
    ) -> MetricSet {
        let mut metrics = MetricSet::new();
        let r = returns.values();

        self.calculate_returns(values, &r, &mut metrics);
        self.calculate_risk(&r, &mut metrics);
        self.calculate_drawdowns(values, drawdown_periods, &mut metrics);
        self.calculate_distribution(&r, &mut metrics);
        self.calculate_calendar(returns, &mut metrics);

        let calmar = stats::calmar_ratio(
            metrics.get(MetricId::AnnualizedReturn),
            metrics.get(MetricId::MaxDrawdown).unwrap_or(0.0),
        );
        metrics.set(MetricId::CalmarRatio, calmar);

        if let Some(alignment) = alignment {
            self.calculate_benchmark(alignment, &mut metrics);
        }
        metrics
    }

    fn calculate_returns(&self, values: &ValueSeries, r: &[f64], metrics: &mut MetricSet) {
        let total = values.last().value / values.first().value - 1.0;
        metrics.set(MetricId::TotalReturn, Some(total));
        metrics.set(
            MetricId::AnnualizedReturn,
            stats::annualized_return(total, r.len(), self.periods_per_year),
        );
    }

    fn calculate_risk(&self, r: &[f64], metrics: &mut MetricSet) {
        let ppy = self.periods_per_year;
        metrics.set(MetricId::AnnualizedVolatility, stats::annualized_volatility(r, ppy));
        metrics.set(MetricId::DownsideVolatility, stats::downside_volatility(r, ppy));
        metrics.set(MetricId::SharpeRatio, stats::sharpe_ratio(r, ppy));
        metrics.set(MetricId::SortinoRatio, stats::sortino_ratio(r, ppy));
        metrics.set(MetricId::Var95, stats::value_at_risk(r, self.var_confidence));
        metrics.set(MetricId::Cvar95, stats::conditional_value_at_risk(r, self.var_confidence));
    }

    fn calculate_drawdowns(
        &self,
        values: &ValueSeries,
        periods: &[DrawdownPeriod],
        metrics: &mut MetricSet,
    ) {
        let drawdown = returns::drawdown_series(values.points());
        let max_drawdown = drawdown.iter().map(|p| p.value).fold(0.0, f64::min);
        metrics.set(MetricId::MaxDrawdown, Some(max_drawdown));

        let longest = returns::drawdown_durations(&values.values()).into_iter().max().unwrap_or(0);
        metrics.set_count(MetricId::MaxDrawdownDuration, longest);
        metrics.set_count(MetricId::NumDrawdowns, periods.len());

        if !periods.is_empty() {
            let n = periods.len() as f64;
            let avg_depth = periods.iter().map(|p| p.depth).sum::<f64>() / n;
            let avg_duration = periods.iter().map(|p| p.duration as f64).sum::<f64>() / n;
            metrics.set(MetricId::AvgDrawdown, Some(avg_depth));
            metrics.set(MetricId::AvgDrawdownDuration, Some(avg_duration));
        }
    }

    fn calculate_distribution(&self, r: &[f64], metrics: &mut MetricSet) {
        metrics.set(MetricId::Skewness, stats::skewness(r));
        metrics.set(MetricId::Kurtosis, stats::excess_kurtosis(r));

        let (positive, negative) = stats::count_signs(r);
        metrics.set_count(MetricId::PositiveDays, positive);
        metrics.set_count(MetricId::NegativeDays, negative);
        if !r.is_empty() {
            metrics.set(MetricId::PctPositiveDays, Some(positive as f64 / r.len() as f64));
        }
    }

    fn calculate_calendar(&self, returns: &ReturnSeries, metrics: &mut MetricSet) {
        let extremes = |period| {
            let bucketed = returns::resample(returns, period).values();
            let best = bucketed.iter().copied().reduce(f64::max);
            let worst = bucketed.iter().copied().reduce(f64::min);
            (best, worst)
        };

        let (best_month, worst_month) = extremes(Period::Month);
        metrics.set(MetricId::BestMonth, best_month);
        metrics.set(MetricId::WorstMonth, worst_month);

        let (best_year, worst_year) = extremes(Period::Year);
        metrics.set(MetricId::BestYear, best_year);
        metrics.set(MetricId::WorstYear, worst_year);
    }

    fn calculate_benchmark(&self, alignment: &Alignment, metrics: &mut MetricSet) {
        let ppy = self.periods_per_year;
        let s = alignment.pair.strategy().values();
        let b = alignment.pair.benchmark().values();

        let alpha = stats::alpha(&s, &b, ppy);
        let tracking_error = stats::tracking_error(&s, &b, ppy);
        metrics.set(MetricId::Alpha, alpha);
        metrics.set(MetricId::Beta, stats::beta(&s, &b));
        metrics.set(MetricId::Correlation, stats::correlation(&s, &b));
        metrics.set(MetricId::TrackingError, tracking_error);
        metrics.set(MetricId::InformationRatio, stats::information_ratio(alpha, tracking_error));
        metrics.set(MetricId::CaptureRatioUp, stats::capture_ratio(&s, &b, Market::Up));
        metrics.set(MetricId::CaptureRatioDown, stats::capture_ratio(&s, &b, Market::Down));

        let bench = &alignment.benchmark;
        let bench_total = bench.last().value / bench.first().value - 1.0;
        metrics.set(MetricId::BenchmarkTotalReturn, Some(bench_total));
        metrics.set(
            MetricId::BenchmarkAnnualizedReturn,
            stats::annualized_return(bench_total, alignment.pair.len(), ppy),
        );
    }
}
