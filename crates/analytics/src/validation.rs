//! The Series Validator / Aligner.
//!
//! Turns raw caller-supplied observations into a [`ValueSeries`] restricted to
//! the requested window and intersects a strategy and a benchmark onto one
//! date index.

use crate::annualization::median_gap_days;
use crate::returns::simple_returns;
use chrono::NaiveDate;
use core_types::{AlignedPair, DataError, Observation, ValueSeries};
use std::collections::{BTreeMap, BTreeSet};

/// Gaps longer than this multiple of the median spacing are reported, never filled.
const IRREGULAR_GAP_FACTOR: f64 = 5.0;

/// Optional inclusive bounds on the dates a run looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, DataError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(DataError::InvalidRange { start, end });
            }
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    fn describe(&self) -> (String, String) {
        let bound =
            |d: Option<NaiveDate>| d.map_or_else(|| "unbounded".to_string(), |d| d.to_string());
        (bound(self.start), bound(self.end))
    }
}

/// The benchmark restricted to the strategy's dates, plus the matching returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub benchmark: ValueSeries,
    pub pair: AlignedPair,
}

/// Validates a raw series and restricts it to `range`.
///
/// Non-finite and non-positive values fail the run wherever they occur. Repeated
/// dates keep the last value supplied. Input order does not matter.
pub fn validate_series(raw: &[Observation], range: &DateRange) -> Result<ValueSeries, DataError> {
    for point in raw {
        if !point.value.is_finite() {
            return Err(DataError::NonFinite { date: point.date, value: point.value });
        }
        if point.value <= 0.0 {
            return Err(DataError::NonPositive { date: point.date, value: point.value });
        }
    }

    let mut by_date = BTreeMap::new();
    for point in raw {
        by_date.insert(point.date, point.value);
    }
    let duplicates = raw.len() - by_date.len();
    if duplicates > 0 {
        tracing::debug!(duplicates, "Collapsed repeated dates, keeping the last value for each");
    }

    let points: Vec<Observation> = by_date
        .into_iter()
        .filter(|(date, _)| range.contains(*date))
        .map(|(date, value)| Observation::new(date, value))
        .collect();

    if points.is_empty() {
        let (start, end) = range.describe();
        return Err(DataError::EmptyRange { start, end });
    }
    if points.len() < 2 {
        return Err(DataError::TooShort(points.len()));
    }

    for (from, to, days) in irregular_gaps(&points) {
        tracing::warn!(%from, %to, days, "Gap in series");
    }

    ValueSeries::new(points)
}

/// Gaps well beyond the series' own median spacing, as `(from, to, days)`.
///
/// The threshold scales with the sampling frequency, so weekends in a daily
/// series and month ends in a monthly one are never flagged.
fn irregular_gaps(points: &[Observation]) -> Vec<(NaiveDate, NaiveDate, i64)> {
    let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
    let Some(median) = median_gap_days(&dates) else {
        return Vec::new();
    };
    let threshold = median * IRREGULAR_GAP_FACTOR;
    dates
        .windows(2)
        .map(|w| (w[0], w[1], (w[1] - w[0]).num_days()))
        .filter(|(_, _, days)| *days as f64 > threshold)
        .collect()
}

/// Validates an optional benchmark.
///
/// Malformed values are still a hard error. A benchmark that merely has too
/// little data inside the window is dropped, so the run continues without it.
pub fn validate_benchmark(
    raw: &[Observation],
    range: &DateRange,
) -> Result<Option<ValueSeries>, DataError> {
    match validate_series(raw, range) {
        Ok(series) => Ok(Some(series)),
        Err(err @ (DataError::EmptyRange { .. } | DataError::TooShort(_))) => {
            tracing::warn!(reason = %err, "Benchmark omitted; benchmark metrics will be undefined");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Intersects the two series on their shared dates.
///
/// Returns `None` when fewer than three dates are shared, since that leaves
/// fewer than two aligned returns.
pub fn align(strategy: &ValueSeries, benchmark: &ValueSeries) -> Option<Alignment> {
    let shared: BTreeSet<NaiveDate> = strategy
        .points()
        .iter()
        .map(|p| p.date)
        .filter(|date| benchmark.points().binary_search_by_key(date, |p| p.date).is_ok())
        .collect();

    if shared.len() < 3 {
        tracing::warn!(
            shared_dates = shared.len(),
            "Benchmark and strategy barely overlap; benchmark metrics will be undefined"
        );
        return None;
    }

    let restrict = |series: &ValueSeries| -> Vec<Observation> {
        series.points().iter().copied().filter(|p| shared.contains(&p.date)).collect()
    };
    let strategy_aligned = ValueSeries::new(restrict(strategy)).ok()?;
    let benchmark_aligned = ValueSeries::new(restrict(benchmark)).ok()?;

    if strategy_aligned.len() < strategy.len() {
        tracing::debug!(
            dropped = strategy.len() - strategy_aligned.len(),
            "Strategy dates missing from the benchmark are excluded from relative metrics"
        );
    }

    let pair = AlignedPair::new(
        simple_returns(&strategy_aligned),
        simple_returns(&benchmark_aligned),
    )?;
    Some(Alignment { benchmark: benchmark_aligned, pair })
}
