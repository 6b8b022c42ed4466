use crate::error::DataError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const EQUITY_SERIES: &str = "equity";
pub const DRAWDOWN_SERIES: &str = "drawdown";
pub const DRAWDOWN_DURATION_SERIES: &str = "drawdown_duration";
pub const RETURNS_SERIES: &str = "returns";
pub const MONTHLY_RETURNS_SERIES: &str = "monthly_returns";
pub const YEARLY_RETURNS_SERIES: &str = "yearly_returns";
pub const BENCHMARK_SERIES: &str = "benchmark";

/// Plot series produced by every run, independent of the rolling configuration.
/// `benchmark` is only present when a benchmark could be aligned.
pub const BASE_PLOT_SERIES: [&str; 7] = [
    EQUITY_SERIES,
    DRAWDOWN_SERIES,
    DRAWDOWN_DURATION_SERIES,
    RETURNS_SERIES,
    MONTHLY_RETURNS_SERIES,
    YEARLY_RETURNS_SERIES,
    BENCHMARK_SERIES,
];

/// A single dated value: an equity or benchmark level, a return, or a derived statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A validated level series (portfolio equity or a benchmark).
///
/// Dates are strictly increasing, every value is finite and positive, and there
/// are at least two points. The only way to obtain one is [`ValueSeries::new`],
/// which enforces all of that.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueSeries {
    points: Vec<Observation>,
}

impl ValueSeries {
    pub fn new(points: Vec<Observation>) -> Result<Self, DataError> {
        if points.len() < 2 {
            return Err(DataError::TooShort(points.len()));
        }
        for point in &points {
            if !point.value.is_finite() {
                return Err(DataError::NonFinite { date: point.date, value: point.value });
            }
            if point.value <= 0.0 {
                return Err(DataError::NonPositive { date: point.date, value: point.value });
            }
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(DataError::Unordered { previous: pair[0].date, next: pair[1].date });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first(&self) -> Observation {
        self.points[0]
    }

    pub fn last(&self) -> Observation {
        self.points[self.points.len() - 1]
    }

    pub fn start_date(&self) -> NaiveDate {
        self.first().date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.last().date
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Construction rejects fewer than two points, so this is false for any `ValueSeries`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Period-over-period simple returns, labelled by the date each period ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReturnSeries {
    points: Vec<Observation>,
}

impl ReturnSeries {
    pub fn new(points: Vec<Observation>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Strategy and benchmark returns over their shared dates.
///
/// Both sides have the same length and the same date index, with at least two
/// aligned returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPair {
    strategy: ReturnSeries,
    benchmark: ReturnSeries,
}

impl AlignedPair {
    /// Returns `None` unless both sides share an identical index of two or more dates.
    pub fn new(strategy: ReturnSeries, benchmark: ReturnSeries) -> Option<Self> {
        if strategy.len() < 2 || strategy.len() != benchmark.len() {
            return None;
        }
        let same_index = strategy
            .points()
            .iter()
            .zip(benchmark.points())
            .all(|(s, b)| s.date == b.date);
        same_index.then_some(Self { strategy, benchmark })
    }

    pub fn strategy(&self) -> &ReturnSeries {
        &self.strategy
    }

    pub fn benchmark(&self) -> &ReturnSeries {
        &self.benchmark
    }

    pub fn len(&self) -> usize {
        self.strategy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategy.is_empty()
    }
}

/// A left-truncated rolling statistic.
///
/// Holds `len(returns) - window + 1` points, or none at all when the window
/// does not fit the input. Undefined windows are `None`, never skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingSeries {
    pub window: usize,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Option<f64>>,
}

impl RollingSeries {
    pub fn empty(window: usize) -> Self {
        Self { window, dates: Vec::new(), values: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The value at `date`; `None` both when the date is absent and when the window was undefined.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .and_then(|idx| self.values[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}
