use chrono::NaiveDate;
use thiserror::Error;

/// Malformed, too-short, or empty-after-filtering input. Always fatal to a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Series has {0} observation(s) after filtering; at least 2 are required")]
    TooShort(usize),

    #[error("Non-finite value {value} at {date}")]
    NonFinite { date: NaiveDate, value: f64 },

    #[error("Non-positive value {value} at {date}; returns are undefined")]
    NonPositive { date: NaiveDate, value: f64 },

    #[error("No observations fall within the requested range ({start} to {end})")]
    EmptyRange { start: String, end: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Dates must be strictly increasing: {previous} is followed by {next}")]
    Unordered { previous: NaiveDate, next: NaiveDate },

    #[error("Initial capital must be positive and finite, got {0}")]
    InvalidCapital(f64),
}

/// A caller asked for something the engine cannot be configured to do.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Rolling window must be at least 2 periods, got {0}")]
    InvalidWindow(usize),

    #[error("Unsupported metric name '{0}'")]
    UnknownMetric(String),

    #[error("Unsupported rolling metric '{0}'")]
    UnknownRollingMetric(String),

    #[error("Periods per year must be positive and finite, got {0}")]
    InvalidPeriodsPerYear(f64),

    #[error("Trailing return horizon must be at least 1 month, got {0}")]
    InvalidTrailingMonths(u32),

    #[error("VaR confidence must lie strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),

    #[error("Custom metric '{0}' collides with a catalog metric")]
    ReservedMetricName(String),

    #[error("Unknown plot series '{0}'")]
    UnknownSeries(String),
}
