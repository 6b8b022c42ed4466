//! The one periods-per-year policy shared by the point calculator and the
//! rolling engine, together with the window lengths derived from it.

use chrono::NaiveDate;

/// Picks the annualization factor for a run: the configured value when there
/// is one, otherwise the factor implied by the median spacing of `dates`.
pub fn resolve_periods_per_year(configured: Option<f64>, dates: &[NaiveDate]) -> f64 {
    configured.unwrap_or_else(|| infer_periods_per_year(dates))
}

/// Maps the median gap between consecutive dates onto a calendar frequency.
///
/// Business-day and calendar-day series both land on 252, so weekends and
/// holidays never shift the factor.
pub fn infer_periods_per_year(dates: &[NaiveDate]) -> f64 {
    let Some(median) = median_gap_days(dates) else {
        return 252.0;
    };

    match median {
        m if m <= 4.0 => 252.0,
        m if m <= 10.0 => 52.0,
        m if m <= 45.0 => 12.0,
        m if m <= 135.0 => 4.0,
        _ => 1.0,
    }
}

/// Median spacing, in calendar days, between consecutive dates.
///
/// `None` for fewer than two dates.
pub fn median_gap_days(dates: &[NaiveDate]) -> Option<f64> {
    let mut gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
    if gaps.is_empty() {
        return None;
    }
    gaps.sort_unstable();
    let mid = gaps.len() / 2;
    let median = if gaps.len() % 2 == 0 {
        (gaps[mid - 1] + gaps[mid]) as f64 / 2.0
    } else {
        gaps[mid] as f64
    };
    Some(median)
}

/// Default rolling window: one year of periods, never below two.
pub fn default_window(periods_per_year: f64) -> usize {
    (periods_per_year.round() as usize).max(2)
}

/// Window length, in periods, of an N-month trailing return.
pub fn trailing_window(months: u32, periods_per_year: f64) -> usize {
    ((f64::from(months) * periods_per_year / 12.0).round() as usize).max(2)
}
