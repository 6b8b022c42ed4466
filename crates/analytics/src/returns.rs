use chrono::{Datelike, NaiveDate};
use core_types::{Observation, ReturnSeries, ValueSeries};
use serde::Serialize;

/// Calendar bucket used when resampling periodic returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Year,
}

/// One contiguous stretch below a running peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawdownPeriod {
    /// Date of the peak the drawdown is measured from.
    pub peak: NaiveDate,
    /// Date of the deepest point.
    pub trough: NaiveDate,
    /// First date back at or above the peak; `None` while still under water.
    pub recovery: Option<NaiveDate>,
    /// Deepest drawdown reached, as a non-positive fraction.
    pub depth: f64,
    /// Periods from the peak to the recovery, or to the last observation.
    pub duration: usize,
}

/// Simple returns `value[i] / value[i-1] - 1`, each dated by the end of its period.
pub fn simple_returns(values: &ValueSeries) -> ReturnSeries {
    let points = values
        .points()
        .windows(2)
        .map(|w| Observation::new(w[1].date, w[1].value / w[0].value - 1.0))
        .collect();
    ReturnSeries::new(points)
}

/// Rebuilds the level series from its returns and the first level.
pub fn reconstruct_equity(returns: &ReturnSeries, start_value: f64) -> Vec<f64> {
    let mut levels = Vec::with_capacity(returns.len() + 1);
    levels.push(start_value);
    let mut level = start_value;
    for r in returns.points() {
        level *= 1.0 + r.value;
        levels.push(level);
    }
    levels
}

/// The value series rescaled so that its first point equals `initial_capital`.
pub fn equity_curve(values: &ValueSeries, initial_capital: f64) -> Vec<Observation> {
    let base = values.first().value;
    values
        .points()
        .iter()
        .map(|p| Observation::new(p.date, initial_capital * (p.value / base)))
        .collect()
}

/// `level[t] / max(level[0..=t]) - 1`. Never positive; zero at every new peak.
pub fn drawdown_series(levels: &[Observation]) -> Vec<Observation> {
    let mut peak = f64::MIN;
    levels
        .iter()
        .map(|p| {
            peak = peak.max(p.value);
            Observation::new(p.date, p.value / peak - 1.0)
        })
        .collect()
}

/// Periods elapsed since the running maximum was last reached (0 on the peak itself).
pub fn drawdown_durations(levels: &[f64]) -> Vec<usize> {
    let mut peak = f64::MIN;
    let mut since_peak = 0;
    levels
        .iter()
        .map(|&level| {
            if level >= peak {
                peak = level;
                since_peak = 0;
            } else {
                since_peak += 1;
            }
            since_peak
        })
        .collect()
}

/// Longest drawdown duration within a window of returns, measured from the
/// window's own starting level.
pub fn max_drawdown_duration(returns: &[f64]) -> usize {
    let mut levels = Vec::with_capacity(returns.len() + 1);
    let mut level = 1.0;
    levels.push(level);
    for r in returns {
        level *= 1.0 + r;
        levels.push(level);
    }
    drawdown_durations(&levels).into_iter().max().unwrap_or(0)
}

/// Splits a level series into its drawdown periods, in chronological order.
pub fn drawdown_periods(levels: &[Observation]) -> Vec<DrawdownPeriod> {
    let mut periods = Vec::new();
    let Some(first) = levels.first() else {
        return periods;
    };

    let mut peak = *first;
    let mut peak_idx = 0;
    let mut current: Option<DrawdownPeriod> = None;

    for (idx, point) in levels.iter().enumerate() {
        if point.value >= peak.value {
            if let Some(mut open) = current.take() {
                open.recovery = Some(point.date);
                open.duration = idx - peak_idx;
                periods.push(open);
            }
            peak = *point;
            peak_idx = idx;
            continue;
        }

        let depth = point.value / peak.value - 1.0;
        let open = current.get_or_insert(DrawdownPeriod {
            peak: peak.date,
            trough: point.date,
            recovery: None,
            depth,
            duration: 0,
        });
        if depth < open.depth {
            open.depth = depth;
            open.trough = point.date;
        }
        open.duration = idx - peak_idx;
    }

    if let Some(open) = current {
        periods.push(open);
    }
    periods
}

/// Compounds returns into calendar buckets: `prod(1 + r) - 1` per bucket.
///
/// Partial first and last buckets are kept. Each bucket is labelled by its last
/// calendar day.
pub fn resample(returns: &ReturnSeries, period: Period) -> ReturnSeries {
    let mut buckets: Vec<Observation> = Vec::new();
    for r in returns.points() {
        let label = bucket_end(r.date, period);
        match buckets.last_mut() {
            Some(last) if last.date == label => {
                last.value = (1.0 + last.value) * (1.0 + r.value) - 1.0;
            }
            _ => buckets.push(Observation::new(label, r.value)),
        }
    }
    ReturnSeries::new(buckets)
}

fn bucket_end(date: NaiveDate, period: Period) -> NaiveDate {
    let end = match period {
        Period::Year => NaiveDate::from_ymd_opt(date.year(), 12, 31),
        Period::Month => {
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1).and_then(|d| d.pred_opt())
        }
    };
    end.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(values: &[f64]) -> ValueSeries {
        let start = date(2022, 1, 3);
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(start + chrono::Duration::days(i as i64), *v))
            .collect();
        ValueSeries::new(points).unwrap()
    }

    #[test]
    fn returns_are_one_shorter_and_dated_by_period_end() {
        let values = series(&[100.0, 102.0, 101.0]);
        let returns = simple_returns(&values);
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.points()[0].date, date(2022, 1, 4));
        assert!((returns.points()[0].value - 0.02).abs() < 1e-12);
    }

    #[test]
    fn equity_round_trips_through_returns() {
        let values = series(&[100.0, 102.0, 101.0, 105.0, 103.0]);
        let rebuilt = reconstruct_equity(&simple_returns(&values), 100.0);
        for (original, rebuilt) in values.values().iter().zip(&rebuilt) {
            assert!((original - rebuilt).abs() < 1e-9);
        }
    }

    #[test]
    fn equity_curve_is_rescaled_to_capital() {
        let values = series(&[50.0, 55.0, 60.0]);
        let equity = equity_curve(&values, 1_000.0);
        assert_eq!(equity[0].value, 1_000.0);
        assert!((equity[2].value - 1_200.0).abs() < 1e-9);
    }

    #[test]
    fn drawdown_and_duration_reset_on_new_peaks() {
        let values = series(&[100.0, 102.0, 101.0, 105.0, 103.0, 104.0]);
        let dd = drawdown_series(values.points());
        assert_eq!(dd[0].value, 0.0);
        assert!((dd[2].value - (101.0 / 102.0 - 1.0)).abs() < 1e-12);
        assert_eq!(dd[3].value, 0.0);
        assert_eq!(drawdown_durations(&values.values()), vec![0, 0, 1, 0, 1, 2]);
    }

    #[test]
    fn drawdown_periods_track_trough_and_recovery() {
        let values = series(&[100.0, 90.0, 80.0, 100.0, 95.0]);
        let periods = drawdown_periods(values.points());
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].trough, date(2022, 1, 5));
        assert_eq!(periods[0].recovery, Some(date(2022, 1, 6)));
        assert_eq!(periods[0].duration, 3);
        assert!((periods[0].depth + 0.2).abs() < 1e-12);
        assert_eq!(periods[1].recovery, None);
        assert_eq!(periods[1].duration, 1);
    }

    #[test]
    fn window_drawdown_duration_starts_from_its_own_level() {
        assert_eq!(max_drawdown_duration(&[0.01, 0.02]), 0);
        assert_eq!(max_drawdown_duration(&[-0.01, -0.01, 0.05, -0.01]), 2);
    }

    #[test]
    fn resampling_keeps_partial_buckets_and_labels_them_by_period_end() {
        let returns = ReturnSeries::new(vec![
            Observation::new(date(2022, 1, 28), 0.01),
            Observation::new(date(2022, 1, 31), 0.02),
            Observation::new(date(2022, 2, 1), -0.01),
            Observation::new(date(2023, 1, 2), 0.03),
        ]);
        let monthly = resample(&returns, Period::Month);
        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly.points()[0].date, date(2022, 1, 31));
        assert!((monthly.points()[0].value - (1.01 * 1.02 - 1.0)).abs() < 1e-12);
        assert_eq!(monthly.points()[1].date, date(2022, 2, 28));

        let yearly = resample(&returns, Period::Year);
        assert_eq!(yearly.len(), 2);
        assert_eq!(yearly.points()[0].date, date(2022, 12, 31));
        assert_eq!(yearly.points()[1].date, date(2023, 12, 31));
    }

    #[test]
    fn december_buckets_roll_into_the_next_year() {
        assert_eq!(bucket_end(date(2021, 12, 15), Period::Month), date(2021, 12, 31));
    }
}
