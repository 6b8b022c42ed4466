//! Scalar statistics over slices of periodic returns.
//!
//! The point-statistic calculator and the rolling-window engine both call into
//! this module, so a rolling value is exactly the point value of its window.
//! Every function answers `None` when the statistic is undefined for the input.

use statrs::statistics::Statistics;

/// Denominators with a magnitude at or below this are treated as zero.
pub const EPSILON: f64 = 1e-12;

/// Which side of the benchmark a capture ratio is measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    Up,
    Down,
}

pub fn mean(returns: &[f64]) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    Some(returns.mean())
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    Some(returns.std_dev())
}

pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    sample_std(returns).map(|sd| sd * periods_per_year.sqrt())
}

/// Sample standard deviation of the strictly negative returns.
pub fn downside_deviation(returns: &[f64]) -> Option<f64> {
    let negatives: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    sample_std(&negatives)
}

pub fn downside_volatility(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    downside_deviation(returns).map(|dd| dd * periods_per_year.sqrt())
}

pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    let sd = sample_std(returns)?;
    if sd <= EPSILON {
        return None;
    }
    Some(mean(returns)? / sd * periods_per_year.sqrt())
}

pub fn sortino_ratio(returns: &[f64], periods_per_year: f64) -> Option<f64> {
    let dd = downside_deviation(returns)?;
    if dd <= EPSILON {
        return None;
    }
    Some(mean(returns)? / dd * periods_per_year.sqrt())
}

/// Geometrically linked return: `prod(1 + r) - 1`.
pub fn compound(returns: &[f64]) -> f64 {
    returns.iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

/// `(1 + total_return)^(periods_per_year / periods) - 1`.
pub fn annualized_return(total_return: f64, periods: usize, periods_per_year: f64) -> Option<f64> {
    let growth = 1.0 + total_return;
    if periods == 0 || growth <= 0.0 {
        return None;
    }
    Some(growth.powf(periods_per_year / periods as f64) - 1.0)
}

pub fn calmar_ratio(annualized_return: Option<f64>, max_drawdown: f64) -> Option<f64> {
    if max_drawdown.abs() <= EPSILON {
        return None;
    }
    annualized_return.map(|ar| ar / max_drawdown.abs())
}

/// The `q`-quantile with linear interpolation between order statistics.
pub fn quantile(returns: &[f64], q: f64) -> Option<f64> {
    if returns.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Historical VaR: the `(1 - confidence)` quantile of the return distribution.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> Option<f64> {
    quantile(returns, 1.0 - confidence)
}

/// Mean of the returns at or below the historical VaR.
pub fn conditional_value_at_risk(returns: &[f64], confidence: f64) -> Option<f64> {
    let var = value_at_risk(returns, confidence)?;
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    mean(&tail)
}

/// Central moments `(m2, m3, m4)` with an n denominator.
fn central_moments(returns: &[f64]) -> (f64, f64, f64) {
    let n = returns.len() as f64;
    let m = returns.mean();
    returns.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), r| {
        let d = r - m;
        let d2 = d * d;
        (m2 + d2 / n, m3 + d2 * d / n, m4 + d2 * d2 / n)
    })
}

/// Sample-bias-corrected skewness (adjusted Fisher-Pearson, G1).
pub fn skewness(returns: &[f64]) -> Option<f64> {
    let n = returns.len();
    if n < 3 {
        return None;
    }
    let (m2, m3, _) = central_moments(returns);
    if m2.sqrt() <= EPSILON {
        return None;
    }
    let n = n as f64;
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Sample-bias-corrected excess kurtosis (G2).
pub fn excess_kurtosis(returns: &[f64]) -> Option<f64> {
    let n = returns.len();
    if n < 4 {
        return None;
    }
    let (m2, _, m4) = central_moments(returns);
    if m2.sqrt() <= EPSILON {
        return None;
    }
    let n = n as f64;
    let g2 = m4 / (m2 * m2) - 3.0;
    Some((n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0))
}

/// Counts of strictly positive and strictly negative returns; zeros count as neither.
pub fn count_signs(returns: &[f64]) -> (usize, usize) {
    returns.iter().fold((0, 0), |(pos, neg), r| {
        if *r > 0.0 {
            (pos + 1, neg)
        } else if *r < 0.0 {
            (pos, neg + 1)
        } else {
            (pos, neg)
        }
    })
}

/// OLS slope of strategy returns on benchmark returns.
pub fn beta(strategy: &[f64], benchmark: &[f64]) -> Option<f64> {
    if strategy.len() < 2 || strategy.len() != benchmark.len() {
        return None;
    }
    let var_b = benchmark.variance();
    if var_b.sqrt() <= EPSILON {
        return None;
    }
    Some(strategy.covariance(benchmark) / var_b)
}

/// OLS intercept per period, annualized linearly by `periods_per_year`.
pub fn alpha(strategy: &[f64], benchmark: &[f64], periods_per_year: f64) -> Option<f64> {
    let beta = beta(strategy, benchmark)?;
    Some((strategy.mean() - beta * benchmark.mean()) * periods_per_year)
}

/// Pearson correlation.
pub fn correlation(strategy: &[f64], benchmark: &[f64]) -> Option<f64> {
    if strategy.len() < 2 || strategy.len() != benchmark.len() {
        return None;
    }
    let sd_s = strategy.std_dev();
    let sd_b = benchmark.std_dev();
    if sd_s <= EPSILON || sd_b <= EPSILON {
        return None;
    }
    Some(strategy.covariance(benchmark) / (sd_s * sd_b))
}

pub fn tracking_error(strategy: &[f64], benchmark: &[f64], periods_per_year: f64) -> Option<f64> {
    if strategy.len() != benchmark.len() {
        return None;
    }
    let active: Vec<f64> = strategy.iter().zip(benchmark).map(|(s, b)| s - b).collect();
    annualized_volatility(&active, periods_per_year)
}

pub fn information_ratio(alpha: Option<f64>, tracking_error: Option<f64>) -> Option<f64> {
    let te = tracking_error?;
    if te <= EPSILON {
        return None;
    }
    alpha.map(|a| a / te)
}

/// Strategy compounded return over the periods where the benchmark moved in
/// `market`'s direction, divided by the benchmark's compounded return over the same periods.
pub fn capture_ratio(strategy: &[f64], benchmark: &[f64], market: Market) -> Option<f64> {
    if strategy.len() != benchmark.len() {
        return None;
    }
    let (subset_s, subset_b): (Vec<f64>, Vec<f64>) = strategy
        .iter()
        .zip(benchmark)
        .filter(|(_, b)| match market {
            Market::Up => **b > 0.0,
            Market::Down => **b < 0.0,
        })
        .map(|(s, b)| (*s, *b))
        .unzip();
    if subset_b.is_empty() {
        return None;
    }
    let bench_cum = compound(&subset_b);
    if bench_cum.abs() <= EPSILON {
        return None;
    }
    Some(compound(&subset_s) / bench_cum)
}
