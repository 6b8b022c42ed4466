use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed catalog of scalar metrics the point-statistic calculator produces.
///
/// Declaration order is the display order. Nothing outside this enum may become
/// a key of a `MetricSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetricId {
    // I. Returns
    TotalReturn,
    AnnualizedReturn,

    // II. Risk and Drawdown
    AnnualizedVolatility,
    DownsideVolatility,
    MaxDrawdown,
    MaxDrawdownDuration,
    AvgDrawdown,
    AvgDrawdownDuration,
    NumDrawdowns,
    Var95,
    Cvar95,

    // III. Risk-Adjusted Ratios
    SharpeRatio,
    SortinoRatio,
    CalmarRatio,

    // IV. Distribution
    Skewness,
    Kurtosis,
    PositiveDays,
    NegativeDays,
    PctPositiveDays,

    // V. Calendar
    BestMonth,
    WorstMonth,
    BestYear,
    WorstYear,

    // VI. Benchmark-Relative
    Alpha,
    Beta,
    Correlation,
    TrackingError,
    InformationRatio,
    CaptureRatioUp,
    CaptureRatioDown,
    BenchmarkTotalReturn,
    BenchmarkAnnualizedReturn,
}

impl MetricId {
    pub const ALL: [MetricId; 32] = [
        MetricId::TotalReturn,
        MetricId::AnnualizedReturn,
        MetricId::AnnualizedVolatility,
        MetricId::DownsideVolatility,
        MetricId::MaxDrawdown,
        MetricId::MaxDrawdownDuration,
        MetricId::AvgDrawdown,
        MetricId::AvgDrawdownDuration,
        MetricId::NumDrawdowns,
        MetricId::Var95,
        MetricId::Cvar95,
        MetricId::SharpeRatio,
        MetricId::SortinoRatio,
        MetricId::CalmarRatio,
        MetricId::Skewness,
        MetricId::Kurtosis,
        MetricId::PositiveDays,
        MetricId::NegativeDays,
        MetricId::PctPositiveDays,
        MetricId::BestMonth,
        MetricId::WorstMonth,
        MetricId::BestYear,
        MetricId::WorstYear,
        MetricId::Alpha,
        MetricId::Beta,
        MetricId::Correlation,
        MetricId::TrackingError,
        MetricId::InformationRatio,
        MetricId::CaptureRatioUp,
        MetricId::CaptureRatioDown,
        MetricId::BenchmarkTotalReturn,
        MetricId::BenchmarkAnnualizedReturn,
    ];

    /// The stable string key used in configuration files and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricId::TotalReturn => "total_return",
            MetricId::AnnualizedReturn => "annualized_return",
            MetricId::AnnualizedVolatility => "annualized_volatility",
            MetricId::DownsideVolatility => "downside_volatility",
            MetricId::MaxDrawdown => "max_drawdown",
            MetricId::MaxDrawdownDuration => "max_drawdown_duration",
            MetricId::AvgDrawdown => "avg_drawdown",
            MetricId::AvgDrawdownDuration => "avg_drawdown_duration",
            MetricId::NumDrawdowns => "num_drawdowns",
            MetricId::Var95 => "var_95",
            MetricId::Cvar95 => "cvar_95",
            MetricId::SharpeRatio => "sharpe_ratio",
            MetricId::SortinoRatio => "sortino_ratio",
            MetricId::CalmarRatio => "calmar_ratio",
            MetricId::Skewness => "skewness",
            MetricId::Kurtosis => "kurtosis",
            MetricId::PositiveDays => "positive_days",
            MetricId::NegativeDays => "negative_days",
            MetricId::PctPositiveDays => "pct_positive_days",
            MetricId::BestMonth => "best_month",
            MetricId::WorstMonth => "worst_month",
            MetricId::BestYear => "best_year",
            MetricId::WorstYear => "worst_year",
            MetricId::Alpha => "alpha",
            MetricId::Beta => "beta",
            MetricId::Correlation => "correlation",
            MetricId::TrackingError => "tracking_error",
            MetricId::InformationRatio => "information_ratio",
            MetricId::CaptureRatioUp => "capture_ratio_up",
            MetricId::CaptureRatioDown => "capture_ratio_down",
            MetricId::BenchmarkTotalReturn => "benchmark_total_return",
            MetricId::BenchmarkAnnualizedReturn => "benchmark_annualized_return",
        }
    }

    /// Whether the metric can only be computed against an aligned benchmark.
    pub fn requires_benchmark(&self) -> bool {
        matches!(
            self,
            MetricId::Alpha
                | MetricId::Beta
                | MetricId::Correlation
                | MetricId::TrackingError
                | MetricId::InformationRatio
                | MetricId::CaptureRatioUp
                | MetricId::CaptureRatioDown
                | MetricId::BenchmarkTotalReturn
                | MetricId::BenchmarkAnnualizedReturn
        )
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricId {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownMetric(s.to_string()))
    }
}

impl TryFrom<String> for MetricId {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MetricId> for String {
    fn from(id: MetricId) -> Self {
        id.as_str().to_string()
    }
}

/// The kinds of time-indexed statistic the rolling-window engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollingMetric {
    Sharpe,
    Sortino,
    Volatility,
    #[serde(alias = "var")]
    ValueAtRisk,
    Skewness,
    DrawdownDuration,
    /// Compounded return over each configured trailing horizon in months.
    TrailingReturn,
}

impl RollingMetric {
    pub const ALL: [RollingMetric; 7] = [
        RollingMetric::Sharpe,
        RollingMetric::Sortino,
        RollingMetric::Volatility,
        RollingMetric::ValueAtRisk,
        RollingMetric::Skewness,
        RollingMetric::DrawdownDuration,
        RollingMetric::TrailingReturn,
    ];

    /// Name of the plot series this metric produces. Trailing returns get one
    /// series per horizon, see [`RollingMetric::trailing_series_name`].
    pub fn series_name(&self) -> &'static str {
        match self {
            RollingMetric::Sharpe => "rolling_sharpe",
            RollingMetric::Sortino => "rolling_sortino",
            RollingMetric::Volatility => "rolling_volatility",
            RollingMetric::ValueAtRisk => "rolling_var",
            RollingMetric::Skewness => "rolling_skewness",
            RollingMetric::DrawdownDuration => "rolling_drawdown_duration",
            RollingMetric::TrailingReturn => "trailing_return",
        }
    }

    pub fn trailing_series_name(months: u32) -> String {
        format!("trailing_return_{months}m")
    }
}

impl FromStr for RollingMetric {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sharpe" | "rolling_sharpe" => Ok(RollingMetric::Sharpe),
            "sortino" | "rolling_sortino" => Ok(RollingMetric::Sortino),
            "volatility" | "rolling_volatility" => Ok(RollingMetric::Volatility),
            "value_at_risk" | "var" | "rolling_var" => Ok(RollingMetric::ValueAtRisk),
            "skewness" | "rolling_skewness" => Ok(RollingMetric::Skewness),
            "drawdown_duration" | "rolling_drawdown_duration" => {
                Ok(RollingMetric::DrawdownDuration)
            }
            "trailing_return" => Ok(RollingMetric::TrailingReturn),
            other => Err(ConfigurationError::UnknownRollingMetric(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_keys_round_trip_through_strings() {
        for id in MetricId::ALL {
            assert_eq!(id.as_str().parse::<MetricId>().unwrap(), id);
        }
    }

    #[test]
    fn unknown_metric_key_is_a_configuration_error() {
        let err = "sharpe".parse::<MetricId>().unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownMetric("sharpe".to_string()));
    }

    #[test]
    fn metric_id_serializes_as_its_key() {
        let json = serde_json::to_string(&MetricId::Var95).unwrap();
        assert_eq!(json, "\"var_95\"");
        let parsed: Result<MetricId, _> = serde_json::from_str("\"not_a_metric\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn benchmark_metrics_are_flagged() {
        assert!(MetricId::Beta.requires_benchmark());
        assert!(MetricId::CaptureRatioDown.requires_benchmark());
        assert!(!MetricId::SharpeRatio.requires_benchmark());
    }

    #[test]
    fn rolling_metric_accepts_short_and_series_names() {
        assert_eq!("var".parse::<RollingMetric>().unwrap(), RollingMetric::ValueAtRisk);
        assert_eq!(
            "rolling_sharpe".parse::<RollingMetric>().unwrap(),
            RollingMetric::Sharpe
        );
        assert!(matches!(
            "beta".parse::<RollingMetric>(),
            Err(ConfigurationError::UnknownRollingMetric(_))
        ));
        assert_eq!(RollingMetric::trailing_series_name(6), "trailing_return_6m");
    }
}
