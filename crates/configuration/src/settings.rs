use core_types::{BASE_PLOT_SERIES, ConfigurationError, MetricCatalog, MetricId, RollingMetric};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub annualization: Annualization,
    pub rolling: RollingSettings,
    pub risk: RiskSettings,
    pub dashboard: DashboardSettings,
    pub logging: LoggingSettings,
}

/// The single periods-per-year policy shared by point and rolling statistics.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Annualization {
    /// Fixed annualization factor (252 for daily, 12 for monthly, ...).
    /// When omitted it is inferred per run from the median observation spacing.
    pub periods_per_year: Option<f64>,
}

/// Parameters for the rolling-window engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RollingSettings {
    /// Window length in periods. Defaults to one year of periods.
    pub window: Option<usize>,
    pub metrics: Vec<RollingMetric>,
    /// Horizons, in calendar months, of the trailing return series.
    pub trailing_months: Vec<u32>,
}

/// Parameters for the tail-risk statistics.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Confidence level of the historical VaR/CVaR (0.95 keeps the 5% tail).
    pub var_confidence: f64,
}

/// Layout of the metric cards and charts a dashboard collaborator renders.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub max_cols: usize,
    pub cards: Vec<MetricCard>,
    pub charts: Vec<ChartSpec>,
}

/// A single scalar shown on the dashboard. `value_key` must name a catalog metric.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricCard {
    pub title: String,
    pub value_key: MetricId,
}

/// A chart bound to one of the bundle's plot series.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub series: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for RollingSettings {
    fn default() -> Self {
        Self {
            window: None,
            metrics: RollingMetric::ALL.to_vec(),
            trailing_months: vec![3, 6, 12],
        }
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self { var_confidence: 0.95 }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        let card = |title: &str, value_key| MetricCard { title: title.to_string(), value_key };
        let chart = |title: &str, series: &str| ChartSpec {
            title: title.to_string(),
            series: series.to_string(),
        };
        Self {
            max_cols: 2,
            cards: vec![
                card("Annualized Return", MetricId::AnnualizedReturn),
                card("Volatility", MetricId::AnnualizedVolatility),
                card("Sharpe Ratio", MetricId::SharpeRatio),
                card("Max Drawdown", MetricId::MaxDrawdown),
            ],
            charts: vec![
                chart("Equity Curve", "equity"),
                chart("Drawdown Chart", "drawdown"),
                chart("Monthly Returns", "monthly_returns"),
                chart("Rolling Sharpe Ratio", "rolling_sharpe"),
            ],
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "info".to_string(), directory: None }
    }
}

impl Settings {
    /// Checks everything serde cannot: numeric bounds, and that the dashboard
    /// only references metrics and series that actually exist.
    pub fn validate(&self, catalog: &MetricCatalog) -> Result<(), ConfigurationError> {
        self.validate_computation()?;

        for card in &self.dashboard.cards {
            catalog.resolve(card.value_key.as_str())?;
        }

        let known_series = self.rolling.series_names();
        for chart in &self.dashboard.charts {
            let known = BASE_PLOT_SERIES.contains(&chart.series.as_str())
                || known_series.iter().any(|name| name == &chart.series);
            if !known {
                return Err(ConfigurationError::UnknownSeries(chart.series.clone()));
            }
        }
        Ok(())
    }

    /// The subset of [`Settings::validate`] the analytics engine depends on.
    pub fn validate_computation(&self) -> Result<(), ConfigurationError> {
        if let Some(ppy) = self.annualization.periods_per_year {
            if !ppy.is_finite() || ppy <= 0.0 {
                return Err(ConfigurationError::InvalidPeriodsPerYear(ppy));
            }
        }
        self.rolling.validate()?;

        let confidence = self.risk.var_confidence;
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(ConfigurationError::InvalidConfidence(confidence));
        }
        Ok(())
    }
}

impl RollingSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if let Some(window) = self.window {
            if window < 2 {
                return Err(ConfigurationError::InvalidWindow(window));
            }
        }
        if let Some(&months) = self.trailing_months.iter().find(|&&m| m == 0) {
            return Err(ConfigurationError::InvalidTrailingMonths(months));
        }
        Ok(())
    }

    /// Names of the rolling plot series this configuration produces.
    pub fn series_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for metric in &self.metrics {
            match metric {
                RollingMetric::TrailingReturn => names.extend(
                    self.trailing_months
                        .iter()
                        .map(|&m| RollingMetric::trailing_series_name(m)),
                ),
                other => names.push(other.series_name().to_string()),
            }
        }
        names
    }
}
