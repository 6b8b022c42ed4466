use crate::enums::MetricId;
use crate::error::ConfigurationError;
use serde::Serialize;

/// How a metric value should be presented by rendering collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFormat {
    /// A fraction rendered as a percentage (0.05 -> 5.00%).
    Percentage,
    /// A dimensionless ratio.
    Ratio,
    /// A count of observations or events.
    Count,
    /// A length measured in periods of the input series.
    Periods,
}

/// Display and dependency information for one catalog metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricDescriptor {
    pub id: MetricId,
    pub label: &'static str,
    pub format: MetricFormat,
    pub requires_benchmark: bool,
}

/// The immutable catalog of every metric the engine knows about.
///
/// Built once at process start and passed by reference to whatever needs to
/// validate or render metric keys.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCatalog {
    descriptors: Vec<MetricDescriptor>,
}

impl MetricCatalog {
    /// The full catalog, in display order.
    pub fn standard() -> Self {
        let descriptors = MetricId::ALL
            .iter()
            .map(|&id| {
                let (label, format) = presentation(id);
                MetricDescriptor {
                    id,
                    label,
                    format,
                    requires_benchmark: id.requires_benchmark(),
                }
            })
            .collect();
        Self { descriptors }
    }

    pub fn get(&self, id: MetricId) -> Option<&MetricDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Resolves a configuration `value_key` to a metric of this catalog.
    pub fn resolve(&self, key: &str) -> Result<&MetricDescriptor, ConfigurationError> {
        let id: MetricId = key.parse()?;
        self.get(id)
            .ok_or_else(|| ConfigurationError::UnknownMetric(key.to_string()))
    }

    pub fn contains(&self, id: MetricId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn presentation(id: MetricId) -> (&'static str, MetricFormat) {
    use MetricFormat::*;
    match id {
        MetricId::TotalReturn => ("Total Return", Percentage),
        MetricId::AnnualizedReturn => ("Annualized Return", Percentage),
        MetricId::AnnualizedVolatility => ("Annualized Volatility", Percentage),
        MetricId::DownsideVolatility => ("Downside Volatility", Percentage),
        MetricId::MaxDrawdown => ("Max Drawdown", Percentage),
        MetricId::MaxDrawdownDuration => ("Max Drawdown Duration", Periods),
        MetricId::AvgDrawdown => ("Average Drawdown", Percentage),
        MetricId::AvgDrawdownDuration => ("Average Drawdown Duration", Periods),
        MetricId::NumDrawdowns => ("Number of Drawdowns", Count),
        MetricId::Var95 => ("Value at Risk", Percentage),
        MetricId::Cvar95 => ("Conditional VaR", Percentage),
        MetricId::SharpeRatio => ("Sharpe Ratio", Ratio),
        MetricId::SortinoRatio => ("Sortino Ratio", Ratio),
        MetricId::CalmarRatio => ("Calmar Ratio", Ratio),
        MetricId::Skewness => ("Skewness", Ratio),
        MetricId::Kurtosis => ("Excess Kurtosis", Ratio),
        MetricId::PositiveDays => ("Positive Periods", Count),
        MetricId::NegativeDays => ("Negative Periods", Count),
        MetricId::PctPositiveDays => ("% Positive Periods", Percentage),
        MetricId::BestMonth => ("Best Month", Percentage),
        MetricId::WorstMonth => ("Worst Month", Percentage),
        MetricId::BestYear => ("Best Year", Percentage),
        MetricId::WorstYear => ("Worst Year", Percentage),
        MetricId::Alpha => ("Alpha (annualized)", Percentage),
        MetricId::Beta => ("Beta", Ratio),
        MetricId::Correlation => ("Correlation", Ratio),
        MetricId::TrackingError => ("Tracking Error", Percentage),
        MetricId::InformationRatio => ("Information Ratio", Ratio),
        MetricId::CaptureRatioUp => ("Upside Capture", Ratio),
        MetricId::CaptureRatioDown => ("Downside Capture", Ratio),
        MetricId::BenchmarkTotalReturn => ("Benchmark Total Return", Percentage),
        MetricId::BenchmarkAnnualizedReturn => ("Benchmark Annualized Return", Percentage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_covers_every_metric_once() {
        let catalog = MetricCatalog::standard();
        assert_eq!(catalog.len(), MetricId::ALL.len());
        for id in MetricId::ALL {
            assert!(catalog.contains(id), "missing {id}");
        }
    }

    #[test]
    fn resolve_fails_fast_on_unknown_keys() {
        let catalog = MetricCatalog::standard();
        assert_eq!(catalog.resolve("calmar_ratio").unwrap().id, MetricId::CalmarRatio);
        assert_eq!(
            catalog.resolve("annual_return").unwrap_err(),
            ConfigurationError::UnknownMetric("annual_return".to_string())
        );
    }

    #[test]
    fn descriptors_carry_the_benchmark_flag() {
        let catalog = MetricCatalog::standard();
        assert!(catalog.get(MetricId::Alpha).unwrap().requires_benchmark);
        assert!(!catalog.get(MetricId::MaxDrawdown).unwrap().requires_benchmark);
    }
}
