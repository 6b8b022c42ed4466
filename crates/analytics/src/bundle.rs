//! The Results Bundle: the single read-only artifact of a run.
//!
//! Rendering, export and persistence collaborators only ever read from a
//! bundle. Adding custom metrics goes through [`BundleBuilder`], which returns
//! a new bundle and leaves the original untouched.

use crate::error::AnalyticsError;
use crate::metrics::MetricSet;
use crate::returns::DrawdownPeriod;
use chrono::NaiveDate;
use core_types::series::{DRAWDOWN_SERIES, EQUITY_SERIES};
use core_types::{ConfigurationError, MetricCatalog, MetricId, Observation, RollingSeries};
use serde::Serialize;
use std::collections::BTreeMap;

/// A named plot-ready series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlotSeries {
    /// One value per date, e.g. the equity curve or monthly returns.
    Values(Vec<Observation>),
    /// A left-truncated rolling statistic with `None` where undefined.
    Rolling(RollingSeries),
}

impl PlotSeries {
    pub fn len(&self) -> usize {
        match self {
            PlotSeries::Values(points) => points.len(),
            PlotSeries::Rolling(series) => series.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `date`, if the series has a defined one there.
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        match self {
            PlotSeries::Values(points) => points
                .binary_search_by_key(&date, |p| p.date)
                .ok()
                .map(|idx| points[idx].value),
            PlotSeries::Rolling(series) => series.value_at(date),
        }
    }
}

/// What a run looked at and how it was configured.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: f64,
    pub final_value: f64,
    pub has_benchmark: bool,
    pub periods_per_year: f64,
    pub rolling_window: usize,
    pub observations: usize,
}

/// One row of the per-date export: `{date, equity, drawdown, <rolling columns>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub date: NaiveDate,
    pub equity: f64,
    pub drawdown: f64,
    #[serde(flatten)]
    pub rolling: BTreeMap<String, Option<f64>>,
}

/// One row of the scalar export. `value` serializes as `null` when undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    pub metric: String,
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsBundle {
    metrics: MetricSet,
    series: BTreeMap<String, PlotSeries>,
    metadata: Metadata,
    drawdown_periods: Vec<DrawdownPeriod>,
    custom_metrics: BTreeMap<String, Option<f64>>,
}

impl ResultsBundle {
    pub(crate) fn assemble(
        metrics: MetricSet,
        series: BTreeMap<String, PlotSeries>,
        metadata: Metadata,
        mut drawdown_periods: Vec<DrawdownPeriod>,
    ) -> Self {
        drawdown_periods.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        Self {
            metrics,
            series,
            metadata,
            drawdown_periods,
            custom_metrics: BTreeMap::new(),
        }
    }

    pub fn metrics(&self) -> &MetricSet {
        &self.metrics
    }

    pub fn metric(&self, id: MetricId) -> Option<f64> {
        self.metrics.get(id)
    }

    /// Looks up a plot series by name.
    pub fn plot_series(&self, name: &str) -> Result<&PlotSeries, AnalyticsError> {
        self.series
            .get(name)
            .ok_or_else(|| AnalyticsError::UnknownSeries(name.to_string()))
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// All drawdown periods, deepest first.
    pub fn drawdown_periods(&self) -> &[DrawdownPeriod] {
        &self.drawdown_periods
    }

    /// The `n` deepest drawdown periods.
    pub fn top_drawdowns(&self, n: usize) -> &[DrawdownPeriod] {
        let all = self.drawdown_periods();
        &all[..n.min(all.len())]
    }

    pub fn custom_metrics(&self) -> &BTreeMap<String, Option<f64>> {
        &self.custom_metrics
    }

    /// Starts a builder seeded with a copy of this bundle.
    pub fn to_builder(&self) -> BundleBuilder {
        BundleBuilder { bundle: self.clone() }
    }

    /// One row per equity date with the drawdown and every rolling series.
    ///
    /// Rolling cells are `None` before the first full window.
    pub fn table(&self) -> Vec<TableRow> {
        let (Some(PlotSeries::Values(equity)), Some(drawdown)) =
            (self.series.get(EQUITY_SERIES), self.series.get(DRAWDOWN_SERIES))
        else {
            return Vec::new();
        };
        let rolling: Vec<(&String, &RollingSeries)> = self
            .series
            .iter()
            .filter_map(|(name, series)| match series {
                PlotSeries::Rolling(rolling) => Some((name, rolling)),
                PlotSeries::Values(_) => None,
            })
            .collect();

        equity
            .iter()
            .map(|point| TableRow {
                date: point.date,
                equity: point.value,
                drawdown: drawdown.value_at(point.date).unwrap_or(0.0),
                rolling: rolling
                    .iter()
                    .map(|(name, series)| ((*name).clone(), series.value_at(point.date)))
                    .collect(),
            })
            .collect()
    }

    /// One row per catalog metric in catalog order, then any custom metrics.
    pub fn metric_rows(&self, catalog: &MetricCatalog) -> Vec<MetricRow> {
        let catalog_rows = catalog.iter().map(|descriptor| MetricRow {
            metric: descriptor.id.to_string(),
            label: descriptor.label.to_string(),
            value: self.metrics.get(descriptor.id),
        });
        let custom_rows = self.custom_metrics.iter().map(|(name, value)| MetricRow {
            metric: name.clone(),
            label: name.clone(),
            value: *value,
        });
        catalog_rows.chain(custom_rows).collect()
    }
}

/// Produces a new bundle from an existing one with extra custom metrics.
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    bundle: ResultsBundle,
}

impl BundleBuilder {
    /// Adds a metric outside the catalog. Catalog names are reserved.
    pub fn with_custom_metric(
        mut self,
        name: impl Into<String>,
        value: Option<f64>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.parse::<MetricId>().is_ok() {
            return Err(ConfigurationError::ReservedMetricName(name));
        }
        self.bundle.custom_metrics.insert(name, value.filter(|v| v.is_finite()));
        Ok(self)
    }

    pub fn build(self) -> ResultsBundle {
        self.bundle
    }
}
