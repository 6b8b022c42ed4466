use core_types::{ConfigurationError, MetricId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Every catalog metric mapped to its value, or `None` when it is not computable.
///
/// All catalog keys are always present, in catalog order. A value is never NaN
/// or infinite: anything non-finite is stored as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSet {
    values: BTreeMap<MetricId, Option<f64>>,
}

impl MetricSet {
    /// A set with every metric undefined.
    pub fn new() -> Self {
        Self { values: MetricId::ALL.iter().map(|&id| (id, None)).collect() }
    }

    pub(crate) fn set(&mut self, id: MetricId, value: Option<f64>) {
        self.values.insert(id, value.filter(|v| v.is_finite()));
    }

    pub(crate) fn set_count(&mut self, id: MetricId, count: usize) {
        self.set(id, Some(count as f64));
    }

    pub fn get(&self, id: MetricId) -> Option<f64> {
        self.values.get(&id).copied().flatten()
    }

    /// Looks a metric up by its catalog key, failing on names outside the catalog.
    pub fn get_by_name(&self, name: &str) -> Result<Option<f64>, ConfigurationError> {
        let id: MetricId = name.parse()?;
        Ok(self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricId, Option<f64>)> + '_ {
        self.values.iter().map(|(id, value)| (*id, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for MetricSet {
    fn default() -> Self {
        Self::new()
    }
}
