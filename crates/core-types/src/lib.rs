pub mod catalog;
pub mod enums;
pub mod error;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use catalog::{MetricCatalog, MetricDescriptor, MetricFormat};
pub use enums::{MetricId, RollingMetric};
pub use error::{ConfigurationError, DataError};
pub use series::{
    AlignedPair, BASE_PLOT_SERIES, Observation, ReturnSeries, RollingSeries, ValueSeries,
};
