use core_types::{ConfigurationError, DataError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid input data: {0}")]
    Data(#[from] DataError),

    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unknown plot series '{0}'")]
    UnknownSeries(String),
}
