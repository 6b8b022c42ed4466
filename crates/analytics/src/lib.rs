//! # Tearsheet Analytics Engine
//!
//! This crate turns a portfolio value series (and an optional benchmark) into a
//! validated, reproducible bundle of performance statistics.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Logic:** A pure computation crate. It depends on `core-types`
//!   (Layer 0) for its data model and on `configuration` (Layer 1) for settings.
//!   It performs no I/O and never installs a tracing subscriber.
//! - **Stateless Calculation:** `AnalyticsEngine` holds only immutable settings.
//!   Every run builds a private `ResultsBundle`, so runs can proceed in parallel.
//! - **Undefined is not zero:** statistics that are well posed but not
//!   computable (zero variance, no benchmark) are `None`, while malformed input
//!   fails the run with a `DataError`.
//!
//! ## Data Flow
//!
//! raw series -> `validation` -> `returns` -> {`calculator`, `rolling`} -> `bundle`
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: `run` for one strategy and `run_batch` for many.
//! - `ResultsBundle`: metrics, named plot series, metadata and export rows.
//! - `MetricSet`: the closed metric catalog mapped to optional values.
//! - `AnalyticsError`: the error type returned from this crate.

pub mod annualization;
pub mod bundle;
pub mod calculator;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod returns;
pub mod rolling;
pub mod stats;
pub mod validation;

pub use bundle::{BundleBuilder, Metadata, MetricRow, PlotSeries, ResultsBundle, TableRow};
pub use calculator::PointStatistics;
pub use engine::{AnalyticsEngine, RunOptions, RunRequest};
pub use error::AnalyticsError;
pub use metrics::MetricSet;
pub use returns::{DrawdownPeriod, reconstruct_equity};
pub use rolling::{RollingEngine, rolling_apply};
pub use validation::{Alignment, DateRange};
