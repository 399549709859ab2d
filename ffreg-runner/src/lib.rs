//! ffreg runner: configuration, pipeline orchestration and report rendering.
//!
//! This crate builds on `ffreg-core` to provide:
//! - `RegressionConfig` (validated, TOML-loadable, content-hashed)
//! - The fetch → align → fit → render pipeline
//! - SVG coefficient chart and text summary

pub mod config;
pub mod pipeline;
pub mod reporting;

pub use config::{ConfigError, RegressionConfig, RunId, DEFAULT_OUTPUT_PATH};
pub use pipeline::{
    dataset_hash, fit_from_provider, run_regression_report, RegressionReport, RunError,
};
pub use reporting::{render_summary, ReportError};
