//! Report rendering: coefficient chart and text summary.

pub mod chart;
pub mod summary;

use thiserror::Error;

pub use chart::{chart_title, render_coefficient_chart, write_coefficient_chart};
pub use summary::render_summary;

/// Rendering failures. Fatal to the run; never retried.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write report to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
