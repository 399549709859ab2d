//! Regression pipeline: fetch prices, load factors, align, fit, render.
//!
//! One synchronous pass per call. Every stage error is fatal and nothing is
//! written unless the fit succeeds.

use std::path::PathBuf;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use ffreg_core::data::align::validate_selection;
use ffreg_core::data::{
    align_excess_returns, load_factor_table, monthly_returns, AlignError, DataError,
    DataSource, ExcessReturnTable, PriceProvider,
};
use ffreg_core::domain::YearMonth;
use ffreg_core::regression::{fit_ols, FittedModel, RegressionError};

use crate::config::{ConfigError, RegressionConfig, RunId};
use crate::reporting::{chart_title, write_coefficient_chart, ReportError};

/// Errors from the pipeline.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("config error: {0}")]
    Selection(#[from] AlignError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("regression error: {0}")]
    Regression(#[from] RegressionError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

/// Outcome of one regression run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    pub run_id: RunId,
    pub ticker: String,
    pub model: FittedModel,
    /// Months that entered the join, before missing-value cleaning.
    pub months: Vec<YearMonth>,
    /// BLAKE3 over the aligned rows. Same data in, same hash out.
    pub dataset_hash: String,
    pub source: DataSource,
    pub chart_title: String,
    pub chart_path: PathBuf,
}

impl RegressionReport {
    /// The line printed after a successful run.
    pub fn completion_message(&self) -> String {
        format!("Plot saved as '{}'", self.chart_path.display())
    }
}

/// Fit the model without writing anything. Used by the full pipeline and by
/// callers that only want the estimates.
pub fn fit_from_provider(
    config: &RegressionConfig,
    provider: &dyn PriceProvider,
) -> Result<(ExcessReturnTable, FittedModel, DataSource), RunError> {
    config.validate()?;

    // Factor file first: a bad selection fails before any network traffic.
    let factors = load_factor_table(&config.factor_file)?;
    validate_selection(&factors, &config.factors, &config.risk_free_column)?;

    let fetched = provider.fetch_daily(&config.ticker, config.start, config.end)?;
    info!(
        provider = provider.name(),
        symbol = %fetched.symbol,
        bars = fetched.bars.len(),
        "fetched daily prices"
    );

    let returns = monthly_returns(&config.ticker, &fetched.bars);
    let table = align_excess_returns(
        &returns,
        &factors,
        &config.factors,
        &config.risk_free_column,
    )?;
    let model = fit_ols(&table, config.confidence_level)?;
    Ok((table, model, fetched.source))
}

/// Run the full pipeline and write the coefficient chart.
pub fn run_regression_report(
    config: &RegressionConfig,
    provider: &dyn PriceProvider,
) -> Result<RegressionReport, RunError> {
    let run_id = config.run_id();
    info!(
        run_id = %run_id,
        ticker = %config.ticker,
        factors = ?config.factors,
        "starting regression run"
    );

    let (table, model, source) = fit_from_provider(config, provider)?;

    let title = chart_title(&config.ticker, config.start.year(), config.end.year());
    write_coefficient_chart(&model, &title, &config.output_path)?;

    let report = RegressionReport {
        run_id,
        ticker: config.ticker.clone(),
        months: table.months().collect(),
        dataset_hash: dataset_hash(&table),
        model,
        source,
        chart_title: title,
        chart_path: config.output_path.clone(),
    };
    info!("{}", report.completion_message());
    Ok(report)
}

/// BLAKE3 over the aligned table's JSON form.
pub fn dataset_hash(table: &ExcessReturnTable) -> String {
    // NaN serializes as null, so this cannot fail for plain f64 rows.
    let json = serde_json::to_vec(table).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}
