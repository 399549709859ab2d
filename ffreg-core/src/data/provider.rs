//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over price sources (Yahoo Finance, CSV
//! import) so the pipeline can be run offline and mocked in tests.

use crate::domain::DailyBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
///
/// Covers both the price fetch and the factor file; every variant is fatal to
/// the run that hit it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from {provider} for {symbol}")]
    HttpStatus {
        provider: String,
        symbol: String,
        status: u16,
    },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no price data for {symbol} between {start} and {end}")]
    NoPriceData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("factor file {path} has no header row with factor columns")]
    MissingHeader { path: String },

    #[error("data error: {0}")]
    Other(String),
}

/// Where the price data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    CsvImport,
}

/// Result of a successful price fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
    pub source: DataSource,
}

/// Trait for price providers (Yahoo Finance, CSV import, test stubs).
///
/// `end` is exclusive: a bar dated `end` is not part of the result.
pub trait PriceProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over `[start, end)`, sorted by date.
    fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}

/// Sort bars by date and drop duplicate dates (first occurrence wins).
pub(crate) fn normalize_bars(mut bars: Vec<DailyBar>) -> Vec<DailyBar> {
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}
