//! CSV price import.
//!
//! Reads daily prices from a local file with a `date` column (YYYY-MM-DD) and
//! a `close` column; `adj_close` (or `Adj Close`) is used when present.
//! Header matching is case-insensitive, matching Yahoo's own CSV export.

use super::provider::{normalize_bars, DataError, DataSource, FetchResult, PriceProvider};
use crate::domain::DailyBar;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Price provider backed by a local CSV file.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    path: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn csv_err(&self, source: csv::Error) -> DataError {
        DataError::Csv {
            path: self.path_str(),
            source,
        }
    }

    fn read_all(&self) -> Result<Vec<DailyBar>, DataError> {
        let file = File::open(&self.path).map_err(|source| DataError::Io {
            path: self.path_str(),
            source,
        })?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| self.csv_err(e))?
            .iter()
            .map(|h| h.to_lowercase().replace(' ', "_"))
            .collect();

        let find = |name: &str| headers.iter().position(|h| h == name);
        let date_idx = find("date").ok_or_else(|| {
            DataError::Other(format!("{}: missing 'date' column", self.path_str()))
        })?;
        let close_idx = find("close").ok_or_else(|| {
            DataError::Other(format!("{}: missing 'close' column", self.path_str()))
        })?;
        let adj_idx = find("adj_close");

        let mut bars = Vec::new();
        let mut skipped = 0usize;
        for record in rdr.records() {
            let record = record.map_err(|e| self.csv_err(e))?;
            let Some(date) = record
                .get(date_idx)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            else {
                skipped += 1;
                continue;
            };
            let number = |idx: Option<usize>| {
                idx.and_then(|i| record.get(i))
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(f64::NAN)
            };
            bars.push(DailyBar::new(date, number(Some(close_idx)), number(adj_idx)));
        }

        if skipped > 0 {
            warn!(path = %self.path.display(), skipped, "skipped rows with unparseable dates");
        }
        Ok(bars)
    }
}

impl PriceProvider for CsvPriceProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars: Vec<DailyBar> = self
            .read_all()?
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();

        if bars.is_empty() {
            return Err(DataError::NoPriceData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        info!(symbol, bars = bars.len(), path = %self.path.display(), "imported daily prices");

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: normalize_bars(bars),
            source: DataSource::CsvImport,
        })
    }
}
