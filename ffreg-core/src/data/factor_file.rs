//! Fama-French factor file loader.
//!
//! The monthly research factor files carry a free-text preamble, a header row
//! whose first cell is blank (`,Mkt-RF,SMB,HML,RF`), one row per month keyed
//! `YYYYMM`, and then footnotes and an annual section keyed `YYYY`. Only the
//! monthly rows survive loading.

use super::provider::DataError;
use crate::domain::{FactorTable, YearMonth};
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

fn month_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{6}$").expect("static pattern is valid"))
}

/// A record that could name columns: something non-empty after the date cell.
/// The header is the last such record before the first month row, so preamble
/// sentences containing commas are overwritten by the real header.
fn names_columns(record: &StringRecord) -> bool {
    record.iter().skip(1).any(|c| !c.is_empty())
}

fn column_names(header: &StringRecord) -> Vec<String> {
    header.iter().skip(1).map(str::to_string).collect()
}

/// Load a factor table from a CSV file on disk.
pub fn load_factor_table(path: impl AsRef<Path>) -> Result<FactorTable, DataError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading factor data");
    let file = File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_factor_csv(file, &path.display().to_string())
}

/// Parse factor CSV content. `source_name` is only used in error messages.
pub fn parse_factor_csv<R: Read>(reader: R, source_name: &str) -> Result<FactorTable, DataError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let csv_err = |source: csv::Error| DataError::Csv {
        path: source_name.to_string(),
        source,
    };

    let missing_header = || DataError::MissingHeader {
        path: source_name.to_string(),
    };

    let mut header: Option<StringRecord> = None;
    let mut parsed: Option<FactorTable> = None;
    let mut skipped = 0usize;
    let mut duplicates = 0usize;

    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let key = record.get(0).unwrap_or_default();
        let is_month_row = month_key_pattern().is_match(key);

        if parsed.is_none() {
            if !is_month_row {
                if names_columns(&record) {
                    header = Some(record);
                }
                continue;
            }
            let columns = header.as_ref().map(column_names).ok_or_else(missing_header)?;
            parsed = Some(FactorTable::new(columns));
        }
        let Some(table) = parsed.as_mut() else {
            continue;
        };

        if !is_month_row {
            skipped += 1;
            continue;
        }
        let Ok(month) = YearMonth::parse_yyyymm(key) else {
            skipped += 1;
            continue;
        };

        let cells = record.iter().skip(1).map(str::to_string).collect();
        if !table.insert_row(month, cells) {
            duplicates += 1;
        }
    }

    // A header with no month rows after it still yields an (empty) table.
    let table = match parsed {
        Some(table) => table,
        None => FactorTable::new(header.as_ref().map(column_names).ok_or_else(missing_header)?),
    };

    if duplicates > 0 {
        warn!(source = source_name, duplicates, "duplicate months in factor file, kept first");
    }
    debug!(
        source = source_name,
        rows = table.len(),
        skipped,
        columns = ?table.columns(),
        "parsed factor table"
    );
    Ok(table)
}
