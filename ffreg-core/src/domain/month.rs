//! Calendar month key.
//!
//! Every join in the pipeline happens on `YearMonth`: price history is
//! reduced to one observation per month and factor rows are keyed by the
//! `YYYYMM` string of the factor file.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// A calendar month (year + month, no day).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MonthParseError {
    #[error("expected exactly six digits (YYYYMM), got '{0}'")]
    NotSixDigits(String),
    #[error("month out of range in '{0}'")]
    MonthOutOfRange(String),
}

impl YearMonth {
    /// Returns `None` when `month` is not in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a factor-file date key. Surrounding whitespace is ignored.
    pub fn parse_yyyymm(raw: &str) -> Result<Self, MonthParseError> {
        let key = raw.trim();
        if key.len() != 6 || !key.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MonthParseError::NotSixDigits(raw.to_string()));
        }
        // Six ASCII digits always fit both integer types.
        let not_digits = |_: ParseIntError| MonthParseError::NotSixDigits(raw.to_string());
        let year: i32 = key[..4].parse().map_err(not_digits)?;
        let month: u32 = key[4..].parse().map_err(not_digits)?;
        Self::new(year, month).ok_or_else(|| MonthParseError::MonthOutOfRange(raw.to_string()))
    }

    pub const fn year(&self) -> i32 {
        self.year
    }

    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_yyyymm(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_keys() {
        let m = YearMonth::parse_yyyymm("202101").unwrap();
        assert_eq!(m.year(), 2021);
        assert_eq!(m.month(), 1);
        assert_eq!(m.to_string(), "2021-01");
    }

    #[test]
    fn trims_padding() {
        assert_eq!(
            YearMonth::parse_yyyymm("  192607 ").unwrap(),
            YearMonth::new(1926, 7).unwrap()
        );
    }

    #[test]
    fn rejects_annual_and_footnote_keys() {
        assert!(YearMonth::parse_yyyymm("2021").is_err());
        assert!(YearMonth::parse_yyyymm("").is_err());
        assert!(YearMonth::parse_yyyymm("Copyright 2024").is_err());
        assert!(YearMonth::parse_yyyymm("2021011").is_err());
        assert!(YearMonth::parse_yyyymm("2021-1").is_err());
    }

    #[test]
    fn rejects_month_thirteen() {
        assert_eq!(
            YearMonth::parse_yyyymm("202113"),
            Err(MonthParseError::MonthOutOfRange("202113".into()))
        );
    }

    #[test]
    fn succ_rolls_over_year() {
        let dec = YearMonth::new(2020, 12).unwrap();
        assert_eq!(dec.succ(), YearMonth::new(2021, 1).unwrap());
        assert_eq!(YearMonth::new(2021, 5).unwrap().succ().month(), 6);
    }

    #[test]
    fn ordering_is_chronological() {
        let a = YearMonth::new(2020, 12).unwrap();
        let b = YearMonth::new(2021, 1).unwrap();
        assert!(a < b);
    }

    #[test]
    fn from_date_drops_day() {
        let d = NaiveDate::from_ymd_opt(2023, 3, 17).unwrap();
        assert_eq!(YearMonth::from_date(d), YearMonth::new(2023, 3).unwrap());
    }
}
