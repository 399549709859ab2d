//! Monthly return series for the single asset under study.

use super::month::YearMonth;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One month of the asset: mean closing price and percent change vs the prior month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyObservation {
    pub average_close: f64,
    /// Percent change (already multiplied by 100).
    pub return_pct: f64,
}

/// Monthly returns keyed by calendar month.
///
/// Backed by a `BTreeMap`, so iteration is always in chronological order and
/// a month can appear at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturnSeries {
    pub ticker: String,
    observations: BTreeMap<YearMonth, MonthlyObservation>,
}

impl MonthlyReturnSeries {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            observations: BTreeMap::new(),
        }
    }

    /// Build a series straight from `(month, return_pct)` pairs.
    ///
    /// The average close is unknown in that case and set to NaN. Used by
    /// callers that already have monthly returns (and by tests).
    pub fn from_returns(
        ticker: impl Into<String>,
        returns: impl IntoIterator<Item = (YearMonth, f64)>,
    ) -> Self {
        let mut series = Self::new(ticker);
        for (month, return_pct) in returns {
            series.insert(
                month,
                MonthlyObservation {
                    average_close: f64::NAN,
                    return_pct,
                },
            );
        }
        series
    }

    /// Insert or replace the observation for `month`.
    pub fn insert(
        &mut self,
        month: YearMonth,
        obs: MonthlyObservation,
    ) -> Option<MonthlyObservation> {
        self.observations.insert(month, obs)
    }

    pub fn get(&self, month: &YearMonth) -> Option<&MonthlyObservation> {
        self.observations.get(month)
    }

    pub fn return_for(&self, month: &YearMonth) -> Option<f64> {
        self.observations.get(month).map(|o| o.return_pct)
    }

    pub fn contains(&self, month: &YearMonth) -> bool {
        self.observations.contains_key(month)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&YearMonth, &MonthlyObservation)> {
        self.observations.iter()
    }

    pub fn months(&self) -> impl Iterator<Item = &YearMonth> {
        self.observations.keys()
    }

    pub fn first_month(&self) -> Option<YearMonth> {
        self.observations.keys().next().copied()
    }

    pub fn last_month(&self) -> Option<YearMonth> {
        self.observations.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// True when consecutive keys are consecutive calendar months.
    pub fn is_gap_free(&self) -> bool {
        let months: Vec<_> = self.observations.keys().collect();
        months.windows(2).all(|w| w[0].succ() == *w[1])
    }
}
