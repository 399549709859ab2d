//! Daily price bar, the raw unit returned by a price provider.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closing prices for a single ticker on a single trading day.
///
/// `adj_close` is NaN when the source does not publish an adjusted series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub close: f64,
    pub adj_close: f64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, close: f64, adj_close: f64) -> Self {
        Self {
            date,
            close,
            adj_close,
        }
    }

    /// Price used for monthly averaging: adjusted close when available,
    /// raw close otherwise. NaN when neither is finite.
    pub fn price(&self) -> f64 {
        if self.adj_close.is_finite() {
            self.adj_close
        } else if self.close.is_finite() {
            self.close
        } else {
            f64::NAN
        }
    }

    /// Returns true if the bar carries no usable price.
    pub fn is_void(&self) -> bool {
        !self.price().is_finite()
    }
}
