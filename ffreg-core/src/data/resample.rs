//! Daily → monthly reduction.
//!
//! Each calendar month is reduced to the mean of its daily prices, then the
//! percent change against the previous month is taken. The first month has no
//! predecessor and is dropped.

use crate::domain::{DailyBar, MonthlyObservation, MonthlyReturnSeries, YearMonth};
use std::collections::BTreeMap;
use tracing::debug;

/// Mean daily price per calendar month. Void bars are ignored; a month with
/// no usable price does not appear in the result.
pub fn monthly_average_prices(bars: &[DailyBar]) -> BTreeMap<YearMonth, f64> {
    let mut sums: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
    for bar in bars.iter().filter(|b| !b.is_void()) {
        let entry = sums.entry(YearMonth::from_date(bar.date)).or_insert((0.0, 0));
        entry.0 += bar.price();
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(month, (sum, n))| (month, sum / n as f64))
        .collect()
}

/// Reduce daily bars to a monthly return series (percent, ×100).
///
/// Returns are computed between consecutive months that have prices. When the
/// price history itself has a gap, the month after the gap is measured against
/// the last month before it.
pub fn monthly_returns(ticker: &str, bars: &[DailyBar]) -> MonthlyReturnSeries {
    let averages = monthly_average_prices(bars);
    let mut series = MonthlyReturnSeries::new(ticker);

    let mut prev: Option<f64> = None;
    for (month, average_close) in averages {
        if let Some(prev_close) = prev {
            if prev_close != 0.0 {
                series.insert(
                    month,
                    MonthlyObservation {
                        average_close,
                        return_pct: (average_close / prev_close - 1.0) * 100.0,
                    },
                );
            }
        }
        prev = Some(average_close);
    }

    debug!(
        ticker,
        daily = bars.len(),
        monthly = series.len(),
        "reduced daily prices to monthly returns"
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(y: i32, m: u32, d: u32, close: f64) -> DailyBar {
        DailyBar::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), close, f64::NAN)
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn averages_within_month() {
        let bars = vec![
            bar(2021, 1, 4, 100.0),
            bar(2021, 1, 5, 110.0),
            bar(2021, 2, 1, 121.0),
        ];
        let avg = monthly_average_prices(&bars);
        assert_eq!(avg[&ym(2021, 1)], 105.0);
        assert_eq!(avg[&ym(2021, 2)], 121.0);
    }

    #[test]
    fn first_month_dropped_and_returns_in_percent() {
        let bars = vec![
            bar(2021, 1, 4, 100.0),
            bar(2021, 2, 1, 110.0),
            bar(2021, 3, 1, 99.0),
        ];
        let series = monthly_returns("QQQ", &bars);
        assert_eq!(series.len(), 2);
        assert!(!series.contains(&ym(2021, 1)));
        assert!((series.return_for(&ym(2021, 2)).unwrap() - 10.0).abs() < 1e-12);
        assert!((series.return_for(&ym(2021, 3)).unwrap() + 10.0).abs() < 1e-12);
        assert_eq!(series.get(&ym(2021, 3)).unwrap().average_close, 99.0);
        assert!(series.is_gap_free());
    }

    #[test]
    fn void_bars_ignored() {
        let bars = vec![
            bar(2021, 1, 4, 100.0),
            bar(2021, 1, 5, f64::NAN),
            bar(2021, 2, 1, 150.0),
        ];
        let series = monthly_returns("QQQ", &bars);
        assert!((series.return_for(&ym(2021, 2)).unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn unsorted_input_gives_sorted_output() {
        let bars = vec![
            bar(2021, 3, 1, 120.0),
            bar(2021, 1, 4, 100.0),
            bar(2021, 2, 1, 110.0),
        ];
        let series = monthly_returns("QQQ", &bars);
        let months: Vec<_> = series.months().copied().collect();
        assert_eq!(months, vec![ym(2021, 2), ym(2021, 3)]);
    }

    #[test]
    fn empty_and_single_month() {
        assert!(monthly_returns("QQQ", &[]).is_empty());
        assert!(monthly_returns("QQQ", &[bar(2021, 1, 4, 1.0)]).is_empty());
    }
}
