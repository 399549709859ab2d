//! ffreg core: domain types, data acquisition and OLS estimation for
//! Fama-French factor regressions.
//!
//! - Domain types (daily bars, calendar months, monthly returns, factor tables)
//! - Price providers (Yahoo Finance chart API, CSV import)
//! - Factor file loading and month-keyed alignment
//! - OLS via SVD pseudo-inverse with t-based inference

pub mod data;
pub mod domain;
pub mod regression;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner hands across threads is
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::DailyBar>();
        require_sync::<domain::DailyBar>();
        require_send::<domain::YearMonth>();
        require_sync::<domain::YearMonth>();
        require_send::<domain::MonthlyReturnSeries>();
        require_sync::<domain::MonthlyReturnSeries>();
        require_send::<domain::FactorTable>();
        require_sync::<domain::FactorTable>();

        require_send::<data::ExcessReturnTable>();
        require_sync::<data::ExcessReturnTable>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::CsvPriceProvider>();
        require_sync::<data::CsvPriceProvider>();

        require_send::<regression::FittedModel>();
        require_sync::<regression::FittedModel>();
        require_send::<regression::RegressionError>();
        require_sync::<regression::RegressionError>();
    }

    /// Providers are usable as trait objects.
    #[test]
    fn price_provider_is_object_safe() {
        fn takes_dyn(p: &dyn data::PriceProvider) -> &str {
            p.name()
        }
        let csv = data::CsvPriceProvider::new("prices.csv");
        assert_eq!(takes_dyn(&csv), "csv_import");
    }
}
