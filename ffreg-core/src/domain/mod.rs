//! Domain types: month keys, daily bars, monthly returns, factor tables.

pub mod bar;
pub mod factors;
pub mod month;
pub mod returns;

pub use bar::DailyBar;
pub use factors::{parse_numeric, FactorTable, RISK_FREE_COLUMN};
pub use month::{MonthParseError, YearMonth};
pub use returns::{MonthlyObservation, MonthlyReturnSeries};
