//! Data acquisition: price providers, monthly reduction, factor files, alignment.

pub mod align;
pub mod csv_prices;
pub mod factor_file;
pub mod provider;
pub mod resample;
pub mod yahoo;

pub use align::{align_excess_returns, AlignError, ExcessReturnRow, ExcessReturnTable};
pub use csv_prices::CsvPriceProvider;
pub use factor_file::{load_factor_table, parse_factor_csv};
pub use provider::{DataError, DataSource, FetchResult, PriceProvider};
pub use resample::{monthly_average_prices, monthly_returns};
pub use yahoo::YahooProvider;
