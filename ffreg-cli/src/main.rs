//! ffreg CLI: regress an ETF's monthly excess returns on Fama-French factors.
//!
//! Commands:
//! - `run`: fetch prices, join with the factor file, fit OLS, write the chart
//! - `factors`: list the columns and month range of a factor file

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ffreg_core::data::{load_factor_table, CsvPriceProvider, PriceProvider, YahooProvider};
use ffreg_runner::{render_summary, run_regression_report, RegressionConfig, DEFAULT_OUTPUT_PATH};

#[derive(Parser)]
#[command(
    name = "ffreg",
    about = "Fama-French factor regression for a single ticker"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the regression and write the coefficient chart.
    Run {
        /// Path to a TOML config file. Replaces all other run options.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Ticker symbol.
        #[arg(long, default_value = "QQQ")]
        ticker: String,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long, default_value = "2006-01-01")]
        start: String,

        /// End date (YYYY-MM-DD), exclusive.
        #[arg(long, default_value = "2023-12-31")]
        end: String,

        /// Fama-French factor CSV.
        #[arg(long, default_value = "data/F-F_Research_Data_Factors.CSV")]
        factor_file: PathBuf,

        /// Factor columns to regress on (repeatable).
        #[arg(long = "factor", default_values_t = vec!["Mkt-RF".to_string()])]
        factors: Vec<String>,

        /// Risk-free rate column in the factor file.
        #[arg(long, default_value = "RF")]
        risk_free_column: String,

        /// Two-sided confidence level for coefficient intervals.
        #[arg(long, default_value_t = 0.95)]
        confidence: f64,

        /// Output SVG path.
        #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,

        /// Read daily prices from a local CSV instead of Yahoo Finance.
        #[arg(long)]
        prices_csv: Option<PathBuf>,
    },
    /// List factor columns and the month range of a factor file.
    Factors {
        /// Fama-French factor CSV.
        #[arg(default_value = "data/F-F_Research_Data_Factors.CSV")]
        factor_file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticker,
            start,
            end,
            factor_file,
            factors,
            risk_free_column,
            confidence,
            output,
            prices_csv,
        } => {
            let config = match config {
                Some(path) => RegressionConfig::from_file(&path)?,
                None => RegressionConfig::new(
                    ticker,
                    parse_date(&start)?,
                    parse_date(&end)?,
                    factor_file,
                    factors,
                )?
                .with_risk_free_column(risk_free_column)
                .with_confidence_level(confidence)?
                .with_output_path(output),
            };
            run_cmd(&config, prices_csv)
        }
        Commands::Factors { factor_file } => run_factors(&factor_file),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Ok(date),
        Err(e) => bail!("invalid date '{raw}' (expected YYYY-MM-DD): {e}"),
    }
}

fn run_cmd(config: &RegressionConfig, prices_csv: Option<PathBuf>) -> Result<()> {
    tracing::debug!(?config, "resolved configuration");
    let provider: Box<dyn PriceProvider> = match prices_csv {
        Some(path) => Box::new(CsvPriceProvider::new(path)),
        None => Box::new(YahooProvider::new()?),
    };

    let report = run_regression_report(config, provider.as_ref())?;

    let heading = format!(
        "{}: {} months ({} to {}), run {}",
        report.chart_title,
        report.months.len(),
        report.months.first().map(|m| m.to_string()).unwrap_or_default(),
        report.months.last().map(|m| m.to_string()).unwrap_or_default(),
        report.run_id.get(..12).unwrap_or(&report.run_id),
    );
    println!("{}", render_summary(&report.model, &heading));
    println!("{}", report.completion_message());
    Ok(())
}

fn run_factors(factor_file: &Path) -> Result<()> {
    let table = load_factor_table(factor_file)?;
    if table.is_empty() {
        bail!("no monthly rows in {}", factor_file.display());
    }
    let first = table.months().next().map(|m| m.to_string()).unwrap_or_default();
    let last = table.months().last().map(|m| m.to_string()).unwrap_or_default();

    println!("File:    {}", factor_file.display());
    println!("Months:  {} ({first} to {last})", table.len());
    println!("Columns: {}", table.columns().join(", "));
    Ok(())
}
