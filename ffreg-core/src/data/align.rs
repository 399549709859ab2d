//! Month-keyed alignment of asset returns with factor rows.
//!
//! The join is an explicit inner join on [`YearMonth`]: a month is kept only
//! when both the return series and the factor table have it, and every value
//! in an output row is looked up by that month. Input ordering never affects
//! which values end up side by side.

use crate::domain::{FactorTable, MonthlyReturnSeries, YearMonth};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration errors raised while selecting factor columns.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    #[error("no factors selected")]
    NoFactorsSelected,

    #[error("no valid factors: {missing:?} not in factor table (available: {available:?})")]
    UnknownFactors {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("risk-free column '{column}' not in factor table (available: {available:?})")]
    MissingRiskFreeColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("row {month} has {found} factor values, expected {expected}")]
    RowWidthMismatch {
        month: YearMonth,
        expected: usize,
        found: usize,
    },
}

/// One month of regression input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcessReturnRow {
    pub month: YearMonth,
    /// Selected factor values, in selection order. `None` = missing.
    pub factors: Vec<Option<f64>>,
    pub risk_free: Option<f64>,
    pub asset_return: f64,
    /// `asset_return - risk_free`; missing when either side is.
    pub excess_return: Option<f64>,
}

/// Regression-ready table: selected factors, risk-free rate and excess return
/// per month, sorted by month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableParts")]
pub struct ExcessReturnTable {
    factor_names: Vec<String>,
    rows: Vec<ExcessReturnRow>,
}

/// Unchecked wire form; deserialized tables go through [`ExcessReturnTable::from_rows`].
#[derive(Deserialize)]
struct TableParts {
    factor_names: Vec<String>,
    rows: Vec<ExcessReturnRow>,
}

impl TryFrom<TableParts> for ExcessReturnTable {
    type Error = AlignError;

    fn try_from(parts: TableParts) -> Result<Self, Self::Error> {
        Self::from_rows(parts.factor_names, parts.rows)
    }
}

impl ExcessReturnTable {
    /// Build a table from prepared rows, sorted by month. Every row must carry
    /// one value per factor name.
    pub fn from_rows(
        factor_names: Vec<String>,
        mut rows: Vec<ExcessReturnRow>,
    ) -> Result<Self, AlignError> {
        if let Some(bad) = rows.iter().find(|r| r.factors.len() != factor_names.len()) {
            return Err(AlignError::RowWidthMismatch {
                month: bad.month,
                expected: factor_names.len(),
                found: bad.factors.len(),
            });
        }
        rows.sort_by_key(|r| r.month);
        Ok(Self { factor_names, rows })
    }

    pub fn factor_names(&self) -> &[String] {
        &self.factor_names
    }

    pub fn rows(&self) -> &[ExcessReturnRow] {
        &self.rows
    }

    pub fn months(&self) -> impl Iterator<Item = YearMonth> + '_ {
        self.rows.iter().map(|r| r.month)
    }

    /// Values of one selected factor column, in month order.
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.factor_names.iter().position(|f| f == name)?;
        Some(self.rows.iter().map(|r| r.factors[idx]).collect())
    }

    pub fn excess_returns(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.excess_return).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Check that every selected factor and the risk-free column exist.
pub fn validate_selection(
    table: &FactorTable,
    selected: &[String],
    risk_free_column: &str,
) -> Result<(), AlignError> {
    if selected.is_empty() {
        return Err(AlignError::NoFactorsSelected);
    }
    let available = || table.columns().to_vec();

    let missing: Vec<String> = selected
        .iter()
        .filter(|f| !table.has_column(f))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(AlignError::UnknownFactors {
            missing,
            available: available(),
        });
    }
    if !table.has_column(risk_free_column) {
        return Err(AlignError::MissingRiskFreeColumn {
            column: risk_free_column.to_string(),
            available: available(),
        });
    }
    Ok(())
}

/// Join monthly asset returns with the factor table and compute excess returns.
///
/// Fails before any joining when the selection names a column the factor
/// table does not have.
pub fn align_excess_returns(
    returns: &MonthlyReturnSeries,
    factors: &FactorTable,
    selected: &[String],
    risk_free_column: &str,
) -> Result<ExcessReturnTable, AlignError> {
    validate_selection(factors, selected, risk_free_column)?;

    let rows: Vec<ExcessReturnRow> = factors
        .months()
        .filter_map(|month| {
            let asset_return = returns.return_for(month)?;
            let risk_free = factors.value(month, risk_free_column);
            let factor_values = selected.iter().map(|f| factors.value(month, f)).collect();
            Some(ExcessReturnRow {
                month: *month,
                factors: factor_values,
                risk_free,
                asset_return,
                excess_return: risk_free.map(|rf| asset_return - rf),
            })
        })
        .collect();

    debug!(
        asset_months = returns.len(),
        factor_months = factors.len(),
        joined = rows.len(),
        "inner join on month"
    );
    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        info!(
            ticker = %returns.ticker,
            months = rows.len(),
            first = %first.month,
            last = %last.month,
            "aligned returns with factors"
        );
    }

    ExcessReturnTable::from_rows(selected.to_vec(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn factor_table() -> FactorTable {
        let mut t = FactorTable::new(vec![
            "Mkt-RF".into(),
            "SMB".into(),
            "HML".into(),
            "RF".into(),
        ]);
        for (m, mkt, rf) in [(1, "1.5", "0.1"), (2, "-0.5", "0.05"), (3, "2.0", "x")] {
            t.insert_row(
                ym(2021, m),
                vec![mkt.into(), "0.3".into(), "0.4".into(), rf.into()],
            );
        }
        t
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn inner_join_keeps_overlap_only() {
        let returns = MonthlyReturnSeries::from_returns(
            "QQQ",
            vec![(ym(2020, 12), 5.0), (ym(2021, 1), 1.0), (ym(2021, 2), 2.0)],
        );
        let table =
            align_excess_returns(&returns, &factor_table(), &names(&["Mkt-RF"]), "RF").unwrap();
        let months: Vec<_> = table.months().collect();
        assert_eq!(months, vec![ym(2021, 1), ym(2021, 2)]);
    }

    #[test]
    fn excess_return_is_return_minus_rf() {
        let returns =
            MonthlyReturnSeries::from_returns("QQQ", vec![(ym(2021, 1), 1.0), (ym(2021, 2), 2.0)]);
        let table =
            align_excess_returns(&returns, &factor_table(), &names(&["Mkt-RF"]), "RF").unwrap();
        assert_eq!(table.excess_returns(), vec![Some(1.0 - 0.1), Some(2.0 - 0.05)]);
        assert_eq!(table.column("Mkt-RF").unwrap(), vec![Some(1.5), Some(-0.5)]);
    }

    #[test]
    fn non_numeric_rf_gives_missing_excess_return() {
        let returns = MonthlyReturnSeries::from_returns("QQQ", vec![(ym(2021, 3), 4.0)]);
        let table =
            align_excess_returns(&returns, &factor_table(), &names(&["Mkt-RF"]), "RF").unwrap();
        assert_eq!(table.rows()[0].risk_free, None);
        assert_eq!(table.rows()[0].excess_return, None);
        assert_eq!(table.rows()[0].asset_return, 4.0);
    }

    #[test]
    fn unknown_factor_is_config_error() {
        let returns = MonthlyReturnSeries::from_returns("QQQ", vec![(ym(2021, 1), 1.0)]);
        let err = align_excess_returns(
            &returns,
            &factor_table(),
            &names(&["Mkt-RF", "Momentum"]),
            "RF",
        )
        .unwrap_err();
        match err {
            AlignError::UnknownFactors { missing, .. } => assert_eq!(missing, vec!["Momentum"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_selection_is_config_error() {
        let returns = MonthlyReturnSeries::from_returns("QQQ", vec![(ym(2021, 1), 1.0)]);
        assert_eq!(
            align_excess_returns(&returns, &factor_table(), &[], "RF"),
            Err(AlignError::NoFactorsSelected)
        );
    }

    #[test]
    fn missing_rf_column_is_config_error() {
        let returns = MonthlyReturnSeries::from_returns("QQQ", vec![(ym(2021, 1), 1.0)]);
        let err = align_excess_returns(&returns, &factor_table(), &names(&["SMB"]), "TBILL")
            .unwrap_err();
        assert!(matches!(err, AlignError::MissingRiskFreeColumn { .. }));
    }

    #[test]
    fn only_selected_columns_in_output() {
        let returns = MonthlyReturnSeries::from_returns("QQQ", vec![(ym(2021, 1), 1.0)]);
        let table =
            align_excess_returns(&returns, &factor_table(), &names(&["HML", "SMB"]), "RF")
                .unwrap();
        assert_eq!(table.factor_names(), ["HML", "SMB"]);
        assert_eq!(table.rows()[0].factors, vec![Some(0.4), Some(0.3)]);
        assert!(table.column("Mkt-RF").is_none());
    }

    #[test]
    fn from_rows_rejects_row_of_wrong_width() {
        let row = |m: u32, factors: Vec<Option<f64>>| ExcessReturnRow {
            month: ym(2021, m),
            factors,
            risk_free: Some(0.0),
            asset_return: 1.0,
            excess_return: Some(1.0),
        };
        let err = ExcessReturnTable::from_rows(
            names(&["Mkt-RF"]),
            vec![row(1, vec![Some(1.0)]), row(2, vec![Some(1.0), Some(2.0)])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AlignError::RowWidthMismatch {
                month: ym(2021, 2),
                expected: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn deserialized_table_is_width_checked() {
        let json = r#"{"factor_names":["Mkt-RF"],"rows":[{"month":{"year":2021,"month":1},"factors":[1.0,2.0],"risk_free":0.0,"asset_return":1.0,"excess_return":1.0}]}"#;
        let err = serde_json::from_str::<ExcessReturnTable>(json).unwrap_err();
        assert!(err.to_string().contains("expected 1"), "{err}");
    }

    #[test]
    fn from_rows_sorts_by_month() {
        let row = |m: u32| ExcessReturnRow {
            month: ym(2021, m),
            factors: vec![Some(m as f64)],
            risk_free: None,
            asset_return: 0.0,
            excess_return: None,
        };
        let table =
            ExcessReturnTable::from_rows(names(&["Mkt-RF"]), vec![row(3), row(1), row(2)]).unwrap();
        let months: Vec<_> = table.months().collect();
        assert_eq!(months, vec![ym(2021, 1), ym(2021, 2), ym(2021, 3)]);
    }
}
