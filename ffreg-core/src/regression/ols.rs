//! Ordinary least squares on the excess-return table.
//!
//! The fit goes through the SVD pseudo-inverse of the design matrix, so a
//! rank-deficient design (e.g. a constant factor column) still yields the
//! minimum-norm solution instead of failing. Degrees of freedom use the
//! numerical rank.

use super::stats::{t_quantile, two_sided_p_value};
use crate::data::ExcessReturnTable;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the intercept term.
pub const INTERCEPT: &str = "const";

/// Default two-sided confidence level for coefficient intervals.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Data-quality errors raised before or during the fit.
#[derive(Debug, Error, PartialEq)]
pub enum RegressionError {
    #[error("design matrix or response is empty after cleaning ({total_rows} rows before dropping missing values)")]
    EmptyAfterCleaning { total_rows: usize },

    #[error("confidence level must be strictly between 0 and 1, got {0}")]
    InvalidConfidenceLevel(f64),

    #[error("linear algebra failure: {0}")]
    LinearAlgebra(String),
}

/// One estimated term of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    pub p_value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
}

/// Result of one OLS fit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    /// Intercept first, then factors in selection order.
    terms: Vec<Coefficient>,
    pub n_obs: usize,
    pub rank: usize,
    pub df_resid: usize,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub residual_std_error: f64,
    pub confidence_level: f64,
    /// Rows of the input table dropped for missing values.
    pub dropped_rows: usize,
}

impl FittedModel {
    pub fn terms(&self) -> &[Coefficient] {
        &self.terms
    }

    pub fn intercept(&self) -> &Coefficient {
        &self.terms[0]
    }

    /// Every term except the intercept.
    pub fn factor_terms(&self) -> &[Coefficient] {
        &self.terms[1..]
    }

    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.terms.iter().find(|c| c.name == name)
    }
}

/// Cleaned regression input: rows with any missing value removed.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub names: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    pub dropped_rows: usize,
}

/// Build `[1, factors...]` and the excess-return response, dropping every row
/// with a missing design cell or a missing response.
pub fn design_matrix(table: &ExcessReturnTable) -> Result<DesignMatrix, RegressionError> {
    let k = table.factor_names().len() + 1;
    let mut cells: Vec<f64> = Vec::with_capacity(table.len() * k);
    let mut response: Vec<f64> = Vec::with_capacity(table.len());

    for row in table.rows() {
        let Some(factors) = row.factors.iter().copied().collect::<Option<Vec<f64>>>() else {
            continue;
        };
        let Some(y) = row.excess_return else {
            continue;
        };
        cells.push(1.0);
        cells.extend(factors);
        response.push(y);
    }

    let n = response.len();
    let dropped_rows = table.len() - n;
    if n == 0 {
        return Err(RegressionError::EmptyAfterCleaning {
            total_rows: table.len(),
        });
    }
    if dropped_rows > 0 {
        warn!(dropped_rows, kept = n, "dropped rows with missing values");
    }

    let mut names = Vec::with_capacity(k);
    names.push(INTERCEPT.to_string());
    names.extend(table.factor_names().iter().cloned());

    Ok(DesignMatrix {
        names,
        x: DMatrix::from_row_slice(n, k, &cells),
        y: DVector::from_vec(response),
        dropped_rows,
    })
}

/// Fit excess return on the selected factors plus an intercept.
pub fn fit_ols(
    table: &ExcessReturnTable,
    confidence_level: f64,
) -> Result<FittedModel, RegressionError> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(RegressionError::InvalidConfidenceLevel(confidence_level));
    }
    let design = design_matrix(table)?;
    fit_design(&design, confidence_level)
}

/// OLS on an already-cleaned design matrix.
pub fn fit_design(
    design: &DesignMatrix,
    confidence_level: f64,
) -> Result<FittedModel, RegressionError> {
    let x = &design.x;
    let y = &design.y;
    let (n, k) = x.shape();

    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    let eps = max_sv * (n.max(k) as f64) * f64::EPSILON;
    let rank = svd.rank(eps);
    let pinv = svd
        .pseudo_inverse(eps)
        .map_err(|e| RegressionError::LinearAlgebra(e.to_string()))?;

    let beta = &pinv * y;
    let residuals = y - x * &beta;
    let ssr = residuals.norm_squared();
    let df_resid = n.saturating_sub(rank);

    // (X'X)^+ without forming X'X
    let normalized_cov = &pinv * pinv.transpose();

    let y_mean = y.mean();
    let tss: f64 = y.iter().map(|v| (v - y_mean).powi(2)).sum();
    let r_squared = if tss > 0.0 { 1.0 - ssr / tss } else { f64::NAN };

    let (scale, adj_r_squared) = if df_resid > 0 {
        let df = df_resid as f64;
        (ssr / df, 1.0 - (n as f64 - 1.0) / df * (1.0 - r_squared))
    } else {
        (f64::NAN, f64::NAN)
    };

    let df = df_resid as f64;
    let critical = if df_resid > 0 {
        t_quantile(1.0 - (1.0 - confidence_level) / 2.0, df)
    } else {
        f64::NAN
    };

    let terms = design
        .names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let estimate = beta[i];
            let std_error = (scale * normalized_cov[(i, i)]).sqrt();
            let t_value = estimate / std_error;
            Coefficient {
                name: name.clone(),
                estimate,
                std_error,
                t_value,
                p_value: two_sided_p_value(t_value, df),
                ci_lower: estimate - critical * std_error,
                ci_upper: estimate + critical * std_error,
            }
        })
        .collect();

    debug!(n_obs = n, rank, df_resid, r_squared, "fitted OLS");

    Ok(FittedModel {
        terms,
        n_obs: n,
        rank,
        df_resid,
        r_squared,
        adj_r_squared,
        residual_std_error: scale.sqrt(),
        confidence_level,
        dropped_rows: design.dropped_rows,
    })
}
