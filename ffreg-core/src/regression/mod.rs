//! Linear-model estimation: OLS fit and Student-t inference.

pub mod ols;
pub mod stats;

pub use ols::{
    design_matrix, fit_design, fit_ols, Coefficient, DesignMatrix, FittedModel, RegressionError,
    DEFAULT_CONFIDENCE_LEVEL, INTERCEPT,
};
pub use stats::{t_cdf, t_quantile, two_sided_p_value};
