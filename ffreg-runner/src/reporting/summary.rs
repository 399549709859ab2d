//! Plain-text regression summary printed after a run.

use ffreg_core::regression::FittedModel;

/// Format a statistic, rendering undefined values as `nan` in a fixed width.
fn cell(value: f64, width: usize) -> String {
    if value.is_nan() {
        format!("{:>width$}", "nan")
    } else {
        format!("{value:>width$.4}")
    }
}

/// Coefficient table plus fit statistics for one model.
pub fn render_summary(model: &FittedModel, heading: &str) -> String {
    let alpha = 1.0 - model.confidence_level;
    let lower_label = format!("[{:.3}", alpha / 2.0);
    let upper_label = format!("{:.3}]", 1.0 - alpha / 2.0);
    let name_width = model
        .terms()
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max(8);

    let mut out = String::with_capacity(1024);
    out.push_str(heading);
    out.push('\n');
    out.push_str(&format!(
        "  Observations: {}    Df residuals: {}    Rank: {}\n",
        model.n_obs, model.df_resid, model.rank
    ));
    out.push_str(&format!(
        "  R-squared: {}    Adj. R-squared: {}\n",
        cell(model.r_squared, 0).trim(),
        cell(model.adj_r_squared, 0).trim()
    ));
    if model.dropped_rows > 0 {
        out.push_str(&format!(
            "  Dropped rows with missing values: {}\n",
            model.dropped_rows
        ));
    }
    out.push('\n');
    out.push_str(&format!(
        "  {:<name_width$} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
        "", "coef", "std err", "t", "P>|t|", lower_label, upper_label
    ));
    for c in model.terms() {
        out.push_str(&format!(
            "  {:<name_width$} {} {} {} {} {} {}\n",
            c.name,
            cell(c.estimate, 10),
            cell(c.std_error, 10),
            cell(c.t_value, 10),
            cell(c.p_value, 10),
            cell(c.ci_lower, 10),
            cell(c.ci_upper, 10),
        ));
    }
    out
}
