//! Coefficient bar chart rendered as SVG.
//!
//! One bar per factor (intercept excluded), a vertical black line spanning
//! the confidence interval, the p-value printed above each bar, and a dashed
//! zero line. Output is a pure function of the model and title, so identical
//! fits give byte-identical files.

use super::ReportError;
use ffreg_core::regression::{Coefficient, FittedModel};
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

const WIDTH: i32 = 640;
const HEIGHT: i32 = 400;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_BOTTOM: f64 = 56.0;
const BAR_FILL: f64 = 0.8;

/// Anchor colors of the diverging coolwarm map at 0, 0.25, 0.5, 0.75, 1.
const COOLWARM: [(f64, f64, f64); 5] = [
    (59.0, 76.0, 192.0),
    (141.0, 176.0, 254.0),
    (221.0, 221.0, 221.0),
    (244.0, 154.0, 123.0),
    (180.0, 4.0, 38.0),
];

/// Chart title for a ticker and date range.
pub fn chart_title(ticker: &str, start_year: i32, end_year: i32) -> String {
    format!("Impact of Fama-French Factors on {ticker} Monthly Returns ({start_year}-{end_year})")
}

/// Sample the coolwarm map at `t` in [0, 1].
fn coolwarm(t: f64) -> String {
    let t = t.clamp(0.0, 1.0) * (COOLWARM.len() - 1) as f64;
    let lo = (t.floor() as usize).min(COOLWARM.len() - 2);
    let frac = t - lo as f64;
    let (a, b) = (COOLWARM[lo], COOLWARM[lo + 1]);
    let mix = |x: f64, y: f64| (x + (y - x) * frac).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Evenly spaced palette of `n` colors, blue to red.
fn palette(n: usize) -> Vec<String> {
    match n {
        0 => Vec::new(),
        1 => vec![coolwarm(0.0)],
        _ => (0..n).map(|i| coolwarm(i as f64 / (n - 1) as f64)).collect(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Value range covering zero, every estimate and every finite CI bound,
/// padded so labels above the bars stay inside the plot.
fn value_extent(terms: &[Coefficient]) -> (f64, f64) {
    let mut lo = 0.0_f64;
    let mut hi = 0.0_f64;
    for c in terms {
        for v in [c.estimate, c.ci_lower, c.ci_upper] {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
    }
    if hi - lo < f64::EPSILON {
        return (-1.0, 1.0);
    }
    let pad = (hi - lo) * 0.12;
    (lo - pad, hi + pad)
}

/// Evenly spaced tick values covering `[lo, hi]`.
fn ticks(lo: f64, hi: f64) -> Vec<f64> {
    let raw = (hi - lo) / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|i| i as f64 * step).collect()
}

/// Render the coefficient chart for every non-intercept term of `model`.
pub fn render_coefficient_chart(model: &FittedModel, title: &str) -> String {
    let terms = model.factor_terms();
    let (lo, hi) = value_extent(terms);
    let plot_w = WIDTH as f64 - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT as f64 - MARGIN_TOP - MARGIN_BOTTOM;
    let y_of = |v: f64| MARGIN_TOP + (hi - v) / (hi - lo) * plot_h;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#333}}</style>"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = write!(
        svg,
        r##"<rect x="0" y="0" width="{WIDTH}" height="{HEIGHT}" fill="#ffffff" />"##
    );
    let _ = write!(
        svg,
        r#"<text x="{x:.2}" y="24" text-anchor="middle" font-size="14">{title}</text>"#,
        x = WIDTH as f64 / 2.0,
        title = escape(title)
    );

    // Y axis with ticks
    let _ = write!(
        svg,
        r##"<line x1="{x:.2}" y1="{top:.2}" x2="{x:.2}" y2="{bottom:.2}" stroke="#333" stroke-width="1" />"##,
        x = MARGIN_LEFT,
        top = MARGIN_TOP,
        bottom = MARGIN_TOP + plot_h
    );
    for tick in ticks(lo, hi) {
        let y = y_of(tick);
        let _ = write!(
            svg,
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#333" stroke-width="1" /><text x="{tx:.2}" y="{y:.2}" text-anchor="end" dy="4">{label}</text>"##,
            x1 = MARGIN_LEFT - 4.0,
            x2 = MARGIN_LEFT,
            tx = MARGIN_LEFT - 6.0,
            label = format_tick(tick)
        );
    }

    let colors = palette(terms.len());
    let slot = plot_w / terms.len().max(1) as f64;
    let bar_w = slot * BAR_FILL;
    let zero_y = y_of(0.0);

    for (i, (coef, color)) in terms.iter().zip(&colors).enumerate() {
        let center = MARGIN_LEFT + slot * (i as f64 + 0.5);
        if coef.estimate.is_finite() {
            let y = y_of(coef.estimate);
            let (top, bottom) = if y < zero_y { (y, zero_y) } else { (zero_y, y) };
            let _ = write!(
                svg,
                r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}" />"#,
                x = center - bar_w / 2.0,
                y = top,
                w = bar_w,
                h = bottom - top
            );
        }
        if coef.ci_lower.is_finite() && coef.ci_upper.is_finite() {
            let _ = write!(
                svg,
                r##"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="#000000" stroke-width="1.5" />"##,
                x = center,
                y1 = y_of(coef.ci_lower),
                y2 = y_of(coef.ci_upper)
            );
        }

        let label_top = [coef.estimate, coef.ci_upper, 0.0]
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" dy="-6">p={p:.4}</text>"#,
            x = center,
            y = y_of(label_top),
            p = coef.p_value
        );
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{name}</text>"#,
            x = center,
            y = MARGIN_TOP + plot_h + 18.0,
            name = escape(&coef.name)
        );
    }

    let _ = write!(
        svg,
        r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#333" stroke-width="0.8" stroke-dasharray="4 3" />"##,
        x1 = MARGIN_LEFT,
        x2 = MARGIN_LEFT + plot_w,
        y = zero_y
    );

    let _ = write!(
        svg,
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="12">Factor</text>"#,
        x = MARGIN_LEFT + plot_w / 2.0,
        y = HEIGHT as f64 - 16.0
    );
    let _ = write!(
        svg,
        r#"<text x="16" y="{y:.2}" text-anchor="middle" font-size="12" transform="rotate(-90 16 {y:.2})">Coefficient Value</text>"#,
        y = MARGIN_TOP + plot_h / 2.0
    );

    let _ = writeln!(svg, "</svg>");
    svg
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

/// Render the chart and write it to `path`, creating the parent directory.
/// An existing file is overwritten.
pub fn write_coefficient_chart(
    model: &FittedModel,
    title: &str,
    path: &Path,
) -> Result<(), ReportError> {
    let io_err = |source: std::io::Error| ReportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, render_coefficient_chart(model, title)).map_err(io_err)?;
    info!(path = %path.display(), factors = model.factor_terms().len(), "wrote coefficient chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ffreg_core::data::{ExcessReturnRow, ExcessReturnTable};
    use ffreg_core::domain::YearMonth;
    use ffreg_core::regression::fit_ols;

    fn model() -> FittedModel {
        let points = [
            (1.0, 0.5, 2.0),
            (2.0, -0.3, 4.1),
            (3.0, 0.8, 5.2),
            (4.0, -1.1, 3.9),
            (5.0, 0.2, 5.3),
            (6.0, 0.0, 6.4),
        ];
        let rows = points
            .iter()
            .enumerate()
            .map(|(i, &(mkt, smb, y))| ExcessReturnRow {
                month: YearMonth::from_date(
                    NaiveDate::from_ymd_opt(2021, i as u32 + 1, 1).unwrap(),
                ),
                factors: vec![Some(mkt), Some(smb)],
                risk_free: Some(0.0),
                asset_return: y,
                excess_return: Some(y),
            })
            .collect();
        let table =
            ExcessReturnTable::from_rows(vec!["Mkt-RF".into(), "SMB".into()], rows).unwrap();
        fit_ols(&table, 0.95).unwrap()
    }

    #[test]
    fn title_format() {
        assert_eq!(
            chart_title("QQQ", 2006, 2023),
            "Impact of Fama-French Factors on QQQ Monthly Returns (2006-2023)"
        );
    }

    #[test]
    fn chart_has_one_bar_per_factor_and_labels() {
        let svg = render_coefficient_chart(&model(), "t");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));
        assert_eq!(svg.matches("<svg").count(), 1);
        // background rect + 2 bars
        assert_eq!(svg.matches("<rect").count(), 3);
        assert!(svg.contains(">Mkt-RF</text>"));
        assert!(svg.contains(">SMB</text>"));
        assert!(!svg.contains(">const</text>"));
        assert_eq!(svg.matches(">p=").count(), 2);
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains(">Factor</text>"));
        assert!(svg.contains(">Coefficient Value</text>"));
    }

    #[test]
    fn p_values_printed_with_four_decimals() {
        let m = model();
        let svg = render_coefficient_chart(&m, "t");
        let expected = format!("p={:.4}", m.coefficient("SMB").unwrap().p_value);
        assert!(svg.contains(&expected));
    }

    #[test]
    fn palette_runs_blue_to_red() {
        let p = palette(3);
        assert_eq!(p[0], "#3b4cc0");
        assert_eq!(p[1], "#dddddd");
        assert_eq!(p[2], "#b40426");
        assert_eq!(palette(0).len(), 0);
    }

    #[test]
    fn titles_are_escaped() {
        let svg = render_coefficient_chart(&model(), "A & B <x>");
        assert!(svg.contains("A &amp; B &lt;x&gt;"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let m = model();
        assert_eq!(
            render_coefficient_chart(&m, "t"),
            render_coefficient_chart(&m, "t")
        );
    }

    #[test]
    fn writes_into_missing_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("imgs").join("chart.svg");
        write_coefficient_chart(&model(), "first", &path).unwrap();
        write_coefficient_chart(&model(), "second", &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("second"));
        assert!(!content.contains("first"));
    }

    #[test]
    fn unwritable_path_is_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_coefficient_chart(&model(), "t", &blocker.join("chart.svg")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn ticks_cover_range() {
        let t = ticks(-0.6, 1.3);
        assert!(t.contains(&0.0));
        assert!(t.iter().all(|v| *v >= -0.6 && *v <= 1.3));
        assert!(t.len() >= 3);
    }
}
