//! Student's t distribution, implemented from first principles:
//! - Lanczos approximation for ln(Gamma)
//! - Regularized incomplete beta function
//! - t CDF, two-sided p-values and quantiles (bisection on the CDF)

// ─── Math primitives ─────────────────────────────────────────────────

/// Lanczos approximation for ln(Gamma(x)), g=7, n=9.
fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if x < 0.5 {
        // Reflection formula: Gamma(x) * Gamma(1-x) = pi / sin(pi*x)
        let log_pi = std::f64::consts::PI.ln();
        let sin_val = (std::f64::consts::PI * x).sin();
        if sin_val.abs() < 1e-300 {
            return f64::INFINITY;
        }
        return log_pi - sin_val.abs().ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }

    let t = x + G + 0.5;
    let log_sqrt_2pi = (2.0 * std::f64::consts::PI).sqrt().ln();

    log_sqrt_2pi + (t.ln() * (x + 0.5)) - t + sum.ln()
}

/// Regularized incomplete beta function I_x(a, b) via continued fraction
/// (modified Lentz).
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if !(0.0..=1.0).contains(&x) {
        return f64::NAN;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    // Symmetry relation converges faster past the mean
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(b, a, 1.0 - x);
    }

    // x^a * (1-x)^b / (a * B(a,b))
    let ln_prefix = a * x.ln() + b * (1.0 - x).ln() - ln_gamma(a) - ln_gamma(b) + ln_gamma(a + b)
        - a.ln();
    let prefix = ln_prefix.exp();

    const MAX_ITER: usize = 200;
    const EPSILON: f64 = 1e-14;
    const TINY: f64 = 1e-30;

    let mut c = 1.0_f64;
    let mut d = 1.0 - (a + b) * x / (a + 1.0);
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut f = d;

    for m in 1..=MAX_ITER {
        let m_f64 = m as f64;

        // Even step
        let numerator_even =
            m_f64 * (b - m_f64) * x / ((a + 2.0 * m_f64 - 1.0) * (a + 2.0 * m_f64));
        d = 1.0 + numerator_even * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator_even / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        f *= c * d;

        // Odd step
        let numerator_odd = -((a + m_f64) * (a + b + m_f64) * x)
            / ((a + 2.0 * m_f64) * (a + 2.0 * m_f64 + 1.0));
        d = 1.0 + numerator_odd * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + numerator_odd / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = c * d;
        f *= delta;

        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }

    prefix * f
}

// ─── Student's t ─────────────────────────────────────────────────────

/// Student's t-distribution CDF: P(T <= t) for df degrees of freedom.
pub fn t_cdf(t: f64, df: f64) -> f64 {
    if df <= 0.0 || t.is_nan() || df.is_nan() {
        return f64::NAN;
    }
    if t == 0.0 {
        return 0.5;
    }
    if t.is_infinite() {
        return if t > 0.0 { 1.0 } else { 0.0 };
    }

    let x = df / (df + t * t);
    let ib = regularized_incomplete_beta(df / 2.0, 0.5, x);

    if t > 0.0 {
        1.0 - 0.5 * ib
    } else {
        0.5 * ib
    }
}

/// Two-sided p-value for H0: coefficient = 0, given its t statistic.
pub fn two_sided_p_value(t: f64, df: f64) -> f64 {
    if t.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    // 2 * P(T > |t|) = I_x(df/2, 1/2), computed directly to keep precision in the tail
    if t.is_infinite() {
        return 0.0;
    }
    regularized_incomplete_beta(df / 2.0, 0.5, df / (df + t * t)).clamp(0.0, 1.0)
}

/// Quantile of the t distribution: the `t` with `t_cdf(t, df) == p`.
///
/// NaN for `p` outside (0, 1) or non-positive `df`.
pub fn t_quantile(p: f64, df: f64) -> f64 {
    if p.is_nan() || p <= 0.0 || p >= 1.0 || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    if p == 0.5 {
        return 0.0;
    }
    if p < 0.5 {
        return -t_quantile(1.0 - p, df);
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    while t_cdf(hi, df) < p {
        lo = hi;
        hi *= 2.0;
        if hi > 1e15 {
            return f64::INFINITY;
        }
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if t_cdf(mid, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-13 * hi.max(1.0) {
            break;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ln_gamma_known_values() {
        assert!((ln_gamma(1.0)).abs() < 1e-10);
        assert!((ln_gamma(2.0)).abs() < 1e-10);
        assert!((ln_gamma(3.0) - 2.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        let expected = std::f64::consts::PI.sqrt().ln();
        assert!((ln_gamma(0.5) - expected).abs() < 1e-10);
    }

    #[test]
    fn t_cdf_at_zero() {
        assert!((t_cdf(0.0, 1.0) - 0.5).abs() < 1e-10);
        assert!((t_cdf(0.0, 10.0) - 0.5).abs() < 1e-10);
        assert!((t_cdf(0.0, 100.0) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn t_cdf_symmetry() {
        let df = 10.0;
        for &t in &[0.5, 1.0, 2.0, 3.0] {
            let left = t_cdf(-t, df);
            let right = t_cdf(t, df);
            assert!((left + right - 1.0).abs() < 1e-10, "t={t}: {left} + {right} != 1.0");
        }
    }

    #[test]
    fn t_cdf_known_values() {
        // df=1 is Cauchy: CDF(1) = 0.75
        assert!((t_cdf(1.0, 1.0) - 0.75).abs() < 1e-6);
        // large df approaches the normal
        assert!((t_cdf(1.96, 1000.0) - 0.975).abs() < 0.005);
    }

    #[test]
    fn t_cdf_degenerate_inputs() {
        assert!(t_cdf(1.0, 0.0).is_nan());
        assert!(t_cdf(f64::NAN, 5.0).is_nan());
        assert_eq!(t_cdf(f64::INFINITY, 5.0), 1.0);
    }

    #[test]
    fn two_sided_p_matches_cdf() {
        for &(t, df) in &[(0.5, 3.0), (2.0, 10.0), (-2.5, 25.0)] {
            let via_cdf = 2.0 * (1.0 - t_cdf(f64::abs(t), df));
            assert!((two_sided_p_value(t, df) - via_cdf).abs() < 1e-10);
        }
        assert!((two_sided_p_value(0.0, 5.0) - 1.0).abs() < 1e-12);
        assert!(two_sided_p_value(1.0, 0.0).is_nan());
    }

    #[test]
    fn quantile_known_values() {
        // Tabulated 97.5% critical values
        assert!((t_quantile(0.975, 1.0) - 12.706_204_736).abs() < 1e-6);
        assert!((t_quantile(0.975, 10.0) - 2.228_138_852).abs() < 1e-6);
        assert!((t_quantile(0.975, 30.0) - 2.042_272_456).abs() < 1e-6);
        assert!((t_quantile(0.025, 10.0) + 2.228_138_852).abs() < 1e-6);
    }

    #[test]
    fn quantile_inverts_cdf() {
        for &df in &[2.0, 7.0, 60.0] {
            for &p in &[0.6, 0.9, 0.995] {
                let q = t_quantile(p, df);
                assert!((t_cdf(q, df) - p).abs() < 1e-9, "df={df} p={p}");
            }
        }
    }

    #[test]
    fn quantile_rejects_bad_inputs() {
        assert!(t_quantile(0.0, 5.0).is_nan());
        assert!(t_quantile(1.0, 5.0).is_nan());
        assert!(t_quantile(0.9, 0.0).is_nan());
        assert_eq!(t_quantile(0.5, 5.0), 0.0);
    }
}
