//! Probability distributions used for significance testing.
//!
//! ## Purpose
//!
//! This module evaluates the Student-t, chi-square and F distributions at a
//! statistic value. Every function is a pure function of its arguments.
//!
//! ## Design notes
//!
//! * **One primitive**: t and F are expressed through the regularized
//!   incomplete beta function; chi-square through the incomplete gamma.
//! * **Clamped**: Probabilities are clamped to [0, 1].
//! * **Checked**: Degrees of freedom `<= 0` (or NaN) are `InvalidParameter`.
//! * **Root finding**: `student_t_quantile` is a safeguarded Newton iteration
//!   inside a bisection bracket; failure to converge is `NonConvergence`.
//!
//! ## Non-goals
//!
//! * This module does not sample random variates.

// Internal dependencies
use crate::math::special::{
    ln_gamma, normal_quantile, regularized_incomplete_beta, regularized_lower_gamma,
};
use crate::primitives::errors::AnalysisError;

const QUANTILE_MAX_ITER: usize = 200;
const QUANTILE_MAX_BRACKET: f64 = 1e12;

// ============================================================================
// Parameter Checks
// ============================================================================

#[inline]
fn check_df(df: f64, name: &str) -> Result<(), AnalysisError> {
    if df.is_nan() || df <= 0.0 {
        return Err(AnalysisError::invalid(format!(
            "Degrees of freedom {name} must be positive, got {df}"
        )));
    }
    Ok(())
}

#[inline]
fn check_statistic(x: f64, name: &str) -> Result<(), AnalysisError> {
    if x.is_nan() {
        return Err(AnalysisError::invalid(format!("{name} statistic is NaN")));
    }
    Ok(())
}

// ============================================================================
// Student's t
// ============================================================================

/// CDF of Student's t distribution, P(T <= t).
pub fn student_t_cdf(t: f64, df: f64) -> Result<f64, AnalysisError> {
    check_df(df, "df")?;
    check_statistic(t, "t")?;
    if t.is_infinite() {
        return Ok(if t > 0.0 { 1.0 } else { 0.0 });
    }

    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(x, 0.5 * df, 0.5)?;
    let p = if t >= 0.0 { 1.0 - tail } else { tail };
    Ok(p.clamp(0.0, 1.0))
}

/// Two-sided tail probability P(|T| >= |t|).
pub fn student_t_two_tailed(t: f64, df: f64) -> Result<f64, AnalysisError> {
    check_df(df, "df")?;
    check_statistic(t, "t")?;
    if t.is_infinite() {
        return Ok(0.0);
    }
    let x = df / (df + t * t);
    Ok(regularized_incomplete_beta(x, 0.5 * df, 0.5)?.clamp(0.0, 1.0))
}

/// Density of Student's t distribution.
pub fn student_t_pdf(t: f64, df: f64) -> Result<f64, AnalysisError> {
    check_df(df, "df")?;
    check_statistic(t, "t")?;
    let half = 0.5 * df;
    let ln_pdf = ln_gamma(half + 0.5)
        - 0.5 * (df * core::f64::consts::PI).ln()
        - ln_gamma(half)
        - (half + 0.5) * (1.0 + t * t / df).ln();
    Ok(ln_pdf.exp())
}

/// Quantile of Student's t distribution: `t` such that P(T <= t) = p.
pub fn student_t_quantile(p: f64, df: f64) -> Result<f64, AnalysisError> {
    check_df(df, "df")?;
    if p.is_nan() || p <= 0.0 || p >= 1.0 {
        return Err(AnalysisError::invalid(format!(
            "Probability must lie strictly between 0 and 1, got {p}"
        )));
    }
    if p == 0.5 {
        return Ok(0.0);
    }
    if p < 0.5 {
        return student_t_quantile(1.0 - p, df).map(|t| -t);
    }

    // Bracket the root in [0, hi].
    let mut lo = 0.0;
    let mut hi = normal_quantile(p).max(1.0);
    while student_t_cdf(hi, df)? < p {
        lo = hi;
        hi *= 2.0;
        if hi > QUANTILE_MAX_BRACKET {
            return Err(AnalysisError::non_convergence(format!(
                "Student t quantile for p={p}, df={df} could not be bracketed"
            )));
        }
    }

    let mut t = 0.5 * (lo + hi);
    for iter in 0..QUANTILE_MAX_ITER {
        let f = student_t_cdf(t, df)? - p;
        if f.abs() < 1e-14 {
            return Ok(t);
        }
        if f < 0.0 {
            lo = t;
        } else {
            hi = t;
        }
        if hi - lo < 1e-12 * t.abs().max(1.0) {
            return Ok(0.5 * (lo + hi));
        }

        // Newton step, replaced by bisection when it leaves the bracket and
        // on every fourth iteration so the bracket keeps shrinking.
        let pdf = student_t_pdf(t, df)?;
        let newton = if pdf > 0.0 { t - f / pdf } else { f64::NAN };
        t = if iter % 4 != 3 && newton.is_finite() && newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };
    }

    Err(AnalysisError::non_convergence(format!(
        "Student t quantile for p={p}, df={df} did not converge"
    )))
}

// ============================================================================
// Chi-square
// ============================================================================

/// CDF of the chi-square distribution, P(X <= x).
pub fn chi_square_cdf(x: f64, df: f64) -> Result<f64, AnalysisError> {
    check_df(df, "df")?;
    check_statistic(x, "Chi-square")?;
    if x <= 0.0 {
        return Ok(0.0);
    }
    regularized_lower_gamma(0.5 * df, 0.5 * x).map(|p| p.clamp(0.0, 1.0))
}

/// Upper-tail probability of the chi-square distribution, P(X >= x).
pub fn chi_square_p_value(x: f64, df: f64) -> Result<f64, AnalysisError> {
    Ok((1.0 - chi_square_cdf(x, df)?).clamp(0.0, 1.0))
}

// ============================================================================
// F
// ============================================================================

/// CDF of the F distribution, `I_x(d1/2, d2/2)` with `x = d1·F / (d1·F + d2)`.
pub fn f_cdf(f: f64, d1: f64, d2: f64) -> Result<f64, AnalysisError> {
    check_df(d1, "df1")?;
    check_df(d2, "df2")?;
    check_statistic(f, "F")?;
    if f <= 0.0 {
        return Ok(0.0);
    }
    if f.is_infinite() {
        return Ok(1.0);
    }
    let x = d1 * f / (d1 * f + d2);
    regularized_incomplete_beta(x, 0.5 * d1, 0.5 * d2)
}

/// Upper-tail probability of the F distribution: `1 − I_x(d1/2, d2/2)`.
pub fn f_p_value(f: f64, d1: f64, d2: f64) -> Result<f64, AnalysisError> {
    Ok((1.0 - f_cdf(f, d1, d2)?).clamp(0.0, 1.0))
}
