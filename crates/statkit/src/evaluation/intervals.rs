//! Confidence and prediction intervals.
//!
//! ## Purpose
//!
//! This module turns an estimate and its standard error into a two-sided
//! interval at a requested coverage level, using Student-t critical values
//! for coefficients and normal critical values for forecasts.
//!
//! ## Invariants
//!
//! * Confidence levels must satisfy 0 < level < 1.
//! * `lower ≤ estimate ≤ upper` for non-negative standard errors.

// Internal dependencies
use crate::math::distributions::student_t_quantile;
use crate::math::special::normal_quantile;
use crate::primitives::errors::AnalysisError;

/// A two-sided interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower bound.
    pub lower: f64,

    /// Upper bound.
    pub upper: f64,
}

fn check_level(level: f64) -> Result<(), AnalysisError> {
    if level.is_nan() || level <= 0.0 || level >= 1.0 {
        return Err(AnalysisError::invalid(format!(
            "Confidence level must be between 0 and 1 (exclusive), got {}",
            level
        )));
    }
    Ok(())
}

/// Two-sided Student-t critical value `t_{(1+level)/2, df}`.
pub fn t_critical(level: f64, df: f64) -> Result<f64, AnalysisError> {
    check_level(level)?;
    student_t_quantile(0.5 * (1.0 + level), df)
}

/// Two-sided normal critical value `z_{(1+level)/2}`.
pub fn z_critical(level: f64) -> Result<f64, AnalysisError> {
    check_level(level)?;
    Ok(normal_quantile(0.5 * (1.0 + level)))
}

/// `estimate ± critical · se`.
#[inline]
pub fn interval(estimate: f64, std_error: f64, critical: f64) -> Interval {
    Interval {
        lower: estimate - critical * std_error,
        upper: estimate + critical * std_error,
    }
}
