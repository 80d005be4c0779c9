//! Input validation for analysis requests.
//!
//! ## Purpose
//!
//! This module provides the validation functions run before any computation:
//! variable checks, option ranges and the ordered time-series gate.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Ordered**: The time-series gate runs its checks in a fixed order and its
//!   messages are shown to users verbatim.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//!
//! ## Invariants
//!
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not filter, transform or impute data.
//! * This module does not perform the analyses.

// Internal dependencies
use crate::algorithms::arima::{ArimaOrder, MAX_AR_ORDER, MAX_DIFFERENCING, MAX_MA_ORDER};
use crate::algorithms::chisquare::{ExpectedRange, ExpectedValues};
use crate::algorithms::smoothing::{SmoothingMethod, SmoothingParameters};
use crate::primitives::errors::AnalysisError;
use crate::primitives::sample::Variable;
use crate::primitives::time::TimeSpecification;

/// Largest accepted forecast horizon.
pub const MAX_FORECAST_HORIZON: usize = 10_000;

/// Largest accepted width of a chi-square category range.
pub const MAX_CATEGORY_RANGE: i64 = 10_000;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for analysis requests.
///
/// Provides static methods that return `Result<(), AnalysisError>` (or the
/// value they establish) and fail fast upon the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Variables
    // ========================================================================

    /// Reject a variable declared as string.
    pub fn validate_numeric(variable: &Variable) -> Result<(), AnalysisError> {
        if !variable.meta.is_numeric() {
            return Err(AnalysisError::insufficient(format!(
                "Variable '{}' is not numeric",
                variable.name()
            )));
        }
        Ok(())
    }

    /// Reject a variable without a single finite value.
    pub fn validate_has_data(variable: &Variable) -> Result<(), AnalysisError> {
        if !variable
            .values
            .observations()
            .iter()
            .any(|o| o.as_f64().is_some())
        {
            return Err(AnalysisError::insufficient(format!(
                "Variable '{}' contains no numeric data",
                variable.name()
            )));
        }
        Ok(())
    }

    /// Require at least one variable in a role.
    pub fn validate_selected(variables: &[Variable], role: &str) -> Result<(), AnalysisError> {
        if variables.is_empty() {
            return Err(AnalysisError::insufficient(format!(
                "At least one {} must be selected",
                role
            )));
        }
        Ok(())
    }

    /// Require every variable to have `rows` observations.
    pub fn validate_aligned(variables: &[&Variable], rows: usize) -> Result<(), AnalysisError> {
        for v in variables {
            if v.values.len() != rows {
                return Err(AnalysisError::invalid(format!(
                    "Variable '{}' has {} rows, expected {}",
                    v.name(),
                    v.values.len(),
                    rows
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Time Series Gate
    // ========================================================================

    /// Ordered validation of time-series input.
    ///
    /// Runs, first failure wins: variables selected, each variable numeric
    /// and non-empty, then (when `seasonal`) dates defined, periodicity
    /// defined, length at least four cycles and a whole number of cycles.
    /// Returns the periodicity of `time`.
    pub fn validate_time_series(
        variables: &[Variable],
        time: TimeSpecification,
        seasonal: bool,
    ) -> Result<Option<usize>, AnalysisError> {
        if variables.is_empty() {
            return Err(AnalysisError::insufficient(
                "At least one variable must be selected",
            ));
        }

        for v in variables {
            Self::validate_numeric(v)?;
            Self::validate_has_data(v)?;
        }

        if !seasonal {
            return Ok(time.periodicity());
        }

        if !time.is_dated() {
            return Err(AnalysisError::invalid(
                "Dates have not been defined: select a time specification other than 'Not dated'",
            ));
        }

        let period = time.periodicity().ok_or_else(|| {
            AnalysisError::invalid("Periodicity is not defined for the selected time specification")
        })?;

        for v in variables {
            let n = v.values.trim_trailing_missing().len();
            if n < 4 * period {
                return Err(AnalysisError::insufficient(
                    "Data length is less than 4 times the periodicity",
                ));
            }
            if n % period != 0 {
                return Err(AnalysisError::insufficient(
                    "Data length is not a multiple of the periodicity",
                ));
            }
        }

        Ok(Some(period))
    }

    /// Require `n ≥ min` observations.
    pub fn validate_series_length(
        variable: &Variable,
        n: usize,
        min: usize,
    ) -> Result<(), AnalysisError> {
        if n < min {
            return Err(AnalysisError::insufficient(format!(
                "Variable '{}' has {} observations; at least {} are required",
                variable.name(),
                n,
                min
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Options
    // ========================================================================

    /// Validate a confidence level in (0, 1).
    pub fn validate_confidence_level(level: f64) -> Result<(), AnalysisError> {
        if !level.is_finite() || level <= 0.0 || level >= 1.0 {
            return Err(AnalysisError::invalid(format!(
                "Confidence level must be between 0 and 1 (exclusive), got {}",
                level
            )));
        }
        Ok(())
    }

    /// Validate a forecast horizon.
    pub fn validate_forecast_horizon(horizon: usize) -> Result<(), AnalysisError> {
        if horizon > MAX_FORECAST_HORIZON {
            return Err(AnalysisError::invalid(format!(
                "Forecast horizon must be at most {}, got {}",
                MAX_FORECAST_HORIZON, horizon
            )));
        }
        Ok(())
    }

    /// Validate ARIMA orders against their bounds.
    pub fn validate_arima_order(order: ArimaOrder) -> Result<(), AnalysisError> {
        let checks = [
            ("AR order", order.p, MAX_AR_ORDER),
            ("Differencing order", order.d, MAX_DIFFERENCING),
            ("MA order", order.q, MAX_MA_ORDER),
        ];
        for (name, value, max) in checks {
            if value > max {
                return Err(AnalysisError::invalid(format!(
                    "{} must be between 0 and {}, got {}",
                    name, max, value
                )));
            }
        }
        Ok(())
    }

    /// Validate smoothing weights in [0, 1].
    pub fn validate_smoothing_parameters(
        method: SmoothingMethod,
        params: SmoothingParameters,
    ) -> Result<(), AnalysisError> {
        let mut checks = vec![("Alpha", params.alpha)];
        if method.has_trend() {
            checks.push(("Gamma", params.gamma));
        }
        if method.is_seasonal() {
            checks.push(("Delta", params.delta));
        }
        for (name, value) in checks {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::invalid(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Validate a chi-square category range and expected-value list.
    pub fn validate_expected(
        range: ExpectedRange,
        expected: &ExpectedValues,
    ) -> Result<(), AnalysisError> {
        if let ExpectedRange::Range { lower, upper } = range {
            if lower > upper {
                return Err(AnalysisError::invalid(format!(
                    "Lower bound {} exceeds upper bound {}",
                    lower, upper
                )));
            }
            if upper.saturating_sub(lower) >= MAX_CATEGORY_RANGE {
                return Err(AnalysisError::invalid(format!(
                    "A category range may span at most {} values",
                    MAX_CATEGORY_RANGE
                )));
            }
        }

        if let ExpectedValues::Values(list) = expected {
            if list.is_empty() {
                return Err(AnalysisError::invalid("The expected-value list is empty"));
            }
            if let Some(bad) = list.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(AnalysisError::invalid(format!(
                    "Expected values must be positive, got {}",
                    bad
                )));
            }
        }
        Ok(())
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> Result<(), AnalysisError> {
        if let Some(param) = duplicate_param {
            return Err(AnalysisError::invalid(format!(
                "Parameter '{}' was set multiple times",
                param
            )));
        }
        Ok(())
    }
}
