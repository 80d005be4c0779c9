//! Layer 6: Analyses
//!
//! # Purpose
//!
//! This layer turns typed requests into result tables. Each module owns one
//! analysis kind: it validates the request, runs the algorithms and lays the
//! numbers out as [`ResultTable`](crate::engine::table::ResultTable)s.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Analyses ← You are here
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

// Internal dependencies
use crate::engine::executor::Executor;
use crate::engine::output::AnalysisOutput;
use crate::engine::request::AnalysisRequest;
use crate::math::moments::{mean, min_max, std_dev};
use crate::primitives::errors::AnalysisError;
use crate::primitives::sample::{Observation, Variable};

/// Regression diagnostics.
pub mod regression;

/// Classical seasonal decomposition.
pub mod decomposition;

/// Exponential smoothing.
pub mod smoothing;

/// ARIMA fitting and forecasting.
pub mod arima;

/// Chi-square goodness-of-fit.
pub mod chisquare;

// ============================================================================
// Dispatch
// ============================================================================

impl AnalysisRequest {
    /// Validate and run this request on the calling thread.
    pub fn run(&self) -> Result<AnalysisOutput, AnalysisError> {
        let kind = self.kind();
        let rows = self.rows();
        match self {
            Self::Regression(r) => Executor::execute(kind, rows, r, regression::run),
            Self::Decomposition(r) => Executor::execute(kind, rows, r, decomposition::run),
            Self::Smoothing(r) => Executor::execute(kind, rows, r, smoothing::run),
            Self::Arima(r) => Executor::execute(kind, rows, r, arima::run),
            Self::ChiSquare(r) => Executor::execute(kind, rows, r, chisquare::run),
        }
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Minimum, maximum, mean and standard deviation of `values`.
pub(crate) fn summarize(values: &[f64]) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (min, max) = match min_max(&finite) {
        Some((lo, hi)) => (Some(lo), Some(hi)),
        None => (None, None),
    };
    (min, max, mean(&finite), std_dev(&finite))
}

/// The gap-free numeric series of a time-series variable.
///
/// Trailing missing rows are dropped; any other non-numeric entry is an
/// `InsufficientData` failure.
pub(crate) fn series_values(variable: &Variable) -> Result<Vec<f64>, AnalysisError> {
    variable
        .values
        .trim_trailing_missing()
        .iter()
        .enumerate()
        .map(|(i, o)| {
            o.as_f64().ok_or_else(|| {
                let what = match o {
                    Observation::Text(_) => "a non-numeric value",
                    _ => "a missing value",
                };
                AnalysisError::insufficient(format!(
                    "Variable '{}' has {} at row {}",
                    variable.name(),
                    what,
                    i + 1
                ))
            })
        })
        .collect()
}

/// Observed values followed by `horizon` forecasts, as a persisted series.
pub(crate) fn fitted_and_forecast(fitted: &[Option<f64>], forecast: &[f64]) -> Vec<Option<f64>> {
    fitted
        .iter()
        .copied()
        .chain(forecast.iter().map(|&v| Some(v)))
        .collect()
}
