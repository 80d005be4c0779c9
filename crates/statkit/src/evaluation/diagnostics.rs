//! Forecast accuracy metrics.
//!
//! ## Purpose
//!
//! This module evaluates how closely a fitted series reproduces the observed
//! one. It backs the evaluation block of the decomposition, smoothing and
//! ARIMA outputs.
//!
//! ## Design notes
//!
//! * **Paired**: Only positions where both an observation and a fitted value
//!   exist contribute.
//! * **Percentage errors**: MPE and MAPE are undefined when any contributing
//!   observation is zero and are then reported as `None`.
//!
//! ## Key concepts
//!
//! * **Residual Metrics**: MSE, RMSE and MAE measure prediction error.
//! * **Percentage Metrics**: MPE (bias) and MAPE (scale-free accuracy).
//! * **Goodness-of-Fit**: R² compares residual to total variation.
//!
//! ## Invariants
//!
//! * MSE, RMSE and MAE are non-negative.
//! * R² ≤ 1 (R² = 1 is a perfect fit).
//!
//! ## Non-goals
//!
//! * This module does not perform the fitting.
//! * This module does not provide hypothesis tests.

// External dependencies
use core::fmt::{Display, Formatter, Result};

// ============================================================================
// Diagnostics Structure
// ============================================================================

/// Accuracy of a fitted series against its observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastDiagnostics {
    /// Number of paired positions.
    pub n: usize,

    /// Mean Squared Error.
    pub mse: f64,

    /// Root Mean Squared Error.
    pub rmse: f64,

    /// Mean Absolute Error.
    pub mae: f64,

    /// Mean Percentage Error (in percent).
    pub mpe: Option<f64>,

    /// Mean Absolute Percentage Error (in percent).
    pub mape: Option<f64>,

    /// Coefficient of determination.
    pub r_squared: Option<f64>,
}

impl ForecastDiagnostics {
    /// Tolerance for treating the total sum of squares as zero.
    const MIN_TOTAL_SS: f64 = 1e-12;

    /// Compare `fitted` with `observed`, skipping positions without a fit.
    ///
    /// Returns `None` when no position is paired.
    pub fn compute(observed: &[f64], fitted: &[Option<f64>]) -> Option<Self> {
        let pairs: Vec<(f64, f64)> = observed
            .iter()
            .zip(fitted)
            .filter_map(|(&y, f)| f.map(|f| (y, f)))
            .filter(|(y, f)| y.is_finite() && f.is_finite())
            .collect();

        let n = pairs.len();
        if n == 0 {
            return None;
        }
        let n_f = n as f64;

        let sse: f64 = pairs.iter().map(|(y, f)| (y - f) * (y - f)).sum();
        let mse = sse / n_f;
        let mae = pairs.iter().map(|(y, f)| (y - f).abs()).sum::<f64>() / n_f;

        let (mpe, mape) = if pairs.iter().any(|(y, _)| *y == 0.0) {
            (None, None)
        } else {
            let pe: Vec<f64> = pairs.iter().map(|(y, f)| 100.0 * (y - f) / y).collect();
            (
                Some(pe.iter().sum::<f64>() / n_f),
                Some(pe.iter().map(|v| v.abs()).sum::<f64>() / n_f),
            )
        };

        let mean = pairs.iter().map(|(y, _)| y).sum::<f64>() / n_f;
        let sst: f64 = pairs.iter().map(|(y, _)| (y - mean) * (y - mean)).sum();
        let r_squared = if sst > Self::MIN_TOTAL_SS {
            Some(1.0 - sse / sst)
        } else if sse <= Self::MIN_TOTAL_SS {
            Some(1.0)
        } else {
            None
        };

        Some(Self {
            n,
            mse,
            rmse: mse.sqrt(),
            mae,
            mpe,
            mape,
            r_squared,
        })
    }

    /// Convenience for fully paired series.
    pub fn from_complete(observed: &[f64], fitted: &[f64]) -> Option<Self> {
        let wrapped: Vec<Option<f64>> = fitted.iter().copied().map(Some).collect();
        Self::compute(observed, &wrapped)
    }
}

impl Display for ForecastDiagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Forecast Diagnostics:")?;
        writeln!(f, "  MSE:  {:.6}", self.mse)?;
        writeln!(f, "  RMSE: {:.6}", self.rmse)?;
        writeln!(f, "  MAE:  {:.6}", self.mae)?;
        if let Some(mpe) = self.mpe {
            writeln!(f, "  MPE:  {:.4}%", mpe)?;
        }
        if let Some(mape) = self.mape {
            writeln!(f, "  MAPE: {:.4}%", mape)?;
        }
        if let Some(r2) = self.r_squared {
            write!(f, "  R^2:  {:.6}", r2)?;
        }
        Ok(())
    }
}
