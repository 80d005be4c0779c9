//! Residual diagnostics.
//!
//! ## Purpose
//!
//! This module derives the five residual types of a least-squares fit from
//! the raw residuals, the residual scale and the leverages:
//!
//! | Type                | Formula                                   |
//! |---------------------|-------------------------------------------|
//! | Unstandardized      | `eᵢ`                                      |
//! | Standardized        | `eᵢ / s`                                  |
//! | Studentized         | `eᵢ / (s·sqrt(1 − hᵢ))`                   |
//! | Deleted             | `eᵢ / (1 − hᵢ)`                           |
//! | Studentized deleted | `rᵢ·sqrt((df − 1) / (df − rᵢ²))`          |
//!
//! with `s = sqrt(SSE / df)`, `df = C − p*` and `rᵢ` the studentized residual.
//! Weighted fits multiply the scaled forms by `sqrt(wᵢ)`.
//!
//! ## Invariants
//!
//! * A leverage of 1 (within [`LEVERAGE_TOLERANCE`]) is a `SingularMatrix`
//!   failure: deleted residuals are undefined for that case.
//! * For an exact fit (`s = 0`) every scaled residual is 0.
//! * When the fit without case `i` is exact (always so for `df = 1`), its
//!   studentized deleted residual is undefined and stored as NaN, which
//!   tables and saved series render as empty.

// Internal dependencies
use crate::algorithms::regression::LeastSquaresFit;
use crate::primitives::errors::AnalysisError;

/// Distance from 1 under which a leverage counts as degenerate.
pub const LEVERAGE_TOLERANCE: f64 = 1e-10;

/// Relative margin of `df − rᵢ²` under which the fit without case `i` is
/// treated as exact.
pub const DELETED_FIT_TOLERANCE: f64 = 1e-10;

/// The five residual series of a fit, in case order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualSet {
    /// `eᵢ`.
    pub unstandardized: Vec<f64>,

    /// `eᵢ / s`.
    pub standardized: Vec<f64>,

    /// `eᵢ / (s·sqrt(1 − hᵢ))`.
    pub studentized: Vec<f64>,

    /// `eᵢ / (1 − hᵢ)`.
    pub deleted: Vec<f64>,

    /// Externally studentized residuals; NaN where undefined.
    pub studentized_deleted: Vec<f64>,
}

impl ResidualSet {
    /// Compute every residual type for `fit`.
    pub fn compute(fit: &LeastSquaresFit) -> Result<Self, AnalysisError> {
        let df = fit.residual_df();
        if df == 0 {
            return Err(AnalysisError::insufficient(format!(
                "{} cases leave no residual degrees of freedom for {} parameters",
                fit.cases, fit.params
            )));
        }
        let df = df as f64;
        let exact = fit.is_exact();
        let s = fit.sigma2().sqrt();

        let n = fit.cases;
        let mut standardized = Vec::with_capacity(n);
        let mut studentized = Vec::with_capacity(n);
        let mut deleted = Vec::with_capacity(n);
        let mut studentized_deleted = Vec::with_capacity(n);

        for i in 0..n {
            let e = fit.residuals[i];
            let h = fit.leverage[i];
            let root_w = fit.weights[i].max(0.0).sqrt();
            let one_minus_h = 1.0 - h;

            if one_minus_h < LEVERAGE_TOLERANCE {
                return Err(AnalysisError::singular(format!(
                    "Case {} has leverage 1: deleted residuals are undefined",
                    i + 1
                )));
            }

            deleted.push(e / one_minus_h);

            if exact {
                standardized.push(0.0);
                studentized.push(0.0);
                studentized_deleted.push(0.0);
                continue;
            }

            let std_i = root_w * e / s;
            let stud_i = std_i / one_minus_h.sqrt();
            let denom = df - stud_i * stud_i;

            standardized.push(std_i);
            studentized.push(stud_i);
            // Deleting the case leaves an exact fit: 0/0.
            studentized_deleted.push(if df <= 1.0 || denom <= DELETED_FIT_TOLERANCE * df {
                f64::NAN
            } else {
                stud_i * ((df - 1.0) / denom).sqrt()
            });
        }

        Ok(Self {
            unstandardized: fit.residuals.clone(),
            standardized,
            studentized,
            deleted,
            studentized_deleted,
        })
    }
}
