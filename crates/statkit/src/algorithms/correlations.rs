//! Predictor and coefficient correlations.
//!
//! ## Purpose
//!
//! This module computes, for each predictor `Xᵢ` of a regression:
//! - zero-order correlation `corr(Y, Xᵢ)`,
//! - partial correlation `corr(resid(Y|Z), resid(Xᵢ|Z))`,
//! - part (semi-partial) correlation `corr(Y, resid(Xᵢ|Z))`,
//! - tolerance `1 − R²(Xᵢ|Z)`,
//!
//! where `Z` is the set of remaining predictors, and the coefficient
//! covariance/correlation matrices of a fitted model.
//!
//! ## Invariants
//!
//! * With a single predictor `Z` is empty and the three correlations coincide.
//! * Correlations of a zero-variance series are `None`.

// Internal dependencies
use crate::algorithms::regression::{residualize, LeastSquaresFit};
use crate::math::linalg::Matrix;
use crate::math::moments::{weighted_correlation, weighted_sum_of_squares};
use crate::primitives::errors::AnalysisError;

// ============================================================================
// Predictor Correlations
// ============================================================================

/// Correlations and tolerance of one predictor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictorCorrelations {
    /// `corr(Y, Xᵢ)`.
    pub zero_order: Option<f64>,

    /// `corr(resid(Y|Z), resid(Xᵢ|Z))`.
    pub partial: Option<f64>,

    /// `corr(Y, resid(Xᵢ|Z))`.
    pub part: Option<f64>,

    /// `SS(resid(Xᵢ|Z)) / SS(Xᵢ)`.
    pub tolerance: Option<f64>,
}

impl PredictorCorrelations {
    /// Variance inflation factor `1 / tolerance`.
    pub fn vif(&self) -> Option<f64> {
        self.tolerance.filter(|&t| t > 0.0).map(|t| 1.0 / t)
    }
}

/// Correlations of every predictor with `y`, controlling for the others.
pub fn predictor_correlations(
    y: &[f64],
    predictors: &[Vec<f64>],
    weights: &[f64],
) -> Result<Vec<PredictorCorrelations>, AnalysisError> {
    let mut out = Vec::with_capacity(predictors.len());

    for (i, xi) in predictors.iter().enumerate() {
        let others: Vec<Vec<f64>> = predictors
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, x)| x.clone())
            .collect();

        let resid_x = residualize(xi, &others, weights)?;
        let resid_y = residualize(y, &others, weights)?;

        let ss_x = weighted_sum_of_squares(xi, weights);
        let ss_resid: f64 = resid_x
            .iter()
            .zip(weights)
            .map(|(&r, &w)| w * r * r)
            .sum();

        out.push(PredictorCorrelations {
            zero_order: weighted_correlation(y, xi, weights),
            partial: weighted_correlation(&resid_y, &resid_x, weights),
            part: weighted_correlation(y, &resid_x, weights),
            tolerance: (ss_x > 0.0).then(|| (ss_resid / ss_x).clamp(0.0, 1.0)),
        });
    }

    Ok(out)
}

// ============================================================================
// Coefficient Correlations
// ============================================================================

/// Covariance and correlation matrices of the slope coefficients
/// (intercept excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientCorrelations {
    /// `σ²(XᵀX)⁻¹` restricted to the predictors.
    pub covariance: Matrix<f64>,

    /// Covariances normalised by `sqrt(varᵢ·varⱼ)`; diagonal fixed at 1.
    /// Undefined entries are NaN.
    pub correlation: Matrix<f64>,
}

impl CoefficientCorrelations {
    /// Derive both matrices from a fitted model.
    pub fn compute(fit: &LeastSquaresFit) -> Result<Self, AnalysisError> {
        let full = fit.coefficient_covariance();
        let k = fit.params.saturating_sub(1);

        let mut covariance = Matrix::zeros(k, k);
        for i in 0..k {
            for j in 0..k {
                covariance.set(i, j, full.get(i + 1, j + 1));
            }
        }

        let mut correlation = Matrix::identity(k);
        for i in 0..k {
            for j in 0..k {
                if i == j {
                    continue;
                }
                let denom = (covariance.get(i, i) * covariance.get(j, j)).sqrt();
                let value = if denom > 0.0 {
                    (covariance.get(i, j) / denom).clamp(-1.0, 1.0)
                } else {
                    f64::NAN
                };
                correlation.set(i, j, value);
            }
        }

        Ok(Self {
            covariance,
            correlation,
        })
    }
}
