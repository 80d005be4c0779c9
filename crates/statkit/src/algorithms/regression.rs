//! Least-squares regression.
//!
//! ## Purpose
//!
//! This module provides the two fitting primitives of the crate:
//! - [`LinearFit`]: closed-form simple linear regression of y on x, used for
//!   trend extraction.
//! - [`LeastSquaresFit`]: weighted multiple regression `β = (XᵀWX)⁻¹XᵀWy`
//!   over a design matrix, with fitted values, residuals, sums of squares and
//!   leverages computed once and shared by every diagnostic.
//!
//! ## Design notes
//!
//! * **Weights**: Case weights scale the rows of the design by `sqrt(w)`; with
//!   unit weights the formulas are ordinary least squares.
//! * **Propagation**: A singular `XᵀWX` surfaces as `SingularMatrix`.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::linalg::Matrix;
use crate::primitives::errors::AnalysisError;

// ============================================================================
// LinearFit
// ============================================================================

/// Simple linear regression fit result (slope and intercept).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit<T: Float> {
    /// Slope (beta_1)
    pub slope: T,

    /// Intercept (beta_0)
    pub intercept: T,

    /// Mean of x-values
    pub x_mean: T,

    /// Mean of y-values
    pub y_mean: T,
}

impl<T: Float> LinearFit<T> {
    /// Create a zero-initialized fit.
    pub fn zero() -> Self {
        Self {
            slope: T::zero(),
            intercept: T::zero(),
            x_mean: T::zero(),
            y_mean: T::zero(),
        }
    }

    /// Predict y-value for a given x using the model.
    #[inline]
    pub fn predict(&self, x: T) -> T {
        self.intercept + self.slope * x
    }

    /// Fit Ordinary Least Squares (OLS) regression.
    pub fn fit_ols(x: &[T], y: &[T]) -> Self {
        let n = x.len().min(y.len());
        if n == 0 {
            return Self::zero();
        }

        let n_t = T::from(n).unwrap_or(T::one());

        let (sum_x, sum_y) = x
            .iter()
            .zip(y)
            .fold((T::zero(), T::zero()), |(sx, sy), (&xi, &yi)| (sx + xi, sy + yi));

        let x_mean = sum_x / n_t;
        let y_mean = sum_y / n_t;

        let (variance, covariance) =
            x.iter()
                .zip(y)
                .fold((T::zero(), T::zero()), |(var, cov), (&xi, &yi)| {
                    let dx = xi - x_mean;
                    (var + dx * dx, cov + dx * (yi - y_mean))
                });

        let tol = T::from(1e-12).unwrap_or_else(T::epsilon);
        if variance <= tol {
            return Self {
                slope: T::zero(),
                intercept: y_mean,
                x_mean,
                y_mean,
            };
        }

        let slope = covariance / variance;
        let intercept = y_mean - slope * x_mean;

        Self {
            slope,
            intercept,
            x_mean,
            y_mean,
        }
    }
}

// ============================================================================
// Design Matrix
// ============================================================================

/// Build an `n × (k + 1)` design matrix: an intercept column followed by the
/// predictor columns in order.
pub fn design_with_intercept(predictors: &[Vec<f64>]) -> Result<Matrix<f64>, AnalysisError> {
    let n = predictors.first().map_or(0, Vec::len);
    if let Some(bad) = predictors.iter().position(|p| p.len() != n) {
        return Err(AnalysisError::invalid(format!(
            "Predictor {} has {} cases, expected {}",
            bad + 1,
            predictors[bad].len(),
            n
        )));
    }

    let mut columns = Vec::with_capacity(predictors.len() + 1);
    columns.push(vec![1.0; n]);
    columns.extend(predictors.iter().cloned());
    Matrix::from_columns(&columns)
}

// ============================================================================
// Weighted Least Squares
// ============================================================================

/// A weighted least-squares fit over a design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresFit {
    /// Coefficients, intercept first.
    pub coefficients: Vec<f64>,

    /// `(XᵀWX)⁻¹`.
    pub xtx_inverse: Matrix<f64>,

    /// Fitted values `ŷ = Xβ`.
    pub fitted: Vec<f64>,

    /// Raw residuals `e = y − ŷ`.
    pub residuals: Vec<f64>,

    /// Hat-matrix diagonal `hᵢ = wᵢ xᵢ(XᵀWX)⁻¹xᵢᵀ`.
    pub leverage: Vec<f64>,

    /// Case weights used in the fit.
    pub weights: Vec<f64>,

    /// Weighted residual sum of squares.
    pub sse: f64,

    /// Weighted total sum of squares about the weighted mean of y.
    pub sst: f64,

    /// Regression sum of squares, `sst − sse` (never negative).
    pub ssr: f64,

    /// Number of cases.
    pub cases: usize,

    /// Number of parameters, intercept included.
    pub params: usize,
}

impl LeastSquaresFit {
    /// Relative size of SSE (against SST) under which a fit counts as exact.
    pub const PERFECT_FIT_TOLERANCE: f64 = 1e-20;

    /// Fit `y` on the columns of `design` with case `weights`.
    pub fn fit(design: &Matrix<f64>, y: &[f64], weights: &[f64]) -> Result<Self, AnalysisError> {
        let n = design.rows();
        let p = design.cols();
        if y.len() != n || weights.len() != n {
            return Err(AnalysisError::invalid(format!(
                "Design has {} cases but y has {} and weights {}",
                n,
                y.len(),
                weights.len()
            )));
        }
        if n == 0 || p == 0 {
            return Err(AnalysisError::insufficient("No cases available for the fit"));
        }

        // Scale rows by sqrt(w).
        let roots: Vec<f64> = weights.iter().map(|w| w.max(0.0).sqrt()).collect();
        let mut scaled = Vec::with_capacity(n * p);
        for (r, &root) in roots.iter().enumerate() {
            scaled.extend(design.row(r).iter().map(|&v| v * root));
        }
        let xw = Matrix::new(n, p, scaled)?;
        let yw: Vec<f64> = y.iter().zip(&roots).map(|(&v, &root)| v * root).collect();

        let xwt = xw.transpose();
        let xtx = xwt.multiply(&xw)?;
        let xtx_inverse = xtx.inverse().map_err(|_| {
            AnalysisError::singular(
                "The design matrix is singular: predictors are linearly dependent",
            )
        })?;
        let xty = xwt.mul_vec(&yw)?;
        let coefficients = xtx_inverse.mul_vec(&xty)?;

        let fitted = design.mul_vec(&coefficients)?;
        let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(&a, &b)| a - b).collect();

        let mut leverage = Vec::with_capacity(n);
        for (r, &w) in weights.iter().enumerate() {
            let row = design.row(r);
            leverage.push(w * xtx_inverse.quadratic_form(row, row)?);
        }

        let sum_w: f64 = weights.iter().sum();
        let y_mean = y.iter().zip(weights).map(|(&v, &w)| w * v).sum::<f64>() / sum_w;
        let sse = residuals
            .iter()
            .zip(weights)
            .map(|(&e, &w)| w * e * e)
            .sum::<f64>();
        let sst = y
            .iter()
            .zip(weights)
            .map(|(&v, &w)| w * (v - y_mean) * (v - y_mean))
            .sum::<f64>();

        Ok(Self {
            coefficients,
            xtx_inverse,
            fitted,
            residuals,
            leverage,
            weights: weights.to_vec(),
            sse,
            sst,
            ssr: (sst - sse).max(0.0),
            cases: n,
            params: p,
        })
    }

    /// Residual degrees of freedom `C − p*`.
    #[inline]
    pub fn residual_df(&self) -> usize {
        self.cases.saturating_sub(self.params)
    }

    /// Whether SSE is negligible relative to SST.
    pub fn is_exact(&self) -> bool {
        self.sse <= Self::PERFECT_FIT_TOLERANCE * self.sst.max(1.0)
    }

    /// Residual variance `SSE / (C − p*)`; zero for an exact fit.
    pub fn sigma2(&self) -> f64 {
        let df = self.residual_df();
        if df == 0 || self.is_exact() {
            return 0.0;
        }
        self.sse / df as f64
    }

    /// Coefficient of determination `SSR / SST`.
    pub fn r_squared(&self) -> f64 {
        if self.sst <= 0.0 {
            return if self.is_exact() { 1.0 } else { 0.0 };
        }
        (self.ssr / self.sst).clamp(0.0, 1.0)
    }

    /// Covariance matrix of the coefficients, `σ²(XᵀWX)⁻¹`.
    pub fn coefficient_covariance(&self) -> Matrix<f64> {
        let sigma2 = self.sigma2();
        let p = self.params;
        let data = self.xtx_inverse.as_slice().iter().map(|v| v * sigma2).collect();
        // Dimensions are copied from a square matrix, so construction cannot fail.
        Matrix::new(p, p, data).unwrap_or_else(|_| Matrix::zeros(p, p))
    }
}

/// Residuals of `target` regressed (with intercept) on `others`.
pub fn residualize(
    target: &[f64],
    others: &[Vec<f64>],
    weights: &[f64],
) -> Result<Vec<f64>, AnalysisError> {
    if others.is_empty() {
        let sum_w: f64 = weights.iter().sum();
        let mean = target.iter().zip(weights).map(|(&v, &w)| w * v).sum::<f64>() / sum_w;
        return Ok(target.iter().map(|v| v - mean).collect());
    }
    let design = design_with_intercept(others)?;
    Ok(LeastSquaresFit::fit(&design, target, weights)?.residuals)
}
