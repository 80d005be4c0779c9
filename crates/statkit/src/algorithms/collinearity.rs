//! Collinearity diagnostics (Belsley-Kuh-Welsch).
//!
//! ## Purpose
//!
//! This module scales the design matrix to unit column length, decomposes
//! the scaled cross-product matrix with the Jacobi solver and derives, per
//! dimension, the condition index and the variance-decomposition proportions
//! of every coefficient.
//!
//! ## Key concepts
//!
//! * **Condition index**: `sqrt(λmax / λᵢ)` over eigenvalues sorted descending.
//! * **Variance proportion**: `φᵢⱼ = vⱼᵢ² / λᵢ`, normalised so that the
//!   proportions of coefficient `j` sum to 1 across dimensions.
//!
//! ## Invariants
//!
//! * The intercept column (all ones) is divided by `sqrt(C)`, which is its
//!   Euclidean norm; every other column by its own norm.

// Internal dependencies
use crate::math::linalg::{jacobi_eigen_default, Matrix};
use crate::primitives::errors::AnalysisError;

/// Collinearity diagnostics of one design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CollinearityDiagnostics {
    /// Eigenvalues of the scaled cross-product matrix, descending.
    pub eigenvalues: Vec<f64>,

    /// `sqrt(λmax / λᵢ)` per dimension.
    pub condition_indices: Vec<f64>,

    /// `variance_proportions[dimension][coefficient]`.
    pub variance_proportions: Vec<Vec<f64>>,

    /// Whether the eigen-solver reached its tolerance.
    pub converged: bool,
}

impl CollinearityDiagnostics {
    /// Compute diagnostics for a design matrix whose columns are the
    /// (row-weighted) intercept and predictors.
    pub fn compute(design: &Matrix<f64>) -> Result<Self, AnalysisError> {
        let p = design.cols();
        let mut columns = Vec::with_capacity(p);
        for c in 0..p {
            let col = design.column(c);
            let norm = col.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm <= 0.0 {
                return Err(AnalysisError::singular(format!(
                    "Design column {} has zero length",
                    c + 1
                )));
            }
            columns.push(col.into_iter().map(|v| v / norm).collect::<Vec<_>>());
        }

        let scaled = Matrix::from_columns(&columns)?;
        let cross = scaled.transpose().multiply(&scaled)?;
        let eigen = jacobi_eigen_default(&cross)?.sorted_descending();

        // Eigenvalues of a Gram matrix are non-negative; clamp rounding noise.
        let eigenvalues: Vec<f64> = eigen
            .eigenvalues
            .iter()
            .map(|&l| l.max(f64::MIN_POSITIVE))
            .collect();
        let lambda_max = eigenvalues.first().copied().unwrap_or(f64::MIN_POSITIVE);
        let condition_indices = eigenvalues.iter().map(|&l| (lambda_max / l).sqrt()).collect();

        // phi[dimension][coefficient]
        let phi: Vec<Vec<f64>> = eigen
            .eigenvectors
            .iter()
            .zip(&eigenvalues)
            .map(|(vector, &lambda)| vector.iter().map(|v| v * v / lambda).collect())
            .collect();

        let mut variance_proportions = vec![vec![0.0; p]; p];
        for j in 0..p {
            let total: f64 = phi.iter().map(|row| row[j]).sum();
            for (k, row) in phi.iter().enumerate() {
                variance_proportions[k][j] = if total > 0.0 { row[j] / total } else { 0.0 };
            }
        }

        Ok(Self {
            eigenvalues,
            condition_indices,
            variance_proportions,
            converged: eigen.converged,
        })
    }
}
