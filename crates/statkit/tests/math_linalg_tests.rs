//! Tests for the dense linear algebra kernel.
//!
//! These tests verify the matrix operations used by the regression engines:
//! - Construction and shape checks
//! - Products and quadratic forms
//! - Gauss-Jordan inversion and singularity detection
//! - Jacobi eigen-decomposition of symmetric matrices
//!
//! ## Test Organization
//!
//! 1. **Construction** - Shapes and layout
//! 2. **Products** - Multiplication and quadratic forms
//! 3. **Inversion** - Inverse accuracy and singular input
//! 4. **Eigen** - Eigenpairs, ordering and convergence
//! 5. **Properties** - Randomised invariants

use approx::assert_relative_eq;
use proptest::prelude::*;

use statkit::internals::math::linalg::{jacobi_eigen, jacobi_eigen_default, Matrix};
use statkit::internals::primitives::errors::ErrorKind;

fn assert_identity(m: &Matrix<f64>, tol: f64) {
    for r in 0..m.rows() {
        for c in 0..m.cols() {
            let expected = if r == c { 1.0 } else { 0.0 };
            assert!(
                (m.get(r, c) - expected).abs() < tol,
                "entry ({}, {}) = {} deviates from identity",
                r,
                c,
                m.get(r, c)
            );
        }
    }
}

// ============================================================================
// Construction Tests
// ============================================================================

/// Test row-major layout and column construction.
#[test]
fn test_from_rows_and_columns() {
    let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    assert_eq!(m.rows(), 2);
    assert_eq!(m.cols(), 3);
    assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    assert_eq!(m.column(2), vec![3.0, 6.0]);

    let t = Matrix::from_columns(&[vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]).unwrap();
    assert_eq!(t, m);
    assert_eq!(m.transpose().transpose(), m);
}

/// Test that ragged rows are rejected.
#[test]
fn test_ragged_rows_rejected() {
    let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

// ============================================================================
// Product Tests
// ============================================================================

/// Test matrix multiplication against a hand-computed product.
#[test]
fn test_multiply() {
    let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let b = Matrix::from_rows(&[vec![5.0, 6.0], vec![7.0, 8.0]]).unwrap();
    let c = a.multiply(&b).unwrap();
    assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
}

/// Test that incompatible shapes are rejected.
#[test]
fn test_multiply_shape_mismatch() {
    let a = Matrix::<f64>::zeros(2, 3);
    let b = Matrix::<f64>::zeros(2, 3);
    assert!(a.multiply(&b).is_err());
}

/// Test matrix-vector product and the bilinear form aᵀMb.
#[test]
fn test_mul_vec_and_quadratic_form() {
    let m = Matrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 3.0]]).unwrap();
    assert_eq!(m.mul_vec(&[1.0, 1.0]).unwrap(), vec![3.0, 4.0]);
    let q = m.quadratic_form(&[1.0, 2.0], &[1.0, 2.0]).unwrap();
    // [1 2] [[2 1] [1 3]] [1 2]ᵀ = 2 + 2 + 2 + 12
    assert_relative_eq!(q, 18.0, epsilon = 1e-12);
}

// ============================================================================
// Inversion Tests
// ============================================================================

/// Test that M · M⁻¹ reproduces the identity.
#[test]
fn test_inverse_reproduces_identity() {
    let m = Matrix::from_rows(&[
        vec![4.0, 7.0, 2.0],
        vec![3.0, 6.0, 1.0],
        vec![2.0, 5.0, 3.0],
    ])
    .unwrap();
    let inv = m.inverse().unwrap();
    assert_identity(&m.multiply(&inv).unwrap(), 1e-8);
    assert_identity(&inv.multiply(&m).unwrap(), 1e-8);
}

/// Test inversion that requires row pivoting.
#[test]
fn test_inverse_needs_pivoting() {
    let m = Matrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
    let inv = m.inverse().unwrap();
    assert_eq!(inv, m);
}

/// Test that a singular matrix is reported as such.
#[test]
fn test_inverse_singular() {
    let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
    let err = m.inverse().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SingularMatrix);
}

/// Test that a non-square matrix cannot be inverted.
#[test]
fn test_inverse_non_square() {
    let err = Matrix::<f64>::zeros(2, 3).inverse().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

// ============================================================================
// Eigen Tests
// ============================================================================

/// Test eigenpairs of a symmetric 3x3 matrix.
///
/// Verifies M·v = λ·v for every pair and Σλ = trace(M).
#[test]
fn test_jacobi_eigenpairs() {
    let m = Matrix::from_rows(&[
        vec![4.0, 1.0, 2.0],
        vec![1.0, 3.0, 0.5],
        vec![2.0, 0.5, 5.0],
    ])
    .unwrap();
    let eig = jacobi_eigen_default(&m).unwrap();
    assert!(eig.converged);

    for (lambda, v) in eig.eigenvalues.iter().zip(&eig.eigenvectors) {
        let mv = m.mul_vec(v).unwrap();
        for (a, b) in mv.iter().zip(v) {
            assert_relative_eq!(*a, lambda * b, epsilon = 1e-8);
        }
        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-10);
    }

    let sum: f64 = eig.eigenvalues.iter().sum();
    assert_relative_eq!(sum, m.trace(), epsilon = 1e-9);
}

/// Test descending ordering of eigenvalues.
#[test]
fn test_jacobi_sorted_descending() {
    let m = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 3.0]]).unwrap();
    let eig = jacobi_eigen_default(&m).unwrap().sorted_descending();
    assert_eq!(eig.eigenvalues, vec![3.0, 1.0]);
    assert_eq!(eig.eigenvectors[0], vec![0.0, 1.0]);
}

/// Test that exhausting the sweep bound is reported, not raised.
#[test]
fn test_jacobi_reports_non_convergence() {
    let m = Matrix::from_rows(&[
        vec![4.0, 1.0, 2.0],
        vec![1.0, 3.0, 0.5],
        vec![2.0, 0.5, 5.0],
    ])
    .unwrap();
    let eig = jacobi_eigen(&m, 1e-300, 1).unwrap();
    assert!(!eig.converged);
    assert_eq!(eig.iterations, 1);
}

/// Test that the sweep bound scales with the matrix size.
///
/// A 9×9 cross-product matrix has 36 off-diagonal pairs; the default bound
/// of 100 sweeps allows 3600 rotations.
#[test]
fn test_jacobi_nine_by_nine_cross_product() {
    let mut state = 17_u64;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
    };
    let rows: Vec<Vec<f64>> = (0..40)
        .map(|_| {
            let mut row = vec![1.0];
            row.extend((0..8).map(|_| next()));
            row
        })
        .collect();
    let x = Matrix::from_rows(&rows).unwrap();
    let m = x.transpose().multiply(&x).unwrap();

    let eig = jacobi_eigen_default(&m).unwrap();
    assert!(eig.converged);
    assert!(eig.iterations >= 1 && eig.iterations <= 100);

    for (lambda, v) in eig.eigenvalues.iter().zip(&eig.eigenvectors) {
        let mv = m.mul_vec(v).unwrap();
        for (a, b) in mv.iter().zip(v) {
            assert_relative_eq!(*a, lambda * b, epsilon = 1e-7);
        }
    }
    let sum: f64 = eig.eigenvalues.iter().sum();
    assert_relative_eq!(sum, m.trace(), max_relative = 1e-12);
}

/// Test that asymmetric input is rejected.
#[test]
fn test_jacobi_rejects_asymmetric() {
    let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![0.0, 1.0]]).unwrap();
    let err = jacobi_eigen_default(&m).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn eigenvalues_sum_to_trace(
        a in -10.0_f64..10.0,
        b in -10.0_f64..10.0,
        c in -10.0_f64..10.0,
        d in -10.0_f64..10.0,
        e in -10.0_f64..10.0,
        f in -10.0_f64..10.0,
    ) {
        let m = Matrix::from_rows(&[
            vec![a, b, c],
            vec![b, d, e],
            vec![c, e, f],
        ]).unwrap();
        let eig = jacobi_eigen(&m, 1e-12, 1000).unwrap();
        let sum: f64 = eig.eigenvalues.iter().sum();
        prop_assert!((sum - m.trace()).abs() < 1e-8, "Σλ = {} but trace = {}", sum, m.trace());
    }

    #[test]
    fn diagonally_dominant_inverse(
        a in 5.0_f64..10.0,
        b in -1.0_f64..1.0,
        c in -1.0_f64..1.0,
        d in 5.0_f64..10.0,
    ) {
        let m = Matrix::from_rows(&[vec![a, b], vec![c, d]]).unwrap();
        let product = m.multiply(&m.inverse().unwrap()).unwrap();
        for r in 0..2 {
            for col in 0..2 {
                let expected = if r == col { 1.0 } else { 0.0 };
                prop_assert!((product.get(r, col) - expected).abs() < 1e-8);
            }
        }
    }
}
