//! Dense linear algebra kernel.
//!
//! ## Purpose
//!
//! This module provides the dense row-major [`Matrix`] type and the kernels
//! every analysis is expressed over: transpose, product, Gauss-Jordan inverse
//! and the classical Jacobi eigen-solver for symmetric matrices.
//!
//! ## Design notes
//!
//! * **Validated**: Dimensions are checked before every operation.
//! * **Partial pivoting**: The inverse selects the largest remaining pivot in
//!   each column and fails below [`PIVOT_TOLERANCE`].
//! * **Bounded**: The Jacobi solver performs at most `max_iter` sweeps of
//!   `n(n−1)/2` rotations each and reports whether it reached `eps` instead
//!   of failing.
//! * **Generics**: All kernels are generic over `Float` types.
//!
//! ## Invariants
//!
//! * `data.len() == rows * cols` for every matrix.
//! * Eigenvalues are returned unsorted; [`EigenDecomposition::sorted_descending`]
//!   reorders values and vectors together.
//!
//! ## Non-goals
//!
//! * This module does not provide sparse storage or decompositions other than
//!   the ones listed above.

// External dependencies
use core::cmp::Ordering;
use core::fmt::{Display, Formatter, Result as FmtResult};
use log::warn;
use num_traits::Float;

// Internal dependencies
use crate::math::simd::DotKernel;
use crate::primitives::errors::AnalysisError;

/// Pivot magnitude under which a matrix is treated as singular.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Default off-diagonal tolerance of the Jacobi solver.
pub const JACOBI_EPS: f64 = 1e-10;

/// Default sweep bound of the Jacobi solver.
pub const JACOBI_MAX_ITER: usize = 100;

// ============================================================================
// Matrix
// ============================================================================

/// Dense, row-major matrix with fixed dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Float + DotKernel> Matrix<T> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a matrix from row-major data.
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, AnalysisError> {
        if data.len() != rows * cols {
            return Err(AnalysisError::invalid(format!(
                "Matrix data has {} elements, expected {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![T::zero(); rows * cols],
        }
    }

    /// Identity matrix of order `n`.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Build from a list of equally long rows.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, AnalysisError> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(AnalysisError::invalid(format!(
                "Row {} has {} elements, expected {}",
                bad,
                rows[bad].len(),
                cols
            )));
        }
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::new(rows.len(), cols, data)
    }

    /// Build from a list of equally long columns.
    pub fn from_columns(columns: &[Vec<T>]) -> Result<Self, AnalysisError> {
        Ok(Self::from_rows(columns)?.transpose())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the matrix is square.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at (`r`, `c`). Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> T {
        self.data[r * self.cols + c]
    }

    /// Overwrite element (`r`, `c`).
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: T) {
        self.data[r * self.cols + c] = value;
    }

    /// Row `r` as a slice.
    #[inline]
    pub fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Column `c` as an owned vector.
    pub fn column(&self, c: usize) -> Vec<T> {
        (0..self.rows).map(|r| self.get(r, c)).collect()
    }

    /// Main diagonal.
    pub fn diagonal(&self) -> Vec<T> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }

    /// Sum of the main diagonal.
    pub fn trace(&self) -> T {
        self.diagonal().into_iter().fold(T::zero(), |acc, v| acc + v)
    }

    /// Row-major backing data.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Whether `|m[i][j] - m[j][i]| <= tol` for all pairs.
    pub fn is_symmetric(&self, tol: T) -> bool {
        self.is_square()
            && (0..self.rows)
                .all(|i| (0..i).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol))
    }

    // ========================================================================
    // Kernels
    // ========================================================================

    /// Transpose.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        out
    }

    /// Matrix product `self * other`.
    pub fn multiply(&self, other: &Self) -> Result<Self, AnalysisError> {
        if self.cols != other.rows {
            return Err(AnalysisError::invalid(format!(
                "Cannot multiply {}x{} by {}x{}: inner dimensions differ",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        // Transposing the right operand keeps both dot operands contiguous.
        let rhs = other.transpose();
        let mut out = Self::zeros(self.rows, other.cols);
        for r in 0..self.rows {
            let lhs_row = self.row(r);
            for c in 0..other.cols {
                out.data[r * other.cols + c] = T::dot(lhs_row, rhs.row(c));
            }
        }
        Ok(out)
    }

    /// Matrix-vector product `self * v`.
    pub fn mul_vec(&self, v: &[T]) -> Result<Vec<T>, AnalysisError> {
        if self.cols != v.len() {
            return Err(AnalysisError::invalid(format!(
                "Cannot multiply {}x{} by a vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        Ok((0..self.rows).map(|r| T::dot(self.row(r), v)).collect())
    }

    /// Quadratic form `a' * self * b`.
    pub fn quadratic_form(&self, a: &[T], b: &[T]) -> Result<T, AnalysisError> {
        let mb = self.mul_vec(b)?;
        if a.len() != mb.len() {
            return Err(AnalysisError::invalid(format!(
                "Quadratic form needs a vector of length {}, got {}",
                mb.len(),
                a.len()
            )));
        }
        Ok(T::dot(a, &mb))
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    pub fn inverse(&self) -> Result<Self, AnalysisError> {
        if !self.is_square() {
            return Err(AnalysisError::invalid(format!(
                "Cannot invert a non-square {}x{} matrix",
                self.rows, self.cols
            )));
        }

        let n = self.rows;
        let tol = T::from(PIVOT_TOLERANCE).unwrap_or_else(T::epsilon);
        let mut a = self.clone();
        let mut inv = Self::identity(n);

        for col in 0..n {
            // Select the row with the largest magnitude in the pivot column.
            let mut pivot_row = col;
            let mut pivot_mag = a.get(col, col).abs();
            for r in (col + 1)..n {
                let mag = a.get(r, col).abs();
                if mag > pivot_mag {
                    pivot_row = r;
                    pivot_mag = mag;
                }
            }

            if pivot_mag.is_nan() || pivot_mag < tol {
                return Err(AnalysisError::singular(
                    "Matrix is singular and cannot be inverted",
                ));
            }

            if pivot_row != col {
                a.swap_rows(pivot_row, col);
                inv.swap_rows(pivot_row, col);
            }

            let pivot = a.get(col, col);
            for c in 0..n {
                a.set(col, c, a.get(col, c) / pivot);
                inv.set(col, c, inv.get(col, c) / pivot);
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a.get(r, col);
                if factor == T::zero() {
                    continue;
                }
                for c in 0..n {
                    a.set(r, c, a.get(r, c) - factor * a.get(col, c));
                    inv.set(r, c, inv.get(r, c) - factor * inv.get(col, c));
                }
            }
        }

        Ok(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for c in 0..self.cols {
            self.data.swap(a * self.cols + c, b * self.cols + c);
        }
    }
}

impl<T: Float + Display> Display for Matrix<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for r in 0..self.rows {
            for c in 0..self.cols {
                write!(f, "{:>12.6}", self.data[r * self.cols + c])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Jacobi Eigen-Decomposition
// ============================================================================

/// Eigenvalues and eigenvectors of a real symmetric matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition<T> {
    /// Eigenvalues, in solver order unless sorted.
    pub eigenvalues: Vec<T>,

    /// `eigenvectors[i]` is the unit eigenvector of `eigenvalues[i]`.
    pub eigenvectors: Vec<Vec<T>>,

    /// Sweeps performed; a partial sweep counts as one.
    pub iterations: usize,

    /// Whether the largest off-diagonal element fell below `eps`.
    pub converged: bool,
}

impl<T: Float> EigenDecomposition<T> {
    /// Reorder eigenpairs by decreasing eigenvalue.
    pub fn sorted_descending(mut self) -> Self {
        let mut order: Vec<usize> = (0..self.eigenvalues.len()).collect();
        order.sort_by(|&a, &b| {
            self.eigenvalues[b]
                .partial_cmp(&self.eigenvalues[a])
                .unwrap_or(Ordering::Equal)
        });
        self.eigenvalues = order.iter().map(|&i| self.eigenvalues[i]).collect();
        self.eigenvectors = order.iter().map(|&i| self.eigenvectors[i].clone()).collect();
        self
    }
}

/// Jacobi eigen-decomposition of a real symmetric matrix.
///
/// Each iteration locates the largest off-diagonal element and annihilates it
/// with one Givens rotation, accumulating rotations into the eigenvector
/// matrix. A sweep is `n(n−1)/2` rotations, one per off-diagonal pair.
/// Iteration stops when the largest element is below `eps` or after
/// `max_iter` sweeps. Exhausting `max_iter` is not an error: the current
/// estimate is returned with `converged == false`.
pub fn jacobi_eigen<T: Float + DotKernel>(
    m: &Matrix<T>,
    eps: T,
    max_iter: usize,
) -> Result<EigenDecomposition<T>, AnalysisError> {
    if !m.is_square() {
        return Err(AnalysisError::invalid(format!(
            "Eigen-decomposition needs a square matrix, got {}x{}",
            m.rows(),
            m.cols()
        )));
    }
    let symmetry_tol = T::from(1e-8).unwrap_or_else(T::epsilon)
        * m.as_slice().iter().fold(T::one(), |acc, v| acc.max(v.abs()));
    if !m.is_symmetric(symmetry_tol) {
        return Err(AnalysisError::invalid(
            "Eigen-decomposition needs a symmetric matrix",
        ));
    }

    let n = m.rows();
    let mut a = m.clone();
    let mut v = Matrix::<T>::identity(n);
    let per_sweep = (n * n.saturating_sub(1) / 2).max(1);
    let max_rotations = max_iter.saturating_mul(per_sweep);
    let mut rotations = 0;
    let mut converged = n < 2;

    while !converged && rotations < max_rotations {
        let (p, q, largest) = largest_off_diagonal(&a);
        if largest < eps {
            converged = true;
            break;
        }

        rotate(&mut a, &mut v, p, q);
        rotations += 1;
    }

    if !converged {
        let (_, _, largest) = largest_off_diagonal(&a);
        converged = largest < eps;
    }
    if !converged {
        warn!(
            "Jacobi eigen-solver stopped after {} sweeps ({} rotations) without reaching tolerance",
            max_iter, rotations
        );
    }

    Ok(EigenDecomposition {
        eigenvalues: a.diagonal(),
        eigenvectors: (0..n).map(|i| v.column(i)).collect(),
        iterations: rotations.div_ceil(per_sweep),
        converged,
    })
}

/// Jacobi eigen-decomposition with the default tolerance and bound.
pub fn jacobi_eigen_default(m: &Matrix<f64>) -> Result<EigenDecomposition<f64>, AnalysisError> {
    jacobi_eigen(m, JACOBI_EPS, JACOBI_MAX_ITER)
}

fn largest_off_diagonal<T: Float + DotKernel>(a: &Matrix<T>) -> (usize, usize, T) {
    let n = a.rows();
    let mut best = (0, 1.min(n.saturating_sub(1)), T::zero());
    for i in 0..n {
        for j in (i + 1)..n {
            let mag = a.get(i, j).abs();
            if mag > best.2 {
                best = (i, j, mag);
            }
        }
    }
    best
}

// Givens rotation zeroing a[p][q].
fn rotate<T: Float + DotKernel>(a: &mut Matrix<T>, v: &mut Matrix<T>, p: usize, q: usize) {
    let n = a.rows();
    let two = T::one() + T::one();
    let app = a.get(p, p);
    let aqq = a.get(q, q);
    let apq = a.get(p, q);

    let theta = (aqq - app) / (two * apq);
    let sign = if theta >= T::zero() { T::one() } else { -T::one() };
    let t = sign / (theta.abs() + (theta * theta + T::one()).sqrt());
    let c = T::one() / (t * t + T::one()).sqrt();
    let s = t * c;

    for k in 0..n {
        if k == p || k == q {
            continue;
        }
        let akp = a.get(k, p);
        let akq = a.get(k, q);
        let new_kp = c * akp - s * akq;
        let new_kq = s * akp + c * akq;
        a.set(k, p, new_kp);
        a.set(p, k, new_kp);
        a.set(k, q, new_kq);
        a.set(q, k, new_kq);
    }

    a.set(p, p, app - t * apq);
    a.set(q, q, aqq + t * apq);
    a.set(p, q, T::zero());
    a.set(q, p, T::zero());

    for k in 0..n {
        let vkp = v.get(k, p);
        let vkq = v.get(k, q);
        v.set(k, p, c * vkp - s * vkq);
        v.set(k, q, s * vkp + c * vkq);
    }
}
