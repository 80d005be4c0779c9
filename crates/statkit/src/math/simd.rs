//! Inner-product kernels.
//!
//! ## Purpose
//!
//! This module provides the dot-product primitive behind every matrix product
//! in the linear algebra kernel, with a generic scalar path and SIMD paths for
//! `f64` and `f32`.
//!
//! ## Design notes
//!
//! * **Dispatch by type**: [`DotKernel`] is implemented for `f64` and `f32`
//!   with `wide` lanes; other `Float` types fall back to the scalar loop.
//! * **Deterministic**: Lane sums are reduced in a fixed order, so results are
//!   reproducible across runs.

// External dependencies
use num_traits::Float;
use wide::{f32x8, f64x2};

// ============================================================================
// Scalar Kernel
// ============================================================================

/// Scalar dot product (generic Float).
#[inline]
pub fn dot_scalar<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

// ============================================================================
// Specialized Kernels (SIMD)
// ============================================================================

/// SIMD-optimized dot product (f64).
#[inline]
pub fn dot_simd_f64(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    let mut acc = f64x2::splat(0.0);

    let mut chunks_a = a[..n].chunks_exact(2);
    let mut chunks_b = b[..n].chunks_exact(2);
    for (ca, cb) in (&mut chunks_a).zip(&mut chunks_b) {
        acc += f64x2::new([ca[0], ca[1]]) * f64x2::new([cb[0], cb[1]]);
    }

    let mut sum = acc.reduce_add();
    for (&x, &y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum += x * y;
    }
    sum
}

/// SIMD-optimized dot product (f32).
#[inline]
pub fn dot_simd_f32(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    let mut acc = f32x8::splat(0.0);

    let mut chunks_a = a[..n].chunks_exact(8);
    let mut chunks_b = b[..n].chunks_exact(8);
    for (ca, cb) in (&mut chunks_a).zip(&mut chunks_b) {
        let va = f32x8::new([ca[0], ca[1], ca[2], ca[3], ca[4], ca[5], ca[6], ca[7]]);
        let vb = f32x8::new([cb[0], cb[1], cb[2], cb[3], cb[4], cb[5], cb[6], cb[7]]);
        acc += va * vb;
    }

    let mut sum = acc.reduce_add();
    for (&x, &y) in chunks_a.remainder().iter().zip(chunks_b.remainder()) {
        sum += x * y;
    }
    sum
}

// ============================================================================
// Kernel Trait
// ============================================================================

/// Trait for type-specific inner products.
pub trait DotKernel: Float {
    /// Dot product of two equally long slices.
    #[inline]
    fn dot(a: &[Self], b: &[Self]) -> Self {
        dot_scalar(a, b)
    }
}

impl DotKernel for f64 {
    #[inline]
    fn dot(a: &[f64], b: &[f64]) -> f64 {
        dot_simd_f64(a, b)
    }
}

impl DotKernel for f32 {
    #[inline]
    fn dot(a: &[f32], b: &[f32]) -> f32 {
        dot_simd_f32(a, b)
    }
}
