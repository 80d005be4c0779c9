//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure mathematical functions used throughout statkit:
//! - Dense linear algebra (product, inverse, Jacobi eigen-solver)
//! - Special functions and probability distributions
//! - Descriptive moments
//!
//! These are reusable mathematical building blocks with no analysis-specific logic.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Analyses
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// SIMD and scalar inner-product kernels.
pub mod simd;

/// Dense matrices and linear algebra kernels.
pub mod linalg;

/// Gamma, beta and normal special functions.
pub mod special;

/// Student-t, chi-square and F distributions.
pub mod distributions;

/// Means, deviations and correlations.
pub mod moments;
