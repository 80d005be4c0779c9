//! Layer 4: Evaluation
//!
//! # Purpose
//!
//! This layer calculates the statistics reported about a fitted model:
//! - Forecast accuracy metrics
//! - Confidence and prediction intervals
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
//! Layer 4: Evaluation ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Forecast accuracy metrics.
pub mod diagnostics;

/// Confidence and prediction interval computation.
pub mod intervals;
