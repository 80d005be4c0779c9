//! Error types for statkit analyses.
//!
//! ## Purpose
//!
//! This module defines the single failure type returned by every engine entry
//! point. Each variant carries a human-readable message that the caller shows
//! to the end user verbatim.
//!
//! ## Design notes
//!
//! * **Classified**: Five classes mirror the ways a numerical analysis can fail.
//! * **Message-first**: `Display` prints the message only, with no prefix.
//! * **Terminal**: A failed request never comes with partial result tables.
//!
//! ## Key concepts
//!
//! 1. **InsufficientData**: Empty, too short, or non-numeric input.
//! 2. **InvalidParameter**: Out-of-range option values.
//! 3. **SingularMatrix**: Non-invertible design matrix or degenerate leverage.
//! 4. **NonConvergence**: An iterative root finder or optimiser exceeded its bound.
//! 5. **Internal**: Invariant violation inside the engine.
//!
//! ## Non-goals
//!
//! * This module does not perform validation (see `engine::validator`).
//! * This module does not provide recovery or fallback strategies.

// External dependencies
use core::fmt::{Display, Formatter, Result};
use std::error::Error;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for every statkit analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input is empty, too short, or not numeric.
    InsufficientData(String),

    /// An option lies outside its admissible range.
    InvalidParameter(String),

    /// A matrix could not be inverted, or a leverage value reached 1.
    SingularMatrix(String),

    /// An iterative computation exceeded its iteration bound.
    NonConvergence(String),

    /// An internal invariant was violated.
    Internal(String),
}

/// Coarse classification of an [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`AnalysisError::InsufficientData`].
    InsufficientData,
    /// See [`AnalysisError::InvalidParameter`].
    InvalidParameter,
    /// See [`AnalysisError::SingularMatrix`].
    SingularMatrix,
    /// See [`AnalysisError::NonConvergence`].
    NonConvergence,
    /// See [`AnalysisError::Internal`].
    Internal,
}

impl AnalysisError {
    /// Shorthand for [`AnalysisError::InsufficientData`].
    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Shorthand for [`AnalysisError::InvalidParameter`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Shorthand for [`AnalysisError::SingularMatrix`].
    pub fn singular(msg: impl Into<String>) -> Self {
        Self::SingularMatrix(msg.into())
    }

    /// Shorthand for [`AnalysisError::NonConvergence`].
    pub fn non_convergence(msg: impl Into<String>) -> Self {
        Self::NonConvergence(msg.into())
    }

    /// Shorthand for [`AnalysisError::Internal`].
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::SingularMatrix(_) => ErrorKind::SingularMatrix,
            Self::NonConvergence(_) => ErrorKind::NonConvergence,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        match self {
            Self::InsufficientData(msg)
            | Self::InvalidParameter(msg)
            | Self::SingularMatrix(msg)
            | Self::NonConvergence(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl Display for AnalysisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(self.message())
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let name = match self {
            Self::InsufficientData => "insufficient data",
            Self::InvalidParameter => "invalid parameter",
            Self::SingularMatrix => "singular matrix",
            Self::NonConvergence => "non-convergence",
            Self::Internal => "internal error",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Standard Error Trait
// ============================================================================

impl Error for AnalysisError {}
