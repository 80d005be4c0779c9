//! Error types for job dispatch.
//!
//! ## Purpose
//!
//! This module defines the failure type returned at the dispatch boundary. It
//! wraps analysis failures unchanged and adds the ways a dispatched job can
//! fail without the engine ever reporting back.
//!
//! ## Key concepts
//!
//! 1. **Analysis**: The engine ran and returned an `AnalysisError`.
//! 2. **TimedOut**: The wall-clock budget elapsed before a result arrived.
//! 3. **Abandoned**: The worker went away without sending a result.
//! 4. **Pool**: The worker pool could not be created.
//! 5. **InvalidConfig**: A `DispatchConfig` value is out of range.
//!
//! ## Non-goals
//!
//! * This module does not retry failed jobs.

// External dependencies
use core::fmt::{Display, Formatter, Result};
use std::error::Error;
use std::time::Duration;

// Export dependencies from statkit crate
use statkit::AnalysisError;

// Internal dependencies
use crate::engine::job::JobId;

// ============================================================================
// Error Type
// ============================================================================

/// Error type for dispatched analyses.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The analysis itself failed.
    Analysis(AnalysisError),

    /// No result arrived within the budget; the job was abandoned.
    TimedOut {
        /// Job that timed out.
        job: JobId,
        /// Budget that elapsed.
        budget: Duration,
    },

    /// The job's worker dropped its channel without sending a result.
    Abandoned {
        /// Job that was lost.
        job: JobId,
    },

    /// The worker pool could not be built.
    Pool(String),

    /// A dispatch option is out of range.
    InvalidConfig(String),
}

impl DispatchError {
    /// The analysis error, if the engine itself reported the failure.
    pub fn analysis(&self) -> Option<&AnalysisError> {
        match self {
            Self::Analysis(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AnalysisError> for DispatchError {
    fn from(err: AnalysisError) -> Self {
        Self::Analysis(err)
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Analysis(err) => write!(f, "{}", err),
            Self::TimedOut { job, budget } => {
                write!(f, "{} did not finish within {:?}", job, budget)
            }
            Self::Abandoned { job } => write!(f, "{} ended without a result", job),
            Self::Pool(msg) => write!(f, "Worker pool error: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "Invalid dispatch configuration: {}", msg),
        }
    }
}

// ============================================================================
// Standard Error Trait
// ============================================================================

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Analysis(err) => Some(err),
            _ => None,
        }
    }
}
