//! Dispatch configuration.
//!
//! ## Purpose
//!
//! Worker count, per-job budget and thread naming of a [`Dispatcher`] pool.
//!
//! [`Dispatcher`]: crate::engine::dispatcher::Dispatcher
//!
//! ## Invariants
//!
//! * A validated config has at least one worker and a positive budget.

// External dependencies
use std::time::Duration;

// Internal dependencies
use crate::errors::DispatchError;

/// Default wall-clock budget of one job.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(60);

/// Default worker thread name prefix.
pub const DEFAULT_THREAD_NAME: &str = "statkit-worker";

// ============================================================================
// Dispatch Configuration
// ============================================================================

/// Worker pool and timeout settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchConfig {
    /// Number of worker threads.
    pub workers: usize,

    /// Wall-clock budget per submitted job.
    pub budget: Duration,

    /// Prefix of worker thread names.
    pub thread_name: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: rayon::current_num_threads(),
            budget: DEFAULT_BUDGET,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl DispatchConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the per-job wall-clock budget.
    pub fn budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Set the worker thread name prefix.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.workers == 0 {
            return Err(DispatchError::InvalidConfig(
                "Worker count must be at least 1".to_string(),
            ));
        }
        if self.budget.is_zero() {
            return Err(DispatchError::InvalidConfig(
                "Job budget must be positive".to_string(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(DispatchError::InvalidConfig(
                "Thread name prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
