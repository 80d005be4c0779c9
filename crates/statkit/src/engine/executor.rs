//! Execution engine for statkit analyses.
//!
//! ## Purpose
//!
//! This module wraps one analysis pass: it logs the start and end of the
//! request, times it, and checks the produced tables before they leave the
//! engine. Analysis code plugs in as an [`AnalysisPass`].
//!
//! ## Design notes
//!
//! * The executor owns no state; each call is independent.
//! * A failed pass is returned untouched. No partial output escapes.
//!
//! ## Invariants
//!
//! * Every returned output holds at least one table.
//! * Every returned table satisfies `ResultTable::validate`.
//!
//! ## Non-goals
//!
//! * This module does not validate request options (handled by `validator`).
//! * This module does not handle parallel execution (handled by fastStatkit).

// External dependencies
use log::debug;
use std::time::Instant;

// Internal dependencies
use crate::engine::output::AnalysisOutput;
use crate::engine::request::AnalysisKind;
use crate::primitives::errors::AnalysisError;

/// Signature of an analysis pass over a typed request.
pub type AnalysisPass<R> = fn(&R) -> Result<AnalysisOutput, AnalysisError>;

// ============================================================================
// Executor
// ============================================================================

/// Stateless runner for analysis passes.
pub struct Executor;

impl Executor {
    /// Run `pass` on `request` and check its output.
    pub fn execute<R>(
        kind: AnalysisKind,
        rows: usize,
        request: &R,
        pass: AnalysisPass<R>,
    ) -> Result<AnalysisOutput, AnalysisError> {
        let started = Instant::now();
        debug!("{} started on {} rows", kind, rows);

        let result = pass(request).and_then(|output| Self::check(kind, output));

        match &result {
            Ok(output) => debug!(
                "{} finished in {:?} with {} tables and {} derived series",
                kind,
                started.elapsed(),
                output.tables.len(),
                output.derived.len()
            ),
            Err(err) => debug!(
                "{} failed after {:?}: {} ({})",
                kind,
                started.elapsed(),
                err,
                err.kind()
            ),
        }
        result
    }

    fn check(kind: AnalysisKind, output: AnalysisOutput) -> Result<AnalysisOutput, AnalysisError> {
        if output.kind != kind {
            return Err(AnalysisError::internal(format!(
                "{} pass produced output tagged {}",
                kind, output.kind
            )));
        }
        if output.tables.is_empty() {
            return Err(AnalysisError::internal(format!(
                "{} produced no result tables",
                kind
            )));
        }
        for table in &output.tables {
            table.validate()?;
        }
        Ok(output)
    }
}
