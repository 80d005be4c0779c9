//! Job identifiers, handles and outcomes.
//!
//! ## Purpose
//!
//! A submitted request is represented by a [`JobHandle`]: the receiving end of
//! a one-slot channel the worker sends exactly one [`JobOutcome`] into.
//!
//! ## Design notes
//!
//! * **One-shot**: The channel has capacity one and exactly one send happens.
//! * **Abandon, not interrupt**: A timed-out or dropped handle leaves the
//!   worker running; its final send fails silently and nothing is retained.
//!
//! ## Invariants
//!
//! * A job's result is delivered at most once.
//! * The budget is measured from submission, not from the first wait.

// External dependencies
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use log::warn;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::{Duration, Instant};

// Export dependencies from statkit crate
use statkit::{AnalysisError, AnalysisKind, AnalysisOutput};

// Internal dependencies
use crate::errors::DispatchError;

// ============================================================================
// Identifiers and Outcomes
// ============================================================================

/// Identifier of a submitted job, unique per dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "job #{}", self.0)
    }
}

/// Message a worker sends when its job ends.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Originating job.
    pub job: JobId,

    /// Engine result.
    pub result: Result<AnalysisOutput, AnalysisError>,
}

// ============================================================================
// Job Handle
// ============================================================================

/// Caller-side handle of one submitted job.
#[derive(Debug)]
pub struct JobHandle {
    pub(crate) id: JobId,
    pub(crate) kind: AnalysisKind,
    pub(crate) receiver: Receiver<JobOutcome>,
    pub(crate) budget: Duration,
    pub(crate) submitted: Instant,
}

impl JobHandle {
    /// Identifier of this job.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Kind of the submitted request.
    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    /// Time left before the job is considered failed.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.submitted.elapsed())
    }

    /// Block until the job ends or its budget elapses.
    pub fn wait(self) -> Result<AnalysisOutput, DispatchError> {
        match self.receiver.recv_timeout(self.remaining()) {
            Ok(outcome) => self.deliver(outcome),
            Err(RecvTimeoutError::Timeout) => Err(self.timed_out()),
            Err(RecvTimeoutError::Disconnected) => Err(DispatchError::Abandoned { job: self.id }),
        }
    }

    /// Poll for the result without blocking.
    ///
    /// Returns `None` while the job is still running inside its budget. Once a
    /// result has been returned, later polls report the job as abandoned.
    pub fn try_result(&self) -> Option<Result<AnalysisOutput, DispatchError>> {
        match self.receiver.try_recv() {
            Ok(outcome) => Some(self.deliver(outcome)),
            Err(TryRecvError::Empty) if self.remaining().is_zero() => Some(Err(self.timed_out())),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(DispatchError::Abandoned { job: self.id })),
        }
    }

    fn deliver(&self, outcome: JobOutcome) -> Result<AnalysisOutput, DispatchError> {
        if outcome.job != self.id {
            return Err(DispatchError::Analysis(AnalysisError::internal(format!(
                "{} received the outcome of {}",
                self.id, outcome.job
            ))));
        }
        outcome.result.map_err(DispatchError::Analysis)
    }

    fn timed_out(&self) -> DispatchError {
        warn!(
            "{} ({}) exceeded its {:?} budget and was abandoned",
            self.id, self.kind, self.budget
        );
        DispatchError::TimedOut {
            job: self.id,
            budget: self.budget,
        }
    }
}
