//! Worker pool and job submission for statkit requests.
//!
//! ## Purpose
//!
//! This module keeps CPU-bound analyses off the caller's thread. A
//! [`Dispatcher`] owns a dedicated `rayon` pool; each submitted request runs
//! as one pool task and reports back through a one-slot channel.
//!
//! ## Design notes
//!
//! * **Isolation**: One request per task; a request never spans tasks.
//! * **Panic containment**: Each engine call runs inside `catch_unwind`; a
//!   panic becomes `AnalysisError::Internal` instead of tearing down the pool.
//! * **Batches**: `run_all` fans independent requests out with `par_iter`
//!   inside the pool and keeps input order.
//!
//! ## Invariants
//!
//! * Every submitted job sends exactly one outcome (or none, if its handle was
//!   dropped first and the send fails).
//! * Job identifiers are unique per dispatcher and strictly increasing.
//!
//! ## Non-goals
//!
//! * This module does not interrupt running analyses.
//! * This module does not prioritise or reorder queued jobs.

// External dependencies
use crossbeam_channel::bounded;
use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// Export dependencies from statkit crate
use statkit::{AnalysisError, AnalysisOutput, AnalysisRequest};

// Internal dependencies
use crate::engine::config::DispatchConfig;
use crate::engine::job::{JobHandle, JobId, JobOutcome};
use crate::errors::DispatchError;

// ============================================================================
// Dispatcher
// ============================================================================

/// Runs analysis requests on a dedicated worker pool.
#[derive(Debug)]
pub struct Dispatcher {
    pool: ThreadPool,
    config: DispatchConfig,
    next_id: AtomicU64,
}

impl Dispatcher {
    /// Validate `config` and start its worker pool.
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        config.validate()?;
        let prefix = config.thread_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(move |i| format!("{}-{}", prefix, i))
            .build()
            .map_err(|e| DispatchError::Pool(e.to_string()))?;
        debug!(
            "Dispatcher started with {} workers and a {:?} budget",
            config.workers, config.budget
        );

        Ok(Self {
            pool,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Wall-clock budget given to each submitted job.
    pub fn budget(&self) -> Duration {
        self.config.budget
    }

    /// Move `request` onto the pool and return its handle.
    pub fn submit(&self, request: AnalysisRequest) -> JobHandle {
        let submitted = Instant::now();
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let kind = request.kind();
        let (sender, receiver) = bounded(1);
        debug!("Submitted {} ({}) with {} rows", id, kind, request.rows());

        self.pool.spawn(move || {
            let started = Instant::now();
            let result = run_isolated(&request);
            debug!(
                "{} ({}) completed in {:?}: {}",
                id,
                kind,
                started.elapsed(),
                if result.is_ok() { "ok" } else { "failed" }
            );
            if sender.send(JobOutcome { job: id, result }).is_err() {
                debug!("{} finished after its handle was dropped", id);
            }
        });

        JobHandle {
            id,
            kind,
            receiver,
            budget: self.config.budget,
            submitted,
        }
    }

    /// Run independent requests in parallel, returning results in input order.
    ///
    /// Blocks until every request has finished; no budget applies.
    pub fn run_all(&self, requests: &[AnalysisRequest]) -> Vec<Result<AnalysisOutput, DispatchError>> {
        debug!("Running a batch of {} requests", requests.len());
        self.pool.install(|| {
            requests
                .par_iter()
                .map(|request| run_isolated(request).map_err(DispatchError::Analysis))
                .collect()
        })
    }
}

// ============================================================================
// Isolated Execution
// ============================================================================

/// Run one request, converting a panic into an internal error.
pub fn run_isolated(request: &AnalysisRequest) -> Result<AnalysisOutput, AnalysisError> {
    catch_unwind(AssertUnwindSafe(|| request.run())).unwrap_or_else(|payload| {
        Err(AnalysisError::internal(format!(
            "{} panicked: {}",
            request.kind(),
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
