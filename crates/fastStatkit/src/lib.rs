//! # fastStatkit: Parallel Job Dispatch for statkit
//!
//! Runs statkit analyses off the caller's thread. Each request executes as
//! one job on a dedicated `rayon` worker pool; the caller gets a handle it can
//! poll or wait on with a wall-clock budget. Independent requests can also be
//! evaluated as an ordered parallel batch.
//!
//! ## Quick Start
//!
//! ### Submitting a job
//!
//! ```rust
//! use fastStatkit::prelude::*;
//!
//! let dispatcher = Dispatcher::new(DispatchConfig::new().workers(2))?;
//!
//! let grade = Variable::numeric("grade", &[1.0, 1.0, 1.0, 2.0, 2.0, 3.0]);
//! let request = ChiSquare::new().variable(grade).build()?;
//!
//! // Runs on the pool; wait blocks for at most the budget (60 s by default)
//! let handle = dispatcher.submit(request);
//! let output = handle.wait()?;
//!
//! println!("{}", output);
//! # Result::<(), DispatchError>::Ok(())
//! ```
//!
//! ### Batches
//!
//! ```rust
//! use fastStatkit::prelude::*;
//! use ndarray::Array1;
//!
//! let dispatcher = Dispatcher::new(DispatchConfig::new())?;
//!
//! let x = Array1::linspace(1.0, 10.0, 10);
//! let y = x.mapv(|v| 2.0 * v + 1.0);
//!
//! let requests = vec![
//!     Regression::new()
//!         .dependent(numeric_variable("y", &y)?)
//!         .independent(numeric_variable("x", &x)?)
//!         .build()?,
//!     ChiSquare::new().variable(numeric_variable("x", &x)?).build()?,
//! ];
//!
//! // Results come back in request order
//! let results = dispatcher.run_all(&requests);
//! assert_eq!(results.len(), 2);
//! # Result::<(), DispatchError>::Ok(())
//! ```
//!
//! ## Timeouts and Abandonment
//!
//! A job that has not reported back within its budget is reported as
//! `DispatchError::TimedOut` and abandoned: the worker keeps running to
//! completion but its result is discarded. Dropping a handle abandons the job
//! the same way.
//!
//! ## ndarray Integration
//!
//! [`numeric_variable`](prelude::numeric_variable) accepts `&[f64]`,
//! `Vec<f64>` or any contiguous 1-D `ndarray` array.

#![allow(non_snake_case)]

// Error types for the dispatch boundary.
mod errors;

// Layer 5: Engine - worker pool, jobs and handles.
mod engine;

// High-level dispatch API.
mod api;

// Input data handling.
mod input;

pub use api::*;

// Standard fastStatkit prelude.
pub mod prelude {
    pub use crate::api::{
        numeric_variable, AnalysisError, AnalysisKind, AnalysisOutput, AnalysisRequest,
        ArimaBuilder as Arima, ChiSquareBuilder as ChiSquare, DecompositionBuilder as Decomposition,
        DispatchConfig, DispatchError, Dispatcher, JobHandle, JobId, RegressionBuilder as Regression,
        ResultTable, SampleInput, SmoothingBuilder as Smoothing, TimeSpecification, Variable,
    };
}

// Internal modules for development and testing.
#[doc(hidden)]
pub mod internals {
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
