//! High-level API for dispatching statkit analyses.
//!
//! ## Purpose
//!
//! This module is the user-facing entry point of fastStatkit: dispatch
//! configuration, plus re-exports of the statkit builders so a caller needs a
//! single import.
//!
//! ## Design notes
//!
//! * **Defaults**: One worker per rayon thread and a 60 second budget.
//! * **Validated**: [`DispatchConfig::validate`] runs when the dispatcher is
//!   created.
//!
//! ### Configuration Flow
//!
//! 1. Create a config with `DispatchConfig::new()` and chain setters.
//! 2. Start a pool with `Dispatcher::new(config)`.
//! 3. `submit` requests and `wait` on their handles, or `run_all` a batch.

// Publicly re-exported types
pub use crate::engine::config::{DispatchConfig, DEFAULT_BUDGET, DEFAULT_THREAD_NAME};
pub use crate::engine::dispatcher::{run_isolated, Dispatcher};
pub use crate::engine::job::{JobHandle, JobId, JobOutcome};
pub use crate::errors::DispatchError;
pub use crate::input::{numeric_variable, SampleInput};
pub use statkit::{
    AnalysisError, AnalysisKind, AnalysisOutput, AnalysisRequest, ArimaBuilder, ChiSquareBuilder,
    DecompositionBuilder, DecompositionMethod, ErrorKind, RegressionBuilder, ResultTable, Sample,
    SmoothingBuilder, SmoothingMethod, TimeSpecification, TrendMethod, Variable, VariableMeta,
};
