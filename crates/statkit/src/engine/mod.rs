//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer defines the request/response contract of the engine and runs
//! analysis passes: typed requests, result tables, outputs, validation and
//! the executor that wraps every pass.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 6: Analyses
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Execution wrapper for analysis passes.
pub mod executor;

/// Validation utilities.
pub mod validator;

/// Analysis requests and options.
pub mod request;

/// Hierarchical result tables.
pub mod table;

/// Output types for analyses.
pub mod output;
