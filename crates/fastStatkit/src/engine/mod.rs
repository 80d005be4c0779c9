//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer runs statkit requests off the caller's thread: a dedicated
//! worker pool, one-shot job handles with a wall-clock budget, and ordered
//! parallel batches.
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! statkit (Layers 1-6)
//! ```

/// Worker pool and job submission.
pub mod dispatcher;

/// Job identifiers, handles and outcomes.
pub mod job;

/// Worker count and budget settings.
pub mod config;
