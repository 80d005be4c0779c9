//! Input abstractions for statkit variables.
//!
//! ## Purpose
//!
//! This module lets callers build a statkit [`Sample`] from the numeric
//! containers they already hold: slices, vectors and 1-D `ndarray` arrays.
//!
//! ## Design notes
//!
//! * **Zero-copy access**: `as_sample_slice` borrows the underlying buffer.
//! * **Fail-fast validation**: Non-contiguous arrays are rejected rather than
//!   silently copied.
//!
//! ## Invariants
//!
//! * Non-finite values become missing observations.
//!
//! ## Non-goals
//!
//! * This module does not handle textual data (build a `Sample` directly).
//! * This module does not reshape multi-dimensional arrays.

// External dependencies
use ndarray::{ArrayBase, Data, Ix1};

// Export dependencies from statkit crate
use statkit::{AnalysisError, Sample, Variable, VariableMeta};

/// Types that can be turned into a statkit sample.
pub trait SampleInput {
    /// Borrow the values as a contiguous slice.
    fn as_sample_slice(&self) -> Result<&[f64], AnalysisError>;

    /// Copy the values into a [`Sample`].
    fn to_sample(&self) -> Result<Sample, AnalysisError> {
        self.as_sample_slice().map(Sample::from_values)
    }
}

impl SampleInput for [f64] {
    fn as_sample_slice(&self) -> Result<&[f64], AnalysisError> {
        Ok(self)
    }
}

impl SampleInput for Vec<f64> {
    fn as_sample_slice(&self) -> Result<&[f64], AnalysisError> {
        Ok(self.as_slice())
    }
}

impl<S> SampleInput for ArrayBase<S, Ix1>
where
    S: Data<Elem = f64>,
{
    fn as_sample_slice(&self) -> Result<&[f64], AnalysisError> {
        self.as_slice().ok_or_else(|| {
            AnalysisError::invalid("ndarray input must be contiguous in memory")
        })
    }
}

/// Build a numeric scale variable named `name` from any supported input.
pub fn numeric_variable<I>(name: &str, input: &I) -> Result<Variable, AnalysisError>
where
    I: SampleInput + ?Sized,
{
    Ok(Variable::new(VariableMeta::new(name), input.to_sample()?))
}
