//! Output types for statkit analyses.
//!
//! ## Purpose
//!
//! This module defines [`AnalysisOutput`], the successful result of one
//! request: the result tables in display order plus any derived series the
//! caller may persist as new variables.
//!
//! ## Invariants
//!
//! * A derived series has one value per input row; `None` marks rows that did
//!   not enter the computation. Forecast series extend past the last row by
//!   the forecast horizon.
//!
//! ## Non-goals
//!
//! * This module does not write series back to a dataset.

// External dependencies
use core::fmt::{Display, Formatter, Result};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

// Internal dependencies
use crate::engine::request::AnalysisKind;
use crate::engine::table::ResultTable;

// ============================================================================
// Derived Series
// ============================================================================

/// A numeric column produced by an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries {
    /// Suggested variable name, e.g. `"RES_1"`.
    pub name: String,

    /// Descriptive label.
    pub label: String,

    /// Values aligned with the input rows (forecasts may run past them).
    #[serde(serialize_with = "finite_or_null")]
    pub values: Vec<Option<f64>>,
}

impl DerivedSeries {
    /// Create a series.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            values,
        }
    }

    /// Scatter `values` into `rows` slots at the given row indices. Non-finite
    /// values stay empty.
    pub fn scattered(
        name: impl Into<String>,
        label: impl Into<String>,
        rows: usize,
        indices: &[usize],
        values: &[f64],
    ) -> Self {
        let mut slots = vec![None; rows];
        for (&i, &v) in indices.iter().zip(values) {
            if i < rows {
                slots[i] = v.is_finite().then_some(v);
            }
        }
        Self::new(name, label, slots)
    }
}

fn finite_or_null<S: Serializer>(
    values: &[Option<f64>],
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for v in values {
        seq.serialize_element(&v.filter(|x| x.is_finite()))?;
    }
    seq.end()
}

// ============================================================================
// Output
// ============================================================================

/// Successful result of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutput {
    /// Analysis that produced the output.
    pub kind: AnalysisKind,

    /// Result tables in display order.
    pub tables: Vec<ResultTable>,

    /// Series offered for persistence.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<DerivedSeries>,
}

impl AnalysisOutput {
    /// Create an output with no derived series.
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            tables: Vec::new(),
            derived: Vec::new(),
        }
    }

    /// First table with the given title.
    pub fn table(&self, title: &str) -> Option<&ResultTable> {
        self.tables.iter().find(|t| t.title == title)
    }

    /// Derived series with the given name.
    pub fn series(&self, name: &str) -> Option<&DerivedSeries> {
        self.derived.iter().find(|s| s.name == name)
    }
}

impl Display for AnalysisOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "{}", self.kind)?;
        for table in &self.tables {
            writeln!(f)?;
            write!(f, "{}", table)?;
        }
        if !self.derived.is_empty() {
            writeln!(f)?;
            writeln!(f, "Saved series:")?;
            for s in &self.derived {
                writeln!(f, "  {} ({})", s.name, s.label)?;
            }
        }
        Ok(())
    }
}
