//! Observation samples and per-variable metadata.
//!
//! ## Purpose
//!
//! This module defines how the caller hands data to the engines: one
//! [`Variable`] per column, holding its metadata and an immutable [`Sample`]
//! of observations that may be numeric, textual, or missing.
//!
//! ## Design notes
//!
//! * **Immutable**: A `Sample` is never modified once constructed; filtering
//!   returns new vectors.
//! * **Lenient**: Non-numeric and missing entries are kept as-is and filtered
//!   by the engines, per variable or listwise.
//!
//! ## Non-goals
//!
//! * This module does not parse files or spreadsheet cells.
//! * This module does not impute missing values.

// External dependencies
use serde::Serialize;

// ============================================================================
// Observation
// ============================================================================

/// A single cell of a variable column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Observation {
    /// A numeric value. Non-finite values are treated as missing.
    Number(f64),

    /// A textual value.
    Text(String),

    /// A declared missing marker (or an empty cell).
    Missing,
}

impl Observation {
    /// The numeric value, if this observation is a finite number.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// Whether this observation is missing (declared, empty text, or non-finite).
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(v) => !v.is_finite(),
            Self::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<f64> for Observation {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Option<f64>> for Observation {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Missing, Self::Number)
    }
}

impl From<&str> for Observation {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ============================================================================
// Sample
// ============================================================================

/// An ordered, immutable sequence of observations for one variable.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Sample {
    observations: Vec<Observation>,
}

impl Sample {
    /// Create a sample from observations.
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    /// Create a fully numeric sample.
    pub fn from_values(values: &[f64]) -> Self {
        Self::new(values.iter().map(|&v| Observation::Number(v)).collect())
    }

    /// Number of observations, missing ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the sample holds no observations at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// All observations in order.
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Numeric value at `idx`, if present and finite.
    #[inline]
    pub fn value(&self, idx: usize) -> Option<f64> {
        self.observations.get(idx).and_then(Observation::as_f64)
    }

    /// Finite numeric values, with every other entry filtered out.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.observations.iter().filter_map(Observation::as_f64).collect()
    }

    /// Observations with trailing missing entries removed.
    pub fn trim_trailing_missing(&self) -> &[Observation] {
        let end = self
            .observations
            .iter()
            .rposition(|o| !o.is_missing())
            .map_or(0, |i| i + 1);
        &self.observations[..end]
    }
}

impl From<Vec<f64>> for Sample {
    fn from(values: Vec<f64>) -> Self {
        Self::from_values(&values)
    }
}

impl From<Vec<Observation>> for Sample {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

// ============================================================================
// Variable Metadata
// ============================================================================

/// Measurement level declared for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Measure {
    /// Interval or ratio data.
    #[default]
    Scale,

    /// Ordered categories.
    Ordinal,

    /// Unordered categories.
    Nominal,

    /// Free text; never numeric.
    String,
}

/// Per-variable metadata supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableMeta {
    /// Column name.
    pub name: String,

    /// Optional descriptive label.
    pub label: Option<String>,

    /// Decimal places used when the variable is displayed.
    pub decimals: usize,

    /// Declared measurement level.
    pub measure: Measure,
}

impl VariableMeta {
    /// Metadata for a numeric scale variable with two decimals.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            decimals: 2,
            measure: Measure::Scale,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the decimal places.
    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the measurement level.
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = measure;
        self
    }

    /// Whether the variable may carry numeric data.
    pub fn is_numeric(&self) -> bool {
        self.measure != Measure::String
    }

    /// Label when present and non-empty, otherwise the name.
    pub fn display_name(&self) -> &str {
        match &self.label {
            Some(label) if !label.trim().is_empty() => label,
            _ => &self.name,
        }
    }
}

// ============================================================================
// Variable
// ============================================================================

/// One analysis variable: metadata plus observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    /// Variable metadata.
    pub meta: VariableMeta,

    /// Observations, in case order.
    pub values: Sample,
}

impl Variable {
    /// Create a variable from metadata and observations.
    pub fn new(meta: VariableMeta, values: impl Into<Sample>) -> Self {
        Self {
            meta,
            values: values.into(),
        }
    }

    /// Create a numeric scale variable from plain values.
    pub fn numeric(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(VariableMeta::new(name), Sample::from_values(values))
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }
}
