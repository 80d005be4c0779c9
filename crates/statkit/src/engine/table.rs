//! Hierarchical result tables.
//!
//! ## Purpose
//!
//! This module defines [`ResultTable`], the single output format of every
//! analysis: a title, a tree of column headers and a tree of rows whose leaves
//! carry named cells.
//!
//! ## Design notes
//!
//! * **Recursive**: Columns and rows are explicit tagged trees ([`ColumnNode`],
//!   [`RowNode`]) so grouped headers ("Confidence Interval" → Lower, Upper) and
//!   nested row categories are first-class.
//! * **Validated**: [`ResultTable::new`] enforces the structural invariants
//!   once, at construction.
//! * **Wire shape**: Serialises to `{ title, columnHeaders, rows }` with leaf
//!   row cells flattened into the row object and non-finite numbers as `null`.
//!
//! ## Invariants
//!
//! * Leaf column keys are unique.
//! * Every cell key of a leaf row is a leaf column key.
//! * Group nodes (columns or rows) have at least one child; leaf rows have
//!   no children.
//!
//! ## Non-goals
//!
//! * This module does not format numbers for display; precision is the
//!   renderer's concern.

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashSet;

// Internal dependencies
use crate::primitives::errors::AnalysisError;

// ============================================================================
// Cell
// ============================================================================

/// One value of a result table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A real number.
    Number(f64),

    /// A count or other integral value.
    Integer(i64),

    /// Free text.
    Text(String),

    /// An undefined or intentionally blank value.
    Empty,
}

impl Cell {
    /// A number, or `Empty` when `v` is not finite.
    pub fn number(v: f64) -> Self {
        if v.is_finite() {
            Self::Number(v)
        } else {
            Self::Empty
        }
    }

    /// Numeric content, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Textual content, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the cell is blank.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Empty, Self::number)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<usize> for Cell {
    fn from(v: usize) -> Self {
        Self::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Number(_) | Self::Empty => serializer.serialize_none(),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Number(v) => write!(f, "{:.3}", v),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(s) => write!(f, "{}", s),
            Self::Empty => Ok(()),
        }
    }
}

// ============================================================================
// Column Headers
// ============================================================================

/// A node of the column-header tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnNode {
    /// A column holding cells under `key`.
    Leaf {
        /// Display header.
        header: String,
        /// Cell key referenced by rows.
        key: String,
    },

    /// A header spanning its children.
    Group {
        /// Display header.
        header: String,
        /// Nested columns.
        children: Vec<ColumnNode>,
    },
}

impl ColumnNode {
    /// Leaf column.
    pub fn leaf(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Leaf {
            header: header.into(),
            key: key.into(),
        }
    }

    /// Grouping column.
    pub fn group(header: impl Into<String>, children: Vec<ColumnNode>) -> Self {
        Self::Group {
            header: header.into(),
            children,
        }
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Self::Leaf { header, key } => out.push((header, key)),
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

/// A node of the row tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RowNode {
    /// A row of cells, in insertion order.
    Leaf {
        /// Header path; `None` entries render blank.
        row_header: Vec<Option<String>>,
        /// Named cells.
        cells: Vec<(String, Cell)>,
    },

    /// A row category spanning its children.
    Group {
        /// Header path of the category.
        row_header: Vec<Option<String>>,
        /// Nested rows.
        children: Vec<RowNode>,
    },
}

impl RowNode {
    /// Leaf row with the given header path.
    pub fn leaf(row_header: Vec<Option<String>>) -> Self {
        Self::Leaf {
            row_header,
            cells: Vec::new(),
        }
    }

    /// Leaf row headed by a single label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self::leaf(vec![Some(label.into())])
    }

    /// Group row headed by a single label.
    pub fn group(label: impl Into<String>, children: Vec<RowNode>) -> Self {
        Self::Group {
            row_header: vec![Some(label.into())],
            children,
        }
    }

    /// Add a cell. Has no effect on a group row.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Cell>) -> Self {
        if let Self::Leaf { cells, .. } = &mut self {
            cells.push((key.into(), value.into()));
        }
        self
    }

    /// Header path of this row.
    pub fn row_header(&self) -> &[Option<String>] {
        match self {
            Self::Leaf { row_header, .. } | Self::Group { row_header, .. } => row_header,
        }
    }

    /// Cell stored under `key` (leaf rows only).
    pub fn cell(&self, key: &str) -> Option<&Cell> {
        match self {
            Self::Leaf { cells, .. } => cells.iter().find(|(k, _)| k == key).map(|(_, c)| c),
            Self::Group { .. } => None,
        }
    }

    /// Whether any header entry equals `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.row_header()
            .iter()
            .any(|h| h.as_deref() == Some(label))
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a RowNode>) {
        match self {
            Self::Leaf { .. } => out.push(self),
            Self::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl Serialize for RowNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Leaf { row_header, cells } => {
                let mut map = serializer.serialize_map(Some(cells.len() + 1))?;
                map.serialize_entry("rowHeader", row_header)?;
                for (key, cell) in cells {
                    map.serialize_entry(key, cell)?;
                }
                map.end()
            }
            Self::Group {
                row_header,
                children,
            } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("rowHeader", row_header)?;
                map.serialize_entry("children", children)?;
                map.end()
            }
        }
    }
}

// ============================================================================
// Result Table
// ============================================================================

/// A titled table of grouped columns and nested rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultTable {
    /// Table title.
    pub title: String,

    /// Column-header forest.
    pub column_headers: Vec<ColumnNode>,

    /// Row forest.
    pub rows: Vec<RowNode>,

    /// Notes shown under the table.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<String>,
}

impl ResultTable {
    /// Build and validate a table.
    pub fn new(
        title: impl Into<String>,
        column_headers: Vec<ColumnNode>,
        rows: Vec<RowNode>,
    ) -> Result<Self, AnalysisError> {
        let table = Self {
            title: title.into(),
            column_headers,
            rows,
            footnotes: Vec::new(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Append a footnote.
    pub fn with_footnote(mut self, note: impl Into<String>) -> Self {
        self.footnotes.push(note.into());
        self
    }

    /// Leaf column keys in display order.
    pub fn leaf_keys(&self) -> Vec<&str> {
        self.leaf_columns().into_iter().map(|(_, k)| k).collect()
    }

    /// Leaf rows in display order.
    pub fn leaf_rows(&self) -> Vec<&RowNode> {
        let mut out = Vec::new();
        for row in &self.rows {
            row.collect_leaves(&mut out);
        }
        out
    }

    /// First leaf row carrying `label` in its header path.
    pub fn find_row(&self, label: &str) -> Option<&RowNode> {
        self.leaf_rows().into_iter().find(|r| r.has_label(label))
    }

    /// Cell at (`row_label`, `key`).
    pub fn cell(&self, row_label: &str, key: &str) -> Option<&Cell> {
        self.find_row(row_label).and_then(|r| r.cell(key))
    }

    fn leaf_columns(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for column in &self.column_headers {
            column.collect_leaves(&mut out);
        }
        out
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        fn check_columns(nodes: &[ColumnNode], title: &str) -> Result<(), AnalysisError> {
            for node in nodes {
                if let ColumnNode::Group { header, children } = node {
                    if children.is_empty() {
                        return Err(AnalysisError::internal(format!(
                            "Table '{}': column group '{}' has no children",
                            title, header
                        )));
                    }
                    check_columns(children, title)?;
                }
            }
            Ok(())
        }

        fn check_rows(
            nodes: &[RowNode],
            keys: &HashSet<&str>,
            title: &str,
        ) -> Result<(), AnalysisError> {
            for node in nodes {
                match node {
                    RowNode::Group { children, .. } => {
                        if children.is_empty() {
                            return Err(AnalysisError::internal(format!(
                                "Table '{}': a row group has no children",
                                title
                            )));
                        }
                        check_rows(children, keys, title)?;
                    }
                    RowNode::Leaf { cells, .. } => {
                        let mut seen = HashSet::new();
                        for (key, _) in cells {
                            if !keys.contains(key.as_str()) {
                                return Err(AnalysisError::internal(format!(
                                    "Table '{}': cell key '{}' has no column",
                                    title, key
                                )));
                            }
                            if !seen.insert(key.as_str()) {
                                return Err(AnalysisError::internal(format!(
                                    "Table '{}': cell key '{}' appears twice in a row",
                                    title, key
                                )));
                            }
                        }
                    }
                }
            }
            Ok(())
        }

        check_columns(&self.column_headers, &self.title)?;

        let mut keys = HashSet::new();
        for key in self.leaf_keys() {
            if !keys.insert(key) {
                return Err(AnalysisError::internal(format!(
                    "Table '{}': column key '{}' is not unique",
                    self.title, key
                )));
            }
        }

        check_rows(&self.rows, &keys, &self.title)
    }
}

impl Display for ResultTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let columns = self.leaf_columns();
        writeln!(f, "{}", self.title)?;

        write!(f, "{:<28}", "")?;
        for (header, _) in &columns {
            write!(f, " {:>14}", header)?;
        }
        writeln!(f)?;
        writeln!(f, "  {}", "-".repeat(28 + 15 * columns.len()))?;

        for row in self.leaf_rows() {
            let label: Vec<&str> = row
                .row_header()
                .iter()
                .map(|h| h.as_deref().unwrap_or(""))
                .collect();
            write!(f, "{:<28}", label.join(" / "))?;
            for (_, key) in &columns {
                let text = row.cell(key).map(|c| c.to_string()).unwrap_or_default();
                write!(f, " {:>14}", text)?;
            }
            writeln!(f)?;
        }

        for note in &self.footnotes {
            writeln!(f, "{}", note)?;
        }
        Ok(())
    }
}
