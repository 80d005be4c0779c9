//! Chi-square goodness-of-fit.
//!
//! ## Purpose
//!
//! This module tabulates observed category frequencies of one variable and
//! tests them against an expected distribution with Pearson's statistic
//! `Σ(obs − exp)² / exp`.
//!
//! ## Key concepts
//!
//! * **Categories**: Values are floored to integers. With a declared range only
//!   values inside `[lower, upper]` count, and every integer of the range is a
//!   category (zero counts included); otherwise the categories are the distinct
//!   observed values.
//! * **Expected**: Uniform across categories, or proportional to a supplied
//!   list normalised to the observed total.
//!
//! ## Invariants
//!
//! * Degrees of freedom are `categories − 1`.
//! * The p-value lies in `[0, 1]`.

// External dependencies
use std::collections::BTreeMap;

// Internal dependencies
use crate::math::distributions::chi_square_p_value;
use crate::primitives::errors::AnalysisError;

// ============================================================================
// Configuration
// ============================================================================

/// Which categories enter the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedRange {
    /// The distinct observed values.
    #[default]
    FromData,

    /// Every integer in `[lower, upper]`.
    Range {
        /// Inclusive lower bound.
        lower: i64,
        /// Inclusive upper bound.
        upper: i64,
    },
}

/// Expected distribution over the categories.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ExpectedValues {
    /// Every category is equally likely.
    #[default]
    AllCategoriesEqual,

    /// Relative frequencies in ascending category order.
    Values(Vec<f64>),
}

// ============================================================================
// Result
// ============================================================================

/// One row of the frequency table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryFrequency {
    /// Category value.
    pub category: i64,

    /// Observed count.
    pub observed: f64,

    /// Expected count.
    pub expected: f64,
}

impl CategoryFrequency {
    /// `observed − expected`.
    pub fn residual(&self) -> f64 {
        self.observed - self.expected
    }
}

/// Outcome of a goodness-of-fit test on one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareTest {
    /// Frequency rows in ascending category order.
    pub categories: Vec<CategoryFrequency>,

    /// Number of counted cases.
    pub total: f64,

    /// Pearson chi-square statistic.
    pub statistic: f64,

    /// Degrees of freedom.
    pub df: usize,

    /// Asymptotic significance.
    pub p_value: f64,

    /// Categories whose expected count is below 5.
    pub sparse_cells: usize,
}

// ============================================================================
// Computation
// ============================================================================

/// Run the test on the numeric values of one variable.
pub fn goodness_of_fit(
    values: &[f64],
    range: ExpectedRange,
    expected: &ExpectedValues,
) -> Result<ChiSquareTest, AnalysisError> {
    let mut counts: BTreeMap<i64, f64> = BTreeMap::new();
    if let ExpectedRange::Range { lower, upper } = range {
        for c in lower..=upper {
            counts.insert(c, 0.0);
        }
    }

    for &v in values {
        if !v.is_finite() {
            continue;
        }
        let category = v.floor() as i64;
        match range {
            ExpectedRange::FromData => *counts.entry(category).or_insert(0.0) += 1.0,
            ExpectedRange::Range { lower, upper } => {
                if (lower..=upper).contains(&category) {
                    *counts.entry(category).or_insert(0.0) += 1.0;
                }
            }
        }
    }

    let total: f64 = counts.values().sum();
    if total <= 0.0 {
        return Err(AnalysisError::insufficient(
            "No cases fall inside the tested categories",
        ));
    }
    let k = counts.len();
    if k < 2 {
        return Err(AnalysisError::insufficient(
            "The chi-square test needs at least two categories",
        ));
    }

    let shares: Vec<f64> = match expected {
        ExpectedValues::AllCategoriesEqual => vec![1.0 / k as f64; k],
        ExpectedValues::Values(list) => {
            if list.len() != k {
                return Err(AnalysisError::invalid(format!(
                    "{} expected values were given for {} categories",
                    list.len(),
                    k
                )));
            }
            if list.iter().any(|&v| v.is_nan() || v <= 0.0) {
                return Err(AnalysisError::invalid("Expected values must be positive"));
            }
            let sum: f64 = list.iter().sum();
            list.iter().map(|v| v / sum).collect()
        }
    };

    let categories: Vec<CategoryFrequency> = counts
        .iter()
        .zip(&shares)
        .map(|((&category, &observed), &share)| CategoryFrequency {
            category,
            observed,
            expected: share * total,
        })
        .collect();

    let statistic = categories
        .iter()
        .map(|c| c.residual() * c.residual() / c.expected)
        .sum::<f64>();
    let df = k - 1;
    let p_value = chi_square_p_value(statistic, df as f64)?;
    let sparse_cells = categories.iter().filter(|c| c.expected < 5.0).count();

    Ok(ChiSquareTest {
        categories,
        total,
        statistic,
        df,
        p_value,
        sparse_cells,
    })
}
