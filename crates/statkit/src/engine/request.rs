//! Analysis requests.
//!
//! ## Purpose
//!
//! This module defines [`AnalysisRequest`], the tagged union a caller hands to
//! the engine, together with the per-analysis option records. Requests are
//! built once (usually through the builders in `api`) and never mutated.
//!
//! ## Key concepts
//!
//! * **Variables**: Every request carries its samples as [`Variable`]s, so
//!   labels and decimal precision travel with the data.
//! * **Options**: Each analysis kind owns one options struct with concrete,
//!   already-resolved values.
//!
//! ## Non-goals
//!
//! * This module does not validate options; builders call the `Validator`.

// External dependencies
use core::fmt::{Display, Formatter, Result};
use serde::Serialize;

// Internal dependencies
use crate::algorithms::arima::ArimaOrder;
use crate::algorithms::chisquare::{ExpectedRange, ExpectedValues};
use crate::algorithms::decomposition::{DecompositionMethod, TrendMethod};
use crate::algorithms::smoothing::{SmoothingMethod, SmoothingParameters};
use crate::primitives::sample::Variable;
use crate::primitives::time::TimeSpecification;

// ============================================================================
// Kind
// ============================================================================

/// Discriminant of [`AnalysisRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisKind {
    /// Linear regression with diagnostics.
    Regression,
    /// Classical seasonal decomposition.
    Decomposition,
    /// Exponential smoothing.
    Smoothing,
    /// ARIMA fit.
    Arima,
    /// Chi-square goodness-of-fit.
    ChiSquare,
}

impl Display for AnalysisKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            Self::Regression => "Linear Regression",
            Self::Decomposition => "Seasonal Decomposition",
            Self::Smoothing => "Exponential Smoothing",
            Self::Arima => "ARIMA",
            Self::ChiSquare => "Chi-Square Test",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// Request
// ============================================================================

/// A complete, immutable analysis request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    /// Linear regression diagnostics.
    Regression(RegressionRequest),
    /// Classical decomposition.
    Decomposition(DecompositionRequest),
    /// Exponential smoothing.
    Smoothing(SmoothingRequest),
    /// ARIMA fitting.
    Arima(ArimaRequest),
    /// Chi-square goodness-of-fit.
    ChiSquare(ChiSquareRequest),
}

impl AnalysisRequest {
    /// Which analysis this request addresses.
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Regression(_) => AnalysisKind::Regression,
            Self::Decomposition(_) => AnalysisKind::Decomposition,
            Self::Smoothing(_) => AnalysisKind::Smoothing,
            Self::Arima(_) => AnalysisKind::Arima,
            Self::ChiSquare(_) => AnalysisKind::ChiSquare,
        }
    }

    /// Number of rows in the longest variable.
    pub fn rows(&self) -> usize {
        let longest = |vars: &[Variable]| vars.iter().map(|v| v.values.len()).max().unwrap_or(0);
        match self {
            Self::Regression(r) => r.dependent.values.len().max(longest(&r.independents)),
            Self::Decomposition(r) => longest(&r.variables),
            Self::Smoothing(r) => longest(&r.variables),
            Self::Arima(r) => longest(&r.variables),
            Self::ChiSquare(r) => longest(&r.variables),
        }
    }
}

// ============================================================================
// Regression
// ============================================================================

/// Derived series a regression may return for persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SavedSeries {
    /// Unstandardized predicted values.
    pub predicted: bool,
    /// Unstandardized residuals.
    pub unstandardized: bool,
    /// Standardized residuals.
    pub standardized: bool,
    /// Studentized residuals.
    pub studentized: bool,
    /// Deleted residuals.
    pub deleted: bool,
    /// Studentized deleted residuals.
    pub studentized_deleted: bool,
    /// Centered leverage (hat) values.
    pub leverage: bool,
}

impl SavedSeries {
    /// Whether any residual type is requested.
    pub fn any_residual(&self) -> bool {
        self.unstandardized
            || self.standardized
            || self.studentized
            || self.deleted
            || self.studentized_deleted
    }
}

/// Options of a regression request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionOptions {
    /// Coverage of the coefficient confidence intervals.
    pub confidence_level: f64,
    /// Emit the Descriptive Statistics table.
    pub descriptives: bool,
    /// Emit zero-order, partial and part correlations.
    pub part_and_partial: bool,
    /// Emit tolerance/VIF and the Collinearity Diagnostics table.
    pub collinearity: bool,
    /// Emit the Coefficient Correlations table.
    pub covariance_matrix: bool,
    /// Emit the Residuals Statistics table.
    pub residual_statistics: bool,
    /// Series returned for persistence.
    pub save: SavedSeries,
}

impl Default for RegressionOptions {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            descriptives: false,
            part_and_partial: false,
            collinearity: false,
            covariance_matrix: false,
            residual_statistics: false,
            save: SavedSeries::default(),
        }
    }
}

/// Regression of one dependent variable on one or more predictors.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionRequest {
    /// Dependent variable.
    pub dependent: Variable,
    /// Predictors, in model order.
    pub independents: Vec<Variable>,
    /// Optional case weights.
    pub weights: Option<Variable>,
    /// Options.
    pub options: RegressionOptions,
}

// ============================================================================
// Time Series
// ============================================================================

/// Options of a decomposition request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DecompositionOptions {
    /// Additive or multiplicative.
    pub method: DecompositionMethod,
    /// Trend model (multiplicative only; additive reports `None`).
    pub trend: TrendMethod,
    /// Number of periods to forecast past the data.
    pub forecast_horizon: usize,
    /// Emit the evaluation block.
    pub evaluate: bool,
    /// Return the fitted-plus-forecast series for persistence.
    pub save_forecast: bool,
}

/// Seasonal decomposition of one or more series.
#[derive(Debug, Clone, PartialEq)]
pub struct DecompositionRequest {
    /// Series to decompose.
    pub variables: Vec<Variable>,
    /// Dating of the rows.
    pub time: TimeSpecification,
    /// Options.
    pub options: DecompositionOptions,
}

/// Options of a smoothing request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingOptions {
    /// Model.
    pub method: SmoothingMethod,
    /// Resolved weights.
    pub parameters: SmoothingParameters,
    /// Number of periods to forecast.
    pub forecast_horizon: usize,
    /// Return the fitted-plus-forecast series for persistence.
    pub save_forecast: bool,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        let method = SmoothingMethod::default();
        Self {
            method,
            parameters: method.defaults(),
            forecast_horizon: 0,
            save_forecast: false,
        }
    }
}

/// Exponential smoothing of one or more series.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingRequest {
    /// Series to smooth.
    pub variables: Vec<Variable>,
    /// Dating of the rows.
    pub time: TimeSpecification,
    /// Options.
    pub options: SmoothingOptions,
}

/// Options of an ARIMA request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArimaOptions {
    /// (p, d, q).
    pub order: ArimaOrder,
    /// Estimate a constant term.
    pub constant: bool,
    /// Coverage of the forecast intervals.
    pub confidence_level: f64,
    /// Number of periods to forecast.
    pub forecast_horizon: usize,
    /// Return the fitted-plus-forecast series for persistence.
    pub save_forecast: bool,
}

impl Default for ArimaOptions {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            constant: true,
            confidence_level: 0.95,
            forecast_horizon: 0,
            save_forecast: false,
        }
    }
}

/// ARIMA fit of one or more series.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaRequest {
    /// Series to model.
    pub variables: Vec<Variable>,
    /// Options.
    pub options: ArimaOptions,
}

// ============================================================================
// Chi-square
// ============================================================================

/// Options of a chi-square request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChiSquareOptions {
    /// Category range.
    pub range: ExpectedRange,
    /// Expected distribution.
    pub expected: ExpectedValues,
    /// Emit the Descriptive Statistics table.
    pub descriptives: bool,
}

/// Goodness-of-fit test of one or more variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareRequest {
    /// Test variables.
    pub variables: Vec<Variable>,
    /// Options.
    pub options: ChiSquareOptions,
}
