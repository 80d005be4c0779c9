//! High-level API for statkit analyses.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry points: one fluent builder per
//! analysis kind, each producing an immutable [`AnalysisRequest`] that is run
//! with [`AnalysisRequest::run`] (or handed to a dispatcher).
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builders with defaults for every option.
//! * **Validated**: Options are checked when `.build()` is called; data checks
//!   run when the request is executed.
//! * **Strict**: Setting the same option twice is reported by `.build()`.
//!
//! ### Configuration Flow
//!
//! 1. Create a builder, e.g. `Regression::new()`.
//! 2. Add variables and chain options (`.confidence_level()`, `.forecast()`...).
//! 3. Call `.build()` to obtain an [`AnalysisRequest`].

// Internal dependencies
use crate::engine::request::{
    ArimaOptions, ArimaRequest, ChiSquareOptions, ChiSquareRequest, DecompositionOptions,
    DecompositionRequest, RegressionOptions, RegressionRequest, SmoothingOptions,
    SmoothingRequest,
};
use crate::engine::validator::Validator;

// Publicly re-exported types
pub use crate::algorithms::arima::ArimaOrder;
pub use crate::algorithms::chisquare::{ExpectedRange, ExpectedValues};
pub use crate::algorithms::decomposition::{DecompositionMethod, TrendMethod};
pub use crate::algorithms::smoothing::{SmoothingMethod, SmoothingParameters};
pub use crate::engine::output::{AnalysisOutput, DerivedSeries};
pub use crate::engine::request::{AnalysisKind, AnalysisRequest, SavedSeries};
pub use crate::engine::table::{Cell, ColumnNode, ResultTable, RowNode};
pub use crate::primitives::errors::{AnalysisError, ErrorKind};
pub use crate::primitives::sample::{Measure, Observation, Sample, Variable, VariableMeta};
pub use crate::primitives::time::TimeSpecification;

// ============================================================================
// Regression
// ============================================================================

/// Builder for a regression request.
#[derive(Debug, Clone, Default)]
pub struct RegressionBuilder {
    /// Dependent variable.
    pub dependent: Option<Variable>,

    /// Predictors in model order.
    pub independents: Vec<Variable>,

    /// Optional case weights.
    pub weights: Option<Variable>,

    /// Coverage of coefficient intervals (default 0.95).
    pub confidence_level: Option<f64>,

    /// Statistic and table switches.
    pub options: RegressionOptions,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl RegressionBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dependent variable.
    pub fn dependent(mut self, variable: Variable) -> Self {
        if self.dependent.is_some() {
            self.duplicate_param = Some("dependent");
        }
        self.dependent = Some(variable);
        self
    }

    /// Append one predictor.
    pub fn independent(mut self, variable: Variable) -> Self {
        self.independents.push(variable);
        self
    }

    /// Append several predictors.
    pub fn independents(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.independents.extend(variables);
        self
    }

    /// Set the case-weight variable.
    pub fn weights(mut self, variable: Variable) -> Self {
        if self.weights.is_some() {
            self.duplicate_param = Some("weights");
        }
        self.weights = Some(variable);
        self
    }

    /// Set the confidence level of coefficient intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        if self.confidence_level.is_some() {
            self.duplicate_param = Some("confidence_level");
        }
        self.confidence_level = Some(level);
        self
    }

    /// Emit the Descriptive Statistics table.
    pub fn descriptives(mut self) -> Self {
        self.options.descriptives = true;
        self
    }

    /// Emit zero-order, partial and part correlations.
    pub fn part_and_partial(mut self) -> Self {
        self.options.part_and_partial = true;
        self
    }

    /// Emit tolerance, VIF and the Collinearity Diagnostics table.
    pub fn collinearity(mut self) -> Self {
        self.options.collinearity = true;
        self
    }

    /// Emit the Coefficient Correlations table.
    pub fn covariance_matrix(mut self) -> Self {
        self.options.covariance_matrix = true;
        self
    }

    /// Emit the Residuals Statistics table.
    pub fn residual_statistics(mut self) -> Self {
        self.options.residual_statistics = true;
        self
    }

    /// Return predicted values as a derived series.
    pub fn save_predicted(mut self) -> Self {
        self.options.save.predicted = true;
        self
    }

    /// Return all five residual types as derived series.
    pub fn save_residuals(mut self) -> Self {
        let save = &mut self.options.save;
        save.unstandardized = true;
        save.standardized = true;
        save.studentized = true;
        save.deleted = true;
        save.studentized_deleted = true;
        self
    }

    /// Select the derived series individually.
    pub fn save(mut self, save: SavedSeries) -> Self {
        self.options.save = save;
        self
    }

    /// Return leverage values as a derived series.
    pub fn save_leverage(mut self) -> Self {
        self.options.save.leverage = true;
        self
    }

    /// Validate the options and build the request.
    pub fn build(self) -> Result<AnalysisRequest, AnalysisError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let dependent = self
            .dependent
            .ok_or_else(|| AnalysisError::insufficient("A dependent variable must be selected"))?;
        Validator::validate_selected(&self.independents, "independent variable")?;

        let mut options = self.options;
        options.confidence_level = self.confidence_level.unwrap_or(options.confidence_level);
        Validator::validate_confidence_level(options.confidence_level)?;

        Ok(AnalysisRequest::Regression(RegressionRequest {
            dependent,
            independents: self.independents,
            weights: self.weights,
            options,
        }))
    }
}

// ============================================================================
// Decomposition
// ============================================================================

/// Builder for a seasonal decomposition request.
#[derive(Debug, Clone, Default)]
pub struct DecompositionBuilder {
    /// Series to decompose.
    pub variables: Vec<Variable>,

    /// Dating of the rows.
    pub time: Option<TimeSpecification>,

    /// Additive or multiplicative.
    pub method: Option<DecompositionMethod>,

    /// Trend model.
    pub trend: Option<TrendMethod>,

    /// Forecast horizon.
    pub forecast_horizon: Option<usize>,

    /// Emit the evaluation block.
    pub evaluate: bool,

    /// Return the fitted-plus-forecast series.
    pub save_forecast: bool,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl DecompositionBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one series.
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Append several series.
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Set the time specification.
    pub fn time(mut self, time: TimeSpecification) -> Self {
        if self.time.is_some() {
            self.duplicate_param = Some("time");
        }
        self.time = Some(time);
        self
    }

    /// Set the decomposition method.
    pub fn method(mut self, method: DecompositionMethod) -> Self {
        if self.method.is_some() {
            self.duplicate_param = Some("method");
        }
        self.method = Some(method);
        self
    }

    /// Set the trend method (multiplicative models).
    pub fn trend(mut self, trend: TrendMethod) -> Self {
        if self.trend.is_some() {
            self.duplicate_param = Some("trend");
        }
        self.trend = Some(trend);
        self
    }

    /// Forecast `horizon` periods past the data.
    pub fn forecast(mut self, horizon: usize) -> Self {
        if self.forecast_horizon.is_some() {
            self.duplicate_param = Some("forecast");
        }
        self.forecast_horizon = Some(horizon);
        self
    }

    /// Emit the evaluation block.
    pub fn evaluate(mut self) -> Self {
        self.evaluate = true;
        self
    }

    /// Return the fitted-plus-forecast series.
    pub fn save_forecast(mut self) -> Self {
        self.save_forecast = true;
        self
    }

    /// Validate the options and build the request.
    pub fn build(self) -> Result<AnalysisRequest, AnalysisError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let method = self.method.unwrap_or_default();
        let forecast_horizon = self.forecast_horizon.unwrap_or(0);
        Validator::validate_forecast_horizon(forecast_horizon)?;

        Ok(AnalysisRequest::Decomposition(DecompositionRequest {
            variables: self.variables,
            time: self.time.unwrap_or_default(),
            options: DecompositionOptions {
                method,
                trend: self.trend.unwrap_or_else(|| method.default_trend()),
                forecast_horizon,
                evaluate: self.evaluate,
                save_forecast: self.save_forecast,
            },
        }))
    }
}

// ============================================================================
// Smoothing
// ============================================================================

/// Builder for an exponential smoothing request.
#[derive(Debug, Clone, Default)]
pub struct SmoothingBuilder {
    /// Series to smooth.
    pub variables: Vec<Variable>,

    /// Dating of the rows.
    pub time: Option<TimeSpecification>,

    /// Smoothing model.
    pub method: Option<SmoothingMethod>,

    /// Level weight.
    pub alpha: Option<f64>,

    /// Trend weight.
    pub gamma: Option<f64>,

    /// Seasonal weight.
    pub delta: Option<f64>,

    /// Forecast horizon.
    pub forecast_horizon: Option<usize>,

    /// Return the fitted-plus-forecast series.
    pub save_forecast: bool,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl SmoothingBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one series.
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Append several series.
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Set the time specification.
    pub fn time(mut self, time: TimeSpecification) -> Self {
        if self.time.is_some() {
            self.duplicate_param = Some("time");
        }
        self.time = Some(time);
        self
    }

    /// Set the smoothing model.
    pub fn method(mut self, method: SmoothingMethod) -> Self {
        if self.method.is_some() {
            self.duplicate_param = Some("method");
        }
        self.method = Some(method);
        self
    }

    /// Set the level weight.
    pub fn alpha(mut self, alpha: f64) -> Self {
        if self.alpha.is_some() {
            self.duplicate_param = Some("alpha");
        }
        self.alpha = Some(alpha);
        self
    }

    /// Set the trend weight.
    pub fn gamma(mut self, gamma: f64) -> Self {
        if self.gamma.is_some() {
            self.duplicate_param = Some("gamma");
        }
        self.gamma = Some(gamma);
        self
    }

    /// Set the seasonal weight.
    pub fn delta(mut self, delta: f64) -> Self {
        if self.delta.is_some() {
            self.duplicate_param = Some("delta");
        }
        self.delta = Some(delta);
        self
    }

    /// Forecast `horizon` periods past the data.
    pub fn forecast(mut self, horizon: usize) -> Self {
        if self.forecast_horizon.is_some() {
            self.duplicate_param = Some("forecast");
        }
        self.forecast_horizon = Some(horizon);
        self
    }

    /// Return the fitted-plus-forecast series.
    pub fn save_forecast(mut self) -> Self {
        self.save_forecast = true;
        self
    }

    /// Validate the options and build the request.
    pub fn build(self) -> Result<AnalysisRequest, AnalysisError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let method = self.method.unwrap_or_default();
        let defaults = method.defaults();
        let parameters = SmoothingParameters {
            alpha: self.alpha.unwrap_or(defaults.alpha),
            gamma: self.gamma.unwrap_or(defaults.gamma),
            delta: self.delta.unwrap_or(defaults.delta),
        };
        Validator::validate_smoothing_parameters(method, parameters)?;
        let forecast_horizon = self.forecast_horizon.unwrap_or(0);
        Validator::validate_forecast_horizon(forecast_horizon)?;

        Ok(AnalysisRequest::Smoothing(SmoothingRequest {
            variables: self.variables,
            time: self.time.unwrap_or_default(),
            options: SmoothingOptions {
                method,
                parameters,
                forecast_horizon,
                save_forecast: self.save_forecast,
            },
        }))
    }
}

// ============================================================================
// ARIMA
// ============================================================================

/// Builder for an ARIMA request.
#[derive(Debug, Clone, Default)]
pub struct ArimaBuilder {
    /// Series to model.
    pub variables: Vec<Variable>,

    /// (p, d, q).
    pub order: Option<ArimaOrder>,

    /// Estimate a constant term (default true).
    pub constant: Option<bool>,

    /// Coverage of forecast intervals (default 0.95).
    pub confidence_level: Option<f64>,

    /// Forecast horizon.
    pub forecast_horizon: Option<usize>,

    /// Return the fitted-plus-forecast series.
    pub save_forecast: bool,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl ArimaBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one series.
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Append several series.
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Set the AR, differencing and MA orders.
    pub fn order(mut self, p: usize, d: usize, q: usize) -> Self {
        if self.order.is_some() {
            self.duplicate_param = Some("order");
        }
        self.order = Some(ArimaOrder::new(p, d, q));
        self
    }

    /// Include or exclude the constant term.
    pub fn constant(mut self, include: bool) -> Self {
        if self.constant.is_some() {
            self.duplicate_param = Some("constant");
        }
        self.constant = Some(include);
        self
    }

    /// Set the confidence level of forecast intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        if self.confidence_level.is_some() {
            self.duplicate_param = Some("confidence_level");
        }
        self.confidence_level = Some(level);
        self
    }

    /// Forecast `horizon` periods past the data.
    pub fn forecast(mut self, horizon: usize) -> Self {
        if self.forecast_horizon.is_some() {
            self.duplicate_param = Some("forecast");
        }
        self.forecast_horizon = Some(horizon);
        self
    }

    /// Return the fitted-plus-forecast series.
    pub fn save_forecast(mut self) -> Self {
        self.save_forecast = true;
        self
    }

    /// Validate the options and build the request.
    pub fn build(self) -> Result<AnalysisRequest, AnalysisError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let defaults = ArimaOptions::default();
        let options = ArimaOptions {
            order: self.order.unwrap_or(defaults.order),
            constant: self.constant.unwrap_or(defaults.constant),
            confidence_level: self.confidence_level.unwrap_or(defaults.confidence_level),
            forecast_horizon: self.forecast_horizon.unwrap_or(0),
            save_forecast: self.save_forecast,
        };
        Validator::validate_arima_order(options.order)?;
        Validator::validate_confidence_level(options.confidence_level)?;
        Validator::validate_forecast_horizon(options.forecast_horizon)?;

        Ok(AnalysisRequest::Arima(ArimaRequest {
            variables: self.variables,
            options,
        }))
    }
}

// ============================================================================
// Chi-square
// ============================================================================

/// Builder for a chi-square goodness-of-fit request.
#[derive(Debug, Clone, Default)]
pub struct ChiSquareBuilder {
    /// Test variables.
    pub variables: Vec<Variable>,

    /// Category range.
    pub range: Option<ExpectedRange>,

    /// Expected distribution.
    pub expected: Option<ExpectedValues>,

    /// Emit the Descriptive Statistics table.
    pub descriptives: bool,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl ChiSquareBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one test variable.
    pub fn variable(mut self, variable: Variable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Append several test variables.
    pub fn variables(mut self, variables: impl IntoIterator<Item = Variable>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Restrict categories to the inclusive range `[lower, upper]`.
    pub fn range(mut self, lower: i64, upper: i64) -> Self {
        if self.range.is_some() {
            self.duplicate_param = Some("range");
        }
        self.range = Some(ExpectedRange::Range { lower, upper });
        self
    }

    /// Treat every category as equally likely (the default).
    pub fn all_categories_equal(mut self) -> Self {
        if self.expected.is_some() {
            self.duplicate_param = Some("expected");
        }
        self.expected = Some(ExpectedValues::AllCategoriesEqual);
        self
    }

    /// Use relative expected frequencies in ascending category order.
    pub fn expected_values(mut self, values: Vec<f64>) -> Self {
        if self.expected.is_some() {
            self.duplicate_param = Some("expected");
        }
        self.expected = Some(ExpectedValues::Values(values));
        self
    }

    /// Emit the Descriptive Statistics table.
    pub fn descriptives(mut self) -> Self {
        self.descriptives = true;
        self
    }

    /// Validate the options and build the request.
    pub fn build(self) -> Result<AnalysisRequest, AnalysisError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let options = ChiSquareOptions {
            range: self.range.unwrap_or_default(),
            expected: self.expected.unwrap_or_default(),
            descriptives: self.descriptives,
        };
        Validator::validate_expected(options.range, &options.expected)?;

        Ok(AnalysisRequest::ChiSquare(ChiSquareRequest {
            variables: self.variables,
            options,
        }))
    }
}
