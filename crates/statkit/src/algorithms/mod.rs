//! Layer 3: Algorithms
//!
//! This layer implements the model-fitting logic of the engine: least squares
//! and its diagnostics, seasonal decomposition, exponential smoothing, ARIMA
//! and the chi-square test. It contains the numerical "business logic" but is
//! orchestrated by the analyses layer, which turns its results into tables.

// Least-squares fitting (simple and weighted multiple regression).
pub mod regression;

// Five residual types derived from a fit.
pub mod residuals;

// Belsley-Kuh-Welsch collinearity diagnostics.
pub mod collinearity;

// Zero-order, partial and part correlations; coefficient correlations.
pub mod correlations;

// Classical seasonal decomposition.
pub mod decomposition;

// Exponential smoothing filters.
pub mod smoothing;

// Nelder-Mead simplex and Levenberg-Marquardt minimisers.
pub mod optimizer;

// ARIMA estimation and forecasting.
pub mod arima;

// Chi-square goodness-of-fit.
pub mod chisquare;
