//! Exponential smoothing (simple, Holt, Holt-Winters).
//!
//! ## Purpose
//!
//! This module implements the recursive exponential smoothing filters used
//! for short-horizon forecasting of level, trend and seasonal series.
//!
//! ## Design notes
//!
//! * **Defaults**: Each method resolves its default weights through
//!   [`SmoothingMethod::defaults`]; there is no shared mutable table.
//! * **Warm-up**: The first observations initialise the state and carry no
//!   one-step-ahead prediction (`None` in `fitted`).
//!
//! ## Key concepts
//!
//! * **alpha**: Level weight.
//! * **gamma**: Trend weight.
//! * **delta**: Seasonal weight.
//!
//! ## Invariants
//!
//! * All weights lie in `[0, 1]`.
//! * Winters methods need at least two full cycles; the multiplicative
//!   variant needs strictly positive data.

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};

// Internal dependencies
use crate::primitives::errors::AnalysisError;

// ============================================================================
// Methods and Parameters
// ============================================================================

/// Exponential smoothing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingMethod {
    /// Level only.
    #[default]
    Simple,

    /// Level and linear trend.
    Holt,

    /// Level, trend and additive season.
    WintersAdditive,

    /// Level, trend and multiplicative season.
    WintersMultiplicative,
}

/// Smoothing weights of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParameters {
    /// Level weight.
    pub alpha: f64,

    /// Trend weight (ignored by `Simple`).
    pub gamma: f64,

    /// Seasonal weight (Winters only).
    pub delta: f64,
}

impl SmoothingMethod {
    /// Default weights for this method.
    pub fn defaults(self) -> SmoothingParameters {
        match self {
            Self::Simple => SmoothingParameters {
                alpha: 0.1,
                gamma: 0.0,
                delta: 0.0,
            },
            Self::Holt => SmoothingParameters {
                alpha: 0.1,
                gamma: 0.1,
                delta: 0.0,
            },
            Self::WintersAdditive | Self::WintersMultiplicative => SmoothingParameters {
                alpha: 0.1,
                gamma: 0.1,
                delta: 0.1,
            },
        }
    }

    /// Whether the model has a seasonal component.
    pub fn is_seasonal(self) -> bool {
        matches!(self, Self::WintersAdditive | Self::WintersMultiplicative)
    }

    /// Whether the model has a trend component.
    pub fn has_trend(self) -> bool {
        !matches!(self, Self::Simple)
    }
}

impl Display for SmoothingMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Simple => write!(f, "Simple"),
            Self::Holt => write!(f, "Holt"),
            Self::WintersAdditive => write!(f, "Winters' Additive"),
            Self::WintersMultiplicative => write!(f, "Winters' Multiplicative"),
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// Output of a smoothing run.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingFit {
    /// One-step-ahead predictions; `None` during warm-up.
    pub fitted: Vec<Option<f64>>,

    /// Values for `t = n+1 ..= n+h`.
    pub forecast: Vec<f64>,

    /// Final level.
    pub level: f64,

    /// Final trend (0 without a trend component).
    pub trend: f64,

    /// Final seasonal state, indexed by period position.
    pub seasonal: Vec<f64>,
}

// ============================================================================
// Filters
// ============================================================================

/// Run `method` over `y` with the given weights and forecast `horizon` steps.
pub fn smooth(
    y: &[f64],
    method: SmoothingMethod,
    params: SmoothingParameters,
    period: Option<usize>,
    horizon: usize,
) -> Result<SmoothingFit, AnalysisError> {
    match method {
        SmoothingMethod::Simple => simple(y, params.alpha, horizon),
        SmoothingMethod::Holt => holt(y, params.alpha, params.gamma, horizon),
        SmoothingMethod::WintersAdditive | SmoothingMethod::WintersMultiplicative => {
            let m = period.ok_or_else(|| {
                AnalysisError::invalid("Seasonal smoothing needs a defined periodicity")
            })?;
            winters(
                y,
                params,
                m,
                method == SmoothingMethod::WintersMultiplicative,
                horizon,
            )
        }
    }
}

fn simple(y: &[f64], alpha: f64, horizon: usize) -> Result<SmoothingFit, AnalysisError> {
    if y.len() < 2 {
        return Err(AnalysisError::insufficient(
            "Simple smoothing needs at least 2 observations",
        ));
    }

    let mut fitted = vec![None; y.len()];
    let mut level = y[0];
    for (t, &v) in y.iter().enumerate().skip(1) {
        fitted[t] = Some(level);
        level = alpha * v + (1.0 - alpha) * level;
    }

    Ok(SmoothingFit {
        fitted,
        forecast: vec![level; horizon],
        level,
        trend: 0.0,
        seasonal: Vec::new(),
    })
}

fn holt(y: &[f64], alpha: f64, gamma: f64, horizon: usize) -> Result<SmoothingFit, AnalysisError> {
    if y.len() < 3 {
        return Err(AnalysisError::insufficient(
            "Holt smoothing needs at least 3 observations",
        ));
    }

    let mut fitted = vec![None; y.len()];
    let mut level = y[1];
    let mut trend = y[1] - y[0];
    for (t, &v) in y.iter().enumerate().skip(2) {
        let prediction = level + trend;
        fitted[t] = Some(prediction);
        let previous = level;
        level = alpha * v + (1.0 - alpha) * prediction;
        trend = gamma * (level - previous) + (1.0 - gamma) * trend;
    }

    let forecast = (1..=horizon).map(|h| level + h as f64 * trend).collect();
    Ok(SmoothingFit {
        fitted,
        forecast,
        level,
        trend,
        seasonal: Vec::new(),
    })
}

fn winters(
    y: &[f64],
    params: SmoothingParameters,
    m: usize,
    multiplicative: bool,
    horizon: usize,
) -> Result<SmoothingFit, AnalysisError> {
    if m < 2 || y.len() < 2 * m {
        return Err(AnalysisError::insufficient(
            "Seasonal smoothing needs at least two full cycles",
        ));
    }
    if multiplicative && y.iter().any(|&v| v <= 0.0) {
        return Err(AnalysisError::invalid(
            "Multiplicative smoothing requires strictly positive data",
        ));
    }

    let SmoothingParameters {
        alpha,
        gamma,
        delta,
    } = params;

    let first = y[..m].iter().sum::<f64>() / m as f64;
    let second = y[m..2 * m].iter().sum::<f64>() / m as f64;
    let mut level = first;
    let mut trend = (second - first) / m as f64;
    let mut seasonal: Vec<f64> = y[..m]
        .iter()
        .map(|&v| if multiplicative { v / first } else { v - first })
        .collect();

    let mut fitted = vec![None; y.len()];
    for (t, &v) in y.iter().enumerate().skip(m) {
        let pos = t % m;
        let base = level + trend;
        let s = seasonal[pos];
        fitted[t] = Some(if multiplicative { base * s } else { base + s });

        let previous = level;
        level = if multiplicative {
            alpha * (v / s) + (1.0 - alpha) * base
        } else {
            alpha * (v - s) + (1.0 - alpha) * base
        };
        trend = gamma * (level - previous) + (1.0 - gamma) * trend;
        seasonal[pos] = if multiplicative {
            delta * (v / level) + (1.0 - delta) * s
        } else {
            delta * (v - level) + (1.0 - delta) * s
        };
    }

    let n = y.len();
    let forecast = (1..=horizon)
        .map(|h| {
            let base = level + h as f64 * trend;
            let s = seasonal[(n + h - 1) % m];
            if multiplicative {
                base * s
            } else {
                base + s
            }
        })
        .collect();

    Ok(SmoothingFit {
        fitted,
        forecast,
        level,
        trend,
        seasonal,
    })
}
