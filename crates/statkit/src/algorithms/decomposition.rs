//! Classical seasonal decomposition.
//!
//! ## Purpose
//!
//! This module splits a seasonal series into trend, seasonal and irregular
//! components by the ratio-to-moving-average method and extends the fitted
//! pattern into a forecast horizon.
//!
//! ## Design notes
//!
//! * **Moving average**: A centered moving average of order `m`; for even `m`
//!   the 2×m average weights the two end points by one half.
//! * **Seasonal indices**: Detrended values are averaged per period position
//!   and normalised (additive: sum 0, multiplicative: mean 1).
//! * **Trend**: A linear fit, or a log-linear (exponential) fit, of the
//!   deseasonalised series against time `t = 1..n`.
//!
//! ## Key concepts
//!
//! * **Additive**: `y = T + S + I`.
//! * **Multiplicative**: `y = T · S · I`.
//!
//! ## Invariants
//!
//! * The caller has validated `n ≥ 4m` and `n mod m = 0`.
//! * Multiplicative and exponential modes need strictly positive data.
//!
//! ## Non-goals
//!
//! * This module does not validate time specifications.
//! * This module does not compute forecast accuracy metrics.

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};

// Internal dependencies
use crate::algorithms::regression::LinearFit;
use crate::primitives::errors::AnalysisError;

// ============================================================================
// Methods
// ============================================================================

/// How the seasonal component combines with the rest of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecompositionMethod {
    /// `y = T + S + I`.
    #[default]
    Additive,

    /// `y = T · S · I`.
    Multiplicative,
}

impl DecompositionMethod {
    /// Trend method applied when the caller does not pick one.
    pub fn default_trend(self) -> TrendMethod {
        match self {
            Self::Additive => TrendMethod::None,
            Self::Multiplicative => TrendMethod::Linear,
        }
    }
}

impl Display for DecompositionMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Additive => write!(f, "Additive"),
            Self::Multiplicative => write!(f, "Multiplicative"),
        }
    }
}

/// Trend model fitted over the deseasonalised series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendMethod {
    /// Reported for additive decompositions.
    #[default]
    None,

    /// `T(t) = a + b·t`.
    Linear,

    /// `T(t) = exp(a + b·t)`.
    Exponential,
}

impl Display for TrendMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::None => write!(f, "None"),
            Self::Linear => write!(f, "Linear"),
            Self::Exponential => write!(f, "Exponential"),
        }
    }
}

// ============================================================================
// Result
// ============================================================================

/// Components of a classical decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Method used.
    pub method: DecompositionMethod,

    /// Trend method as reported (always `None` for additive).
    pub trend_method: TrendMethod,

    /// Normalised seasonal index per period position.
    pub seasonal_indices: Vec<f64>,

    /// Fitted trend (or log-trend coefficients for exponential).
    pub trend_fit: LinearFit<f64>,

    /// Trend component per observation.
    pub trend: Vec<f64>,

    /// Seasonal component per observation.
    pub seasonal: Vec<f64>,

    /// Irregular component per observation.
    pub irregular: Vec<f64>,

    /// Trend combined with season, per observation.
    pub fitted: Vec<f64>,

    /// Out-of-sample values for `t = n+1 ..= n+h`.
    pub forecast: Vec<f64>,
}

// ============================================================================
// Computation
// ============================================================================

/// Decompose `y` with period `m` and extend it `horizon` steps.
pub fn decompose(
    y: &[f64],
    period: usize,
    method: DecompositionMethod,
    trend_method: TrendMethod,
    horizon: usize,
) -> Result<Decomposition, AnalysisError> {
    let n = y.len();
    if period < 2 || n < 2 * period {
        return Err(AnalysisError::insufficient(format!(
            "Decomposition needs at least two full cycles of {} observations",
            period
        )));
    }

    let multiplicative = method == DecompositionMethod::Multiplicative;
    // Additive mode always fits a linear trend; it reports no trend method.
    let fitted_trend = match method {
        DecompositionMethod::Additive => TrendMethod::Linear,
        DecompositionMethod::Multiplicative => match trend_method {
            TrendMethod::None => TrendMethod::Linear,
            other => other,
        },
    };
    let exponential = fitted_trend == TrendMethod::Exponential;

    if (multiplicative || exponential) && y.iter().any(|&v| v <= 0.0) {
        return Err(AnalysisError::invalid(
            "Multiplicative and exponential models require strictly positive data",
        ));
    }

    let ma = centered_moving_average(y, period);
    let seasonal_indices = seasonal_indices(y, &ma, period, multiplicative)?;

    let seasonal: Vec<f64> = (0..n).map(|i| seasonal_indices[i % period]).collect();
    let deseasonalised: Vec<f64> = y
        .iter()
        .zip(&seasonal)
        .map(|(&v, &s)| if multiplicative { v / s } else { v - s })
        .collect();

    let t: Vec<f64> = (1..=n).map(|i| i as f64).collect();
    let trend_fit = if exponential {
        let logs: Vec<f64> = deseasonalised.iter().map(|v| v.ln()).collect();
        LinearFit::fit_ols(&t, &logs)
    } else {
        LinearFit::fit_ols(&t, &deseasonalised)
    };
    let trend_at = |ti: f64| {
        let v = trend_fit.predict(ti);
        if exponential {
            v.exp()
        } else {
            v
        }
    };

    let trend: Vec<f64> = t.iter().map(|&ti| trend_at(ti)).collect();
    let combine = |tr: f64, s: f64| if multiplicative { tr * s } else { tr + s };

    let fitted: Vec<f64> = trend
        .iter()
        .zip(&seasonal)
        .map(|(&tr, &s)| combine(tr, s))
        .collect();
    let irregular: Vec<f64> = y
        .iter()
        .zip(&fitted)
        .map(|(&v, &f)| if multiplicative { v / f } else { v - f })
        .collect();

    let forecast = (n..n + horizon)
        .map(|i| combine(trend_at((i + 1) as f64), seasonal_indices[i % period]))
        .collect();

    Ok(Decomposition {
        method,
        trend_method: match method {
            DecompositionMethod::Additive => TrendMethod::None,
            DecompositionMethod::Multiplicative => fitted_trend,
        },
        seasonal_indices,
        trend_fit,
        trend,
        seasonal,
        irregular,
        fitted,
        forecast,
    })
}

/// Centered moving average of order `m`; `None` where the window does not fit.
pub fn centered_moving_average(y: &[f64], m: usize) -> Vec<Option<f64>> {
    let n = y.len();
    let half = m / 2;
    let mut out = vec![None; n];
    if m == 0 || n < m + (1 - m % 2) {
        return out;
    }

    for (i, slot) in out.iter_mut().enumerate().take(n - half).skip(half) {
        let value = if m % 2 == 1 {
            y[i - half..=i + half].iter().sum::<f64>() / m as f64
        } else {
            let inner: f64 = y[i - half + 1..i + half].iter().sum();
            (0.5 * y[i - half] + inner + 0.5 * y[i + half]) / m as f64
        };
        *slot = Some(value);
    }
    out
}

fn seasonal_indices(
    y: &[f64],
    ma: &[Option<f64>],
    period: usize,
    multiplicative: bool,
) -> Result<Vec<f64>, AnalysisError> {
    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];

    for (i, (&v, avg)) in y.iter().zip(ma).enumerate() {
        if let Some(a) = *avg {
            let detrended = if multiplicative { v / a } else { v - a };
            sums[i % period] += detrended;
            counts[i % period] += 1;
        }
    }

    if counts.iter().any(|&c| c == 0) {
        return Err(AnalysisError::insufficient(
            "Not enough cycles to estimate every seasonal index",
        ));
    }

    let raw: Vec<f64> = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| s / c as f64)
        .collect();
    let centre = raw.iter().sum::<f64>() / period as f64;

    if multiplicative {
        if centre <= 0.0 {
            return Err(AnalysisError::internal("Seasonal indices have a non-positive mean"));
        }
        Ok(raw.iter().map(|r| r / centre).collect())
    } else {
        Ok(raw.iter().map(|r| r - centre).collect())
    }
}
