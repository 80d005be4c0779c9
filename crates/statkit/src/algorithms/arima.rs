//! ARIMA(p, d, q) estimation and forecasting.
//!
//! ## Purpose
//!
//! This module fits ARIMA models by conditional sum of squares (CSS) and
//! produces point forecasts with prediction-interval variances.
//!
//! ## Design notes
//!
//! * **Differencing**: The series is differenced `d` times; the ARMA part is
//!   fitted to the differenced series `w`.
//! * **CSS**: Innovations before the first usable observation are taken as 0
//!   and the first `p` values of `w` condition the recursion.
//! * **Estimation**: Nelder-Mead over `[c, φ₁..φp, θ₁..θq]`, polished by
//!   Levenberg-Marquardt on the innovation vector. Only the polish decides
//!   convergence; exhausting its step budget is `NonConvergence`.
//! * **Standard errors**: Gauss-Newton approximation `σ²(JᵀJ)⁻¹` with a
//!   central-difference Jacobian of the innovation vector. A singular
//!   information matrix leaves the standard errors undefined (NaN).
//!
//! ## Key concepts
//!
//! * **Model**: `wₜ = c + Σφᵢwₜ₋ᵢ + eₜ + Σθⱼeₜ₋ⱼ`.
//! * **ψ-weights**: MA(∞) representation of the integrated model, giving
//!   `Var(h) = σ²Σ_{j<h} ψⱼ²`.
//!
//! ## Invariants
//!
//! * `p ≤ 5`, `d ≤ 2`, `q ≤ 5` (checked by the validator).
//! * At least one residual degree of freedom remains after estimation.

// Internal dependencies
use crate::algorithms::optimizer::{
    levenberg_marquardt, nelder_mead, LeastSquaresOptions, SimplexOptions,
};
use crate::math::linalg::Matrix;
use crate::primitives::errors::AnalysisError;

/// Largest accepted autoregressive order.
pub const MAX_AR_ORDER: usize = 5;

/// Largest accepted differencing order.
pub const MAX_DIFFERENCING: usize = 2;

/// Largest accepted moving-average order.
pub const MAX_MA_ORDER: usize = 5;

/// Minimum series length after trimming trailing missing values.
pub const MIN_OBSERVATIONS: usize = 20;

// ============================================================================
// Order
// ============================================================================

/// Model orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArimaOrder {
    /// Autoregressive order `p`.
    pub p: usize,

    /// Differencing order `d`.
    pub d: usize,

    /// Moving-average order `q`.
    pub q: usize,
}

impl ArimaOrder {
    /// Create an order triple.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

// ============================================================================
// Fit
// ============================================================================

/// One estimated parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaParameter {
    /// Display name, e.g. `"AR1"`.
    pub name: String,

    /// Point estimate.
    pub estimate: f64,

    /// Approximate standard error.
    pub std_error: f64,
}

/// A fitted ARIMA model.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaFit {
    /// Orders.
    pub order: ArimaOrder,

    /// Whether a constant term was estimated.
    pub constant: bool,

    /// Parameters in order constant, AR, MA.
    pub parameters: Vec<ArimaParameter>,

    /// Innovations for the differenced series (index aligned to `w`).
    pub innovations: Vec<f64>,

    /// Conditional sum of squares.
    pub css: f64,

    /// Number of innovations entering the CSS.
    pub effective_n: usize,

    /// Residual variance `CSS / (n_eff − k)`.
    pub sigma2: f64,

    /// Gaussian log-likelihood at the CSS estimate.
    pub log_likelihood: f64,

    /// Akaike information criterion.
    pub aic: f64,

    /// Bayesian information criterion.
    pub bic: f64,

    /// One-step-ahead fitted values on the original scale; `None` before
    /// the first conditioned observation.
    pub fitted: Vec<Option<f64>>,

    /// Simplex iterations plus Levenberg-Marquardt steps.
    pub iterations: usize,

    series: Vec<f64>,
}

impl ArimaFit {
    /// Number of estimated coefficients `k`.
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Residual degrees of freedom `n_eff − k`.
    pub fn residual_df(&self) -> usize {
        self.effective_n.saturating_sub(self.parameter_count())
    }

    fn coefficients(&self) -> Coefficients {
        let values: Vec<f64> = self.parameters.iter().map(|p| p.estimate).collect();
        Coefficients::unpack(&values, self.order, self.constant)
    }

    /// Forecast `horizon` steps past the end of the series.
    pub fn forecast(&self, horizon: usize, z: f64) -> ArimaForecast {
        let ArimaOrder { p, d, q } = self.order;
        let coeffs = self.coefficients();

        let mut levels = difference_levels(&self.series, d);
        let mut e = self.innovations.clone();

        let mut values = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let w = &levels[d];
            let t = w.len();
            let mut next = coeffs.c;
            for i in 1..=p {
                next += coeffs.phi[i - 1] * w[t - i];
            }
            for j in 1..=q {
                if t >= j {
                    next += coeffs.theta[j - 1] * e[t - j];
                }
            }
            e.push(0.0);

            levels[d].push(next);
            for k in (0..d).rev() {
                let prev = levels[k].last().copied().unwrap_or(0.0);
                let step = levels[k + 1].last().copied().unwrap_or(0.0);
                levels[k].push(prev + step);
            }
            values.push(levels[0].last().copied().unwrap_or(next));
        }

        let psi = psi_weights(&coeffs, self.order, horizon);
        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut std_errors = Vec::with_capacity(horizon);
        for (h, &v) in values.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let se = (self.sigma2 * cumulative).sqrt();
            std_errors.push(se);
            lower.push(v - z * se);
            upper.push(v + z * se);
        }

        ArimaForecast {
            values,
            std_errors,
            lower,
            upper,
        }
    }
}

/// Point forecasts with prediction intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaForecast {
    /// Point forecasts.
    pub values: Vec<f64>,

    /// Forecast standard errors.
    pub std_errors: Vec<f64>,

    /// Lower interval bounds.
    pub lower: Vec<f64>,

    /// Upper interval bounds.
    pub upper: Vec<f64>,
}

// ============================================================================
// Estimation
// ============================================================================

#[derive(Debug, Clone)]
struct Coefficients {
    c: f64,
    phi: Vec<f64>,
    theta: Vec<f64>,
}

impl Coefficients {
    fn unpack(x: &[f64], order: ArimaOrder, constant: bool) -> Self {
        let offset = usize::from(constant);
        Self {
            c: if constant { x[0] } else { 0.0 },
            phi: x[offset..offset + order.p].to_vec(),
            theta: x[offset + order.p..offset + order.p + order.q].to_vec(),
        }
    }
}

/// Fit ARIMA(`order`) to a gap-free series.
pub fn fit_arima(
    series: &[f64],
    order: ArimaOrder,
    constant: bool,
) -> Result<ArimaFit, AnalysisError> {
    let ArimaOrder { p, d, q } = order;
    let k = usize::from(constant) + p + q;

    let levels = difference_levels(series, d);
    let w = &levels[d];
    if w.len() <= p + k {
        return Err(AnalysisError::insufficient(format!(
            "{} observations are too few for ARIMA({},{},{})",
            series.len(),
            p,
            d,
            q
        )));
    }
    let effective_n = w.len() - p;

    let mean = w.iter().sum::<f64>() / w.len() as f64;
    let mut start = vec![0.0; k];
    if constant {
        start[0] = mean;
    }

    let objective = |x: &[f64]| {
        let e = innovations(w, &Coefficients::unpack(x, order, constant), p);
        e[p..].iter().map(|v| v * v).sum::<f64>()
    };

    let coarse = nelder_mead(objective, &start, &SimplexOptions::default());
    if !coarse.value.is_finite() {
        return Err(AnalysisError::non_convergence(
            "ARIMA estimation diverged: the sum of squares is not finite",
        ));
    }

    let residuals =
        |x: &[f64]| innovations(w, &Coefficients::unpack(x, order, constant), p).split_off(p);
    let polished = levenberg_marquardt(residuals, &coarse.x, &LeastSquaresOptions::default());
    let iterations = coarse.iterations + polished.iterations;
    if !polished.converged {
        return Err(AnalysisError::non_convergence(format!(
            "ARIMA estimation did not converge after {} iterations",
            iterations
        )));
    }
    if !polished.value.is_finite() {
        return Err(AnalysisError::non_convergence(
            "ARIMA estimation diverged: the sum of squares is not finite",
        ));
    }

    let estimates = polished.x;
    let coeffs = Coefficients::unpack(&estimates, order, constant);
    let e = innovations(w, &coeffs, p);
    let css = e[p..].iter().map(|v| v * v).sum::<f64>();

    let df = effective_n - k;
    let sigma2 = css / df as f64;
    let std_errors = standard_errors(w, &estimates, order, constant, sigma2)?;

    let names = (constant.then(|| "Constant".to_string()))
        .into_iter()
        .chain((1..=p).map(|i| format!("AR{}", i)))
        .chain((1..=q).map(|j| format!("MA{}", j)));
    let parameters = names
        .zip(estimates.iter().zip(&std_errors))
        .map(|(name, (&estimate, &std_error))| ArimaParameter {
            name,
            estimate,
            std_error,
        })
        .collect();

    let n_eff = effective_n as f64;
    let sigma2_ml = (css / n_eff).max(f64::MIN_POSITIVE);
    let log_likelihood =
        -0.5 * n_eff * ((2.0 * core::f64::consts::PI * sigma2_ml).ln() + 1.0);
    let free = (k + 1) as f64;
    let aic = -2.0 * log_likelihood + 2.0 * free;
    let bic = -2.0 * log_likelihood + n_eff.ln() * free;

    // ŷₜ = yₜ − eₜ: the differencing terms only involve past values.
    let fitted = series
        .iter()
        .enumerate()
        .map(|(t, &y)| (t >= d + p).then(|| y - e[t - d]))
        .collect();

    Ok(ArimaFit {
        order,
        constant,
        parameters,
        innovations: e,
        css,
        effective_n,
        sigma2,
        log_likelihood,
        aic,
        bic,
        fitted,
        iterations,
        series: series.to_vec(),
    })
}

/// `levels[k]` is the series differenced `k` times, for `k = 0..=d`.
fn difference_levels(series: &[f64], d: usize) -> Vec<Vec<f64>> {
    let mut levels = vec![series.to_vec()];
    for k in 0..d {
        let next = levels[k].windows(2).map(|pair| pair[1] - pair[0]).collect();
        levels.push(next);
    }
    levels
}

fn innovations(w: &[f64], coeffs: &Coefficients, p: usize) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in p..w.len() {
        let mut prediction = coeffs.c;
        for (i, phi) in coeffs.phi.iter().enumerate() {
            prediction += phi * w[t - i - 1];
        }
        for (j, theta) in coeffs.theta.iter().enumerate() {
            if t > j {
                prediction += theta * e[t - j - 1];
            }
        }
        e[t] = w[t] - prediction;
    }
    e
}

fn standard_errors(
    w: &[f64],
    estimates: &[f64],
    order: ArimaOrder,
    constant: bool,
    sigma2: f64,
) -> Result<Vec<f64>, AnalysisError> {
    let k = estimates.len();
    if k == 0 {
        return Ok(Vec::new());
    }
    let p = order.p;
    let rows = w.len() - p;

    // J[t][i] = ∂eₜ/∂βᵢ by central differences.
    let mut jacobian = Matrix::zeros(rows, k);
    for i in 0..k {
        let h = 1e-6 * estimates[i].abs().max(1.0);
        let mut plus = estimates.to_vec();
        let mut minus = estimates.to_vec();
        plus[i] += h;
        minus[i] -= h;
        let e_plus = innovations(w, &Coefficients::unpack(&plus, order, constant), p);
        let e_minus = innovations(w, &Coefficients::unpack(&minus, order, constant), p);
        for r in 0..rows {
            jacobian.set(r, i, (e_plus[p + r] - e_minus[p + r]) / (2.0 * h));
        }
    }

    let jtj = jacobian.transpose().multiply(&jacobian)?;
    let Ok(inverse) = jtj.inverse() else {
        return Ok(vec![f64::NAN; k]);
    };
    Ok(inverse
        .diagonal()
        .into_iter()
        .map(|v| (sigma2 * v).max(0.0).sqrt())
        .collect())
}

fn psi_weights(coeffs: &Coefficients, order: ArimaOrder, horizon: usize) -> Vec<f64> {
    // φ*(B) = φ(B)(1 − B)^d, stored as 1 − Σφ*ᵢBⁱ.
    let mut poly = vec![1.0];
    poly.extend(coeffs.phi.iter().map(|phi| -phi));
    for _ in 0..order.d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, &a) in poly.iter().enumerate() {
            next[i] += a;
            next[i + 1] -= a;
        }
        poly = next;
    }
    let phi_star: Vec<f64> = poly[1..].iter().map(|a| -a).collect();

    let mut psi = vec![0.0; horizon.max(1)];
    psi[0] = 1.0;
    for j in 1..psi.len() {
        let mut v = if j <= order.q { coeffs.theta[j - 1] } else { 0.0 };
        for (i, &phi) in phi_star.iter().enumerate() {
            if i < j {
                v += phi * psi[j - i - 1];
            }
        }
        psi[j] = v;
    }
    psi
}
