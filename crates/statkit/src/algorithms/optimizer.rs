//! Minimisers for ARIMA estimation.
//!
//! * **Nelder-Mead**: derivative-free simplex search over the conditional sum
//!   of squares. The simplex is seeded around the starting point with one
//!   perturbed vertex per dimension; iteration stops once both the spread of
//!   function values and the simplex diameter fall below their tolerances,
//!   each taken relative to the scale of the best vertex.
//! * **Levenberg-Marquardt**: damped Gauss-Newton on a residual vector. It
//!   polishes the simplex result, which can stall on the flat ridges that
//!   moving-average terms produce.

// External dependencies
use core::cmp::Ordering;

// Internal dependencies
use crate::math::linalg::Matrix;

// ============================================================================
// Options and Result
// ============================================================================

/// Stopping rules for [`nelder_mead`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexOptions {
    /// Maximum number of simplex iterations.
    pub max_iter: usize,

    /// Tolerance on `|f_worst − f_best|`, relative to `|f_best|` (floor 1).
    pub f_tol: f64,

    /// Tolerance on the simplex diameter, relative to `‖x_best‖` (floor 1).
    pub x_tol: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            f_tol: 1e-12,
            x_tol: 1e-8,
        }
    }
}

/// Best vertex found by the simplex search.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Minimiser.
    pub x: Vec<f64>,

    /// Objective value at `x`.
    pub value: f64,

    /// Iterations performed.
    pub iterations: usize,

    /// Whether both tolerances were met.
    pub converged: bool,
}

// ============================================================================
// Algorithm
// ============================================================================

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimise `f` from `x0`. Non-finite objective values rank as worst.
pub fn nelder_mead<F>(f: F, x0: &[f64], options: &SimplexOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = f(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let n = x0.len();
    if n == 0 {
        return Minimum {
            x: Vec::new(),
            value: eval(x0),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(x0.to_vec());
    for i in 0..n {
        let mut vertex = x0.to_vec();
        vertex[i] += if x0[i].abs() < 1e-10 {
            0.1
        } else {
            0.1 * x0[i].abs()
        };
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    for iter in 0..options.max_iter {
        order(&mut simplex, &mut values);

        let spread = (values[n] - values[0]).abs();
        let diameter = simplex[1..]
            .iter()
            .map(|v| distance(&simplex[0], v))
            .fold(0.0, f64::max);
        if spread <= options.f_tol * values[0].abs().max(1.0)
            && diameter <= options.x_tol * norm(&simplex[0]).max(1.0)
        {
            return Minimum {
                x: simplex[0].clone(),
                value: values[0],
                iterations: iter,
                converged: true,
            };
        }

        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v / n as f64;
            }
        }
        let toward = |from: &[f64], scale: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(from)
                .map(|(&c, &x)| c + scale * (x - c))
                .collect()
        };

        let reflected = toward(&simplex[n], -REFLECT);
        let f_r = eval(&reflected);

        if f_r < values[0] {
            let expanded = toward(&reflected, EXPAND);
            let f_e = eval(&expanded);
            if f_e < f_r {
                simplex[n] = expanded;
                values[n] = f_e;
            } else {
                simplex[n] = reflected;
                values[n] = f_r;
            }
        } else if f_r < values[n - 1] {
            simplex[n] = reflected;
            values[n] = f_r;
        } else {
            let (contracted, f_c) = if f_r < values[n] {
                let x = toward(&reflected, CONTRACT);
                let v = eval(&x);
                (x, v)
            } else {
                let x = toward(&simplex[n], CONTRACT);
                let v = eval(&x);
                (x, v)
            };

            if f_c < values[n].min(f_r) {
                simplex[n] = contracted;
                values[n] = f_c;
            } else {
                let best = simplex[0].clone();
                for i in 1..=n {
                    for (x, &b) in simplex[i].iter_mut().zip(&best) {
                        *x = b + SHRINK * (*x - b);
                    }
                    values[i] = eval(&simplex[i]);
                }
            }
        }
    }

    order(&mut simplex, &mut values);
    Minimum {
        x: simplex[0].clone(),
        value: values[0],
        iterations: options.max_iter,
        converged: false,
    }
}

// ============================================================================
// Levenberg-Marquardt
// ============================================================================

/// Stopping rules for [`levenberg_marquardt`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeastSquaresOptions {
    /// Maximum number of damped Gauss-Newton steps.
    pub max_iter: usize,

    /// Tolerance on the relative decrease of the sum of squares.
    pub f_tol: f64,

    /// Tolerance on the step length, relative to `‖x‖` (floor 1).
    pub x_tol: f64,

    /// Tolerance on `‖Jᵀr‖`, relative to the sum of squares (floor 1).
    pub g_tol: f64,
}

impl Default for LeastSquaresOptions {
    fn default() -> Self {
        Self {
            max_iter: 500,
            f_tol: 1e-10,
            x_tol: 1e-10,
            g_tol: 1e-10,
        }
    }
}

const LAMBDA_START: f64 = 1e-3;
const LAMBDA_UP: f64 = 10.0;
const LAMBDA_DOWN: f64 = 0.1;
const LAMBDA_MAX: f64 = 1e12;

/// Minimise `‖r(x)‖²` from `x0`.
///
/// The Jacobian is taken by forward differences. A step is accepted only when
/// it lowers the sum of squares; rejected steps raise the damping. Once the
/// damping saturates without an accepted step, `x` is stationary to working
/// precision and the search reports convergence.
pub fn levenberg_marquardt<F>(r: F, x0: &[f64], options: &LeastSquaresOptions) -> Minimum
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let sum_sq = |v: &[f64]| {
        let s = v.iter().map(|e| e * e).sum::<f64>();
        if s.is_finite() {
            s
        } else {
            f64::INFINITY
        }
    };

    let n = x0.len();
    let mut x = x0.to_vec();
    let mut residuals = r(&x);
    let mut cost = sum_sq(&residuals);
    if n == 0 || !cost.is_finite() {
        return Minimum {
            x,
            value: cost,
            iterations: 0,
            converged: n == 0,
        };
    }

    let mut lambda = LAMBDA_START;
    let mut jacobian = forward_jacobian(&r, &x, &residuals);
    for iter in 0..options.max_iter {
        let m = residuals.len();
        let mut jtj = Matrix::zeros(n, n);
        let mut gradient = vec![0.0; n];
        for i in 0..n {
            for j in i..n {
                let v = (0..m).map(|t| jacobian[t][i] * jacobian[t][j]).sum::<f64>();
                jtj.set(i, j, v);
                jtj.set(j, i, v);
            }
            gradient[i] = (0..m).map(|t| jacobian[t][i] * residuals[t]).sum::<f64>();
        }

        if norm(&gradient) <= options.g_tol * cost.max(1.0) {
            return Minimum {
                x,
                value: cost,
                iterations: iter,
                converged: true,
            };
        }

        let mut damped = jtj.clone();
        for i in 0..n {
            damped.set(i, i, jtj.get(i, i) * (1.0 + lambda) + lambda * f64::EPSILON);
        }
        let negative: Vec<f64> = gradient.iter().map(|g| -g).collect();
        let step = damped.inverse().and_then(|inv| inv.mul_vec(&negative));

        let accepted = match step {
            Ok(step) => {
                let candidate: Vec<f64> = x.iter().zip(&step).map(|(a, b)| a + b).collect();
                let trial = r(&candidate);
                let trial_cost = sum_sq(&trial);
                if trial_cost < cost {
                    let decrease = (cost - trial_cost) / cost.max(f64::MIN_POSITIVE);
                    let small_step = norm(&step) <= options.x_tol * norm(&candidate).max(1.0);
                    x = candidate;
                    residuals = trial;
                    cost = trial_cost;
                    if decrease <= options.f_tol || small_step {
                        return Minimum {
                            x,
                            value: cost,
                            iterations: iter + 1,
                            converged: true,
                        };
                    }
                    true
                } else {
                    false
                }
            }
            Err(_) => false,
        };

        if accepted {
            lambda = (lambda * LAMBDA_DOWN).max(f64::EPSILON);
            jacobian = forward_jacobian(&r, &x, &residuals);
        } else if lambda >= LAMBDA_MAX {
            return Minimum {
                x,
                value: cost,
                iterations: iter + 1,
                converged: true,
            };
        } else {
            lambda *= LAMBDA_UP;
        }
    }

    Minimum {
        x,
        value: cost,
        iterations: options.max_iter,
        converged: false,
    }
}

/// `J[t][i] = ∂rₜ/∂xᵢ` by forward differences.
fn forward_jacobian<F>(r: &F, x: &[f64], at: &[f64]) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let mut jacobian = vec![vec![0.0; x.len()]; at.len()];
    for i in 0..x.len() {
        let h = 1e-7 * x[i].abs().max(1.0);
        let mut shifted = x.to_vec();
        shifted[i] += h;
        let moved = r(&shifted);
        for (row, (a, b)) in jacobian.iter_mut().zip(moved.iter().zip(at)) {
            let d = (a - b) / h;
            row[i] = if d.is_finite() { d } else { 0.0 };
        }
    }
    jacobian
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn order(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
