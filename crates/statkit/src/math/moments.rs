//! Descriptive moments over plain and weighted samples.
//!
//! Small, allocation-free helpers shared by the regression, time-series and
//! categorical engines. Weighted variants treat weights as case multipliers.

// ============================================================================
// Unweighted
// ============================================================================

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator); `None` below two values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>();
    Some((ss / (n - 1) as f64).sqrt())
}

/// Minimum and maximum; `None` for an empty slice.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

// ============================================================================
// Weighted
// ============================================================================

/// Weighted mean Σwᵢxᵢ / Σwᵢ; `None` when the weights sum to zero.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    let sum_w: f64 = weights.iter().sum();
    if sum_w <= 0.0 {
        return None;
    }
    let sum_wx = values
        .iter()
        .zip(weights)
        .fold(0.0, |acc, (&x, &w)| acc + w * x);
    Some(sum_wx / sum_w)
}

/// Weighted sum of squared deviations from the weighted mean.
pub fn weighted_sum_of_squares(values: &[f64], weights: &[f64]) -> f64 {
    match weighted_mean(values, weights) {
        Some(m) => values
            .iter()
            .zip(weights)
            .fold(0.0, |acc, (&x, &w)| acc + w * (x - m) * (x - m)),
        None => 0.0,
    }
}

/// Weighted standard deviation with a (Σw − 1) denominator.
pub fn weighted_std_dev(values: &[f64], weights: &[f64]) -> Option<f64> {
    let sum_w: f64 = weights.iter().sum();
    if sum_w <= 1.0 {
        return None;
    }
    Some((weighted_sum_of_squares(values, weights) / (sum_w - 1.0)).sqrt())
}

/// Weighted Pearson correlation.
///
/// `None` when either variable has zero weighted variance.
pub fn weighted_correlation(x: &[f64], y: &[f64], weights: &[f64]) -> Option<f64> {
    let mx = weighted_mean(x, weights)?;
    let my = weighted_mean(y, weights)?;

    let (sxy, sxx, syy) = x.iter().zip(y).zip(weights).fold(
        (0.0, 0.0, 0.0),
        |(sxy, sxx, syy), ((&xi, &yi), &w)| {
            let dx = xi - mx;
            let dy = yi - my;
            (sxy + w * dx * dy, sxx + w * dx * dx, syy + w * dy * dy)
        },
    );

    let denom = (sxx * syy).sqrt();
    if denom.is_nan() || denom <= f64::EPSILON * (sxx + syy).max(1e-300) {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}
