//! Tests for the time-series analyses.
//!
//! These tests verify seasonal decomposition, exponential smoothing and
//! ARIMA, together with the gate every time-series request passes first.
//!
//! ## Test Organization
//!
//! 1. **Gate** - Selection, type and periodicity checks with their messages
//! 2. **Decomposition** - Recovery of known trend and seasonal components
//! 3. **Smoothing** - Recurrences on series with exact answers
//! 4. **ARIMA** - Estimation, forecasting and minimum length

use approx::assert_relative_eq;

use statkit::internals::algorithms::arima::{fit_arima, ArimaOrder};
use statkit::internals::algorithms::decomposition::{centered_moving_average, decompose};
use statkit::internals::algorithms::smoothing::{smooth, SmoothingParameters};
use statkit::prelude::*;
use statkit::{DecompositionMethod, Measure, SmoothingMethod};

const SEASON: [f64; 4] = [3.0, -1.0, -4.0, 2.0];

/// Linear trend plus a zero-sum quarterly pattern.
fn quarterly(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 10.0 + 0.5 * (i + 1) as f64 + SEASON[i % 4])
        .collect()
}

/// Deterministic uniform noise on [-0.5, 0.5).
fn lcg_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect()
}

// ============================================================================
// Gate Tests
// ============================================================================

/// Test that a series shorter than four cycles is rejected.
#[test]
fn test_gate_too_short_for_period() {
    let err = Decomposition::new()
        .variable(Variable::numeric("sales", &quarterly(25)))
        .time(YearsMonths)
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert_eq!(err.message(), "Data length is less than 4 times the periodicity");
}

/// Test that a partial final cycle is rejected.
#[test]
fn test_gate_partial_cycle() {
    let err = Decomposition::new()
        .variable(Variable::numeric("visits", &quarterly(49)))
        .time(WeeksWorkDays5)
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.message(), "Data length is not a multiple of the periodicity");
}

/// Test that trailing missing rows do not count towards the length.
#[test]
fn test_gate_ignores_trailing_missing() {
    let mut observations: Vec<Observation> =
        quarterly(16).into_iter().map(Observation::Number).collect();
    observations.push(Observation::Missing);
    observations.push(Observation::Missing);
    let variable = Variable::new(VariableMeta::new("sales"), observations);

    let output = Decomposition::new()
        .variable(variable)
        .time(YearsQuarters)
        .build()
        .unwrap()
        .run()
        .unwrap();
    let trend = output.series("TRD_sales").unwrap();
    assert_eq!(trend.values.len(), 16);
}

/// Test the undated and non-periodic specifications.
#[test]
fn test_gate_requires_dates_and_periodicity() {
    let err = Decomposition::new()
        .variable(Variable::numeric("y", &quarterly(16)))
        .time(NotDated)
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert!(err.message().starts_with("Dates have not been defined"));

    let err = Decomposition::new()
        .variable(Variable::numeric("y", &quarterly(16)))
        .time(Years)
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(
        err.message(),
        "Periodicity is not defined for the selected time specification"
    );
}

/// Test selection, type and content checks.
#[test]
fn test_gate_variable_checks() {
    let err = Smoothing::new().build().unwrap().run().unwrap_err();
    assert_eq!(err.message(), "At least one variable must be selected");

    let text = Variable::new(
        VariableMeta::new("region").with_measure(Measure::String),
        vec![Observation::from("north"), Observation::from("south")],
    );
    let err = Smoothing::new().variable(text).build().unwrap().run().unwrap_err();
    assert_eq!(err.message(), "Variable 'region' is not numeric");

    let empty = Variable::new(
        VariableMeta::new("blank"),
        vec![Observation::Missing, Observation::Number(f64::NAN)],
    );
    let err = Smoothing::new().variable(empty).build().unwrap().run().unwrap_err();
    assert_eq!(err.message(), "Variable 'blank' contains no numeric data");
}

/// Test that an interior gap in a series is reported with its row.
#[test]
fn test_gate_interior_gap() {
    let variable = Variable::new(
        VariableMeta::new("y"),
        vec![
            Observation::Number(1.0),
            Observation::Missing,
            Observation::Number(3.0),
            Observation::Number(4.0),
        ],
    );
    let err = Smoothing::new().variable(variable).build().unwrap().run().unwrap_err();
    assert_eq!(err.message(), "Variable 'y' has a missing value at row 2");
}

// ============================================================================
// Decomposition Tests
// ============================================================================

/// Test the centered moving average for even and odd windows.
#[test]
fn test_centered_moving_average() {
    let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let odd = centered_moving_average(&y, 3);
    assert_eq!(odd[0], None);
    assert_relative_eq!(odd[1].unwrap(), 2.0);
    assert_eq!(odd[5], None);

    let even = centered_moving_average(&y, 4);
    assert_eq!(even[1], None);
    assert_relative_eq!(even[2].unwrap(), 3.0);
    assert_relative_eq!(even[3].unwrap(), 4.0);
    assert_eq!(even[4], None);
}

/// Test exact recovery of an additive seasonal pattern and linear trend.
#[test]
fn test_additive_decomposition_recovers_components() {
    let y = quarterly(16);
    let fit = decompose(&y, 4, DecompositionMethod::Additive, TrendMethod::None, 4).unwrap();

    for (idx, expected) in fit.seasonal_indices.iter().zip(SEASON) {
        assert_relative_eq!(*idx, expected, epsilon = 1e-10);
    }
    assert_relative_eq!(fit.trend_fit.slope, 0.5, epsilon = 1e-10);
    assert_relative_eq!(fit.trend_fit.intercept, 10.0, epsilon = 1e-10);
    for v in &fit.irregular {
        assert_relative_eq!(*v, 0.0, epsilon = 1e-10);
    }
    // t = 17 falls in the first season.
    assert_relative_eq!(fit.forecast[0], 10.0 + 0.5 * 17.0 + SEASON[0], epsilon = 1e-9);
    assert_eq!(fit.trend_method, TrendMethod::None);
}

/// Test that multiplicative indices average to one.
#[test]
fn test_multiplicative_indices_normalised() {
    let factors = [1.2, 0.9, 0.8, 1.1];
    let y: Vec<f64> = (0..24)
        .map(|i| (20.0 + (i + 1) as f64) * factors[i % 4])
        .collect();
    let fit = decompose(&y, 4, DecompositionMethod::Multiplicative, TrendMethod::Linear, 0)
        .unwrap();

    let mean = fit.seasonal_indices.iter().sum::<f64>() / 4.0;
    assert_relative_eq!(mean, 1.0, epsilon = 1e-12);
    for (idx, expected) in fit.seasonal_indices.iter().zip(factors) {
        assert!((idx - expected).abs() < 0.02);
    }
    assert!(fit.forecast.is_empty());
}

/// Test that multiplicative models reject non-positive data.
#[test]
fn test_multiplicative_rejects_non_positive() {
    let mut y = quarterly(16);
    y[3] = 0.0;
    let err = decompose(&y, 4, DecompositionMethod::Multiplicative, TrendMethod::Linear, 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

/// Test the rendered decomposition output.
#[test]
fn test_decomposition_tables() {
    let output = Decomposition::new()
        .variable(Variable::numeric("sales", &quarterly(16)))
        .time(YearsQuarters)
        .forecast(4)
        .evaluate()
        .save_forecast()
        .build()
        .unwrap()
        .run()
        .unwrap();

    let titles: Vec<&str> = output.tables.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Model Description",
            "Seasonal Factors",
            "Trend Model",
            "Forecast",
            "Evaluation"
        ]
    );

    let description = output.table("Model Description").unwrap();
    assert_eq!(description.cell("Method", "value").and_then(Cell::as_str), Some("Additive"));
    assert_eq!(description.cell("Period", "value").and_then(Cell::as_str), Some("Quarter"));
    assert_eq!(description.cell("Periodicity", "value"), Some(&Cell::Integer(4)));

    let factors = output.table("Seasonal Factors").unwrap();
    assert_relative_eq!(
        factors.cell("3", "v1").and_then(Cell::as_f64).unwrap(),
        SEASON[2],
        epsilon = 1e-10
    );

    let forecast = output.table("Forecast").unwrap();
    assert_eq!(forecast.leaf_rows().len(), 4);
    assert_relative_eq!(
        forecast.cell("t+2", "v1").and_then(Cell::as_f64).unwrap(),
        10.0 + 0.5 * 18.0 + SEASON[1],
        epsilon = 1e-9
    );

    for name in ["TRD_sales", "SEA_sales", "IRR_sales"] {
        assert_eq!(output.series(name).unwrap().values.len(), 16);
    }
    assert_eq!(output.series("FCT_sales").unwrap().values.len(), 20);
}

// ============================================================================
// Smoothing Tests
// ============================================================================

/// Test simple smoothing by hand.
#[test]
fn test_simple_smoothing() {
    let params = SmoothingParameters {
        alpha: 0.5,
        gamma: 0.0,
        delta: 0.0,
    };
    let fit = smooth(&[1.0, 2.0, 3.0], SmoothingMethod::Simple, params, None, 2).unwrap();
    assert_eq!(fit.fitted, vec![None, Some(1.0), Some(1.5)]);
    assert_relative_eq!(fit.level, 2.25);
    assert_eq!(fit.forecast, vec![2.25, 2.25]);
}

/// Test that Holt reproduces a straight line.
#[test]
fn test_holt_on_linear_series() {
    let y: Vec<f64> = (0..12).map(|i| 5.0 + 2.0 * i as f64).collect();
    let params = SmoothingParameters {
        alpha: 0.3,
        gamma: 0.2,
        delta: 0.0,
    };
    let fit = smooth(&y, SmoothingMethod::Holt, params, None, 3).unwrap();

    assert!(fit.fitted[..2].iter().all(Option::is_none));
    for (t, f) in fit.fitted.iter().enumerate().skip(2) {
        assert_relative_eq!(f.unwrap(), y[t], epsilon = 1e-10);
    }
    assert_relative_eq!(fit.trend, 2.0, epsilon = 1e-10);
    assert_relative_eq!(fit.forecast[2], 5.0 + 2.0 * 14.0, epsilon = 1e-9);
}

/// Test that additive Winters reproduces a stable seasonal pattern.
#[test]
fn test_winters_additive_on_seasonal_series() {
    let y: Vec<f64> = (0..16).map(|i| 10.0 + SEASON[i % 4]).collect();
    let params = SmoothingParameters {
        alpha: 0.4,
        gamma: 0.1,
        delta: 0.3,
    };
    let fit = smooth(&y, SmoothingMethod::WintersAdditive, params, Some(4), 6).unwrap();

    for (t, f) in fit.fitted.iter().enumerate().skip(4) {
        assert_relative_eq!(f.unwrap(), y[t], epsilon = 1e-10);
    }
    for (h, f) in fit.forecast.iter().enumerate() {
        assert_relative_eq!(*f, 10.0 + SEASON[(16 + h) % 4], epsilon = 1e-10);
    }
}

/// Test that seasonal smoothing needs a periodicity.
#[test]
fn test_winters_requires_period() {
    let y = quarterly(16);
    let err = smooth(
        &y,
        SmoothingMethod::WintersMultiplicative,
        SmoothingMethod::WintersMultiplicative.defaults(),
        None,
        0,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

/// Test the rendered smoothing output and default weights.
#[test]
fn test_smoothing_tables() {
    let output = Smoothing::new()
        .variable(Variable::numeric("demand", &quarterly(20)))
        .time(YearsQuarters)
        .method(Holt)
        .forecast(3)
        .save_forecast()
        .build()
        .unwrap()
        .run()
        .unwrap();

    let params = output.table("Smoothing Parameters").unwrap();
    assert_eq!(params.leaf_keys(), vec!["alpha", "gamma"]);
    assert_relative_eq!(params.cell("demand", "alpha").and_then(Cell::as_f64).unwrap(), 0.1);

    assert_eq!(output.table("Forecast").unwrap().leaf_rows().len(), 3);
    assert!(output.table("Evaluation").is_some());

    let fitted = output.series("FIT_demand").unwrap();
    assert_eq!(fitted.values.len(), 20);
    assert!(fitted.values[0].is_none());
    assert_eq!(output.series("FCT_demand").unwrap().values.len(), 23);
}

/// Test that non-seasonal smoothing accepts undated data.
#[test]
fn test_simple_smoothing_undated() {
    let output = Smoothing::new()
        .variable(Variable::numeric("y", &[4.0, 5.0, 6.0, 5.0]))
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert!(output.table("Forecast").is_none());
}

// ============================================================================
// ARIMA Tests
// ============================================================================

/// Test that an AR(1) coefficient is recovered.
#[test]
fn test_ar1_estimation() {
    let noise = lcg_noise(300, 7);
    let mut y = vec![0.0; 300];
    for t in 1..300 {
        y[t] = 0.6 * y[t - 1] + noise[t];
    }

    let fit = fit_arima(&y, ArimaOrder::new(1, 0, 0), false).unwrap();
    assert_eq!(fit.parameters.len(), 1);
    assert_eq!(fit.parameters[0].name, "AR1");
    assert!((fit.parameters[0].estimate - 0.6).abs() < 0.15);
    assert!(fit.parameters[0].std_error > 0.0);
    assert_eq!(fit.effective_n, 299);
    assert!(fit.aic < fit.bic);
}

/// Test a random walk with drift.
///
/// The constant of ARIMA(0,1,0) is the mean of the first differences and
/// the forecast standard error grows as σ√h.
#[test]
fn test_random_walk_with_drift() {
    let noise = lcg_noise(60, 42);
    let mut y = vec![100.0];
    for e in &noise[1..] {
        let last = y[y.len() - 1];
        y.push(last + 0.5 + e);
    }

    let fit = fit_arima(&y, ArimaOrder::new(0, 1, 0), true).unwrap();
    let drift = (y[59] - y[0]) / 59.0;
    assert_relative_eq!(fit.parameters[0].estimate, drift, epsilon = 1e-5);

    let forecast = fit.forecast(4, 1.96);
    assert_relative_eq!(forecast.values[0], y[59] + fit.parameters[0].estimate, epsilon = 1e-9);
    for h in 0..4 {
        let expected = fit.sigma2.sqrt() * ((h + 1) as f64).sqrt();
        assert_relative_eq!(forecast.std_errors[h], expected, epsilon = 1e-12);
        assert_relative_eq!(
            forecast.upper[h] - forecast.values[h],
            1.96 * expected,
            epsilon = 1e-9
        );
    }
}

/// ARMA(2,1): yₜ = 0.5yₜ₋₁ − 0.2yₜ₋₂ + eₜ + 0.3eₜ₋₁.
fn arma21(n: usize, seed: u64) -> Vec<f64> {
    let e = lcg_noise(n, seed);
    let mut y = vec![0.0; n];
    for t in 2..n {
        y[t] = 0.5 * y[t - 1] - 0.2 * y[t - 2] + e[t] + 0.3 * e[t - 1];
    }
    y
}

/// Test that mixed orders with moving-average terms are estimated.
///
/// ARIMA(2,0,2) nests AR(2) at θ = 0 with the same conditioning, so its
/// minimised sum of squares cannot be larger.
#[test]
fn test_arma_with_ma_terms() {
    let y = arma21(120, 11);

    let ar2 = fit_arima(&y, ArimaOrder::new(2, 0, 0), true).unwrap();
    let fit = fit_arima(&y, ArimaOrder::new(2, 0, 2), true).unwrap();

    let names: Vec<&str> = fit.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Constant", "AR1", "AR2", "MA1", "MA2"]);
    assert_eq!(fit.effective_n, 118);
    assert!(fit.sigma2.is_finite() && fit.sigma2 > 0.0);
    assert!(fit.css <= ar2.css * (1.0 + 1e-4));
    assert!(fit.aic.is_finite() && fit.bic.is_finite());
}

/// Test the largest orders through the builder.
#[test]
fn test_arima_largest_orders() {
    let y = arma21(120, 11);

    let output = Arima::new()
        .variable(Variable::numeric("x", &y))
        .order(5, 0, 5)
        .constant(true)
        .forecast(3)
        .build()
        .unwrap()
        .run()
        .unwrap();

    let estimates = output.table("Parameter Estimates").unwrap();
    assert_eq!(estimates.leaf_rows().len(), 11);
    assert!(estimates.find_row("MA5").is_some());
    assert_eq!(output.table("Forecast").unwrap().leaf_rows().len(), 3);
}

/// Test that ARIMA needs twenty observations.
#[test]
fn test_arima_minimum_length() {
    let err = Arima::new()
        .variable(Variable::numeric("x", &lcg_noise(19, 1)))
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    assert_eq!(
        err.message(),
        "Variable 'x' has 19 observations; at least 20 are required"
    );
}

/// Test the rendered ARIMA output.
#[test]
fn test_arima_tables() {
    let noise = lcg_noise(80, 3);
    let mut y = vec![0.0; 80];
    for t in 1..80 {
        y[t] = 0.5 * y[t - 1] + noise[t];
    }

    let output = Arima::new()
        .variable(Variable::numeric("x", &y))
        .order(1, 0, 0)
        .constant(true)
        .forecast(5)
        .save_forecast()
        .build()
        .unwrap()
        .run()
        .unwrap();

    let titles: Vec<&str> = output.tables.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Model Description",
            "Parameter Estimates",
            "Model Statistics",
            "Model Fit",
            "Forecast"
        ]
    );

    let estimates = output.table("Parameter Estimates").unwrap();
    assert!(estimates.find_row("Constant").is_some());
    assert!(estimates.find_row("AR1").is_some());

    let forecast = output.table("Forecast").unwrap();
    let rows = forecast.leaf_rows();
    assert_eq!(rows.len(), 5);
    let se = |i: usize| rows[i].cell("se").and_then(Cell::as_f64).unwrap();
    assert!(se(4) >= se(0));
    let value = rows[0].cell("forecast").and_then(Cell::as_f64).unwrap();
    let lower = rows[0].cell("lower").and_then(Cell::as_f64).unwrap();
    assert!(lower < value);

    assert_eq!(output.series("FCT_x").unwrap().values.len(), 85);
}
