//! Tests for linear regression and its diagnostics.
//!
//! These tests verify the regression engine end to end:
//! - Least-squares coefficients, sums of squares and fit statistics
//! - The five residual types and leverage
//! - Collinearity and coefficient correlation tables
//! - Listwise deletion, weights and degenerate designs
//!
//! ## Test Organization
//!
//! 1. **Least Squares** - Direct fits through the algorithm layer
//! 2. **Residuals** - Residual identities
//! 3. **Tables** - Rendered output of the analysis
//! 4. **Edge Cases** - Exact fits, missing data, singular designs

use approx::assert_relative_eq;

use statkit::internals::algorithms::regression::{design_with_intercept, LeastSquaresFit};
use statkit::internals::algorithms::residuals::ResidualSet;
use statkit::internals::math::distributions::f_p_value;
use statkit::prelude::*;

fn noisy_line() -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (1..=8).map(f64::from).collect();
    let noise = [0.1, -0.2, 0.15, -0.05, 0.0, 0.2, -0.1, -0.1];
    let y = x.iter().zip(noise).map(|(xi, e)| 2.0 * xi + 1.0 + e).collect();
    (x, y)
}

/// Residuals of `target` after a simple regression on `control`.
fn residual_on(target: &[f64], control: &[f64]) -> Vec<f64> {
    let n = target.len() as f64;
    let mt = target.iter().sum::<f64>() / n;
    let mc = control.iter().sum::<f64>() / n;
    let sxy: f64 = target.iter().zip(control).map(|(t, c)| (t - mt) * (c - mc)).sum();
    let sxx: f64 = control.iter().map(|c| (c - mc) * (c - mc)).sum();
    let slope = sxy / sxx;
    target
        .iter()
        .zip(control)
        .map(|(t, c)| t - mt - slope * (c - mc))
        .collect()
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let ma = a.iter().sum::<f64>() / n;
    let mb = b.iter().sum::<f64>() / n;
    let sab: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    let saa: f64 = a.iter().map(|x| (x - ma) * (x - ma)).sum();
    let sbb: f64 = b.iter().map(|y| (y - mb) * (y - mb)).sum();
    sab / (saa * sbb).sqrt()
}

fn cell(output: &AnalysisOutput, table: &str, row: &str, key: &str) -> Option<f64> {
    output
        .table(table)
        .unwrap_or_else(|| panic!("missing table {}", table))
        .cell(row, key)
        .and_then(Cell::as_f64)
}

// ============================================================================
// Least Squares Tests
// ============================================================================

/// Test coefficients and the decomposition SST = SSR + SSE.
#[test]
fn test_least_squares_coefficients() {
    let (x, y) = noisy_line();
    let design = design_with_intercept(&[x]).unwrap();
    let fit = LeastSquaresFit::fit(&design, &y, &[1.0; 8]).unwrap();

    // slope = 2 + Σ(x − x̄)e / Sxx = 2 − 0.35 / 42
    assert_relative_eq!(fit.coefficients[1], 2.0 - 0.35 / 42.0, epsilon = 1e-10);
    assert_relative_eq!(fit.sst, fit.ssr + fit.sse, epsilon = 1e-9);
    assert!(fit.r_squared() > 0.99);
    assert_eq!(fit.residual_df(), 6);
}

/// Test that leverages sum to the number of parameters.
#[test]
fn test_leverage_trace() {
    let (x, y) = noisy_line();
    let design = design_with_intercept(&[x]).unwrap();
    let fit = LeastSquaresFit::fit(&design, &y, &[1.0; 8]).unwrap();
    let trace: f64 = fit.leverage.iter().sum();
    assert_relative_eq!(trace, 2.0, epsilon = 1e-10);
}

/// Test that an integer case weight equals duplicating the case.
#[test]
fn test_weights_match_duplicated_cases() {
    let (x, y) = noisy_line();
    let mut weights = vec![1.0; 8];
    weights[2] = 2.0;
    let weighted = LeastSquaresFit::fit(&design_with_intercept(&[x.clone()]).unwrap(), &y, &weights)
        .unwrap();

    let mut x_dup = x.clone();
    let mut y_dup = y.clone();
    x_dup.push(x[2]);
    y_dup.push(y[2]);
    let duplicated =
        LeastSquaresFit::fit(&design_with_intercept(&[x_dup]).unwrap(), &y_dup, &[1.0; 9])
            .unwrap();

    for (a, b) in weighted.coefficients.iter().zip(&duplicated.coefficients) {
        assert_relative_eq!(*a, *b, epsilon = 1e-10);
    }
    assert_relative_eq!(weighted.sse, duplicated.sse, epsilon = 1e-10);
}

// ============================================================================
// Residual Tests
// ============================================================================

/// Test the relations between the residual types.
///
/// Deleted residuals are eᵢ/(1 − hᵢ) and the externally studentized residual
/// follows from the internal one as r·sqrt((df − 1)/(df − r²)).
#[test]
fn test_residual_identities() {
    let (x, y) = noisy_line();
    let design = design_with_intercept(&[x]).unwrap();
    let fit = LeastSquaresFit::fit(&design, &y, &[1.0; 8]).unwrap();
    let res = ResidualSet::compute(&fit).unwrap();
    let s = fit.sigma2().sqrt();
    let df = fit.residual_df() as f64;

    let sum: f64 = res.unstandardized.iter().sum();
    assert_relative_eq!(sum, 0.0, epsilon = 1e-10);

    for i in 0..8 {
        let e = res.unstandardized[i];
        let h = fit.leverage[i];
        assert_relative_eq!(res.standardized[i], e / s, epsilon = 1e-10);
        assert_relative_eq!(res.studentized[i], e / (s * (1.0 - h).sqrt()), epsilon = 1e-10);
        assert_relative_eq!(res.deleted[i], e / (1.0 - h), epsilon = 1e-10);
        let r = res.studentized[i];
        assert_relative_eq!(
            res.studentized_deleted[i],
            r * ((df - 1.0) / (df - r * r)).sqrt(),
            epsilon = 1e-10
        );
    }
}

// ============================================================================
// Table Tests
// ============================================================================

/// Test the Model Summary, ANOVA and Coefficients tables.
#[test]
fn test_regression_tables() {
    let (x, y) = noisy_line();
    let output = Regression::new()
        .dependent(Variable::numeric("y", &y))
        .independent(Variable::numeric("x", &x))
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(output.kind, AnalysisKind::Regression);
    let titles: Vec<&str> = output.tables.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Model Summary", "ANOVA", "Coefficients"]);

    let r2 = cell(&output, "Model Summary", "1", "rSquare").unwrap();
    let r = cell(&output, "Model Summary", "1", "r").unwrap();
    assert_relative_eq!(r * r, r2, epsilon = 1e-12);
    assert!(r2 > 0.99);

    let ss_reg = cell(&output, "ANOVA", "Regression", "sumOfSquares").unwrap();
    let ss_res = cell(&output, "ANOVA", "Residual", "sumOfSquares").unwrap();
    let ss_tot = cell(&output, "ANOVA", "Total", "sumOfSquares").unwrap();
    assert_relative_eq!(ss_reg + ss_res, ss_tot, epsilon = 1e-9);
    assert_eq!(
        output.table("ANOVA").unwrap().cell("Total", "df"),
        Some(&Cell::Integer(7))
    );

    // F of a single predictor equals t².
    let f = cell(&output, "ANOVA", "Regression", "f").unwrap();
    let t = cell(&output, "Coefficients", "x", "t").unwrap();
    assert_relative_eq!(f, t * t, max_relative = 1e-9);

    let sig = cell(&output, "Coefficients", "x", "sig").unwrap();
    assert!(sig < 1e-6);
    let b = cell(&output, "Coefficients", "x", "b").unwrap();
    let lower = cell(&output, "Coefficients", "x", "lowerBound").unwrap();
    let upper = cell(&output, "Coefficients", "x", "upperBound").unwrap();
    assert!(lower < b && b < upper);
    assert_relative_eq!(b - lower, upper - b, epsilon = 1e-12);
}

/// Test optional tables with two predictors.
#[test]
fn test_optional_tables() {
    let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    let x2 = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 8.0, 9.0, 7.0, 10.0];
    let y: Vec<f64> = x1
        .iter()
        .zip(&x2)
        .enumerate()
        .map(|(i, (a, b))| 1.0 + 0.5 * a + 0.8 * b + if i % 2 == 0 { 0.3 } else { -0.3 })
        .collect();

    let output = Regression::new()
        .dependent(Variable::numeric("y", &y))
        .independents([Variable::numeric("x1", &x1), Variable::numeric("x2", &x2)])
        .descriptives()
        .part_and_partial()
        .collinearity()
        .covariance_matrix()
        .residual_statistics()
        .build()
        .unwrap()
        .run()
        .unwrap();

    for title in [
        "Descriptive Statistics",
        "Model Summary",
        "ANOVA",
        "Coefficients",
        "Coefficient Correlations",
        "Collinearity Diagnostics",
        "Residuals Statistics",
    ] {
        assert!(output.table(title).is_some(), "missing {}", title);
    }

    // Tolerance and VIF are reciprocal.
    let tolerance = cell(&output, "Coefficients", "x1", "tolerance").unwrap();
    let vif = cell(&output, "Coefficients", "x1", "vif").unwrap();
    assert!(tolerance > 0.0 && tolerance <= 1.0);
    assert_relative_eq!(tolerance * vif, 1.0, epsilon = 1e-10);

    // Both predictors see the same correlation between them.
    let correlations = output.table("Coefficient Correlations").unwrap();
    let rows = correlations.leaf_rows();
    assert_relative_eq!(rows[0].cell("x1").and_then(Cell::as_f64).unwrap(), 1.0);
    assert_relative_eq!(
        rows[0].cell("x2").and_then(Cell::as_f64).unwrap(),
        rows[1].cell("x1").and_then(Cell::as_f64).unwrap(),
        epsilon = 1e-12
    );

    // Scaled cross-products have unit diagonal, so eigenvalues sum to p.
    let diagnostics = output.table("Collinearity Diagnostics").unwrap();
    assert!(diagnostics.footnotes.is_empty());
    let dims = diagnostics.leaf_rows();
    assert_eq!(dims.len(), 3);
    let total: f64 = dims
        .iter()
        .map(|r| r.cell("eigenvalue").and_then(Cell::as_f64).unwrap())
        .sum();
    assert_relative_eq!(total, 3.0, epsilon = 1e-8);
    assert_relative_eq!(
        dims[0].cell("conditionIndex").and_then(Cell::as_f64).unwrap(),
        1.0,
        epsilon = 1e-12
    );
    for key in ["constant", "x1", "x2"] {
        let share: f64 = dims
            .iter()
            .map(|r| r.cell(key).and_then(Cell::as_f64).unwrap())
            .sum();
        assert_relative_eq!(share, 1.0, epsilon = 1e-8);
    }

    let n = output
        .table("Residuals Statistics")
        .unwrap()
        .cell("Residual", "n")
        .cloned();
    assert_eq!(n, Some(Cell::Integer(10)));
}

/// Test partial and part correlations against explicit residualization.
#[test]
fn test_partial_and_part_correlations() {
    let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    let x2 = [2.0, 1.0, 4.0, 3.0, 6.0, 5.0, 8.0, 9.0, 7.0, 10.0];
    let y = [3.1, 2.2, 5.9, 5.0, 8.3, 7.1, 10.4, 11.0, 9.2, 12.9];

    let output = Regression::new()
        .dependent(Variable::numeric("y", &y))
        .independents([Variable::numeric("x1", &x1), Variable::numeric("x2", &x2)])
        .part_and_partial()
        .build()
        .unwrap()
        .run()
        .unwrap();

    for (name, own, other) in [("x1", &x1, &x2), ("x2", &x2, &x1)] {
        let resid_x = residual_on(own, other);
        let resid_y = residual_on(&y, other);

        let zero_order = cell(&output, "Coefficients", name, "zeroOrder").unwrap();
        let partial = cell(&output, "Coefficients", name, "partial").unwrap();
        let part = cell(&output, "Coefficients", name, "part").unwrap();

        assert_relative_eq!(zero_order, pearson(&y, own), epsilon = 1e-10);
        assert_relative_eq!(partial, pearson(&resid_y, &resid_x), epsilon = 1e-10);
        assert_relative_eq!(part, pearson(&y, &resid_x), epsilon = 1e-10);
        assert!(part.abs() <= partial.abs() + 1e-12);
    }
}

/// Test that a single predictor has equal zero-order, partial and part
/// correlations.
#[test]
fn test_single_predictor_correlations_coincide() {
    let (x, y) = noisy_line();
    let output = Regression::new()
        .dependent(Variable::numeric("y", &y))
        .independent(Variable::numeric("x", &x))
        .part_and_partial()
        .build()
        .unwrap()
        .run()
        .unwrap();

    let zero_order = cell(&output, "Coefficients", "x", "zeroOrder").unwrap();
    let partial = cell(&output, "Coefficients", "x", "partial").unwrap();
    let part = cell(&output, "Coefficients", "x", "part").unwrap();
    let r = cell(&output, "Model Summary", "1", "r").unwrap();

    assert_relative_eq!(zero_order, partial, epsilon = 1e-12);
    assert_relative_eq!(zero_order, part, epsilon = 1e-12);
    assert_relative_eq!(zero_order, r, epsilon = 1e-10);
}

/// Test the R² change statistics of the Model Summary.
#[test]
fn test_r_square_change_significance() {
    let (x, y) = noisy_line();
    let output = Regression::new()
        .dependent(Variable::numeric("y", &y))
        .independent(Variable::numeric("x", &x))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let summary = output.table("Model Summary").unwrap();
    assert_eq!(summary.cell("1", "df1"), Some(&Cell::Integer(1)));
    assert_eq!(summary.cell("1", "df2"), Some(&Cell::Integer(6)));

    let f_change = cell(&output, "Model Summary", "1", "fChange").unwrap();
    let sig = cell(&output, "Model Summary", "1", "sigFChange").unwrap();
    assert_relative_eq!(
        f_change,
        cell(&output, "ANOVA", "Regression", "f").unwrap(),
        max_relative = 1e-12
    );
    assert_relative_eq!(sig, f_p_value(f_change, 1.0, 6.0).unwrap(), epsilon = 1e-15);
    assert!((0.0..1e-6).contains(&sig));
}

/// Test that collinearity diagnostics for eight predictors converge.
#[test]
fn test_collinearity_many_predictors() {
    let mut state = 5_u64;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };
    let predictors: Vec<Vec<f64>> = (0..8)
        .map(|_| (0..40).map(|_| next()).collect())
        .collect();
    let y: Vec<f64> = (0..40)
        .map(|i| predictors.iter().map(|x| x[i]).sum::<f64>() + next())
        .collect();

    let output = Regression::new()
        .dependent(Variable::numeric("y", &y))
        .independents(
            predictors
                .iter()
                .enumerate()
                .map(|(j, x)| Variable::numeric(format!("x{}", j + 1), x)),
        )
        .collinearity()
        .build()
        .unwrap()
        .run()
        .unwrap();

    let diagnostics = output.table("Collinearity Diagnostics").unwrap();
    assert!(diagnostics.footnotes.is_empty());
    assert_eq!(diagnostics.leaf_rows().len(), 9);
    let total: f64 = diagnostics
        .leaf_rows()
        .iter()
        .map(|r| r.cell("eigenvalue").and_then(Cell::as_f64).unwrap())
        .sum();
    assert_relative_eq!(total, 9.0, epsilon = 1e-8);
}

// ============================================================================
// Edge Case Tests
// ============================================================================

/// Test the perfect fit y = x.
///
/// The fit is exact: intercept 0, slope 1, zero residuals, R² = 1, and the
/// undefined F and t statistics are empty cells.
#[test]
fn test_perfect_fit() {
    let x = [1.0, 2.0, 3.0, 4.0, 5.0];
    let output = Regression::new()
        .dependent(Variable::numeric("y", &x))
        .independent(Variable::numeric("x", &x))
        .save_residuals()
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_relative_eq!(
        cell(&output, "Coefficients", "(Constant)", "b").unwrap(),
        0.0,
        epsilon = 1e-10
    );
    assert_relative_eq!(
        cell(&output, "Coefficients", "x", "b").unwrap(),
        1.0,
        epsilon = 1e-10
    );
    assert_relative_eq!(
        cell(&output, "Model Summary", "1", "rSquare").unwrap(),
        1.0,
        epsilon = 1e-12
    );

    let coefficients = output.table("Coefficients").unwrap();
    assert!(coefficients.cell("x", "t").unwrap().is_empty());
    assert!(coefficients.cell("x", "sig").unwrap().is_empty());
    assert!(output.table("ANOVA").unwrap().cell("Regression", "f").unwrap().is_empty());

    let residuals = output.series("RES_1").unwrap();
    assert_eq!(residuals.values.len(), 5);
    for v in &residuals.values {
        assert_relative_eq!(v.unwrap(), 0.0, epsilon = 1e-10);
    }
}

/// Test that incomplete cases are dropped and saved series keep row alignment.
#[test]
fn test_listwise_deletion() {
    let x = Variable::new(
        VariableMeta::new("x"),
        vec![
            Observation::Number(1.0),
            Observation::Number(2.0),
            Observation::Missing,
            Observation::Number(4.0),
            Observation::Number(5.0),
            Observation::Number(6.0),
        ],
    );
    let y = Variable::numeric("y", &[2.0, 4.1, 6.0, 7.9, 10.2, 11.8]);

    let output = Regression::new()
        .dependent(y)
        .independent(x)
        .save_predicted()
        .save_leverage()
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        output.table("ANOVA").unwrap().cell("Total", "df"),
        Some(&Cell::Integer(4))
    );
    let predicted = output.series("PRE_1").unwrap();
    assert_eq!(predicted.values.len(), 6);
    assert!(predicted.values[2].is_none());
    assert!(predicted.values.iter().enumerate().all(|(i, v)| i == 2 || v.is_some()));
    assert!(output.series("LEV_1").is_some());
    assert!(output.series("RES_1").is_none());
}

/// Test one residual degree of freedom.
///
/// With three cases and one predictor, deleting any case leaves an exact
/// fit, so the studentized deleted residuals are undefined and empty while
/// the other residual types are still reported.
#[test]
fn test_single_residual_degree_of_freedom() {
    let y = [1.0, 3.0, 2.0];
    let x = [1.0, 2.0, 3.0];

    let design = design_with_intercept(&[x.to_vec()]).unwrap();
    let fit = LeastSquaresFit::fit(&design, &y, &[1.0; 3]).unwrap();
    let residuals = ResidualSet::compute(&fit).unwrap();
    assert!(residuals.studentized_deleted.iter().all(|v| v.is_nan()));
    assert!(residuals.studentized.iter().all(|v| v.is_finite()));

    let output = Regression::new()
        .dependent(Variable::numeric("y", &y))
        .independent(Variable::numeric("x", &x))
        .residual_statistics()
        .save_residuals()
        .build()
        .unwrap()
        .run()
        .unwrap();

    let stats = output.table("Residuals Statistics").unwrap();
    assert!(stats.cell("Stud. Deleted Residual", "minimum").unwrap().is_empty());
    assert!(stats.cell("Stud. Deleted Residual", "stdDeviation").unwrap().is_empty());
    assert!(cell(&output, "Residuals Statistics", "Stud. Residual", "maximum").is_some());

    let sdr = output.series("SDR_1").unwrap();
    assert_eq!(sdr.values, vec![None, None, None]);
    let sre = output.series("SRE_1").unwrap();
    assert!(sre.values.iter().all(Option::is_some));
}

/// Test that a case with leverage 1 aborts the residual diagnostics.
///
/// Only the last case has `x = 1`, so the fit passes through it exactly.
#[test]
fn test_unit_leverage_is_singular() {
    let err = Regression::new()
        .dependent(Variable::numeric("y", &[1.0, 2.0, 1.5, 2.5, 9.0]))
        .independent(Variable::numeric("x", &[0.0, 0.0, 0.0, 0.0, 1.0]))
        .residual_statistics()
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SingularMatrix);
    assert_eq!(
        err.message(),
        "Case 5 has leverage 1: deleted residuals are undefined"
    );
}

/// Test that too few cases are rejected.
#[test]
fn test_too_few_cases() {
    let err = Regression::new()
        .dependent(Variable::numeric("y", &[1.0, 2.0]))
        .independent(Variable::numeric("x", &[1.0, 3.0]))
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

/// Test that linearly dependent predictors give a singular design.
#[test]
fn test_singular_design() {
    let x1 = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let x2: Vec<f64> = x1.iter().map(|v| 2.0 * v).collect();
    let err = Regression::new()
        .dependent(Variable::numeric("y", &[1.0, 3.0, 2.0, 5.0, 4.0, 6.0]))
        .independents([Variable::numeric("x1", &x1), Variable::numeric("x2", &x2)])
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SingularMatrix);
}

/// Test that a string variable is rejected by name.
#[test]
fn test_string_predictor_rejected() {
    let label = Variable::new(
        VariableMeta::new("label").with_measure(statkit::Measure::String),
        vec![Observation::from("a"), Observation::from("b"), Observation::from("c")],
    );
    let err = Regression::new()
        .dependent(Variable::numeric("y", &[1.0, 2.0, 3.0]))
        .independent(label)
        .build()
        .unwrap()
        .run()
        .unwrap_err();
    assert_eq!(err.message(), "Variable 'label' is not numeric");
}
