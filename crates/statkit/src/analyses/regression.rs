//! Linear regression with diagnostics.
//!
//! ## Purpose
//!
//! This module turns a [`RegressionRequest`] into the regression result
//! tables: descriptives, model summary with change statistics, ANOVA,
//! coefficients, coefficient correlations, collinearity diagnostics and
//! residual statistics, plus the optional saved series.
//!
//! ## Design notes
//!
//! * **Listwise deletion**: A case enters only if the dependent, every
//!   predictor and the weight are numeric and the weight is positive.
//! * **One fit**: Coefficients, leverages and sums of squares come from one
//!   [`LeastSquaresFit`] shared by every table.
//! * **Lazy residuals**: The five residual types are derived only when a
//!   table or saved series needs them.
//! * **Blank cells**: Ratios that are undefined for a perfect fit (t, F and
//!   their significance) are reported as empty cells.

// External dependencies
use log::warn;

// Internal dependencies
use crate::algorithms::collinearity::CollinearityDiagnostics;
use crate::algorithms::correlations::{
    predictor_correlations, CoefficientCorrelations, PredictorCorrelations,
};
use crate::algorithms::regression::{design_with_intercept, LeastSquaresFit};
use crate::algorithms::residuals::ResidualSet;
use crate::analyses::summarize;
use crate::engine::output::{AnalysisOutput, DerivedSeries};
use crate::engine::request::{AnalysisKind, RegressionRequest};
use crate::engine::table::{ColumnNode, ResultTable, RowNode};
use crate::engine::validator::Validator;
use crate::evaluation::intervals::{interval, t_critical};
use crate::math::distributions::{f_p_value, student_t_two_tailed};
use crate::math::linalg::Matrix;
use crate::math::moments::{weighted_mean, weighted_std_dev};
use crate::primitives::errors::AnalysisError;
use crate::primitives::sample::Variable;

const MODEL: &str = "1";
const CONSTANT: &str = "(Constant)";

/// Footnote added when the collinearity eigen-solver stops at its bound.
pub const EIGEN_NOT_CONVERGED: &str =
    "The eigenvalue solver reached its iteration limit; collinearity values are approximate.";

// ============================================================================
// Prepared Data
// ============================================================================

struct Cases {
    /// Row index of each retained case.
    rows: Vec<usize>,
    y: Vec<f64>,
    predictors: Vec<Vec<f64>>,
    weights: Vec<f64>,
}

fn listwise(request: &RegressionRequest) -> Cases {
    let n = request.dependent.values.len();
    let mut cases = Cases {
        rows: Vec::new(),
        y: Vec::new(),
        predictors: vec![Vec::new(); request.independents.len()],
        weights: Vec::new(),
    };

    'rows: for i in 0..n {
        let Some(y) = request.dependent.values.value(i) else {
            continue;
        };
        let w = match &request.weights {
            Some(wv) => match wv.values.value(i) {
                Some(w) if w > 0.0 => w,
                _ => continue,
            },
            None => 1.0,
        };
        let mut xs = Vec::with_capacity(request.independents.len());
        for x in &request.independents {
            match x.values.value(i) {
                Some(v) => xs.push(v),
                None => continue 'rows,
            }
        }

        cases.rows.push(i);
        cases.y.push(y);
        cases.weights.push(w);
        for (column, v) in cases.predictors.iter_mut().zip(xs) {
            column.push(v);
        }
    }
    cases
}

fn validate(request: &RegressionRequest) -> Result<(), AnalysisError> {
    Validator::validate_selected(&request.independents, "independent variable")?;
    Validator::validate_numeric(&request.dependent)?;
    Validator::validate_has_data(&request.dependent)?;
    for x in &request.independents {
        Validator::validate_numeric(x)?;
        Validator::validate_has_data(x)?;
    }
    if let Some(w) = &request.weights {
        Validator::validate_numeric(w)?;
    }

    let mut all: Vec<&Variable> = request.independents.iter().collect();
    if let Some(w) = &request.weights {
        all.push(w);
    }
    Validator::validate_aligned(&all, request.dependent.values.len())?;
    Validator::validate_confidence_level(request.options.confidence_level)
}

// ============================================================================
// Entry Point
// ============================================================================

/// Run a regression request.
pub fn run(request: &RegressionRequest) -> Result<AnalysisOutput, AnalysisError> {
    validate(request)?;
    let options = request.options;

    let cases = listwise(request);
    let dropped = request.dependent.values.len() - cases.rows.len();
    if dropped > 0 {
        warn!(
            "Listwise deletion excluded {} of {} cases",
            dropped,
            request.dependent.values.len()
        );
    }

    let k = request.independents.len();
    let c = cases.rows.len();
    if c <= k + 1 {
        return Err(AnalysisError::insufficient(format!(
            "{} valid cases are too few to estimate {} parameters",
            c,
            k + 1
        )));
    }

    let design = design_with_intercept(&cases.predictors)?;
    let fit = LeastSquaresFit::fit(&design, &cases.y, &cases.weights)?;

    let needs_residuals = options.residual_statistics || options.save.any_residual();
    let residuals = if needs_residuals {
        Some(ResidualSet::compute(&fit)?)
    } else {
        None
    };

    let names: Vec<String> = request
        .independents
        .iter()
        .map(|v| v.meta.display_name().to_string())
        .collect();

    let mut output = AnalysisOutput::new(AnalysisKind::Regression);
    if options.descriptives {
        output.tables.push(descriptives_table(request, &cases)?);
    }
    output.tables.push(model_summary_table(&fit, k)?);
    output.tables.push(anova_table(&fit, k)?);

    let correlations = if options.part_and_partial || options.collinearity {
        Some(predictor_correlations(&cases.y, &cases.predictors, &cases.weights)?)
    } else {
        None
    };
    output.tables.push(coefficients_table(
        &fit,
        &cases,
        &names,
        options.confidence_level,
        correlations.as_deref(),
        options.part_and_partial,
        options.collinearity,
    )?);

    if options.covariance_matrix {
        output.tables.push(coefficient_correlations_table(&fit, &names)?);
    }
    if options.collinearity {
        output.tables.push(collinearity_table(&design, &cases.weights, &names)?);
    }
    if let (true, Some(res)) = (options.residual_statistics, &residuals) {
        output.tables.push(residual_statistics_table(&fit, res)?);
    }

    output.derived = saved_series(request, &cases, &fit, residuals.as_ref());
    Ok(output)
}

// ============================================================================
// Tables
// ============================================================================

fn descriptives_table(
    request: &RegressionRequest,
    cases: &Cases,
) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Mean", "mean"),
        ColumnNode::leaf("Std. Deviation", "stdDeviation"),
        ColumnNode::leaf("N", "n"),
    ];

    let mut rows = Vec::with_capacity(cases.predictors.len() + 1);
    let series = std::iter::once((&request.dependent, &cases.y))
        .chain(request.independents.iter().zip(&cases.predictors));
    for (variable, values) in series {
        rows.push(
            RowNode::labeled(variable.meta.display_name())
                .with("mean", weighted_mean(values, &cases.weights))
                .with("stdDeviation", weighted_std_dev(values, &cases.weights))
                .with("n", values.len()),
        );
    }

    ResultTable::new("Descriptive Statistics", columns, rows)
}

fn f_change(fit: &LeastSquaresFit, k: usize) -> Result<(Option<f64>, Option<f64>), AnalysisError> {
    let df2 = fit.residual_df();
    if fit.is_exact() || df2 == 0 || k == 0 {
        return Ok((None, None));
    }
    let f = (fit.ssr / k as f64) / (fit.sse / df2 as f64);
    Ok((Some(f), Some(f_p_value(f, k as f64, df2 as f64)?)))
}

fn model_summary_table(fit: &LeastSquaresFit, k: usize) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("R", "r"),
        ColumnNode::leaf("R Square", "rSquare"),
        ColumnNode::leaf("Adjusted R Square", "adjustedRSquare"),
        ColumnNode::leaf("Std. Error of the Estimate", "stdErrorEstimate"),
        ColumnNode::group(
            "Change Statistics",
            vec![
                ColumnNode::leaf("R Square Change", "rSquareChange"),
                ColumnNode::leaf("F Change", "fChange"),
                ColumnNode::leaf("df1", "df1"),
                ColumnNode::leaf("df2", "df2"),
                ColumnNode::leaf("Sig. F Change", "sigFChange"),
            ],
        ),
    ];

    let r2 = fit.r_squared();
    let df2 = fit.residual_df();
    let adjusted = 1.0 - (1.0 - r2) * (fit.cases as f64 - 1.0) / df2 as f64;
    let (f, sig) = f_change(fit, k)?;

    let row = RowNode::labeled(MODEL)
        .with("r", r2.sqrt())
        .with("rSquare", r2)
        .with("adjustedRSquare", adjusted)
        .with("stdErrorEstimate", fit.sigma2().sqrt())
        .with("rSquareChange", r2)
        .with("fChange", f)
        .with("df1", k)
        .with("df2", df2)
        .with("sigFChange", sig);

    ResultTable::new("Model Summary", columns, vec![row])
}

fn anova_table(fit: &LeastSquaresFit, k: usize) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Sum of Squares", "sumOfSquares"),
        ColumnNode::leaf("df", "df"),
        ColumnNode::leaf("Mean Square", "meanSquare"),
        ColumnNode::leaf("F", "f"),
        ColumnNode::leaf("Sig.", "sig"),
    ];

    let df2 = fit.residual_df();
    let (f, sig) = f_change(fit, k)?;
    let children = vec![
        RowNode::labeled("Regression")
            .with("sumOfSquares", fit.ssr)
            .with("df", k)
            .with("meanSquare", fit.ssr / k as f64)
            .with("f", f)
            .with("sig", sig),
        RowNode::labeled("Residual")
            .with("sumOfSquares", fit.sse)
            .with("df", df2)
            .with("meanSquare", fit.sse / df2 as f64),
        RowNode::labeled("Total")
            .with("sumOfSquares", fit.sst)
            .with("df", fit.cases - 1),
    ];

    ResultTable::new("ANOVA", columns, vec![RowNode::group(MODEL, children)])
}

fn coefficients_table(
    fit: &LeastSquaresFit,
    cases: &Cases,
    names: &[String],
    level: f64,
    correlations: Option<&[PredictorCorrelations]>,
    part_and_partial: bool,
    collinearity: bool,
) -> Result<ResultTable, AnalysisError> {
    let percent = level * 100.0;
    let mut columns = vec![
        ColumnNode::group(
            "Unstandardized Coefficients",
            vec![
                ColumnNode::leaf("B", "b"),
                ColumnNode::leaf("Std. Error", "stdError"),
            ],
        ),
        ColumnNode::group(
            "Standardized Coefficients",
            vec![ColumnNode::leaf("Beta", "beta")],
        ),
        ColumnNode::leaf("t", "t"),
        ColumnNode::leaf("Sig.", "sig"),
        ColumnNode::group(
            format!("{}% Confidence Interval for B", percent),
            vec![
                ColumnNode::leaf("Lower Bound", "lowerBound"),
                ColumnNode::leaf("Upper Bound", "upperBound"),
            ],
        ),
    ];
    if part_and_partial {
        columns.push(ColumnNode::group(
            "Correlations",
            vec![
                ColumnNode::leaf("Zero-order", "zeroOrder"),
                ColumnNode::leaf("Partial", "partial"),
                ColumnNode::leaf("Part", "part"),
            ],
        ));
    }
    if collinearity {
        columns.push(ColumnNode::group(
            "Collinearity Statistics",
            vec![
                ColumnNode::leaf("Tolerance", "tolerance"),
                ColumnNode::leaf("VIF", "vif"),
            ],
        ));
    }

    let df = fit.residual_df() as f64;
    let critical = t_critical(level, df)?;
    let covariance = fit.coefficient_covariance();
    let sd_y = weighted_std_dev(&cases.y, &cases.weights).filter(|&s| s > 0.0);

    let mut children = Vec::with_capacity(fit.params);
    for j in 0..fit.params {
        let b = fit.coefficients[j];
        let se = covariance.get(j, j).max(0.0).sqrt();
        let (t, sig) = if se > 0.0 {
            let t = b / se;
            (Some(t), Some(student_t_two_tailed(t, df)?))
        } else {
            (None, None)
        };
        let ci = interval(b, se, critical);

        let label = if j == 0 { CONSTANT } else { names[j - 1].as_str() };
        let mut row = RowNode::labeled(label)
            .with("b", b)
            .with("stdError", se);

        if j > 0 {
            let sd_x = weighted_std_dev(&cases.predictors[j - 1], &cases.weights);
            let beta = match (sd_x, sd_y) {
                (Some(sx), Some(sy)) => Some(b * sx / sy),
                _ => None,
            };
            row = row.with("beta", beta);
        }

        row = row
            .with("t", t)
            .with("sig", sig)
            .with("lowerBound", ci.lower)
            .with("upperBound", ci.upper);

        if j > 0 {
            if let Some(pc) = correlations.map(|c| c[j - 1]) {
                if part_and_partial {
                    row = row
                        .with("zeroOrder", pc.zero_order)
                        .with("partial", pc.partial)
                        .with("part", pc.part);
                }
                if collinearity {
                    row = row.with("tolerance", pc.tolerance).with("vif", pc.vif());
                }
            }
        }
        children.push(row);
    }

    ResultTable::new("Coefficients", columns, vec![RowNode::group(MODEL, children)])
}

fn predictor_key(j: usize) -> String {
    format!("x{}", j + 1)
}

fn coefficient_correlations_table(
    fit: &LeastSquaresFit,
    names: &[String],
) -> Result<ResultTable, AnalysisError> {
    let matrices = CoefficientCorrelations::compute(fit)?;
    let columns: Vec<ColumnNode> = names
        .iter()
        .enumerate()
        .map(|(j, name)| ColumnNode::leaf(name.clone(), predictor_key(j)))
        .collect();

    let block = |label: &str, m: &Matrix<f64>| {
        let rows = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                (0..names.len()).fold(RowNode::labeled(name.clone()), |row, j| {
                    row.with(predictor_key(j), m.get(i, j))
                })
            })
            .collect();
        RowNode::group(label, rows)
    };

    let model = RowNode::Group {
        row_header: vec![Some(MODEL.to_string())],
        children: vec![
            block("Correlations", &matrices.correlation),
            block("Covariances", &matrices.covariance),
        ],
    };

    ResultTable::new("Coefficient Correlations", columns, vec![model])
}

fn collinearity_table(
    design: &Matrix<f64>,
    weights: &[f64],
    names: &[String],
) -> Result<ResultTable, AnalysisError> {
    // Weighted designs enter with rows scaled by sqrt(w).
    let scaled_rows: Vec<Vec<f64>> = (0..design.rows())
        .map(|r| {
            let root = weights[r].sqrt();
            design.row(r).iter().map(|v| v * root).collect()
        })
        .collect();
    let diagnostics = CollinearityDiagnostics::compute(&Matrix::from_rows(&scaled_rows)?)?;

    let mut proportion_columns = vec![ColumnNode::leaf(CONSTANT, "constant")];
    proportion_columns.extend(
        names
            .iter()
            .enumerate()
            .map(|(j, name)| ColumnNode::leaf(name.clone(), predictor_key(j))),
    );
    let columns = vec![
        ColumnNode::leaf("Eigenvalue", "eigenvalue"),
        ColumnNode::leaf("Condition Index", "conditionIndex"),
        ColumnNode::group("Variance Proportions", proportion_columns),
    ];

    let children = diagnostics
        .eigenvalues
        .iter()
        .enumerate()
        .map(|(d, &lambda)| {
            let proportions = &diagnostics.variance_proportions[d];
            let row = RowNode::labeled((d + 1).to_string())
                .with("eigenvalue", lambda)
                .with("conditionIndex", diagnostics.condition_indices[d])
                .with("constant", proportions[0]);
            (1..proportions.len()).fold(row, |row, j| {
                row.with(predictor_key(j - 1), proportions[j])
            })
        })
        .collect();

    let table = ResultTable::new(
        "Collinearity Diagnostics",
        columns,
        vec![RowNode::group(MODEL, children)],
    )?;
    Ok(if diagnostics.converged {
        table
    } else {
        table.with_footnote(EIGEN_NOT_CONVERGED)
    })
}

fn residual_statistics_table(
    fit: &LeastSquaresFit,
    residuals: &ResidualSet,
) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Minimum", "minimum"),
        ColumnNode::leaf("Maximum", "maximum"),
        ColumnNode::leaf("Mean", "mean"),
        ColumnNode::leaf("Std. Deviation", "stdDeviation"),
        ColumnNode::leaf("N", "n"),
    ];

    let (_, _, pred_mean, pred_sd) = summarize(&fit.fitted);
    let std_predicted: Vec<f64> = fit
        .fitted
        .iter()
        .map(|v| match pred_sd {
            Some(sd) if sd > 0.0 => (v - pred_mean.unwrap_or(0.0)) / sd,
            _ => f64::NAN,
        })
        .collect();
    let centered_leverage: Vec<f64> = fit
        .leverage
        .iter()
        .map(|h| h - 1.0 / fit.cases as f64)
        .collect();

    let series: [(&str, &[f64]); 8] = [
        ("Predicted Value", fit.fitted.as_slice()),
        ("Std. Predicted Value", std_predicted.as_slice()),
        ("Residual", residuals.unstandardized.as_slice()),
        ("Std. Residual", residuals.standardized.as_slice()),
        ("Stud. Residual", residuals.studentized.as_slice()),
        ("Deleted Residual", residuals.deleted.as_slice()),
        ("Stud. Deleted Residual", residuals.studentized_deleted.as_slice()),
        ("Centered Leverage Value", centered_leverage.as_slice()),
    ];

    let rows = series
        .iter()
        .map(|(label, values)| {
            let (min, max, mean, sd) = summarize(values);
            RowNode::labeled(*label)
                .with("minimum", min)
                .with("maximum", max)
                .with("mean", mean)
                .with("stdDeviation", sd)
                .with("n", values.len())
        })
        .collect();

    ResultTable::new("Residuals Statistics", columns, rows)
}

// ============================================================================
// Saved Series
// ============================================================================

fn saved_series(
    request: &RegressionRequest,
    cases: &Cases,
    fit: &LeastSquaresFit,
    residuals: Option<&ResidualSet>,
) -> Vec<DerivedSeries> {
    let save = request.options.save;
    let rows = request.dependent.values.len();
    let scatter = |name: &str, label: &str, values: &[f64]| {
        DerivedSeries::scattered(name, label, rows, &cases.rows, values)
    };

    let mut out = Vec::new();
    if save.predicted {
        out.push(scatter("PRE_1", "Unstandardized Predicted Value", &fit.fitted));
    }
    if let Some(res) = residuals {
        let wanted: [(bool, &str, &str, &[f64]); 5] = [
            (
                save.unstandardized,
                "RES_1",
                "Unstandardized Residual",
                &res.unstandardized,
            ),
            (
                save.standardized,
                "ZRE_1",
                "Standardized Residual",
                &res.standardized,
            ),
            (
                save.studentized,
                "SRE_1",
                "Studentized Residual",
                &res.studentized,
            ),
            (save.deleted, "DRE_1", "Deleted Residual", &res.deleted),
            (
                save.studentized_deleted,
                "SDR_1",
                "Studentized Deleted Residual",
                &res.studentized_deleted,
            ),
        ];
        for (on, name, label, values) in wanted {
            if on {
                out.push(scatter(name, label, values));
            }
        }
    }
    if save.leverage {
        out.push(scatter("LEV_1", "Leverage Value", &fit.leverage));
    }
    out
}
