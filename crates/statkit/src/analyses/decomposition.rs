//! Seasonal decomposition analysis.
//!
//! ## Purpose
//!
//! This module runs the classical decomposition on every requested series
//! and reports the model description, seasonal factors, trend model,
//! forecasts and evaluation metrics. The trend, seasonal and irregular
//! components are returned as derived series.
//!
//! ## Invariants
//!
//! * The time-series gate has passed before any computation.
//! * Additive models report their trend method as "None".

// Internal dependencies
use crate::algorithms::decomposition::{decompose, Decomposition};
use crate::analyses::{fitted_and_forecast, series_values};
use crate::engine::output::{AnalysisOutput, DerivedSeries};
use crate::engine::request::{AnalysisKind, DecompositionRequest};
use crate::engine::table::{ColumnNode, ResultTable, RowNode};
use crate::engine::validator::Validator;
use crate::evaluation::diagnostics::ForecastDiagnostics;
use crate::primitives::errors::AnalysisError;
use crate::primitives::sample::Variable;

/// Run a decomposition request.
pub fn run(request: &DecompositionRequest) -> Result<AnalysisOutput, AnalysisError> {
    let period = Validator::validate_time_series(&request.variables, request.time, true)?
        .ok_or_else(|| AnalysisError::internal("Seasonal gate passed without a periodicity"))?;
    let options = request.options;
    Validator::validate_forecast_horizon(options.forecast_horizon)?;

    let mut fits: Vec<(&Variable, Vec<f64>, Decomposition)> = Vec::new();
    for variable in &request.variables {
        let y = series_values(variable)?;
        let fit = decompose(
            &y,
            period,
            options.method,
            options.trend,
            options.forecast_horizon,
        )?;
        fits.push((variable, y, fit));
    }

    let mut output = AnalysisOutput::new(AnalysisKind::Decomposition);
    output.tables.push(description_table(request, period, &fits)?);
    output.tables.push(seasonal_factors_table(period, &fits)?);
    output.tables.push(trend_table(&fits)?);
    if options.forecast_horizon > 0 {
        output.tables.push(forecast_table(&fits)?);
    }
    if options.evaluate {
        output.tables.push(evaluation_table(&fits)?);
    }

    for (variable, _, fit) in &fits {
        let name = variable.name();
        let wrap = |v: &[f64]| v.iter().map(|&x| Some(x)).collect::<Vec<_>>();
        output.derived.push(DerivedSeries::new(
            format!("TRD_{}", name),
            format!("Trend of {}", variable.meta.display_name()),
            wrap(&fit.trend),
        ));
        output.derived.push(DerivedSeries::new(
            format!("SEA_{}", name),
            format!("Seasonal component of {}", variable.meta.display_name()),
            wrap(&fit.seasonal),
        ));
        output.derived.push(DerivedSeries::new(
            format!("IRR_{}", name),
            format!("Irregular component of {}", variable.meta.display_name()),
            wrap(&fit.irregular),
        ));
        if options.save_forecast {
            output.derived.push(DerivedSeries::new(
                format!("FCT_{}", name),
                format!("Fitted and forecast values of {}", variable.meta.display_name()),
                fitted_and_forecast(&wrap(&fit.fitted), &fit.forecast),
            ));
        }
    }

    Ok(output)
}

fn variable_key(i: usize) -> String {
    format!("v{}", i + 1)
}

fn variable_columns(fits: &[(&Variable, Vec<f64>, Decomposition)]) -> Vec<ColumnNode> {
    fits.iter()
        .enumerate()
        .map(|(i, (v, _, _))| ColumnNode::leaf(v.meta.display_name(), variable_key(i)))
        .collect()
}

fn description_table(
    request: &DecompositionRequest,
    period: usize,
    fits: &[(&Variable, Vec<f64>, Decomposition)],
) -> Result<ResultTable, AnalysisError> {
    let columns = vec![ColumnNode::leaf("Value", "value")];
    let rows = fits
        .iter()
        .map(|(variable, y, fit)| {
            RowNode::group(
                variable.meta.display_name(),
                vec![
                    RowNode::labeled("Series Name").with("value", variable.name()),
                    RowNode::labeled("Method").with("value", fit.method.to_string()),
                    RowNode::labeled("Trend Method").with("value", fit.trend_method.to_string()),
                    RowNode::labeled("Period").with("value", request.time.period_name()),
                    RowNode::labeled("Periodicity").with("value", period),
                    RowNode::labeled("Observations").with("value", y.len()),
                ],
            )
        })
        .collect();
    ResultTable::new("Model Description", columns, rows)
}

fn seasonal_factors_table(
    period: usize,
    fits: &[(&Variable, Vec<f64>, Decomposition)],
) -> Result<ResultTable, AnalysisError> {
    let rows = (0..period)
        .map(|pos| {
            fits.iter()
                .enumerate()
                .fold(RowNode::labeled((pos + 1).to_string()), |row, (i, (_, _, fit))| {
                    row.with(variable_key(i), fit.seasonal_indices[pos])
                })
        })
        .collect();
    ResultTable::new("Seasonal Factors", variable_columns(fits), rows)
}

fn trend_table(fits: &[(&Variable, Vec<f64>, Decomposition)]) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Intercept", "intercept"),
        ColumnNode::leaf("Slope", "slope"),
    ];
    let rows = fits
        .iter()
        .map(|(variable, _, fit)| {
            RowNode::labeled(variable.meta.display_name())
                .with("intercept", fit.trend_fit.intercept)
                .with("slope", fit.trend_fit.slope)
        })
        .collect();
    ResultTable::new("Trend Model", columns, rows)
}

fn forecast_table(
    fits: &[(&Variable, Vec<f64>, Decomposition)],
) -> Result<ResultTable, AnalysisError> {
    let horizon = fits.first().map_or(0, |(_, _, f)| f.forecast.len());
    let rows = (0..horizon)
        .map(|h| {
            fits.iter().enumerate().fold(
                RowNode::labeled(format!("t+{}", h + 1)),
                |row, (i, (_, _, fit))| row.with(variable_key(i), fit.forecast[h]),
            )
        })
        .collect();
    ResultTable::new("Forecast", variable_columns(fits), rows)
}

fn evaluation_table(
    fits: &[(&Variable, Vec<f64>, Decomposition)],
) -> Result<ResultTable, AnalysisError> {
    let rows = fits
        .iter()
        .map(|(variable, y, fit)| {
            evaluation_row(
                variable.meta.display_name(),
                ForecastDiagnostics::from_complete(y, &fit.fitted),
            )
        })
        .collect();
    ResultTable::new("Evaluation", evaluation_columns(), rows)
}

/// Columns of an evaluation block.
pub(crate) fn evaluation_columns() -> Vec<ColumnNode> {
    vec![
        ColumnNode::leaf("MSE", "mse"),
        ColumnNode::leaf("RMSE", "rmse"),
        ColumnNode::leaf("MAE", "mae"),
        ColumnNode::leaf("MPE", "mpe"),
        ColumnNode::leaf("MAPE", "mape"),
        ColumnNode::leaf("R Square", "rSquare"),
    ]
}

/// One evaluation row; blank when nothing could be compared.
pub(crate) fn evaluation_row(label: &str, diagnostics: Option<ForecastDiagnostics>) -> RowNode {
    let row = RowNode::labeled(label);
    match diagnostics {
        Some(d) => row
            .with("mse", d.mse)
            .with("rmse", d.rmse)
            .with("mae", d.mae)
            .with("mpe", d.mpe)
            .with("mape", d.mape)
            .with("rSquare", d.r_squared),
        None => row,
    }
}
