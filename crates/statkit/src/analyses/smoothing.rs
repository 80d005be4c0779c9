//! Exponential smoothing analysis.
//!
//! Runs the requested smoothing model on every series and reports the model
//! description, the weights used, forecasts and the evaluation block. Seasonal
//! models pass the full time-series gate; level and trend models only need
//! numeric, non-empty series.

// Internal dependencies
use crate::algorithms::smoothing::{smooth, SmoothingFit};
use crate::analyses::decomposition::{evaluation_columns, evaluation_row};
use crate::analyses::{fitted_and_forecast, series_values};
use crate::engine::output::{AnalysisOutput, DerivedSeries};
use crate::engine::request::{AnalysisKind, SmoothingRequest};
use crate::engine::table::{ColumnNode, ResultTable, RowNode};
use crate::engine::validator::Validator;
use crate::evaluation::diagnostics::ForecastDiagnostics;
use crate::primitives::errors::AnalysisError;
use crate::primitives::sample::Variable;

/// Run a smoothing request.
pub fn run(request: &SmoothingRequest) -> Result<AnalysisOutput, AnalysisError> {
    let options = request.options;
    let method = options.method;
    let period =
        Validator::validate_time_series(&request.variables, request.time, method.is_seasonal())?;
    Validator::validate_smoothing_parameters(method, options.parameters)?;
    Validator::validate_forecast_horizon(options.forecast_horizon)?;

    let mut fits: Vec<(&Variable, Vec<f64>, SmoothingFit)> = Vec::new();
    for variable in &request.variables {
        let y = series_values(variable)?;
        let fit = smooth(
            &y,
            method,
            options.parameters,
            period,
            options.forecast_horizon,
        )?;
        fits.push((variable, y, fit));
    }

    let mut output = AnalysisOutput::new(AnalysisKind::Smoothing);

    let description = fits
        .iter()
        .map(|(variable, y, _)| {
            let mut rows = vec![
                RowNode::labeled("Series Name").with("value", variable.name()),
                RowNode::labeled("Method").with("value", method.to_string()),
                RowNode::labeled("Observations").with("value", y.len()),
            ];
            if let (true, Some(m)) = (method.is_seasonal(), period) {
                rows.push(RowNode::labeled("Periodicity").with("value", m));
            }
            RowNode::group(variable.meta.display_name(), rows)
        })
        .collect();
    output.tables.push(ResultTable::new(
        "Model Description",
        vec![ColumnNode::leaf("Value", "value")],
        description,
    )?);

    let mut parameter_columns = vec![ColumnNode::leaf("Alpha (Level)", "alpha")];
    if method.has_trend() {
        parameter_columns.push(ColumnNode::leaf("Gamma (Trend)", "gamma"));
    }
    if method.is_seasonal() {
        parameter_columns.push(ColumnNode::leaf("Delta (Season)", "delta"));
    }
    let p = options.parameters;
    let parameter_rows = fits
        .iter()
        .map(|(variable, _, _)| {
            let mut row = RowNode::labeled(variable.meta.display_name()).with("alpha", p.alpha);
            if method.has_trend() {
                row = row.with("gamma", p.gamma);
            }
            if method.is_seasonal() {
                row = row.with("delta", p.delta);
            }
            row
        })
        .collect();
    output.tables.push(ResultTable::new(
        "Smoothing Parameters",
        parameter_columns,
        parameter_rows,
    )?);

    if options.forecast_horizon > 0 {
        let columns = fits
            .iter()
            .enumerate()
            .map(|(i, (v, _, _))| ColumnNode::leaf(v.meta.display_name(), format!("v{}", i + 1)))
            .collect();
        let rows = (0..options.forecast_horizon)
            .map(|h| {
                fits.iter().enumerate().fold(
                    RowNode::labeled(format!("t+{}", h + 1)),
                    |row, (i, (_, _, fit))| row.with(format!("v{}", i + 1), fit.forecast[h]),
                )
            })
            .collect();
        output
            .tables
            .push(ResultTable::new("Forecast", columns, rows)?);
    }

    let evaluation = fits
        .iter()
        .map(|(variable, y, fit)| {
            evaluation_row(
                variable.meta.display_name(),
                ForecastDiagnostics::compute(y, &fit.fitted),
            )
        })
        .collect();
    output
        .tables
        .push(ResultTable::new("Evaluation", evaluation_columns(), evaluation)?);

    for (variable, _, fit) in &fits {
        output.derived.push(DerivedSeries::new(
            format!("FIT_{}", variable.name()),
            format!("Smoothed values of {}", variable.meta.display_name()),
            fit.fitted.clone(),
        ));
        if options.save_forecast {
            output.derived.push(DerivedSeries::new(
                format!("FCT_{}", variable.name()),
                format!("Fitted and forecast values of {}", variable.meta.display_name()),
                fitted_and_forecast(&fit.fitted, &fit.forecast),
            ));
        }
    }

    Ok(output)
}
