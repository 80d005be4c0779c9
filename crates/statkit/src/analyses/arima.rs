//! ARIMA analysis.
//!
//! ## Purpose
//!
//! This module fits the requested ARIMA model to every series and reports
//! the model description, parameter estimates with t-tests, model-selection
//! criteria, fit statistics and (optionally) forecasts with prediction
//! intervals.
//!
//! ## Invariants
//!
//! * Orders are within `p ≤ 5`, `d ≤ 2`, `q ≤ 5`.
//! * Each series has at least 20 observations after trailing missing rows
//!   are trimmed.

// Internal dependencies
use crate::algorithms::arima::{fit_arima, ArimaFit, ArimaForecast, MIN_OBSERVATIONS};
use crate::analyses::decomposition::{evaluation_columns, evaluation_row};
use crate::analyses::{fitted_and_forecast, series_values};
use crate::engine::output::{AnalysisOutput, DerivedSeries};
use crate::engine::request::{AnalysisKind, ArimaRequest};
use crate::engine::table::{ColumnNode, ResultTable, RowNode};
use crate::engine::validator::Validator;
use crate::evaluation::diagnostics::ForecastDiagnostics;
use crate::evaluation::intervals::z_critical;
use crate::math::distributions::student_t_two_tailed;
use crate::primitives::errors::AnalysisError;
use crate::primitives::sample::Variable;
use crate::primitives::time::TimeSpecification;

struct Fitted<'a> {
    variable: &'a Variable,
    y: Vec<f64>,
    fit: ArimaFit,
    forecast: ArimaForecast,
}

/// Run an ARIMA request.
pub fn run(request: &ArimaRequest) -> Result<AnalysisOutput, AnalysisError> {
    let options = request.options;
    Validator::validate_time_series(&request.variables, TimeSpecification::NotDated, false)?;
    Validator::validate_arima_order(options.order)?;
    Validator::validate_confidence_level(options.confidence_level)?;
    Validator::validate_forecast_horizon(options.forecast_horizon)?;
    let z = z_critical(options.confidence_level)?;

    let mut models = Vec::with_capacity(request.variables.len());
    for variable in &request.variables {
        let y = series_values(variable)?;
        Validator::validate_series_length(variable, y.len(), MIN_OBSERVATIONS)?;
        let fit = fit_arima(&y, options.order, options.constant)?;
        let forecast = fit.forecast(options.forecast_horizon, z);
        models.push(Fitted {
            variable,
            y,
            fit,
            forecast,
        });
    }

    let mut output = AnalysisOutput::new(AnalysisKind::Arima);
    output.tables.push(description_table(&models)?);
    output.tables.push(parameters_table(&models)?);
    output.tables.push(criteria_table(&models)?);

    let evaluation = models
        .iter()
        .map(|m| {
            evaluation_row(
                m.variable.meta.display_name(),
                ForecastDiagnostics::compute(&m.y, &m.fit.fitted),
            )
        })
        .collect();
    output
        .tables
        .push(ResultTable::new("Model Fit", evaluation_columns(), evaluation)?);

    if options.forecast_horizon > 0 {
        output
            .tables
            .push(forecast_table(&models, options.confidence_level)?);
    }

    if options.save_forecast {
        for m in &models {
            output.derived.push(DerivedSeries::new(
                format!("FCT_{}", m.variable.name()),
                format!(
                    "ARIMA fitted and forecast values of {}",
                    m.variable.meta.display_name()
                ),
                fitted_and_forecast(&m.fit.fitted, &m.forecast.values),
            ));
        }
    }

    Ok(output)
}

fn description_table(models: &[Fitted<'_>]) -> Result<ResultTable, AnalysisError> {
    let rows = models
        .iter()
        .map(|m| {
            let o = m.fit.order;
            RowNode::group(
                m.variable.meta.display_name(),
                vec![
                    RowNode::labeled("Model")
                        .with("value", format!("ARIMA({},{},{})", o.p, o.d, o.q)),
                    RowNode::labeled("Constant")
                        .with("value", if m.fit.constant { "Included" } else { "Excluded" }),
                    RowNode::labeled("Observations").with("value", m.y.len()),
                    RowNode::labeled("Effective Observations").with("value", m.fit.effective_n),
                    RowNode::labeled("Iterations").with("value", m.fit.iterations),
                ],
            )
        })
        .collect();
    ResultTable::new(
        "Model Description",
        vec![ColumnNode::leaf("Value", "value")],
        rows,
    )
}

fn parameters_table(models: &[Fitted<'_>]) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Estimate", "estimate"),
        ColumnNode::leaf("SE", "se"),
        ColumnNode::leaf("t", "t"),
        ColumnNode::leaf("Sig.", "sig"),
    ];

    let mut rows = Vec::with_capacity(models.len());
    for m in models {
        let df = m.fit.residual_df() as f64;
        let mut children = Vec::with_capacity(m.fit.parameters.len());
        for p in &m.fit.parameters {
            let (t, sig) = if p.std_error > 0.0 {
                let t = p.estimate / p.std_error;
                (Some(t), Some(student_t_two_tailed(t, df)?))
            } else {
                (None, None)
            };
            children.push(
                RowNode::labeled(p.name.clone())
                    .with("estimate", p.estimate)
                    .with("se", p.std_error)
                    .with("t", t)
                    .with("sig", sig),
            );
        }
        if children.is_empty() {
            children.push(RowNode::labeled("No parameters estimated"));
        }
        rows.push(RowNode::group(m.variable.meta.display_name(), children));
    }

    ResultTable::new("Parameter Estimates", columns, rows)
}

fn criteria_table(models: &[Fitted<'_>]) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Residual Variance", "sigma2"),
        ColumnNode::leaf("Log-Likelihood", "logLikelihood"),
        ColumnNode::leaf("AIC", "aic"),
        ColumnNode::leaf("BIC", "bic"),
        ColumnNode::leaf("df", "df"),
    ];
    let rows = models
        .iter()
        .map(|m| {
            RowNode::labeled(m.variable.meta.display_name())
                .with("sigma2", m.fit.sigma2)
                .with("logLikelihood", m.fit.log_likelihood)
                .with("aic", m.fit.aic)
                .with("bic", m.fit.bic)
                .with("df", m.fit.residual_df())
        })
        .collect();
    ResultTable::new("Model Statistics", columns, rows)
}

fn forecast_table(models: &[Fitted<'_>], level: f64) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Forecast", "forecast"),
        ColumnNode::leaf("SE", "se"),
        ColumnNode::group(
            format!("{}% Prediction Interval", level * 100.0),
            vec![
                ColumnNode::leaf("Lower", "lower"),
                ColumnNode::leaf("Upper", "upper"),
            ],
        ),
    ];
    let rows = models
        .iter()
        .map(|m| {
            let f = &m.forecast;
            let children = (0..f.values.len())
                .map(|h| {
                    RowNode::labeled(format!("t+{}", h + 1))
                        .with("forecast", f.values[h])
                        .with("se", f.std_errors[h])
                        .with("lower", f.lower[h])
                        .with("upper", f.upper[h])
                })
                .collect();
            RowNode::group(m.variable.meta.display_name(), children)
        })
        .collect();
    ResultTable::new("Forecast", columns, rows)
}
