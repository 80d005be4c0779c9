//! Chi-square goodness-of-fit analysis.
//!
//! Produces one frequency table per test variable (observed, expected and
//! residual counts), a combined "Test Statistics" table with one column per
//! variable and, on request, a descriptive statistics table.

// Internal dependencies
use crate::algorithms::chisquare::{goodness_of_fit, ChiSquareTest};
use crate::analyses::summarize;
use crate::engine::output::AnalysisOutput;
use crate::engine::request::{AnalysisKind, ChiSquareRequest};
use crate::engine::table::{ColumnNode, ResultTable, RowNode};
use crate::engine::validator::Validator;
use crate::primitives::errors::AnalysisError;
use crate::primitives::sample::Variable;

/// Run a chi-square request.
pub fn run(request: &ChiSquareRequest) -> Result<AnalysisOutput, AnalysisError> {
    Validator::validate_selected(&request.variables, "test variable")?;
    for v in &request.variables {
        Validator::validate_numeric(v)?;
        Validator::validate_has_data(v)?;
    }
    let options = &request.options;
    Validator::validate_expected(options.range, &options.expected)?;

    let mut tests: Vec<(&Variable, Vec<f64>, ChiSquareTest)> = Vec::new();
    for variable in &request.variables {
        let values = variable.values.numeric_values();
        let test = goodness_of_fit(&values, options.range, &options.expected)?;
        tests.push((variable, values, test));
    }

    let mut output = AnalysisOutput::new(AnalysisKind::ChiSquare);
    if options.descriptives {
        output.tables.push(descriptives_table(&tests)?);
    }
    for (variable, _, test) in &tests {
        output.tables.push(frequency_table(variable, test)?);
    }
    output.tables.push(statistics_table(&tests)?);
    Ok(output)
}

fn descriptives_table(
    tests: &[(&Variable, Vec<f64>, ChiSquareTest)],
) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("N", "n"),
        ColumnNode::leaf("Mean", "mean"),
        ColumnNode::leaf("Std. Deviation", "stdDeviation"),
        ColumnNode::leaf("Minimum", "minimum"),
        ColumnNode::leaf("Maximum", "maximum"),
    ];
    let rows = tests
        .iter()
        .map(|(variable, values, _)| {
            let (min, max, mean, sd) = summarize(values);
            RowNode::labeled(variable.meta.display_name())
                .with("n", values.len())
                .with("mean", mean)
                .with("stdDeviation", sd)
                .with("minimum", min)
                .with("maximum", max)
        })
        .collect();
    ResultTable::new("Descriptive Statistics", columns, rows)
}

fn frequency_table(variable: &Variable, test: &ChiSquareTest) -> Result<ResultTable, AnalysisError> {
    let columns = vec![
        ColumnNode::leaf("Observed N", "observed"),
        ColumnNode::leaf("Expected N", "expected"),
        ColumnNode::leaf("Residual", "residual"),
    ];
    let mut rows: Vec<RowNode> = test
        .categories
        .iter()
        .map(|c| {
            RowNode::labeled(c.category.to_string())
                .with("observed", c.observed)
                .with("expected", c.expected)
                .with("residual", c.residual())
        })
        .collect();
    rows.push(RowNode::labeled("Total").with("observed", test.total));

    ResultTable::new(variable.meta.display_name(), columns, rows)
}

fn statistics_table(
    tests: &[(&Variable, Vec<f64>, ChiSquareTest)],
) -> Result<ResultTable, AnalysisError> {
    let key = |i: usize| format!("v{}", i + 1);
    let columns = tests
        .iter()
        .enumerate()
        .map(|(i, (v, _, _))| ColumnNode::leaf(v.meta.display_name(), key(i)))
        .collect();

    let mut chi = RowNode::labeled("Chi-Square");
    let mut df = RowNode::labeled("df");
    let mut sig = RowNode::labeled("Asymp. Sig.");
    for (i, (_, _, test)) in tests.iter().enumerate() {
        chi = chi.with(key(i), test.statistic);
        df = df.with(key(i), test.df);
        sig = sig.with(key(i), test.p_value);
    }

    let mut table = ResultTable::new("Test Statistics", columns, vec![chi, df, sig])?;
    for (variable, _, test) in tests {
        let k = test.categories.len();
        let min_expected = test
            .categories
            .iter()
            .map(|c| c.expected)
            .fold(f64::INFINITY, f64::min);
        table = table.with_footnote(format!(
            "{}: {} cells ({:.1}%) have expected frequencies less than 5. \
             The minimum expected cell frequency is {:.1}.",
            variable.meta.display_name(),
            test.sparse_cells,
            100.0 * test.sparse_cells as f64 / k as f64,
            min_expected
        ));
    }
    Ok(table)
}
