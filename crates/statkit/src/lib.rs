//! # statkit: Numerical Engine for a Statistical Workbench
//!
//! A self-contained numerical core covering dense linear algebra, the
//! common sampling distributions, linear regression with a full diagnostic
//! suite, classical time-series analyses and the chi-square goodness-of-fit
//! test. Every analysis renders its results as structured tables that can be
//! printed or serialized to JSON.
//!
//! ## What is in the box?
//!
//! | Analysis                | Builder          | Main tables                                    |
//! |-------------------------|------------------|------------------------------------------------|
//! | Linear regression       | `Regression`     | Model Summary, ANOVA, Coefficients, diagnostics |
//! | Seasonal decomposition  | `Decomposition`  | Seasonal Factors, Trend Model, Forecast        |
//! | Exponential smoothing   | `Smoothing`      | Smoothing Parameters, Forecast, Evaluation     |
//! | ARIMA(p, d, q)          | `Arima`          | Parameter Estimates, Model Statistics          |
//! | Chi-square test         | `ChiSquare`      | Frequencies, Test Statistics                   |
//!
//! ## Quick Start
//!
//! ```rust
//! use statkit::prelude::*;
//!
//! let grade = Variable::numeric("grade", &[1.0, 1.0, 1.0, 2.0, 2.0, 3.0]);
//!
//! // Build the request
//! let request = ChiSquare::new().variable(grade).build()?;
//!
//! // Run it
//! let output = request.run()?;
//!
//! let stats = output.table("Test Statistics").expect("table is always emitted");
//! let chi = stats.cell("Chi-Square", "v1").and_then(|c| c.as_f64());
//! assert!((chi.unwrap() - 1.0).abs() < 1e-12);
//! # Result::<(), AnalysisError>::Ok(())
//! ```
//!
//! ### Regression
//!
//! ```rust
//! use statkit::prelude::*;
//!
//! let x = Variable::numeric("x", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! let y = Variable::numeric("y", &[2.1, 3.9, 6.2, 7.8, 10.1, 12.0]);
//!
//! let output = Regression::new()
//!     .dependent(y)
//!     .independent(x)
//!     .collinearity()         // Tolerance, VIF and eigen diagnostics
//!     .residual_statistics()  // Residuals Statistics table
//!     .save_residuals()       // RES_1, ZRE_1, SRE_1, DRE_1, SDR_1
//!     .build()?
//!     .run()?;
//!
//! println!("{}", output);
//! # Result::<(), AnalysisError>::Ok(())
//! ```
//!
//! ### Time series
//!
//! Time-series analyses need a time specification that defines the
//! periodicity of the data:
//!
//! ```rust
//! use statkit::prelude::*;
//!
//! let values: Vec<f64> = (0..48).map(|t| 10.0 + (t % 12) as f64).collect();
//! let sales = Variable::numeric("sales", &values);
//!
//! let output = Smoothing::new()
//!     .variable(sales)
//!     .time(YearsMonths)
//!     .method(WintersAdditive)
//!     .forecast(12)
//!     .build()?
//!     .run()?;
//!
//! assert!(output.table("Forecast").is_some());
//! # Result::<(), AnalysisError>::Ok(())
//! ```
//!
//! ## Error Handling
//!
//! Every fallible operation returns `Result<_, AnalysisError>`. Errors are
//! grouped into five kinds (see [`ErrorKind`]): insufficient data, invalid
//! parameter, singular matrix, non-convergence and internal. Numerically
//! undefined statistics (a ratio with a zero denominator, say) are not
//! errors: they appear as empty cells in the output tables.
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: `debug!`
//! for analysis start and finish, `warn!` for recoverable conditions such as
//! dropped cases or an unconverged eigen solver. Install any logger to see
//! them.
//!
//! ## Parallel Dispatch
//!
//! For running many requests concurrently with timeouts, see the companion
//! crate `fastStatkit`.

// Layer 1: Primitives - data structures and basic utilities.
mod primitives;

// Layer 2: Math - linear algebra, special functions and distributions.
mod math;

// Layer 3: Algorithms - model fitting and numerical procedures.
mod algorithms;

// Layer 4: Evaluation - fit diagnostics and interval estimation.
mod evaluation;

// Layer 5: Engine - requests, validation, tables and execution.
mod engine;

// Layer 6: Analyses - table rendering for each analysis kind.
mod analyses;

// High-level fluent API for statistical analyses.
mod api;

pub use api::*;

// Standard statkit prelude.
pub mod prelude {
    pub use crate::api::{
        AnalysisError, AnalysisKind, AnalysisOutput, AnalysisRequest, ArimaBuilder as Arima,
        Cell, ChiSquareBuilder as ChiSquare,
        DecompositionBuilder as Decomposition,
        DecompositionMethod::{Additive, Multiplicative},
        DerivedSeries, ErrorKind, Observation, RegressionBuilder as Regression, ResultTable,
        Sample,
        SmoothingBuilder as Smoothing,
        SmoothingMethod::{Holt, Simple, WintersAdditive, WintersMultiplicative},
        TimeSpecification::{
            Days, DaysHours, DaysWorkHours8, Hours, Minutes, NotDated, Years,
            YearsMonths, YearsQuarters, WeeksDays, WeeksWorkDays5, WeeksWorkDays6,
        },
        TrendMethod, Variable, VariableMeta,
    };
}

// Internal modules for development and testing.
//
// This module re-exports every layer so integration tests and benchmarks can
// reach the numerical building blocks directly. It is not part of the stable
// API.
#[doc(hidden)]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod math {
        pub use crate::math::*;
    }
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod analyses {
        pub use crate::analyses::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
