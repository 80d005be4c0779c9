//! Tests for the parallel job dispatcher.
//!
//! ## Test Organization
//!
//! 1. **Configuration** - Pool settings and their validation
//! 2. **Submission** - Single jobs, identifiers and failures
//! 3. **Batches** - Ordered parallel execution
//! 4. **Budgets** - Jobs that outlive their wall-clock budget

use approx::assert_relative_eq;
use std::time::{Duration, Instant};

use fastStatkit::prelude::*;
use fastStatkit::{run_isolated, ErrorKind, DEFAULT_BUDGET, DEFAULT_THREAD_NAME};

fn chi_square(values: &[f64]) -> AnalysisRequest {
    ChiSquare::new()
        .variable(Variable::numeric("grade", values))
        .build()
        .unwrap()
}

fn chi_square_statistic(output: &AnalysisOutput) -> f64 {
    output
        .table("Test Statistics")
        .and_then(|t| t.cell("Chi-Square", "v1"))
        .and_then(|c| c.as_f64())
        .unwrap()
}

/// A long ARIMA series that keeps a worker busy for a while.
fn slow_request() -> AnalysisRequest {
    let mut state = 11_u64;
    let mut y = vec![0.0; 4000];
    for t in 2..y.len() {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let e = (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5;
        y[t] = 0.5 * y[t - 1] - 0.2 * y[t - 2] + e;
    }
    Arima::new()
        .variable(Variable::numeric("x", &y))
        .order(2, 0, 2)
        .build()
        .unwrap()
}

// ============================================================================
// Configuration Tests
// ============================================================================

/// Test configuration defaults.
#[test]
fn test_config_defaults() {
    let config = DispatchConfig::default();
    assert!(config.workers >= 1);
    assert_eq!(config.budget, DEFAULT_BUDGET);
    assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    assert!(config.validate().is_ok());
}

/// Test that invalid settings are rejected before the pool starts.
#[test]
fn test_invalid_config() {
    let cases = [
        DispatchConfig::new().workers(0),
        DispatchConfig::new().budget(Duration::ZERO),
        DispatchConfig::new().thread_name("  "),
    ];
    for config in cases {
        let err = Dispatcher::new(config).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidConfig(_)));
        assert!(err.analysis().is_none());
    }

    let err = Dispatcher::new(DispatchConfig::new().workers(0)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid dispatch configuration: Worker count must be at least 1"
    );
}

/// Test that the pool honours the worker count and budget.
#[test]
fn test_dispatcher_settings() {
    let dispatcher = Dispatcher::new(
        DispatchConfig::new()
            .workers(3)
            .budget(Duration::from_secs(5))
            .thread_name("test-pool"),
    )
    .unwrap();
    assert_eq!(dispatcher.workers(), 3);
    assert_eq!(dispatcher.budget(), Duration::from_secs(5));
}

// ============================================================================
// Submission Tests
// ============================================================================

/// Test a single submitted job.
#[test]
fn test_submit_and_wait() {
    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(2)).unwrap();
    let handle = dispatcher.submit(chi_square(&[1.0, 1.0, 1.0, 2.0, 2.0, 3.0]));
    assert_eq!(handle.kind(), AnalysisKind::ChiSquare);
    assert!(handle.remaining() <= DEFAULT_BUDGET);

    let output = handle.wait().unwrap();
    assert_relative_eq!(chi_square_statistic(&output), 1.0, epsilon = 1e-12);
}

/// Test that job identifiers increase with each submission.
#[test]
fn test_job_ids_increase() {
    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(1)).unwrap();
    let first = dispatcher.submit(chi_square(&[1.0, 2.0]));
    let second = dispatcher.submit(chi_square(&[1.0, 2.0]));
    assert!(second.id() > first.id());
    assert_eq!(first.id().to_string(), format!("job #{}", first.id().0));
    first.wait().unwrap();
    second.wait().unwrap();
}

/// Test that engine failures come back as analysis errors.
#[test]
fn test_analysis_failure_propagates() {
    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(1)).unwrap();
    let err = dispatcher.submit(chi_square(&[4.0, 4.0])).wait().unwrap_err();

    let analysis = err.analysis().unwrap();
    assert_eq!(analysis.kind(), ErrorKind::InsufficientData);
    assert_eq!(err.to_string(), analysis.message());
    assert!(std::error::Error::source(&err).is_some());
}

/// Test polling until the result arrives.
#[test]
fn test_try_result_polls() {
    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(1)).unwrap();
    let handle = dispatcher.submit(chi_square(&[1.0, 2.0, 2.0]));

    let poll = || loop {
        if let Some(result) = handle.try_result() {
            break result;
        }
        std::thread::sleep(Duration::from_millis(1));
    };
    assert!(poll().is_ok());

    // The single outcome has been consumed.
    assert!(matches!(poll(), Err(DispatchError::Abandoned { .. })));
}

/// Test running a request on the calling thread.
#[test]
fn test_run_isolated() {
    let output = run_isolated(&chi_square(&[1.0, 2.0])).unwrap();
    assert_eq!(output.kind, AnalysisKind::ChiSquare);
}

// ============================================================================
// Batch Tests
// ============================================================================

/// Test that a batch keeps input order and isolates failures.
#[test]
fn test_run_all_keeps_order() {
    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(4)).unwrap();
    let requests = vec![
        chi_square(&[1.0, 1.0, 1.0, 2.0, 2.0, 3.0]),
        chi_square(&[5.0]),
        chi_square(&[1.0, 2.0, 1.0, 2.0]),
        Smoothing::new()
            .variable(Variable::numeric("y", &[3.0, 4.0, 5.0, 4.0, 6.0]))
            .forecast(2)
            .build()
            .unwrap(),
    ];

    let results = dispatcher.run_all(&requests);
    assert_eq!(results.len(), 4);
    assert_relative_eq!(
        chi_square_statistic(results[0].as_ref().unwrap()),
        1.0,
        epsilon = 1e-12
    );
    assert!(matches!(results[1], Err(DispatchError::Analysis(_))));
    assert_relative_eq!(
        chi_square_statistic(results[2].as_ref().unwrap()),
        0.0,
        epsilon = 1e-12
    );
    assert_eq!(results[3].as_ref().unwrap().kind, AnalysisKind::Smoothing);
}

/// Test that batch results match sequential execution.
#[test]
fn test_run_all_matches_sequential() {
    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(2)).unwrap();
    let requests: Vec<AnalysisRequest> = (1..=8)
        .map(|k| {
            let values: Vec<f64> = (0..20).map(|i| ((i * k) % 4) as f64).collect();
            chi_square(&values)
        })
        .collect();

    let parallel = dispatcher.run_all(&requests);
    for (request, result) in requests.iter().zip(parallel) {
        assert_eq!(result.map_err(|e| e.to_string()), request.run().map_err(|e| e.to_string()));
    }
}

// ============================================================================
// Budget Tests
// ============================================================================

/// Test that a job queued behind slow work misses a tiny budget.
#[test]
fn test_budget_exceeded() {
    let dispatcher = Dispatcher::new(
        DispatchConfig::new()
            .workers(1)
            .budget(Duration::from_nanos(1)),
    )
    .unwrap();

    let _slow = dispatcher.submit(slow_request());
    let queued = dispatcher.submit(chi_square(&[1.0, 2.0]));
    let id = queued.id();

    match queued.wait() {
        Err(DispatchError::TimedOut { job, budget }) => {
            assert_eq!(job, id);
            assert_eq!(budget, Duration::from_nanos(1));
        }
        other => panic!("expected a timeout, got {:?}", other.map(|o| o.kind)),
    }
}

/// Test that the budget is consumed from the moment of submission.
#[test]
fn test_budget_runs_from_submission() {
    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(1)).unwrap();
    let handle = dispatcher.submit(chi_square(&[1.0, 2.0, 2.0]));
    let submitted_by = Instant::now();

    std::thread::sleep(Duration::from_millis(20));
    let since = submitted_by.elapsed();
    assert!(handle.remaining() <= DEFAULT_BUDGET - since);

    handle.wait().unwrap();
}
