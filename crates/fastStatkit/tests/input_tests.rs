//! Tests for building variables from caller-owned containers.
//!
//! ## Test Organization
//!
//! 1. **Containers** - Slices, vectors and ndarray arrays
//! 2. **Layout** - Contiguity requirements
//! 3. **End to End** - Dispatching requests built from ndarray input

use ndarray::{s, Array1};

use fastStatkit::prelude::*;
use fastStatkit::ErrorKind;

// ============================================================================
// Container Tests
// ============================================================================

/// Test that every supported container yields the same variable.
#[test]
fn test_containers_agree() {
    let values = vec![1.0, 2.5, 4.0];
    let from_vec = numeric_variable("x", &values).unwrap();
    let from_slice = numeric_variable("x", values.as_slice()).unwrap();
    let from_array = numeric_variable("x", &Array1::from(values.clone())).unwrap();

    assert_eq!(from_vec, from_slice);
    assert_eq!(from_vec, from_array);
    assert_eq!(from_vec.name(), "x");
    assert_eq!(from_vec.values.len(), 3);
    assert_eq!(from_vec.values.value(1), Some(2.5));
}

/// Test that non-finite values become missing observations.
#[test]
fn test_non_finite_values_missing() {
    let variable = numeric_variable("x", &[1.0, f64::NAN, f64::INFINITY][..]).unwrap();
    assert_eq!(variable.values.value(0), Some(1.0));
    assert_eq!(variable.values.value(1), None);
    assert_eq!(variable.values.value(2), None);
}

/// Test that array views borrow without copying.
#[test]
fn test_view_borrows_buffer() {
    let array = Array1::linspace(0.0, 1.0, 5);
    let view = array.view();
    let slice = view.as_sample_slice().unwrap();
    assert_eq!(slice.as_ptr(), array.as_ptr());
    assert_eq!(slice.len(), 5);
}

// ============================================================================
// Layout Tests
// ============================================================================

/// Test that strided views are rejected.
#[test]
fn test_strided_view_rejected() {
    let array = Array1::linspace(0.0, 9.0, 10);
    let strided = array.slice(s![..;2]);

    let err = numeric_variable("x", &strided).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(err.message(), "ndarray input must be contiguous in memory");

    // A contiguous copy is accepted.
    let owned = strided.to_owned();
    assert_eq!(numeric_variable("x", &owned).unwrap().values.len(), 5);
}

// ============================================================================
// End to End Tests
// ============================================================================

/// Test a regression built from ndarray columns and run on the pool.
#[test]
fn test_regression_from_arrays() {
    let x = Array1::linspace(1.0, 10.0, 10);
    let y = x.mapv(|v| 3.0 * v - 2.0 + if (v as i64) % 2 == 0 { 0.1 } else { -0.1 });

    let request = Regression::new()
        .dependent(numeric_variable("y", &y).unwrap())
        .independent(numeric_variable("x", &x).unwrap())
        .build()
        .unwrap();

    let dispatcher = Dispatcher::new(DispatchConfig::new().workers(1)).unwrap();
    let output = dispatcher.submit(request).wait().unwrap();
    let slope = output
        .table("Coefficients")
        .and_then(|t| t.cell("x", "b"))
        .and_then(|c| c.as_f64())
        .unwrap();
    assert!((slope - 3.0).abs() < 0.05);
}
