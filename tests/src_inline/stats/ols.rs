use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2};

use super::*;

#[test]
fn test_exact_line_has_unit_r_squared() {
    let x = Array2::from_shape_vec((5, 1), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    let y = Array1::from(vec![3.0, 5.0, 7.0, 9.0, 11.0]);
    let fit = fit_with_intercept(y.view(), x.view()).unwrap();
    assert_abs_diff_eq!(fit.coefficients[0], 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(fit.coefficients[1], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
}

#[test]
fn test_r_squared_matches_squared_correlation() {
    // r(x, y) = 0.8 for this pair.
    let x = Array2::from_shape_vec((5, 1), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    let y = Array1::from(vec![2.0, 1.0, 4.0, 3.0, 5.0]);
    let fit = fit_with_intercept(y.view(), x.view()).unwrap();
    assert_abs_diff_eq!(fit.r_squared, 0.64, epsilon = 1e-9);
}

#[test]
fn test_constant_response() {
    let x = Array2::from_shape_vec((3, 1), vec![1.0, 2.0, 3.0]).unwrap();
    let y = Array1::from(vec![4.0, 4.0, 4.0]);
    assert_eq!(
        fit_with_intercept(y.view(), x.view()).unwrap_err(),
        OlsError::ConstantResponse
    );
}

#[test]
fn test_duplicate_predictors_are_singular() {
    let x = Array2::from_shape_vec((4, 2), vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0]).unwrap();
    let y = Array1::from(vec![1.0, 3.0, 2.0, 4.0]);
    assert_eq!(
        fit_with_intercept(y.view(), x.view()).unwrap_err(),
        OlsError::Singular
    );
}

#[test]
fn test_near_collinear_predictors_still_solve() {
    let n = 400;
    let x1 = (0..n).map(|i| (i % 5) as f64 + 1.0).collect::<Vec<_>>();
    let x2 = (0..n)
        .map(|i| x1[i] + 1e-3 * ((i * 7 % 3) as f64 - 1.0))
        .collect::<Vec<_>>();
    let mut x = Array2::<f64>::zeros((n, 2));
    for i in 0..n {
        x[[i, 0]] = x1[i];
        x[[i, 1]] = x2[i];
    }
    let y = Array1::from_shape_fn(n, |i| 0.5 + x1[i] + 2.0 * x2[i]);
    let fit = fit_with_intercept(y.view(), x.view()).unwrap();
    assert_abs_diff_eq!(fit.coefficients[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.coefficients[1], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.coefficients[2], 2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(fit.r_squared, 1.0, epsilon = 1e-9);
}

#[test]
fn test_fewer_rows_than_coefficients_is_singular() {
    let x = Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 5.0]).unwrap();
    let y = Array1::from(vec![1.0, 2.0]);
    assert_eq!(
        fit_with_intercept(y.view(), x.view()).unwrap_err(),
        OlsError::Singular
    );
}

#[test]
fn test_error_messages() {
    assert_eq!(
        OlsError::Singular.to_string(),
        "the design matrix is rank deficient"
    );
}
