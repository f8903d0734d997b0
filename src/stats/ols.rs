use faer::Mat;
use faer::linalg::solvers::ColPivQr;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use thiserror::Error;

/// A diagonal entry of R at or below this fraction of the largest one marks
/// the design as rank deficient.
const RANK_TOL: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OlsError {
    #[error("the response has zero total sum of squares")]
    ConstantResponse,
    #[error("the design matrix is rank deficient")]
    Singular,
}

#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Intercept first, then one coefficient per predictor column.
    pub coefficients: Array1<f64>,
    pub r_squared: f64,
}

/// Least squares of `y` on the columns of `x` plus an intercept.
pub fn fit_with_intercept(y: ArrayView1<'_, f64>, x: ArrayView2<'_, f64>) -> Result<OlsFit, OlsError> {
    let n = y.len();
    let p = x.ncols() + 1;
    if n < p {
        return Err(OlsError::Singular);
    }

    let y_mean = y.sum() / n as f64;
    let ss_tot = y.iter().map(|v| (v - y_mean) * (v - y_mean)).sum::<f64>();
    if ss_tot == 0.0 {
        return Err(OlsError::ConstantResponse);
    }

    let mut design = Array2::<f64>::ones((n, p));
    for (j, col) in x.columns().into_iter().enumerate() {
        design.column_mut(j + 1).assign(&col);
    }
    let coefficients = solve_least_squares(&design, y)?;

    let fitted = design.dot(&coefficients);
    let ss_res = y
        .iter()
        .zip(fitted.iter())
        .map(|(v, f)| (v - f) * (v - f))
        .sum::<f64>();

    Ok(OlsFit {
        coefficients,
        r_squared: 1.0 - ss_res / ss_tot,
    })
}

/// Solves `design . beta = y` through a column-pivoted QR factorization,
/// `design P = Q R`, so `X'X` is never formed.
fn solve_least_squares(design: &Array2<f64>, y: ArrayView1<'_, f64>) -> Result<Array1<f64>, OlsError> {
    let (n, p) = design.dim();
    let a = Mat::from_fn(n, p, |i, j| design[[i, j]]);
    let qr = ColPivQr::new(a.as_ref());
    let q = qr.compute_thin_Q();
    let r = qr.R();
    let pivot = qr.P().arrays().0.to_vec();

    let largest = r[(0, 0)].abs();
    if largest == 0.0 || !largest.is_finite() {
        return Err(OlsError::Singular);
    }
    for k in 0..p {
        if r[(k, k)].abs() <= RANK_TOL * largest {
            return Err(OlsError::Singular);
        }
    }

    // Q'y, then back substitution on R.
    let qty = (0..p)
        .map(|j| (0..n).map(|i| q[(i, j)] * y[i]).sum::<f64>())
        .collect::<Vec<_>>();
    let mut z = vec![0.0f64; p];
    for k in (0..p).rev() {
        let mut acc = qty[k];
        for j in k + 1..p {
            acc -= r[(k, j)] * z[j];
        }
        z[k] = acc / r[(k, k)];
    }

    // Column `k` of the pivoted design is column `pivot[k]` of the original.
    let mut beta = Array1::<f64>::zeros(p);
    for (k, &original) in pivot.iter().enumerate() {
        beta[original] = z[k];
    }
    Ok(beta)
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/ols.rs"]
mod tests;
