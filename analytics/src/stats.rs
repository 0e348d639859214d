//! Sample statistics shared by the estimators
//!
//! Covariance and variance use the same two-pass (n-1) formula so that
//! `sample_covariance(x, x) == sample_variance(x)` holds exactly.

use crate::returns::ReturnMatrix;
use nalgebra::DMatrix;
use statrs::statistics::Statistics;

/// Arithmetic mean (NaN for an empty slice)
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Sample covariance with an (n-1) denominator over paired observations
///
/// Returns NaN when fewer than two pairs exist.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len(), "covariance over misaligned series");

    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }

    let (x, y) = (&x[..n], &y[..n]);
    co_moment(x, mean(x), y, mean(y)) / (n - 1) as f64
}

/// Sample variance with an (n-1) denominator
pub fn sample_variance(values: &[f64]) -> f64 {
    sample_covariance(values, values)
}

/// Pearson correlation of two aligned series
///
/// If either series has zero (or undefined) variance there is no measurable
/// co-movement and 0.0 is returned. The result is clamped to [-1, 1].
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let var_x = sample_variance(x);
    let var_y = sample_variance(y);

    if !(var_x > 0.0 && var_y > 0.0) {
        return 0.0;
    }

    let correlation = sample_covariance(x, y) / (var_x * var_y).sqrt();
    correlation.clamp(-1.0, 1.0)
}

/// Sample covariance matrix of every column in a return matrix
///
/// Means are computed once per column; the result is symmetric by
/// construction.
pub fn covariance_matrix(returns: &ReturnMatrix) -> DMatrix<f64> {
    let columns = returns.columns();
    let n = columns.len();
    let obs = returns.len();
    let means: Vec<f64> = columns.iter().map(|c| mean(c)).collect();

    let mut cov = DMatrix::zeros(n, n);
    if obs < 2 {
        return cov;
    }

    for i in 0..n {
        for j in i..n {
            let value = co_moment(&columns[i], means[i], &columns[j], means[j]) / (obs - 1) as f64;
            cov[(i, j)] = value;
            cov[(j, i)] = value;
        }
    }

    cov
}

fn co_moment(x: &[f64], mean_x: f64, y: &[f64], mean_y: f64) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum()
}
