//! Least squares solvers.
//!
//! Two kinds of small linear problems show up in the smoothers:
//!
//! ```text
//! minimize ||y - X β||^2              (regression spline, pilot fits)
//! minimize Σ w_i (y_i - x_i^T β)^2    (local polynomial fits)
//! ```
//!
//! Notes:
//! - The global regression problems are tall (N rows, a handful of columns), so
//!   we solve them with SVD, which stays robust when basis columns are nearly
//!   collinear. (Nalgebra's `QR::solve` is intended for square systems.)
//! - Local fits only need the first row of `(X^T W X)^{-1} X^T W`, i.e. the
//!   equivalent-kernel weights at the target point. The normal matrix is at most
//!   4x4 and symmetric positive definite when the fit is identifiable, so a
//!   Cholesky solve is both cheap and a precise singularity test.

use nalgebra::{DMatrix, DVector};

/// Relative singular-value threshold used for rank decisions.
const RANK_TOL: f64 = 1e-10;

/// Minimum ratio between the smallest and largest Cholesky pivot of a local
/// normal matrix (pivots are square roots, so this is ~1e-14 on the matrix).
const PIVOT_TOL: f64 = 1e-7;

/// Minimum-norm least squares solution of `X β ≈ y` via SVD.
///
/// `None` when no cutoff yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Loosen the singular value cutoff until a finite solution appears.
    for tol in [1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Numerical column rank of `x`.
pub fn column_rank(x: &DMatrix<f64>) -> usize {
    let singular = x.singular_values();
    let s_max = singular.iter().copied().fold(0.0_f64, f64::max);
    if !(s_max.is_finite() && s_max > 0.0) {
        return 0;
    }
    singular.iter().filter(|&&s| s > RANK_TOL * s_max).count()
}

/// Equivalent-kernel weights of a local polynomial fit evaluated at `u = 0`.
///
/// `u` holds the scaled offsets `(x_j - x0) / h` of every observation and `w`
/// their kernel weights. The returned vector `l` satisfies
/// `fitted(x0) = Σ l_j y_j`; `l_j` for the observation at `x0` itself is the
/// hat-matrix diagonal entry.
///
/// Returns `None` when the weighted design is singular (too few distinct
/// points carry weight for the requested degree).
pub fn local_polynomial_weights(u: &[f64], w: &[f64], degree: usize) -> Option<Vec<f64>> {
    debug_assert_eq!(u.len(), w.len());
    let p = degree + 1;

    // The fit at u = 0 is invariant to rescaling u, so map the weighted
    // offsets into [-1, 1] to keep the normal matrix well scaled.
    let scale = u
        .iter()
        .zip(w)
        .filter(|(_, wj)| **wj > 0.0)
        .map(|(uj, _)| uj.abs())
        .fold(0.0_f64, f64::max);
    let scale = if scale > 0.0 { scale } else { 1.0 };

    // Normal matrix M = X^T W X with X_j = [1, u_j, u_j^2, ...].
    let mut m = DMatrix::<f64>::zeros(p, p);
    let mut row = vec![0.0; p];
    for (&uj, &wj) in u.iter().zip(w) {
        if wj <= 0.0 {
            continue;
        }
        fill_powers(uj / scale, &mut row);
        for a in 0..p {
            for b in a..p {
                m[(a, b)] += wj * row[a] * row[b];
            }
        }
    }
    for a in 0..p {
        for b in 0..a {
            m[(a, b)] = m[(b, a)];
        }
    }

    // Solve M c = e1; then l_j = w_j * X_j · c.
    let chol = m.cholesky()?;
    let pivots = chol.l().diagonal();
    let pivot_max = pivots.iter().copied().fold(0.0_f64, f64::max);
    let pivot_min = pivots.iter().copied().fold(f64::INFINITY, f64::min);
    if !(pivot_min > PIVOT_TOL * pivot_max) {
        return None;
    }
    let mut e1 = DVector::<f64>::zeros(p);
    e1[0] = 1.0;
    let c = chol.solve(&e1);
    if !c.iter().all(|v| v.is_finite()) {
        return None;
    }

    let weights = u
        .iter()
        .zip(w)
        .map(|(&uj, &wj)| {
            if wj <= 0.0 {
                return 0.0;
            }
            fill_powers(uj / scale, &mut row);
            wj * row.iter().zip(c.iter()).map(|(r, ci)| r * ci).sum::<f64>()
        })
        .collect();

    Some(weights)
}

fn fill_powers(u: f64, out: &mut [f64]) {
    let mut acc = 1.0;
    for slot in out.iter_mut() {
        *slot = acc;
        acc *= u;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn svd_recovers_exact_line() {
        // y = -1 + 0.5 t, t = 1..4
        let x = DMatrix::from_fn(4, 2, |i, j| if j == 0 { 1.0 } else { (i + 1) as f64 });
        let y = DVector::from_fn(4, |i, _| -1.0 + 0.5 * (i + 1) as f64);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert_relative_eq!(beta[0], -1.0, epsilon = 1e-10);
        assert_relative_eq!(beta[1], 0.5, epsilon = 1e-10);
    }

    #[test]
    fn rank_detects_duplicate_columns() {
        let x = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0]);
        assert_eq!(column_rank(&x), 2);
    }

    #[test]
    fn local_linear_reproduces_a_line() {
        // A local linear fit reproduces straight lines exactly, whatever the weights.
        let x: Vec<f64> = (0..9).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|v| 1.5 + 0.25 * v).collect();
        let x0 = 2.0;
        let u: Vec<f64> = x.iter().map(|v| (v - x0) / 3.0).collect();
        let w: Vec<f64> = u.iter().map(|v| (-0.5 * v * v).exp()).collect();

        let l = local_polynomial_weights(&u, &w, 1).unwrap();
        let fitted: f64 = l.iter().zip(&y).map(|(a, b)| a * b).sum();
        assert_abs_diff_eq!(fitted, 1.5 + 0.25 * x0, epsilon = 1e-10);
        // Weights of a local fit always sum to one.
        assert_abs_diff_eq!(l.iter().sum::<f64>(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn local_quadratic_needs_three_points() {
        let u = [-1.0, 0.0, 1.0, 2.0];
        let w = [0.0, 1.0, 1.0, 0.0];
        assert!(local_polynomial_weights(&u, &w, 2).is_none());
        assert!(local_polynomial_weights(&u, &w, 1).is_some());
    }
}
