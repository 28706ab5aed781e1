//! Cubic smoothing spline with a cross-validated roughness penalty.
//!
//! The fit minimizes `Σ (y_i - g(x_i))^2 + λ ∫ g''(x)^2 dx`. With knots at
//! every observation the solution is `g = (I + λK)^{-1} y` where
//! `K = Q R^{-1} Q^T` is the Reinsch penalty matrix (Green & Silverman, ch. 2).
//!
//! Penalty search:
//! - `K` is eigendecomposed once, `K = U diag(d) U^T`. For any `λ` the smoother
//!   matrix is `S_λ = U diag(1 / (1 + λ d)) U^T`, so fitted values, trace and
//!   leverages all come out in `O(N^2)` without refactorizing.
//! - `λ` is searched over a fixed log-spaced grid; the first minimizer of the
//!   criterion wins.
//!
//! Criteria:
//! - leave-one-out: `mean(((y_i - g_i) / (1 - S_ii))^2)`
//! - generalized:   `mean((y_i - g_i)^2) / (1 - tr(S) / N)^2`

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use tracing::{debug, warn};

use crate::data::Series;
use crate::domain::{CvCriterion, SmootherConfig};
use crate::error::FitError;
use crate::math::log_space;
use crate::models::model::{FitDetail, FittedModel};

/// Penalty search range and resolution (10 points per decade).
const LAMBDA_MIN: f64 = 1e-6;
const LAMBDA_MAX: f64 = 1e10;
const LAMBDA_STEPS: usize = 161;

/// The penalty is only defined with at least one interior knot.
const MIN_OBSERVATIONS: usize = 3;

const EIGEN_MAX_ITER: usize = 10_000;

pub fn fit(series: &Series, criterion: CvCriterion) -> Result<FittedModel, FitError> {
    let config = SmootherConfig::SmoothingSpline { criterion };
    let n = series.len();
    if n < MIN_OBSERVATIONS {
        return Err(FitError::TooFewObservations {
            required: MIN_OBSERVATIONS,
            actual: n,
        });
    }

    let x = series.index_axis();
    let y = series.values();
    let spectrum = PenaltySpectrum::new(&x)?;
    let lambdas = log_space(LAMBDA_MIN, LAMBDA_MAX, LAMBDA_STEPS)
        .ok_or_else(|| FitError::NonConvergence("invalid penalty grid".to_string()))?;

    let z = spectrum.u.tr_mul(&DVector::from_column_slice(y));

    let mut best: Option<(usize, f64)> = None;
    for (idx, &lambda) in lambdas.iter().enumerate() {
        let eval = spectrum.evaluate(&z, lambda);
        let score = criterion_score(criterion, y, &eval);
        if !score.is_finite() {
            continue;
        }
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((idx, score));
        }
    }

    let (idx, score) = best.ok_or_else(|| {
        FitError::NonConvergence(format!(
            "no penalty in [{LAMBDA_MIN:e}, {LAMBDA_MAX:e}] gives a finite {} score",
            criterion.display_name()
        ))
    })?;
    let lambda = lambdas[idx];
    if idx == 0 || idx + 1 == lambdas.len() {
        warn!(
            criterion = criterion.display_name(),
            lambda, "smoothing penalty landed on the edge of the search grid"
        );
    }

    let eval = spectrum.evaluate(&z, lambda);
    debug!(
        criterion = criterion.display_name(),
        lambda,
        score,
        edf = eval.trace,
        "selected smoothing penalty"
    );

    FittedModel::new(
        config,
        eval.fitted,
        eval.trace,
        FitDetail::SmoothingSpline {
            lambda,
            criterion,
            score,
        },
    )
}

/// Eigendecomposition of the Reinsch penalty matrix.
struct PenaltySpectrum {
    /// Orthonormal eigenvectors (columns).
    u: DMatrix<f64>,
    /// Squared eigenvector entries, used for the leverages `S_ii`.
    u_sq: DMatrix<f64>,
    /// Non-negative eigenvalues.
    d: Vec<f64>,
}

struct PenaltyEval {
    fitted: Vec<f64>,
    leverages: Vec<f64>,
    trace: f64,
}

impl PenaltySpectrum {
    fn new(x: &[f64]) -> Result<Self, FitError> {
        let k = penalty_matrix(x)?;
        let eigen = SymmetricEigen::try_new(k, f64::EPSILON, EIGEN_MAX_ITER).ok_or_else(|| {
            FitError::NonConvergence("eigendecomposition of the penalty matrix".to_string())
        })?;

        // K is positive semi-definite; round-off can push the two null
        // eigenvalues (constants and lines) slightly negative.
        let d = eigen.eigenvalues.iter().map(|&v| v.max(0.0)).collect();
        let u = eigen.eigenvectors;
        let u_sq = u.map(|v| v * v);
        Ok(Self { u, u_sq, d })
    }

    /// Smoother output for penalty `lambda`, given `z = U^T y`.
    fn evaluate(&self, z: &DVector<f64>, lambda: f64) -> PenaltyEval {
        let shrink = DVector::from_iterator(self.d.len(), self.d.iter().map(|&d| 1.0 / (1.0 + lambda * d)));
        let fitted = &self.u * z.component_mul(&shrink);
        let leverages = &self.u_sq * &shrink;
        PenaltyEval {
            fitted: fitted.iter().copied().collect(),
            leverages: leverages.iter().copied().collect(),
            trace: shrink.sum(),
        }
    }
}

/// Build `K = Q R^{-1} Q^T` for strictly increasing knots `x`.
fn penalty_matrix(x: &[f64]) -> Result<DMatrix<f64>, FitError> {
    let n = x.len();
    let m = n - 2;
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    if h.iter().any(|&hi| !(hi > 0.0)) {
        return Err(FitError::SingularBasis(
            "knots must be strictly increasing".to_string(),
        ));
    }

    let mut q = DMatrix::<f64>::zeros(n, m);
    let mut r = DMatrix::<f64>::zeros(m, m);
    for j in 0..m {
        q[(j, j)] = 1.0 / h[j];
        q[(j + 1, j)] = -1.0 / h[j] - 1.0 / h[j + 1];
        q[(j + 2, j)] = 1.0 / h[j + 1];

        r[(j, j)] = (h[j] + h[j + 1]) / 3.0;
        if j + 1 < m {
            r[(j, j + 1)] = h[j + 1] / 6.0;
            r[(j + 1, j)] = h[j + 1] / 6.0;
        }
    }

    let chol = r
        .cholesky()
        .ok_or_else(|| FitError::SingularBasis("penalty band matrix is not positive definite".to_string()))?;
    let r_inv_qt = chol.solve(&q.transpose());
    let k = &q * r_inv_qt;
    Ok((&k + k.transpose()) * 0.5)
}

fn criterion_score(criterion: CvCriterion, y: &[f64], eval: &PenaltyEval) -> f64 {
    let n = y.len() as f64;
    match criterion {
        CvCriterion::LeaveOneOut => {
            let sum: f64 = y
                .iter()
                .zip(&eval.fitted)
                .zip(&eval.leverages)
                .map(|((yi, gi), sii)| {
                    let r = (yi - gi) / (1.0 - sii);
                    r * r
                })
                .sum();
            sum / n
        }
        CvCriterion::Generalized => {
            let rss: f64 = y
                .iter()
                .zip(&eval.fitted)
                .map(|(yi, gi)| (yi - gi) * (yi - gi))
                .sum();
            let denom = 1.0 - eval.trace / n;
            (rss / n) / (denom * denom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn penalty_annihilates_lines() {
        let x: Vec<f64> = (1..=12).map(|t| t as f64).collect();
        let k = penalty_matrix(&x).unwrap();
        let line = DVector::from_iterator(12, x.iter().map(|t| 2.0 - 0.3 * t));
        let out = &k * line;
        assert!(out.iter().all(|v| v.abs() < 1e-9));
    }

    #[test]
    fn linear_data_is_reproduced() {
        let values = (1..=30).map(|t| 10.0 + 2.0 * t as f64).collect();
        let s = Series::new("line", 2000, 1, values).unwrap();
        for criterion in [CvCriterion::LeaveOneOut, CvCriterion::Generalized] {
            let model = fit(&s, criterion).unwrap();
            for (f, y) in model.fitted_values().iter().zip(s.values()) {
                assert_relative_eq!(*f, *y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn edf_lies_between_line_and_interpolation() {
        let s = Series::uk_driver_deaths();
        for criterion in [CvCriterion::LeaveOneOut, CvCriterion::Generalized] {
            let model = fit(&s, criterion).unwrap();
            let edf = model.effective_df();
            assert!(edf >= 2.0 - 1e-6 && edf <= s.len() as f64, "edf={edf}");
            match model.detail() {
                FitDetail::SmoothingSpline { lambda, score, .. } => {
                    assert!(*lambda >= LAMBDA_MIN && *lambda <= LAMBDA_MAX);
                    assert!(score.is_finite() && *score > 0.0);
                }
                other => panic!("unexpected detail {other:?}"),
            }
        }
    }

    fn uneven_sample() -> (Vec<f64>, Vec<f64>) {
        let x = vec![1.0, 2.0, 3.5, 4.0, 6.0, 7.5, 8.0, 10.0, 11.0, 13.5];
        let y = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0];
        (x, y)
    }

    #[test]
    fn spectrum_matches_direct_inverse() {
        let (x, y) = uneven_sample();
        let n = x.len();
        let k = penalty_matrix(&x).unwrap();
        let spectrum = PenaltySpectrum::new(&x).unwrap();
        let yv = DVector::from_column_slice(&y);

        for lambda in [0.05, 0.7, 12.0] {
            let eval = spectrum.evaluate(&spectrum.u.tr_mul(&yv), lambda);
            let s = (DMatrix::<f64>::identity(n, n) + &k * lambda).try_inverse().unwrap();
            let direct = &s * &yv;
            for i in 0..n {
                assert_relative_eq!(eval.fitted[i], direct[i], epsilon = 1e-8);
                assert_relative_eq!(eval.leverages[i], s[(i, i)], epsilon = 1e-8);
            }
            assert_relative_eq!(eval.trace, s.trace(), epsilon = 1e-8);

            let rss: f64 = (0..n).map(|i| (y[i] - direct[i]).powi(2)).sum();
            let denom = 1.0 - s.trace() / n as f64;
            let gcv = rss / n as f64 / (denom * denom);
            assert_relative_eq!(
                criterion_score(CvCriterion::Generalized, &y, &eval),
                gcv,
                max_relative = 1e-8
            );
        }
    }

    #[test]
    fn loocv_shortcut_matches_refitting_without_each_point() {
        // Dropping observation i is a zero weight on it; the penalty still
        // spans every knot so the refit is evaluated at x_i directly.
        let (x, y) = uneven_sample();
        let n = x.len();
        let k = penalty_matrix(&x).unwrap();
        let spectrum = PenaltySpectrum::new(&x).unwrap();
        let yv = DVector::from_column_slice(&y);

        for lambda in [0.05, 0.7, 12.0] {
            let eval = spectrum.evaluate(&spectrum.u.tr_mul(&yv), lambda);
            let mut sum = 0.0;
            for i in 0..n {
                let w = DMatrix::from_diagonal(&DVector::from_fn(n, |j, _| if j == i { 0.0 } else { 1.0 }));
                let refit = (&w + &k * lambda).lu().solve(&(&w * &yv)).unwrap();
                sum += (y[i] - refit[i]).powi(2);
            }
            assert_relative_eq!(
                criterion_score(CvCriterion::LeaveOneOut, &y, &eval),
                sum / n as f64,
                max_relative = 1e-8
            );
        }
    }

    #[test]
    fn needs_three_points() {
        let s = Series::new("short", 2000, 1, vec![1.0, 2.0]).unwrap();
        assert_eq!(
            fit(&s, CvCriterion::Generalized).unwrap_err(),
            FitError::TooFewObservations { required: 3, actual: 2 }
        );
    }
}
