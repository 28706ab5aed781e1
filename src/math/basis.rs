//! Natural cubic spline basis.
//!
//! We use the truncated-power representation (Hastie, Tibshirani & Friedman,
//! eq. 5.4–5.5). With knots `ξ_1 < … < ξ_K`:
//!
//! - `N_1(x) = 1`
//! - `N_2(x) = x`
//! - `N_{k+2}(x) = d_k(x) - d_{K-1}(x)` for `k = 1..K-2`
//!
//! where `d_k(x) = ((x - ξ_k)^3_+ - (x - ξ_K)^3_+) / (ξ_K - ξ_k)`.
//!
//! The `K` functions span the natural cubic splines on those knots: cubic
//! between knots, linear beyond the boundary knots.
//!
//! Numerical notes:
//! - Inputs are mapped onto `[0, 1]` before cubing so that columns stay on a
//!   comparable scale (raw month indices would produce values near 1e7).
//! - Boundary knots sit at the data range. The `df - 1` interior knots are
//!   nested: going from `df` to `df + 1` keeps every knot and adds one at the
//!   sample quantile halfway (in probability) across the widest gap, leftmost
//!   first. Bases for increasing `df` therefore span nested spaces.

use crate::math::stats::quantile_sorted;

/// Minimum gap between consecutive (scaled) knots.
const KNOT_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct NaturalSplineBasis {
    lo: f64,
    hi: f64,
    /// Knots on the scaled `[0, 1]` axis, boundary knots included.
    knots: Vec<f64>,
}

impl NaturalSplineBasis {
    /// Build the basis for `df` degrees of freedom over the sample `x`.
    ///
    /// Returns `None` when the knots cannot be separated (e.g. heavily tied
    /// inputs) or the input range is degenerate.
    pub fn with_df(x: &[f64], df: usize) -> Option<Self> {
        if df == 0 || x.len() < 2 {
            return None;
        }
        let mut sorted: Vec<f64> = x.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let lo = *sorted.first()?;
        let hi = *sorted.last()?;
        let interior: Vec<f64> = nested_knot_probabilities(df)
            .into_iter()
            .map(|p| quantile_sorted(&sorted, p))
            .collect::<Option<_>>()?;

        Self::from_knots(lo, hi, &interior)
    }

    /// Build the basis from explicit boundary and interior knots.
    pub fn from_knots(lo: f64, hi: f64, interior: &[f64]) -> Option<Self> {
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return None;
        }
        let width = hi - lo;
        let mut knots = Vec::with_capacity(interior.len() + 2);
        knots.push(0.0);
        knots.extend(interior.iter().map(|k| (k - lo) / width));
        knots.push(1.0);

        if knots.windows(2).any(|w| !(w[1] - w[0] > KNOT_EPS)) {
            return None;
        }

        Some(Self { lo, hi, knots })
    }

    /// Number of basis functions (intercept included).
    pub fn n_columns(&self) -> usize {
        self.knots.len()
    }

    /// Knots in input units, boundary knots included.
    pub fn knots(&self) -> Vec<f64> {
        let width = self.hi - self.lo;
        self.knots.iter().map(|k| self.lo + k * width).collect()
    }

    /// Evaluate every basis function at `x`.
    ///
    /// # Panics
    /// Panics if `out.len() != self.n_columns()`.
    pub fn fill_row(&self, x: f64, out: &mut [f64]) {
        assert_eq!(out.len(), self.n_columns(), "basis row has the wrong width");

        let z = (x - self.lo) / (self.hi - self.lo);
        let k_total = self.knots.len();

        out[0] = 1.0;
        out[1] = z;
        if k_total < 3 {
            return;
        }

        let last = self.d(k_total - 2, z);
        for k in 0..k_total - 2 {
            out[k + 2] = self.d(k, z) - last;
        }
    }

    fn d(&self, k: usize, z: f64) -> f64 {
        let xi_k = self.knots[k];
        let xi_last = self.knots[self.knots.len() - 1];
        (cube_pos(z - xi_k) - cube_pos(z - xi_last)) / (xi_last - xi_k)
    }
}

/// Interior knot probabilities for `df` degrees of freedom, ascending.
///
/// Starts from `[0, 1]` and splits the widest gap `df - 1` times.
fn nested_knot_probabilities(df: usize) -> Vec<f64> {
    let mut probs = vec![0.0, 1.0];
    for _ in 1..df {
        let mut widest = 0;
        for i in 1..probs.len() - 1 {
            if probs[i + 1] - probs[i] > probs[widest + 1] - probs[widest] {
                widest = i;
            }
        }
        let mid = 0.5 * (probs[widest] + probs[widest + 1]);
        probs.insert(widest + 1, mid);
    }
    probs[1..probs.len() - 1].to_vec()
}

#[inline]
fn cube_pos(v: f64) -> f64 {
    if v > 0.0 { v * v * v } else { 0.0 }
}
