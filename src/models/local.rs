//! Shared driver for local polynomial smoothers (loess and kernel regression).
//!
//! Both families fit a weighted polynomial around every time index and keep
//! its value at the target. They differ only in how the weights are built, so
//! the family modules supply a window function and an error constructor.

use crate::error::FitError;
use crate::math::local_polynomial_weights;

#[derive(Debug)]
pub(crate) struct LocalFit {
    pub fitted: Vec<f64>,
    /// Sum of the hat-matrix diagonal.
    pub trace: f64,
}

/// Evaluate a local polynomial smoother of `degree` at every observation.
///
/// `window(i)` returns the scaled offsets and kernel weights of all
/// observations relative to observation `i` (0-based). When the weighted design
/// at `i` is singular, `singular(t, neighbours)` builds the error, with `t` the
/// 1-based time index and `neighbours` the number of positively weighted points.
pub(crate) fn fit_local<W, E>(
    y: &[f64],
    degree: usize,
    mut window: W,
    singular: E,
) -> Result<LocalFit, FitError>
where
    W: FnMut(usize) -> (Vec<f64>, Vec<f64>),
    E: Fn(usize, usize) -> FitError,
{
    let mut fitted = Vec::with_capacity(y.len());
    let mut trace = 0.0;

    for i in 0..y.len() {
        let (u, w) = window(i);
        let neighbours = w.iter().filter(|&&wj| wj > 0.0).count();
        if neighbours < degree + 1 {
            return Err(singular(i + 1, neighbours));
        }
        let l = local_polynomial_weights(&u, &w, degree).ok_or_else(|| singular(i + 1, neighbours))?;
        fitted.push(l.iter().zip(y).map(|(lj, yj)| lj * yj).sum());
        trace += l[i];
    }

    Ok(LocalFit { fitted, trace })
}
