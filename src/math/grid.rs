//! Deterministic search grids.
//!
//! Hyperparameters are searched on fixed grids rather than with a numerical
//! optimizer: the result only depends on the inputs, and the criteria we
//! minimise are cheap enough to evaluate a few hundred times.

/// `steps` log-spaced points between `min` and `max` (inclusive).
///
/// Returns `None` unless `0 < min < max` (both finite) and `steps >= 2`.
pub fn log_space(min: f64, max: f64, steps: usize) -> Option<Vec<f64>> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) || steps < 2 {
        return None;
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Some(out)
}
