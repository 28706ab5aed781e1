//! Weight kernels for local regression.
//!
//! Both kernels map a scaled distance `u = |x - x0| / h` to a non-negative,
//! symmetric weight:
//!
//! | Kernel   | Formula            | Support      |
//! |----------|--------------------|--------------|
//! | Tricube  | (1 - \|u\|^3)^3    | \|u\| < 1    |
//! | Gaussian | exp(-u^2 / 2)      | \|u\| < 6    |

/// Beyond six standard deviations the Gaussian weight is below 1e-8 and is
/// treated as exactly zero.
pub const GAUSSIAN_CUTOFF: f64 = 6.0;

/// Distances below this fraction of the radius get full tricube weight.
const TRICUBE_NEAR: f64 = 0.001;

/// Distances above this fraction of the radius get zero tricube weight.
const TRICUBE_FAR: f64 = 0.999;

/// Tricube weight for a scaled distance.
#[inline]
pub fn tricube(u: f64) -> f64 {
    let u = u.abs();
    if u <= TRICUBE_NEAR {
        return 1.0;
    }
    if u > TRICUBE_FAR {
        return 0.0;
    }
    let t = 1.0 - u * u * u;
    t * t * t
}

/// Gaussian weight for a scaled distance (unnormalized).
#[inline]
pub fn gaussian(u: f64) -> f64 {
    let u = u.abs();
    if u >= GAUSSIAN_CUTOFF {
        return 0.0;
    }
    (-0.5 * u * u).exp()
}
