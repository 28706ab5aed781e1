//! Gaussian kernel regression (local polynomial of degree 0..=3).
//!
//! The bandwidth `h` is the standard deviation of the Gaussian weight kernel in
//! time-index units. It is given directly, as a fraction of the index standard
//! deviation, or estimated with a rule-of-thumb plug-in.
//!
//! Plug-in estimate (Ruppert, Sheather & Wand 1995, blocked quartic pilot):
//!
//! ```text
//! h = [ σ² (b - a) / (2 √π N θ22) ]^(1/5)
//! ```
//!
//! - The index range `[a, b]` is cut into `B` equal blocks and a quartic is
//!   fitted by least squares in each.
//! - `B` runs over `1..=Bmax`, `Bmax = max(min(N / 20, 5), 1)`, and is chosen by
//!   Mallows' `Cp(B) = RSS(B) / (RSS(Bmax) / (N - 5 Bmax)) - (N - 10 B)`.
//! - `θ22` is the mean squared second derivative of the blocked fit and
//!   `σ² = RSS(B) / (N - 5 B)`.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::data::Series;
use crate::domain::{Bandwidth, FamilyTag, SmootherConfig};
use crate::error::FitError;
use crate::math::{gaussian, min_max, sample_sd, solve_least_squares};
use crate::models::local::fit_local;
use crate::models::model::{FitDetail, FittedModel};

pub const MAX_DEGREE: usize = 3;

/// Coefficients in a quartic pilot fit.
const QUARTIC_TERMS: usize = 5;

/// A block needs more points than coefficients to leave a residual.
const MIN_BLOCK_POINTS: usize = QUARTIC_TERMS + 1;

pub fn fit(series: &Series, bandwidth: Bandwidth, degree: usize) -> Result<FittedModel, FitError> {
    let config = SmootherConfig::Kernel { bandwidth, degree };
    if degree > MAX_DEGREE {
        return Err(invalid("degree", format!("{degree} exceeds the maximum of {MAX_DEGREE}")));
    }

    let x = series.index_axis();
    let y = series.values();
    let h = resolve_bandwidth(&x, y, bandwidth)?;

    let local = fit_local(
        y,
        degree,
        |i| {
            let u: Vec<f64> = x.iter().map(|&xj| (xj - x[i]) / h).collect();
            let w = u.iter().map(|&uj| gaussian(uj)).collect();
            (u, w)
        },
        |time_index, neighbours| {
            FitError::SingularBasis(format!(
                "bandwidth {h:.4} leaves {neighbours} weighted points at t={time_index}, degree {degree} needs {}",
                degree + 1
            ))
        },
    )?;

    FittedModel::new(config, local.fitted, local.trace, FitDetail::Kernel { bandwidth: h })
}

/// Turn a bandwidth spec into a positive bandwidth in index units.
pub fn resolve_bandwidth(x: &[f64], y: &[f64], bandwidth: Bandwidth) -> Result<f64, FitError> {
    match bandwidth {
        Bandwidth::Absolute(h) => {
            check_positive("bandwidth", h)?;
            Ok(h)
        }
        Bandwidth::FractionOfSd(f) => {
            check_positive("bandwidth fraction", f)?;
            let sd = sample_sd(x).ok_or(FitError::TooFewObservations {
                required: 2,
                actual: x.len(),
            })?;
            let h = f * sd;
            check_positive("bandwidth", h)?;
            Ok(h)
        }
        Bandwidth::PlugIn => plug_in_bandwidth(x, y),
    }
}

/// Rule-of-thumb plug-in bandwidth for local linear Gaussian kernel regression.
pub fn plug_in_bandwidth(x: &[f64], y: &[f64]) -> Result<f64, FitError> {
    let n = x.len();
    if n < MIN_BLOCK_POINTS {
        return Err(FitError::TooFewObservations {
            required: MIN_BLOCK_POINTS,
            actual: n,
        });
    }
    let (a, b) = min_max(x).ok_or(FitError::TooFewObservations {
        required: MIN_BLOCK_POINTS,
        actual: 0,
    })?;
    if !(b > a) {
        return Err(invalid("bandwidth", "plug-in rule needs a non-degenerate index range".to_string()));
    }

    let max_blocks = (n / 20).min(5).max(1);
    let fits: Vec<Option<BlockedQuartic>> = (1..=max_blocks)
        .map(|blocks| BlockedQuartic::fit(x, y, a, b, blocks))
        .collect();

    let single = fits[0]
        .as_ref()
        .ok_or_else(|| FitError::SingularBasis("quartic pilot fit failed".to_string()))?;

    // Cp needs the residual variance of the finest blocking; fall back to a
    // single block when it is unavailable or exact.
    let chosen = match fits[max_blocks - 1].as_ref() {
        Some(finest) if finest.rss > 0.0 => {
            let sigma2_max = finest.rss / (n - QUARTIC_TERMS * max_blocks) as f64;
            fits.iter()
                .flatten()
                .map(|f| {
                    let cp = f.rss / sigma2_max - (n as f64 - 10.0 * f.blocks as f64);
                    (f, cp)
                })
                .min_by(|l, r| l.1.total_cmp(&r.1))
                .map(|(f, _)| f)
                .unwrap_or(single)
        }
        _ => single,
    };

    let sigma2 = chosen.rss / (n - QUARTIC_TERMS * chosen.blocks) as f64;
    let theta22 = chosen.curvature.iter().map(|c| c * c).sum::<f64>() / n as f64;
    if !(sigma2 > 0.0 && sigma2.is_finite()) {
        return Err(invalid("bandwidth", "plug-in rule needs a positive residual variance".to_string()));
    }
    if !(theta22 > 0.0 && theta22.is_finite()) {
        return Err(invalid("bandwidth", "plug-in rule needs a non-zero curvature estimate".to_string()));
    }

    let h = (sigma2 * (b - a) / (2.0 * PI.sqrt() * n as f64 * theta22)).powf(0.2);
    debug!(blocks = chosen.blocks, sigma2, theta22, h, "plug-in bandwidth");
    check_positive("bandwidth", h)?;
    Ok(h)
}

/// Piecewise quartic least squares fit over equal-width blocks.
struct BlockedQuartic {
    blocks: usize,
    rss: f64,
    /// Second derivative of the fit at every observation.
    curvature: Vec<f64>,
}

impl BlockedQuartic {
    /// Returns `None` when a block is too small or its fit is singular.
    fn fit(x: &[f64], y: &[f64], a: f64, b: f64, blocks: usize) -> Option<Self> {
        let width = (b - a) / blocks as f64;
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); blocks];
        for (i, &xi) in x.iter().enumerate() {
            let k = (((xi - a) / width).floor() as usize).min(blocks - 1);
            members[k].push(i);
        }

        let mut rss = 0.0;
        let mut curvature = vec![0.0; x.len()];
        for idx in &members {
            if idx.len() < MIN_BLOCK_POINTS {
                return None;
            }
            let center = idx.iter().map(|&i| x[i]).sum::<f64>() / idx.len() as f64;
            let scale = idx
                .iter()
                .map(|&i| (x[i] - center).abs())
                .fold(0.0_f64, f64::max);
            if !(scale > 0.0) {
                return None;
            }

            let mut design = DMatrix::<f64>::zeros(idx.len(), QUARTIC_TERMS);
            for (r, &i) in idx.iter().enumerate() {
                let z = (x[i] - center) / scale;
                let mut p = 1.0;
                for c in 0..QUARTIC_TERMS {
                    design[(r, c)] = p;
                    p *= z;
                }
            }
            let target = DVector::from_iterator(idx.len(), idx.iter().map(|&i| y[i]));
            let beta = solve_least_squares(&design, &target)?;
            let fitted = &design * &beta;

            for (r, &i) in idx.iter().enumerate() {
                let resid = target[r] - fitted[r];
                rss += resid * resid;
                let z = (x[i] - center) / scale;
                let d2z = 2.0 * beta[2] + 6.0 * beta[3] * z + 12.0 * beta[4] * z * z;
                curvature[i] = d2z / (scale * scale);
            }
        }

        Some(Self {
            blocks,
            rss,
            curvature,
        })
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), FitError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, format!("{value} must be a finite positive number")))
    }
}

fn invalid(name: &'static str, reason: String) -> FitError {
    FitError::InvalidParameter {
        family: FamilyTag::Kernel,
        name,
        reason,
    }
}
