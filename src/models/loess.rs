//! Loess: locally weighted polynomial regression over nearest neighbours.
//!
//! For each time index the `q = floor(N * span)` nearest observations define
//! the neighbourhood radius; tricube weights fall to zero at that radius.

use crate::data::Series;
use crate::domain::{FamilyTag, SmootherConfig};
use crate::error::FitError;
use crate::math::tricube;
use crate::models::local::fit_local;
use crate::models::model::{FitDetail, FittedModel};

/// Largest supported local polynomial degree.
pub const MAX_DEGREE: usize = 2;

pub fn fit(series: &Series, span: f64, degree: usize) -> Result<FittedModel, FitError> {
    let config = SmootherConfig::Loess { span, degree };
    if !(span.is_finite() && span > 0.0 && span <= 1.0) {
        return Err(FitError::InvalidParameter {
            family: FamilyTag::Loess,
            name: "span",
            reason: format!("{span} is outside (0, 1]"),
        });
    }
    if degree > MAX_DEGREE {
        return Err(FitError::InvalidParameter {
            family: FamilyTag::Loess,
            name: "degree",
            reason: format!("{degree} exceeds the maximum of {MAX_DEGREE}"),
        });
    }

    let x = series.index_axis();
    let n = x.len();
    let q = ((n as f64) * span).floor() as usize;
    let required = degree + 1;
    let insufficient = |time_index: usize, neighbours: usize| FitError::InsufficientSpan {
        span,
        degree,
        time_index,
        neighbours,
        required,
    };
    if q < required {
        return Err(insufficient(1, q));
    }

    let mut distances = vec![0.0; n];
    let local = fit_local(
        series.values(),
        degree,
        |i| {
            let x0 = x[i];
            for (d, &xj) in distances.iter_mut().zip(&x) {
                *d = (xj - x0).abs();
            }
            let radius = kth_smallest(&mut distances, q - 1);
            if !(radius > 0.0) {
                return (vec![0.0; n], vec![0.0; n]);
            }
            let u: Vec<f64> = x.iter().map(|&xj| (xj - x0) / radius).collect();
            let w = u.iter().map(|&uj| tricube(uj.abs())).collect();
            (u, w)
        },
        insufficient,
    )?;

    FittedModel::new(
        config,
        local.fitted,
        local.trace,
        FitDetail::Loess { neighbours: q },
    )
}

/// The `k`-th smallest value (0-based); reorders `values`.
fn kth_smallest(values: &mut [f64], k: usize) -> f64 {
    let (_, v, _) = values.select_nth_unstable_by(k, f64::total_cmp);
    *v
}
