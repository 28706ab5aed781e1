//! Smoother families behind one fitting entry point.
//!
//! Every family is a small module with a pure `fit` function; `fit` below
//! dispatches on the config so grid and selection code stay family-agnostic.

pub mod kernel;
pub mod loess;
mod local;
pub mod model;
pub mod natural_spline;
pub mod smoothing_spline;

pub use model::*;

use crate::data::Series;
use crate::domain::SmootherConfig;
use crate::error::FitError;

/// Fit one config to the whole series.
///
/// Returns the fitted model or the reason this config could not be fitted.
/// Failures are per config and never affect other fits.
pub fn fit(series: &Series, config: &SmootherConfig) -> Result<FittedModel, FitError> {
    match *config {
        SmootherConfig::NaturalSpline { df } => natural_spline::fit(series, df),
        SmootherConfig::SmoothingSpline { criterion } => smoothing_spline::fit(series, criterion),
        SmootherConfig::Loess { span, degree } => loess::fit(series, span, degree),
        SmootherConfig::Kernel { bandwidth, degree } => kernel::fit(series, bandwidth, degree),
    }
}
