//! Fitted smoother handle.
//!
//! Every family in this crate is a linear smoother evaluated on the observed
//! time grid, so a fitted model is fully described by:
//! - its fitted value at each time index (what `predict` returns)
//! - its effective degrees of freedom (trace of the smoother matrix)
//! - a family-specific detail record (knots, chosen penalty, bandwidth, ...)
//!
//! Predictions are only defined on the fitted domain `[1, N]`; requests outside
//! it are rejected instead of extrapolated.

use serde::{Deserialize, Serialize};

use crate::domain::{CvCriterion, FamilyTag, SmootherConfig};
use crate::error::{FitError, PredictionRangeError};

/// Family-specific information about a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitDetail {
    NaturalSpline {
        /// Knot positions in time-index units, boundary knots included.
        knots: Vec<f64>,
        /// Regression coefficients on the (rescaled) basis.
        coefficients: Vec<f64>,
    },
    SmoothingSpline {
        /// Selected roughness penalty.
        lambda: f64,
        criterion: CvCriterion,
        /// Criterion value at the selected penalty.
        score: f64,
    },
    Loess {
        /// Neighbourhood size `floor(N * span)`.
        neighbours: usize,
    },
    Kernel {
        /// Resolved Gaussian bandwidth in time-index units.
        bandwidth: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FittedModel {
    config: SmootherConfig,
    fitted: Vec<f64>,
    effective_df: f64,
    detail: FitDetail,
}

impl FittedModel {
    /// Wrap fitted values, rejecting non-finite output.
    pub(crate) fn new(
        config: SmootherConfig,
        fitted: Vec<f64>,
        effective_df: f64,
        detail: FitDetail,
    ) -> Result<Self, FitError> {
        if let Some(i) = fitted.iter().position(|v| !v.is_finite()) {
            return Err(FitError::NonFinite { time_index: i + 1 });
        }
        if !effective_df.is_finite() {
            return Err(FitError::NonConvergence(format!(
                "non-finite effective degrees of freedom for {config}"
            )));
        }
        Ok(Self {
            config,
            fitted,
            effective_df,
            detail,
        })
    }

    /// Predicted value at 1-based time index `t`.
    pub fn predict(&self, time_index: usize) -> Result<f64, PredictionRangeError> {
        time_index
            .checked_sub(1)
            .and_then(|i| self.fitted.get(i))
            .copied()
            .ok_or(PredictionRangeError {
                time_index,
                len: self.fitted.len(),
            })
    }

    /// Fitted values for `t = 1..=N`.
    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    /// Number of time indices the model was fitted on.
    pub fn len(&self) -> usize {
        self.fitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fitted.is_empty()
    }

    pub fn config(&self) -> &SmootherConfig {
        &self.config
    }

    pub fn family(&self) -> FamilyTag {
        self.config.family()
    }

    /// Trace of the smoother matrix; the complexity measure used for selection.
    pub fn effective_df(&self) -> f64 {
        self.effective_df
    }

    pub fn detail(&self) -> &FitDetail {
        &self.detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> FittedModel {
        FittedModel::new(
            SmootherConfig::Loess { span: 1.0, degree: 0 },
            vec![1.0, 2.0, 3.0],
            1.0,
            FitDetail::Loess { neighbours: 3 },
        )
        .unwrap()
    }

    #[test]
    fn predict_rejects_out_of_range() {
        let model = toy();
        assert_eq!(model.predict(1), Ok(1.0));
        assert_eq!(model.predict(3), Ok(3.0));
        assert_eq!(
            model.predict(0),
            Err(PredictionRangeError { time_index: 0, len: 3 })
        );
        assert_eq!(
            model.predict(4),
            Err(PredictionRangeError { time_index: 4, len: 3 })
        );
    }

    #[test]
    fn non_finite_output_is_a_fit_error() {
        let err = FittedModel::new(
            SmootherConfig::NaturalSpline { df: 1 },
            vec![1.0, f64::NAN],
            2.0,
            FitDetail::Loess { neighbours: 1 },
        )
        .unwrap_err();
        assert_eq!(err, FitError::NonFinite { time_index: 2 });
    }
}
