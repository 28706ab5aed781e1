//! Grid evaluation: fit every config of one family and score it.
//!
//! Configs are independent, so they are fitted in parallel. The output keeps
//! the input order (`index` is the position in `configs`) and records failed
//! configs instead of aborting the batch.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::data::Series;
use crate::domain::{FamilyTag, SmootherConfig};
use crate::error::FitError;
use crate::math::mean_squared_error;
use crate::models::{self, FittedModel};

/// Successful fit plus its in-sample mean squared error.
#[derive(Debug, Clone, PartialEq)]
pub struct FitScore {
    pub model: FittedModel,
    pub mse: f64,
}

/// Outcome of one config from a grid run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredFit {
    /// Position of the config in the evaluated grid.
    pub index: usize,
    pub config: SmootherConfig,
    pub outcome: Result<FitScore, FitError>,
}

impl ScoredFit {
    pub fn score(&self) -> Option<&FitScore> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&FitError> {
        self.outcome.as_ref().err()
    }

    pub fn mse(&self) -> Option<f64> {
        self.score().map(|s| s.mse)
    }

    pub fn effective_df(&self) -> Option<f64> {
        self.score().map(|s| s.model.effective_df())
    }
}

/// Fit and score `configs` for `family`.
///
/// A config belonging to another family is recorded as
/// [`FitError::FamilyMismatch`].
pub fn evaluate(series: &Series, family: FamilyTag, configs: &[SmootherConfig]) -> Vec<ScoredFit> {
    configs
        .par_iter()
        .enumerate()
        .map(|(index, config)| {
            let outcome = score_config(series, family, config);
            match &outcome {
                Ok(score) => debug!(
                    %family,
                    config = %config,
                    mse = score.mse,
                    edf = score.model.effective_df(),
                    "fitted config"
                ),
                Err(err) => warn!(%family, config = %config, error = %err, "config failed to fit"),
            }
            ScoredFit {
                index,
                config: *config,
                outcome,
            }
        })
        .collect()
}

fn score_config(
    series: &Series,
    family: FamilyTag,
    config: &SmootherConfig,
) -> Result<FitScore, FitError> {
    let found = config.family();
    if found != family {
        return Err(FitError::FamilyMismatch {
            expected: family,
            found,
        });
    }

    let model = models::fit(series, config)?;
    let mse = mean_squared_error(model.fitted_values(), series.values())
        .filter(|m| m.is_finite())
        .ok_or_else(|| {
            FitError::NonConvergence(format!("mean squared error of {config} is undefined"))
        })?;
    Ok(FitScore { model, mse })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bandwidth;

    #[test]
    fn order_follows_input_and_failures_are_recorded() {
        let s = Series::uk_driver_deaths();
        let configs = [
            SmootherConfig::Loess { span: 0.75, degree: 2 },
            SmootherConfig::Loess { span: 0.0, degree: 2 },
            SmootherConfig::NaturalSpline { df: 4 },
            SmootherConfig::Loess { span: 0.3, degree: 1 },
        ];
        let scored = evaluate(&s, FamilyTag::Loess, &configs);

        assert_eq!(scored.len(), 4);
        for (i, fit) in scored.iter().enumerate() {
            assert_eq!(fit.index, i);
            assert_eq!(fit.config, configs[i]);
        }
        assert!(scored[0].score().is_some());
        assert!(matches!(
            scored[1].error(),
            Some(FitError::InvalidParameter { name: "span", .. })
        ));
        assert_eq!(
            scored[2].error(),
            Some(&FitError::FamilyMismatch {
                expected: FamilyTag::Loess,
                found: FamilyTag::NaturalSpline,
            })
        );
        assert!(scored[3].mse().is_some_and(|m| m >= 0.0));
    }

    #[test]
    fn interpolating_fit_scores_zero() {
        let s = Series::uk_driver_deaths();
        let scored = evaluate(
            &s,
            FamilyTag::Kernel,
            &[SmootherConfig::Kernel {
                bandwidth: Bandwidth::Absolute(0.01),
                degree: 0,
            }],
        );
        assert_eq!(scored[0].mse(), Some(0.0));
    }
}
