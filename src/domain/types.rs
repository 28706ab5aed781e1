//! Shared domain types.
//!
//! Configs are small immutable values that can be:
//!
//! - enumerated from a parameter grid
//! - fitted in parallel (they are `Copy`)
//! - exported to JSON alongside the fitted curves

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Smoother family.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyTag {
    NaturalSpline,
    SmoothingSpline,
    Loess,
    Kernel,
}

impl FamilyTag {
    pub const ALL: [FamilyTag; 4] = [
        FamilyTag::NaturalSpline,
        FamilyTag::SmoothingSpline,
        FamilyTag::Loess,
        FamilyTag::Kernel,
    ];

    /// Stable label used in terminal output, exports and log fields.
    pub fn display_name(self) -> &'static str {
        match self {
            FamilyTag::NaturalSpline => "natural-spline",
            FamilyTag::SmoothingSpline => "smoothing-spline",
            FamilyTag::Loess => "loess",
            FamilyTag::Kernel => "kernel",
        }
    }

    /// Single-character marker used by the ASCII plot.
    pub fn marker(self) -> char {
        match self {
            FamilyTag::NaturalSpline => 'n',
            FamilyTag::SmoothingSpline => 's',
            FamilyTag::Loess => 'l',
            FamilyTag::Kernel => 'k',
        }
    }
}

impl std::fmt::Display for FamilyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a smoothing spline chooses its roughness penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CvCriterion {
    /// Ordinary leave-one-out ("N-fold") cross-validation.
    #[value(name = "loocv")]
    LeaveOneOut,
    /// Generalized cross-validation.
    #[value(name = "gcv")]
    Generalized,
}

impl CvCriterion {
    pub fn display_name(self) -> &'static str {
        match self {
            CvCriterion::LeaveOneOut => "loocv",
            CvCriterion::Generalized => "gcv",
        }
    }
}

impl std::fmt::Display for CvCriterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Kernel bandwidth specification.
///
/// The resolved bandwidth is the standard deviation of the Gaussian weight
/// kernel, in time-index units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// Absolute bandwidth in time-index units.
    Absolute(f64),
    /// Fraction of the sample standard deviation of the time index.
    FractionOfSd(f64),
    /// Rule-of-thumb plug-in selector (Ruppert, Sheather & Wand).
    PlugIn,
}

/// One smoother family plus its hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "kebab-case")]
pub enum SmootherConfig {
    /// Natural cubic spline regression with `df` degrees of freedom (plus intercept).
    NaturalSpline { df: usize },
    /// Penalized cubic smoothing spline; the penalty is chosen by `criterion`.
    SmoothingSpline { criterion: CvCriterion },
    /// Locally weighted polynomial regression with a tricube kernel.
    Loess { span: f64, degree: usize },
    /// Local polynomial regression with a Gaussian kernel.
    Kernel { bandwidth: Bandwidth, degree: usize },
}

impl SmootherConfig {
    pub fn family(&self) -> FamilyTag {
        match self {
            SmootherConfig::NaturalSpline { .. } => FamilyTag::NaturalSpline,
            SmootherConfig::SmoothingSpline { .. } => FamilyTag::SmoothingSpline,
            SmootherConfig::Loess { .. } => FamilyTag::Loess,
            SmootherConfig::Kernel { .. } => FamilyTag::Kernel,
        }
    }

    /// Compact human-readable label (e.g. `loess(span=0.50, degree=2)`).
    pub fn label(&self) -> String {
        match self {
            SmootherConfig::NaturalSpline { df } => format!("ns(df={df})"),
            SmootherConfig::SmoothingSpline { criterion } => {
                format!("smooth.spline({})", criterion.display_name())
            }
            SmootherConfig::Loess { span, degree } => {
                format!("loess(span={span:.2}, degree={degree})")
            }
            SmootherConfig::Kernel { bandwidth, degree } => match bandwidth {
                Bandwidth::Absolute(h) => format!("kernel(h={h:.3}, degree={degree})"),
                Bandwidth::FractionOfSd(f) => format!("kernel(h={f:.2}*sd, degree={degree})"),
                Bandwidth::PlugIn => format!("kernel(h=plug-in, degree={degree})"),
            },
        }
    }
}

impl std::fmt::Display for SmootherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Summary statistics of an observed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub n: usize,
    pub mean: f64,
    pub sd: f64,
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_reports_its_family() {
        let configs = [
            SmootherConfig::NaturalSpline { df: 5 },
            SmootherConfig::SmoothingSpline {
                criterion: CvCriterion::Generalized,
            },
            SmootherConfig::Loess { span: 0.5, degree: 2 },
            SmootherConfig::Kernel {
                bandwidth: Bandwidth::PlugIn,
                degree: 1,
            },
        ];
        let families: Vec<FamilyTag> = configs.iter().map(|c| c.family()).collect();
        assert_eq!(families, FamilyTag::ALL.to_vec());
    }

    #[test]
    fn labels_are_compact() {
        assert_eq!(SmootherConfig::NaturalSpline { df: 5 }.label(), "ns(df=5)");
        assert_eq!(
            SmootherConfig::Loess { span: 0.5, degree: 2 }.label(),
            "loess(span=0.50, degree=2)"
        );
        assert_eq!(
            SmootherConfig::Kernel {
                bandwidth: Bandwidth::FractionOfSd(0.5),
                degree: 1
            }
            .label(),
            "kernel(h=0.50*sd, degree=1)"
        );
    }

    #[test]
    fn config_json_is_tagged_by_family() {
        let json = serde_json::to_string(&SmootherConfig::Loess { span: 0.5, degree: 2 }).unwrap();
        assert_eq!(json, r#"{"family":"loess","span":0.5,"degree":2}"#);
    }
}
