//! Parameter grids per smoother family.
//!
//! Grids are deterministic and ordered from the simplest config to the most
//! flexible one where a family has such an order.

use crate::domain::{Bandwidth, CvCriterion, FamilyTag, SmootherConfig};

pub const DEFAULT_NS_DF: [usize; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
pub const DEFAULT_LOESS_SPANS: [f64; 10] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0];
pub const DEFAULT_LOESS_DEGREE: usize = 2;
pub const DEFAULT_KERNEL_FRACTIONS: [f64; 5] = [0.1, 0.25, 0.5, 0.75, 1.0];
pub const DEFAULT_KERNEL_DEGREE: usize = 1;

/// Default effective-degrees-of-freedom ceilings.
pub const DEFAULT_NS_MAX_EDF: f64 = 8.0;
pub const DEFAULT_LOESS_MAX_EDF: f64 = 12.0;
pub const DEFAULT_KERNEL_MAX_EDF: f64 = 12.0;

/// Parameter values from which every family's config grid is built.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSpec {
    pub ns_df: Vec<usize>,
    pub ss_criteria: Vec<CvCriterion>,
    pub loess_spans: Vec<f64>,
    pub loess_degree: usize,
    pub kernel_fractions: Vec<f64>,
    pub kernel_degree: usize,
    pub kernel_plug_in: bool,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            ns_df: DEFAULT_NS_DF.to_vec(),
            ss_criteria: vec![CvCriterion::LeaveOneOut, CvCriterion::Generalized],
            loess_spans: DEFAULT_LOESS_SPANS.to_vec(),
            loess_degree: DEFAULT_LOESS_DEGREE,
            kernel_fractions: DEFAULT_KERNEL_FRACTIONS.to_vec(),
            kernel_degree: DEFAULT_KERNEL_DEGREE,
            kernel_plug_in: true,
        }
    }
}

impl GridSpec {
    /// Configs to evaluate for `family`, in grid order.
    pub fn configs(&self, family: FamilyTag) -> Vec<SmootherConfig> {
        match family {
            FamilyTag::NaturalSpline => self
                .ns_df
                .iter()
                .map(|&df| SmootherConfig::NaturalSpline { df })
                .collect(),
            FamilyTag::SmoothingSpline => self
                .ss_criteria
                .iter()
                .map(|&criterion| SmootherConfig::SmoothingSpline { criterion })
                .collect(),
            FamilyTag::Loess => self
                .loess_spans
                .iter()
                .map(|&span| SmootherConfig::Loess {
                    span,
                    degree: self.loess_degree,
                })
                .collect(),
            FamilyTag::Kernel => {
                let mut configs: Vec<SmootherConfig> = self
                    .kernel_fractions
                    .iter()
                    .map(|&f| SmootherConfig::Kernel {
                        bandwidth: Bandwidth::FractionOfSd(f),
                        degree: self.kernel_degree,
                    })
                    .collect();
                if self.kernel_plug_in {
                    configs.push(SmootherConfig::Kernel {
                        bandwidth: Bandwidth::PlugIn,
                        degree: self.kernel_degree,
                    });
                }
                configs
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_sizes() {
        let grid = GridSpec::default();
        assert_eq!(grid.configs(FamilyTag::NaturalSpline).len(), 12);
        assert_eq!(grid.configs(FamilyTag::SmoothingSpline).len(), 2);
        assert_eq!(grid.configs(FamilyTag::Loess).len(), 10);
        assert_eq!(grid.configs(FamilyTag::Kernel).len(), 6);
    }

    #[test]
    fn configs_belong_to_their_family() {
        let grid = GridSpec::default();
        for family in FamilyTag::ALL {
            assert!(grid.configs(family).iter().all(|c| c.family() == family));
        }
    }

    #[test]
    fn plug_in_can_be_disabled() {
        let grid = GridSpec {
            kernel_plug_in: false,
            ..GridSpec::default()
        };
        let kernel = grid.configs(FamilyTag::Kernel);
        assert_eq!(kernel.len(), 5);
        assert!(
            kernel
                .iter()
                .all(|c| !matches!(c, SmootherConfig::Kernel { bandwidth: Bandwidth::PlugIn, .. }))
        );
    }
}
