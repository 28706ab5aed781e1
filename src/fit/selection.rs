//! Per-family model selection under a complexity ceiling.
//!
//! Rules:
//! 1. Only successful fits with `EDF <= ceiling` are candidates.
//! 2. A preferred config, when supplied and among the candidates, wins.
//! 3. Otherwise pick the minimum MSE; break ties by lower EDF, then by grid
//!    position.
//!
//! The ceiling is never relaxed: if every successful fit is too complex the
//! family has no viable config.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{FamilyTag, SmootherConfig};
use crate::error::{NoViableConfigError, NoViableReason};
use crate::fit::grid::ScoredFit;
use crate::models::FittedModel;

/// Absolute slack when comparing EDF against the ceiling.
const CEILING_TOL: f64 = 1e-9;

/// Caller-supplied selection policy for one family.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionPolicy {
    /// Maximum effective degrees of freedom; `None` means unconstrained.
    pub ceiling: Option<f64>,
    /// Config to choose whenever it is a viable candidate.
    pub preferred: Option<SmootherConfig>,
}

impl SelectionPolicy {
    pub fn with_ceiling(ceiling: f64) -> Self {
        Self {
            ceiling: Some(ceiling),
            preferred: None,
        }
    }

    fn admits(&self, edf: f64) -> bool {
        match self.ceiling {
            Some(ceiling) => edf <= ceiling + CEILING_TOL,
            None => true,
        }
    }
}

/// Policies for every family of a run. Families without an entry are
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionPolicySet {
    policies: BTreeMap<FamilyTag, SelectionPolicy>,
}

impl SelectionPolicySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, family: FamilyTag, policy: SelectionPolicy) -> &mut Self {
        self.policies.insert(family, policy);
        self
    }

    pub fn get(&self, family: FamilyTag) -> SelectionPolicy {
        self.policies.get(&family).copied().unwrap_or_default()
    }
}

/// The chosen config of a family.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFit {
    pub index: usize,
    pub config: SmootherConfig,
    pub mse: f64,
    pub model: FittedModel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub family: FamilyTag,
    pub ceiling: Option<f64>,
    pub selected: SelectedFit,
    /// Every evaluated config ordered by (MSE, EDF, grid position); failed
    /// configs come last in grid order.
    pub ranked: Vec<ScoredFit>,
}

impl SelectionResult {
    /// Whether a ranked entry fitted but exceeds this result's ceiling.
    pub fn exceeds_ceiling(&self, fit: &ScoredFit) -> bool {
        match (self.ceiling, fit.effective_df()) {
            (Some(ceiling), Some(edf)) => edf > ceiling + CEILING_TOL,
            _ => false,
        }
    }
}

/// Select the best config of one family.
pub fn select(
    scored: &[ScoredFit],
    policy: &SelectionPolicy,
) -> Result<SelectionResult, NoViableConfigError> {
    let Some(family) = family_of(scored) else {
        return Err(NoViableConfigError {
            family: None,
            reason: NoViableReason::Empty,
        });
    };
    let no_viable = |reason| NoViableConfigError {
        family: Some(family),
        reason,
    };

    let fitted: Vec<&ScoredFit> = scored.iter().filter(|s| s.score().is_some()).collect();
    if fitted.is_empty() {
        return Err(no_viable(NoViableReason::AllFailed {
            failed: scored.len(),
        }));
    }

    let candidates: Vec<&ScoredFit> = fitted
        .iter()
        .copied()
        .filter(|s| s.effective_df().is_some_and(|edf| policy.admits(edf)))
        .collect();
    if candidates.is_empty() {
        let lowest_edf = fitted
            .iter()
            .filter_map(|s| s.effective_df())
            .fold(f64::INFINITY, f64::min);
        return Err(no_viable(NoViableReason::AboveCeiling {
            ceiling: policy.ceiling.unwrap_or(f64::INFINITY),
            lowest_edf,
        }));
    }

    let preferred = policy
        .preferred
        .and_then(|p| candidates.iter().copied().find(|s| s.config == p));
    let best = match preferred {
        Some(fit) => fit,
        None => candidates
            .iter()
            .copied()
            .min_by(|a, b| rank_order(a, b))
            .ok_or_else(|| no_viable(NoViableReason::Empty))?,
    };
    let score = best
        .score()
        .ok_or_else(|| no_viable(NoViableReason::AllFailed { failed: scored.len() }))?;

    let mut ranked = scored.to_vec();
    ranked.sort_by(rank_order);

    Ok(SelectionResult {
        family,
        ceiling: policy.ceiling,
        selected: SelectedFit {
            index: best.index,
            config: best.config,
            mse: score.mse,
            model: score.model.clone(),
        },
        ranked,
    })
}

/// Family of a scored grid: that of the first fitted config, else the first entry.
fn family_of(scored: &[ScoredFit]) -> Option<FamilyTag> {
    scored
        .iter()
        .find_map(|s| s.score().map(|score| score.model.family()))
        .or_else(|| scored.first().map(|s| s.config.family()))
}

/// (MSE, EDF, index) with failures after every success.
fn rank_order(a: &ScoredFit, b: &ScoredFit) -> Ordering {
    match (a.score(), b.score()) {
        (Some(sa), Some(sb)) => sa
            .mse
            .total_cmp(&sb.mse)
            .then_with(|| sa.model.effective_df().total_cmp(&sb.model.effective_df()))
            .then_with(|| a.index.cmp(&b.index)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.index.cmp(&b.index),
    }
}
