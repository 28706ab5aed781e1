//! Shared comparison pipeline used by every run command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! parameter grids -> parallel fit/score -> per-family selection -> comparison
//!
//! The commands can then focus on presentation (summary, tables, plot, exports).

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::data::Series;
use crate::domain::FamilyTag;
use crate::error::AppError;
use crate::fit::{GridSpec, SelectionPolicySet, SelectionResult, evaluate, select};
use crate::report::{ComparisonReport, SkippedFamily, compare};

/// Everything the pipeline needs besides the series.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub families: Vec<FamilyTag>,
    pub grid: GridSpec,
    pub policies: SelectionPolicySet,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Selection result of every family that produced a viable config.
    pub results: BTreeMap<FamilyTag, SelectionResult>,
    pub report: ComparisonReport,
}

/// Evaluate, select and compare every requested family.
///
/// A family without a viable config is reported as skipped. The run fails only
/// when no family is left (exit code 3).
pub fn run_pipeline(series: &Series, config: &RunConfig) -> Result<RunOutput, AppError> {
    let families: BTreeSet<FamilyTag> = config.families.iter().copied().collect();
    if families.is_empty() {
        return Err(AppError::new(2, "No smoother families requested."));
    }
    info!(
        series = series.name(),
        n = series.len(),
        families = families.len(),
        "starting comparison"
    );

    let mut results = BTreeMap::new();
    let mut skipped = Vec::new();

    for family in families {
        let configs = config.grid.configs(family);
        let scored = evaluate(series, family, &configs);
        let policy = config.policies.get(family);

        match select(&scored, &policy) {
            Ok(result) => {
                info!(
                    %family,
                    config = %result.selected.config,
                    mse = result.selected.mse,
                    edf = result.selected.model.effective_df(),
                    evaluated = scored.len(),
                    "selected config"
                );
                results.insert(family, result);
            }
            Err(err) => {
                warn!(%family, error = %err, "family skipped");
                skipped.push(SkippedFamily::from_error(family, &err));
            }
        }
    }

    if results.is_empty() {
        let reasons: Vec<String> = skipped
            .iter()
            .map(|s| format!("{}: {}", s.family.display_name(), s.reason))
            .collect();
        return Err(AppError::new(
            3,
            format!("No family produced a viable config ({}).", reasons.join("; ")),
        ));
    }

    let report = compare(series, &results, skipped)?;
    Ok(RunOutput { results, report })
}
