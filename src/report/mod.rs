//! Cross-family comparison and ranked tables.
//!
//! Assembles what selection already decided; no numerical decisions are made
//! here beyond predicting each selected model over the series' time range.

pub mod format;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::Series;
use crate::domain::{FamilyTag, SmootherConfig};
use crate::error::{NoViableConfigError, PredictionRangeError};
use crate::fit::SelectionResult;
use crate::models::FitDetail;

/// The selected model of one family, predicted over `1..=N`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub family: FamilyTag,
    pub config: SmootherConfig,
    pub label: String,
    pub mse: f64,
    pub rmse: f64,
    pub effective_df: f64,
    pub detail: FitDetail,
    pub predictions: Vec<f64>,
}

/// A family that produced no selectable config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFamily {
    pub family: FamilyTag,
    pub reason: String,
}

impl SkippedFamily {
    pub fn from_error(family: FamilyTag, err: &NoViableConfigError) -> Self {
        Self {
            family,
            reason: err.reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub series_name: String,
    pub time_index: Vec<usize>,
    pub dates: Vec<NaiveDate>,
    pub observed: Vec<f64>,
    /// One entry per selected family, in family order.
    pub entries: Vec<ComparisonEntry>,
    pub skipped: Vec<SkippedFamily>,
}

impl ComparisonReport {
    pub fn entry(&self, family: FamilyTag) -> Option<&ComparisonEntry> {
        self.entries.iter().find(|e| e.family == family)
    }
}

/// Pair every family's selected curve with the observed series.
///
/// Fails only when a selected model was fitted on a series of different length.
pub fn compare(
    series: &Series,
    results: &BTreeMap<FamilyTag, SelectionResult>,
    skipped: Vec<SkippedFamily>,
) -> Result<ComparisonReport, PredictionRangeError> {
    let time_index: Vec<usize> = series.time_indices().collect();

    let mut entries = Vec::with_capacity(results.len());
    for (&family, result) in results {
        let model = &result.selected.model;
        if model.len() != series.len() {
            // First index where the model and the series disagree.
            return Err(PredictionRangeError {
                time_index: model.len().min(series.len()) + 1,
                len: model.len(),
            });
        }
        let predictions = time_index
            .iter()
            .map(|&t| model.predict(t))
            .collect::<Result<Vec<f64>, _>>()?;
        entries.push(ComparisonEntry {
            family,
            config: result.selected.config,
            label: result.selected.config.label(),
            mse: result.selected.mse,
            rmse: result.selected.mse.sqrt(),
            effective_df: model.effective_df(),
            detail: model.detail().clone(),
            predictions,
        });
    }

    Ok(ComparisonReport {
        series_name: series.name().to_string(),
        dates: time_index.iter().filter_map(|&t| series.date_of(t)).collect(),
        observed: series.values().to_vec(),
        time_index,
        entries,
        skipped,
    })
}

/// Status of a config within its family's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankStatus {
    Selected,
    Candidate,
    AboveCeiling,
    Failed,
}

impl RankStatus {
    /// One-character marker used in terminal tables.
    pub fn marker(self) -> char {
        match self {
            RankStatus::Selected => '*',
            RankStatus::Candidate => ' ',
            RankStatus::AboveCeiling => '^',
            RankStatus::Failed => 'x',
        }
    }
}

/// One row of a family's ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub rank: usize,
    pub index: usize,
    pub config: SmootherConfig,
    pub label: String,
    pub status: RankStatus,
    pub mse: Option<f64>,
    pub effective_df: Option<f64>,
    pub error: Option<String>,
}

/// Flatten a selection result into table rows (rank starts at 1).
pub fn ranked_rows(result: &SelectionResult) -> Vec<RankedRow> {
    result
        .ranked
        .iter()
        .enumerate()
        .map(|(i, fit)| {
            let status = if fit.error().is_some() {
                RankStatus::Failed
            } else if fit.index == result.selected.index {
                RankStatus::Selected
            } else if result.exceeds_ceiling(fit) {
                RankStatus::AboveCeiling
            } else {
                RankStatus::Candidate
            };
            RankedRow {
                rank: i + 1,
                index: fit.index,
                config: fit.config,
                label: fit.config.label(),
                status,
                mse: fit.mse(),
                effective_df: fit.effective_df(),
                error: fit.error().map(|e| e.to_string()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{SelectionPolicy, evaluate, select};

    fn loess_result(series: &Series) -> SelectionResult {
        let configs = [
            SmootherConfig::Loess { span: 0.25, degree: 2 },
            SmootherConfig::Loess { span: 0.5, degree: 2 },
            SmootherConfig::Loess { span: -1.0, degree: 2 },
        ];
        let scored = evaluate(series, FamilyTag::Loess, &configs);
        select(&scored, &SelectionPolicy::default()).unwrap()
    }

    #[test]
    fn compare_predicts_full_range() {
        let series = Series::uk_driver_deaths();
        let mut results = BTreeMap::new();
        results.insert(FamilyTag::Loess, loess_result(&series));
        let skipped = vec![SkippedFamily {
            family: FamilyTag::Kernel,
            reason: "all 1 configs failed to fit".to_string(),
        }];

        let report = compare(&series, &results, skipped).unwrap();
        assert_eq!(report.time_index.len(), 192);
        assert_eq!(report.dates.len(), 192);
        assert_eq!(report.observed, series.values());
        assert_eq!(report.entries.len(), 1);
        let entry = report.entry(FamilyTag::Loess).unwrap();
        assert_eq!(entry.predictions.len(), 192);
        assert!((entry.rmse * entry.rmse - entry.mse).abs() < 1e-6 * entry.mse.max(1.0));
        assert_eq!(report.skipped[0].family, FamilyTag::Kernel);
    }

    #[test]
    fn compare_rejects_models_from_other_series() {
        let long = Series::uk_driver_deaths();
        let short = Series::new("short", 1969, 1, long.values()[..120].to_vec()).unwrap();
        let mut results = BTreeMap::new();
        results.insert(FamilyTag::Loess, loess_result(&short));

        let err = compare(&long, &results, Vec::new()).unwrap_err();
        assert_eq!(err, PredictionRangeError { time_index: 121, len: 120 });
    }

    #[test]
    fn compare_rejects_models_fitted_on_longer_series() {
        let long = Series::uk_driver_deaths();
        let short = Series::new("short", 1969, 1, long.values()[..120].to_vec()).unwrap();
        let mut results = BTreeMap::new();
        results.insert(FamilyTag::Loess, loess_result(&long));

        let err = compare(&short, &results, Vec::new()).unwrap_err();
        assert_eq!(err, PredictionRangeError { time_index: 121, len: 192 });
    }

    #[test]
    fn ranked_rows_mark_status() {
        let series = Series::uk_driver_deaths();
        let result = loess_result(&series);
        let rows = ranked_rows(&result);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].status, RankStatus::Selected);
        assert_eq!(rows[2].status, RankStatus::Failed);
        assert!(rows[2].error.is_some());
        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
