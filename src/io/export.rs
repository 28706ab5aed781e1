//! Export comparison results to CSV and JSON.
//!
//! - CSV: one row per time index with the observed value and every selected
//!   curve, easy to consume in spreadsheets or downstream scripts.
//! - JSON: the full comparison report plus each family's ranked table; it can
//!   be read back for plotting.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::FamilyTag;
use crate::error::AppError;
use crate::fit::SelectionResult;
use crate::report::{ComparisonReport, RankedRow, ranked_rows};

/// Schema of the exported JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub report: ComparisonReport,
    /// Ranked configs per evaluated family.
    pub families: BTreeMap<FamilyTag, Vec<RankedRow>>,
}

impl ReportFile {
    pub fn new(report: &ComparisonReport, results: &BTreeMap<FamilyTag, SelectionResult>) -> Self {
        Self {
            tool: "smooth".to_string(),
            report: report.clone(),
            families: results
                .iter()
                .map(|(&family, result)| (family, ranked_rows(result)))
                .collect(),
        }
    }
}

/// Write the comparison table to a CSV file.
pub fn write_comparison_csv(path: &Path, report: &ComparisonReport) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;
    write_comparison(file, report)
}

/// Write the comparison table as CSV to any writer.
pub fn write_comparison<W: Write>(mut out: W, report: &ComparisonReport) -> Result<(), AppError> {
    let mut header = String::from("time_index,date,observed");
    for entry in &report.entries {
        header.push(',');
        header.push_str(entry.family.display_name());
    }
    writeln!(out, "{header}")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (i, (&t, &y)) in report.time_index.iter().zip(&report.observed).enumerate() {
        let date = report
            .dates
            .get(i)
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default();
        let mut row = format!("{t},{date},{y:.4}");
        for entry in &report.entries {
            row.push_str(&format!(",{:.4}", entry.predictions[i]));
        }
        writeln!(out, "{row}")
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the report JSON file.
pub fn write_report_json(path: &Path, file: &ReportFile) -> Result<(), AppError> {
    let out = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))
}
