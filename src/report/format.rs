//! Formatted terminal output.
//!
//! Plain fixed-width tables: the run summary and one ranked table per family.
//! Nothing here touches the models beyond reading their results.

use crate::data::Series;
use crate::fit::SelectionResult;
use crate::models::FitDetail;
use crate::report::{ComparisonReport, ranked_rows};

const LABEL_WIDTH: usize = 30;
const ERROR_WIDTH: usize = 60;

/// Format the run summary: dataset stats, the selected config per family and
/// any skipped families.
pub fn format_run_summary(series: &Series, report: &ComparisonReport) -> String {
    let mut out = String::new();
    let stats = series.stats();

    out.push_str("=== smooth - Series Smoother Comparison ===\n");
    out.push_str(&format!("Series: {}\n", report.series_name));
    if let (Some(first), Some(last)) = (report.dates.first(), report.dates.last()) {
        out.push_str(&format!(
            "Period: {} .. {} (monthly)\n",
            first.format("%Y-%m"),
            last.format("%Y-%m")
        ));
    }
    out.push_str(&format!(
        "Points: n={} | mean={:.2} sd={:.2} | y=[{:.2}, {:.2}]\n",
        stats.n, stats.mean, stats.sd, stats.min, stats.max
    ));

    out.push_str("\nSelected smoothers:\n");
    out.push_str(
        format!(
            "{:<18} {:<LABEL_WIDTH$} {:>12} {:>10} {:>7}\n",
            "family", "config", "mse", "rmse", "edf"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<18} {:-<LABEL_WIDTH$} {:-<12} {:-<10} {:-<7}\n",
            "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');
    for entry in &report.entries {
        out.push_str(
            format!(
                "{:<18} {:<LABEL_WIDTH$} {:>12.2} {:>10.3} {:>7.2}\n",
                entry.family.display_name(),
                truncate(&entry.label, LABEL_WIDTH),
                entry.mse,
                entry.rmse,
                entry.effective_df,
            )
            .trim_end(),
        );
        out.push('\n');
        out.push_str(&format!("  {}\n", fmt_detail(&entry.detail)));
    }
    if report.entries.is_empty() {
        out.push_str("  (none)\n");
    }

    for skipped in &report.skipped {
        out.push_str(&format!(
            "  (skipped {}) {}\n",
            skipped.family.display_name(),
            skipped.reason
        ));
    }
    out.push('\n');

    out
}

/// Format one family's ranked table.
///
/// Markers: `*` selected, `^` above the complexity ceiling, `x` failed.
pub fn format_family_table(result: &SelectionResult) -> String {
    let mut out = String::new();
    let ceiling = match result.ceiling {
        Some(c) => format!("max edf {c:.2}"),
        None => "no edf ceiling".to_string(),
    };
    out.push_str(&format!(
        "{} ({ceiling}):\n",
        result.family.display_name()
    ));

    out.push_str(
        format!(
            "  {:>4} {:<LABEL_WIDTH$} {:>12} {:>7} {}\n",
            "rank", "config", "mse", "edf", "note"
        )
        .trim_end(),
    );
    out.push('\n');

    for row in ranked_rows(result) {
        let mse = row.mse.map(|m| format!("{m:.2}")).unwrap_or_else(|| "-".to_string());
        let edf = row
            .effective_df
            .map(|d| format!("{d:.2}"))
            .unwrap_or_else(|| "-".to_string());
        let note = row
            .error
            .as_deref()
            .map(|e| truncate(e, ERROR_WIDTH))
            .unwrap_or_default();
        out.push_str(
            format!(
                "{} {:>4} {:<LABEL_WIDTH$} {:>12} {:>7} {}\n",
                row.status.marker(),
                row.rank,
                truncate(&row.label, LABEL_WIDTH),
                mse,
                edf,
                note,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_detail(detail: &FitDetail) -> String {
    match detail {
        FitDetail::NaturalSpline { knots, .. } => format!("knots: {}", fmt_vec(knots)),
        FitDetail::SmoothingSpline {
            lambda,
            criterion,
            score,
        } => format!(
            "lambda: {lambda:.4e} ({} score {score:.2})",
            criterion.display_name()
        ),
        FitDetail::Loess { neighbours } => format!("neighbours: {neighbours}"),
        FitDetail::Kernel { bandwidth } => format!("bandwidth: {bandwidth:.3} months"),
    }
}

fn fmt_vec(v: &[f64]) -> String {
    let inner = v.iter().map(|x| format!("{x:.2}")).collect::<Vec<_>>().join(", ");
    format!("[{inner}]")
}

/// Cut `s` to at most `max` characters, marking the cut with a trailing `.`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::domain::{FamilyTag, SmootherConfig};
    use crate::fit::{SelectionPolicy, evaluate, select};
    use crate::report::{SkippedFamily, compare};

    fn ns_result(series: &Series) -> SelectionResult {
        let configs: Vec<SmootherConfig> = [2, 4, 9]
            .into_iter()
            .map(|df| SmootherConfig::NaturalSpline { df })
            .chain([SmootherConfig::NaturalSpline { df: 0 }])
            .collect();
        let scored = evaluate(series, FamilyTag::NaturalSpline, &configs);
        select(&scored, &SelectionPolicy::with_ceiling(8.0)).unwrap()
    }

    #[test]
    fn family_table_marks_rows() {
        let series = Series::uk_driver_deaths();
        let table = format_family_table(&ns_result(&series));
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "natural-spline (max edf 8.00):");
        assert_eq!(lines.len(), 6);
        // df=9 fits best but exceeds the ceiling; df=4 is selected.
        assert!(lines[2].starts_with("^    1 ns(df=9)"));
        assert!(lines[3].starts_with("*    2 ns(df=4)"));
        assert!(lines[5].starts_with("x    4 ns(df=0)"));
        assert!(lines[5].contains("invalid df"));
    }

    #[test]
    fn summary_lists_entries_and_skips() {
        let series = Series::uk_driver_deaths();
        let mut results = BTreeMap::new();
        results.insert(FamilyTag::NaturalSpline, ns_result(&series));
        let skipped = vec![SkippedFamily {
            family: FamilyTag::Loess,
            reason: "no configs were evaluated".to_string(),
        }];
        let report = compare(&series, &results, skipped).unwrap();

        let txt = format_run_summary(&series, &report);
        assert!(txt.contains("Series: UKDriverDeaths"));
        assert!(txt.contains("Period: 1969-01 .. 1984-12"));
        assert!(txt.contains("natural-spline     ns(df=4)"));
        assert!(txt.contains("knots: [1.00, 48.75, 96.50, 144.25, 192.00]"));
        assert!(txt.contains("(skipped loess) no configs were evaluated"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 10), "abcdef");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd.");
    }
}
