//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid: enough to eyeball how the selected smoothers
//! track the data, and deterministic so it can be snapshot tested.
//!
//! Plot elements:
//! - observed values: `.`
//! - selected curve per family: the family marker (`n`, `s`, `l`, `k`)
//!
//! Curves are drawn first, in family order; observed points fill the cells
//! left blank.

use crate::report::ComparisonReport;

const OBSERVED: char = '.';
const Y_PADDING: f64 = 0.05;

/// Render the observed series and every selected curve of a report.
pub fn render_comparison_plot(report: &ComparisonReport, width: usize, height: usize) -> String {
    let t_first = report.time_index.first().copied().unwrap_or(1) as f64;
    let t_last = report.time_index.last().copied().unwrap_or(1) as f64;
    let t_range = if t_last > t_first {
        (t_first, t_last)
    } else {
        (t_first, t_first + 1.0)
    };

    let all_y = report
        .observed
        .iter()
        .chain(report.entries.iter().flat_map(|e| e.predictions.iter()))
        .copied();
    let y_range = padded_extent(all_y).unwrap_or((0.0, 1.0));

    let mut canvas = Canvas::new(width.max(10), height.max(5), t_range, y_range);

    for entry in &report.entries {
        let marker = entry.family.marker();
        let mut prev: Option<(usize, usize)> = None;
        for (&t, &y) in report.time_index.iter().zip(&entry.predictions) {
            let cell = canvas.cell(t as f64, y);
            match prev {
                Some(from) => canvas.line(from, cell, marker),
                None => canvas.put(cell, marker),
            }
            prev = Some(cell);
        }
    }

    for (&t, &y) in report.time_index.iter().zip(&report.observed) {
        let cell = canvas.cell(t as f64, y);
        canvas.put(cell, OBSERVED);
    }

    let (t_min, t_max) = t_range;
    let (y_min, y_max) = y_range;
    let mut out = format!("Plot: t=[{t_min:.0}, {t_max:.0}] | y=[{y_min:.2}, {y_max:.2}]\n");
    canvas.write_rows(&mut out);

    out.push_str(&format!("Legend: {OBSERVED} observed"));
    for entry in &report.entries {
        out.push_str(&format!("  {} {}", entry.family.marker(), entry.family.display_name()));
    }
    out.push('\n');
    out
}

/// Finite extent of `values`, widened by [`Y_PADDING`] on both sides.
fn padded_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi > lo {
        let pad = ((hi - lo) * Y_PADDING).max(1e-12);
        Some((lo - pad, hi + pad))
    } else {
        None
    }
}

struct Canvas {
    cells: Vec<Vec<char>>,
    t_range: (f64, f64),
    y_range: (f64, f64),
}

impl Canvas {
    fn new(width: usize, height: usize, t_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            cells: vec![vec![' '; width]; height],
            t_range,
            y_range,
        }
    }

    fn width(&self) -> usize {
        self.cells[0].len()
    }

    fn height(&self) -> usize {
        self.cells.len()
    }

    /// Grid cell `(column, row)` of a data point. Row 0 is the top (largest y).
    fn cell(&self, t: f64, y: f64) -> (usize, usize) {
        let (t_lo, t_hi) = self.t_range;
        let (y_lo, y_hi) = self.y_range;
        let u = ((t - t_lo) / (t_hi - t_lo)).clamp(0.0, 1.0);
        let v = ((y - y_lo) / (y_hi - y_lo)).clamp(0.0, 1.0);
        let last_col = (self.width() - 1) as f64;
        let last_row = (self.height() - 1) as f64;
        ((u * last_col).round() as usize, (last_row * (1.0 - v)).round() as usize)
    }

    /// Write `ch` unless the cell is already taken.
    fn put(&mut self, (col, row): (usize, usize), ch: char) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            if *slot == ' ' {
                *slot = ch;
            }
        }
    }

    /// Bresenham segment between two cells, endpoints included.
    fn line(&mut self, from: (usize, usize), to: (usize, usize), ch: char) {
        let (mut col, mut row) = (from.0 as isize, from.1 as isize);
        let (end_col, end_row) = (to.0 as isize, to.1 as isize);

        let dx = (end_col - col).abs();
        let dy = -(end_row - row).abs();
        let step_col = (end_col - col).signum();
        let step_row = (end_row - row).signum();
        let mut err = dx + dy;

        loop {
            self.put((col as usize, row as usize), ch);
            if col == end_col && row == end_row {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                col += step_col;
            }
            if doubled <= dx {
                err += dx;
                row += step_row;
            }
        }
    }

    fn write_rows(&self, out: &mut String) {
        for row in &self.cells {
            let line: String = row.iter().collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
}
