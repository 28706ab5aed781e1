//! CSV ingest for monthly series.
//!
//! Turns a CSV file into a validated [`Series`].
//!
//! A value column is required and every row must parse: a skipped row would
//! shift every later time index, so bad input is an error (exit code 2).
//!
//! Schema:
//! - `value` (or the column named by `--column`): the observations
//! - `date` (optional): `YYYY-MM` or `YYYY-MM-DD`, consecutive months
//!
//! Header names are matched case-insensitively.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use tracing::{info, warn};

use crate::data::Series;
use crate::error::AppError;

const DEFAULT_VALUE_COLUMN: &str = "value";
const DATE_COLUMN: &str = "date";

/// First period assumed when the file has no `date` column and no start was
/// supplied: January of year 1.
pub const DEFAULT_START: YearMonth = YearMonth { year: 1, month: 1 };

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_month(s).map(YearMonth::of)
    }
}

/// How to read a series from CSV.
#[derive(Debug, Clone)]
pub struct CsvSeriesSpec {
    pub path: PathBuf,
    /// Value column; defaults to `value`.
    pub column: Option<String>,
    /// First period when the file has no `date` column.
    pub start: Option<YearMonth>,
}

/// Load a series from a CSV file.
pub fn load_series_csv(spec: &CsvSeriesSpec) -> Result<Series, AppError> {
    let file = File::open(&spec.path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", spec.path.display()))
    })?;
    let name = series_name(&spec.path);
    let series = read_series(file, &name, spec.column.as_deref(), spec.start)?;
    info!(
        path = %spec.path.display(),
        n = series.len(),
        "loaded series"
    );
    Ok(series)
}

/// Read a series from any CSV source.
pub fn read_series<R: Read>(
    reader: R,
    name: &str,
    column: Option<&str>,
    start: Option<YearMonth>,
) -> Result<Series, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let value_name = column.map(header_key).unwrap_or_else(|| DEFAULT_VALUE_COLUMN.to_string());
    let columns = Columns::locate(&headers, &value_name)?;
    if columns.date.is_some() && start.is_some() {
        warn!("CSV has a `date` column; ignoring the supplied start period");
    }

    let mut values = Vec::new();
    let mut first: Option<YearMonth> = None;
    let mut previous: Option<YearMonth> = None;

    for (idx, result) in reader.records().enumerate() {
        // Header is line 1; lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| row_error(line, format!("CSV parse error: {e}")))?;

        let value = field(&record, columns.value, &value_name)
            .and_then(|s| parse_f64(s, &value_name))
            .map_err(|e| row_error(line, e))?;

        if let Some(date_idx) = columns.date {
            let month = field(&record, date_idx, DATE_COLUMN)
                .and_then(parse_month)
                .map(YearMonth::of)
                .map_err(|e| row_error(line, e))?;
            if let Some(prev) = previous {
                if month != prev.next() {
                    return Err(row_error(
                        line,
                        format!("date {month} does not follow {prev}; months must be consecutive"),
                    ));
                }
            }
            first.get_or_insert(month);
            previous = Some(month);
        }

        values.push(value);
    }

    let start = first.or(start).unwrap_or(DEFAULT_START);
    Ok(Series::new(name, start.year, start.month, values)?)
}

fn row_error(line: usize, message: String) -> AppError {
    AppError::new(2, format!("Invalid CSV row at line {line}: {message}"))
}

fn series_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "series".to_string())
}

/// Positions of the columns we read.
struct Columns {
    value: usize,
    date: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, value_name: &str) -> Result<Self, AppError> {
        let position = |wanted: &str| headers.iter().position(|h| header_key(h) == wanted);
        let value = position(value_name).ok_or_else(|| {
            AppError::new(2, format!("Missing required column: `{value_name}`"))
        })?;
        Ok(Self {
            value,
            date: position(DATE_COLUMN),
        })
    }
}

/// Case-insensitive header key. A UTF-8 BOM on the first header is dropped.
fn header_key(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn field<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    match record.get(idx).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(format!("Missing required value: `{name}`")),
    }
}

/// Parse `YYYY-MM-DD` or `YYYY-MM` to the first day of that month.
fn parse_month(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .map_err(|_| format!("Invalid date '{s}'. Expected YYYY-MM or YYYY-MM-DD."))?;
    date.with_day(1)
        .ok_or_else(|| format!("Invalid date '{s}'."))
}

fn parse_f64(s: &str, column: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{column}` value '{s}'.")),
    }
}
