//! Command-line parsing for the series smoother comparison.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code. Every run flag can also be supplied
//! through a `SMOOTH_*` environment variable (or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{CvCriterion, FamilyTag};
use crate::fit::{
    DEFAULT_KERNEL_DEGREE, DEFAULT_KERNEL_FRACTIONS, DEFAULT_KERNEL_MAX_EDF, DEFAULT_LOESS_DEGREE,
    DEFAULT_LOESS_MAX_EDF, DEFAULT_LOESS_SPANS, DEFAULT_NS_DF, DEFAULT_NS_MAX_EDF,
};
use crate::io::YearMonth;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "smooth",
    version,
    about = "Compare spline, loess and kernel smoothers on a monthly series"
)]
pub struct Cli {
    /// Log filter (e.g. `warn`, `info`, `series_smoothers=debug`). Logs go to stderr.
    #[arg(long, global = true, env = "SMOOTH_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every family's grid, select one config per family and print the comparison.
    Compare(RunArgs),
    /// Print the ranked table of each family only (useful for scripting).
    Rank(RunArgs),
    /// Plot a previously exported report JSON.
    Plot(PlotArgs),
}

/// Options shared by `compare` and `rank`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// CSV file with a `value` column and optional `date` column (default: embedded UK driver deaths).
    #[arg(long, value_name = "CSV", env = "SMOOTH_DATA")]
    pub data: Option<PathBuf>,

    /// Name of the value column in `--data`.
    #[arg(long, env = "SMOOTH_COLUMN")]
    pub column: Option<String>,

    /// First month (YYYY-MM) when `--data` has no `date` column.
    #[arg(long, value_name = "YYYY-MM", env = "SMOOTH_START")]
    pub start: Option<YearMonth>,

    /// Families to evaluate.
    #[arg(
        long = "family",
        value_enum,
        value_delimiter = ',',
        env = "SMOOTH_FAMILIES",
        default_values_t = FamilyTag::ALL.to_vec()
    )]
    pub families: Vec<FamilyTag>,

    /// Natural spline degrees of freedom to try.
    #[arg(long, value_delimiter = ',', env = "SMOOTH_NS_DF", default_values_t = DEFAULT_NS_DF.to_vec())]
    pub ns_df: Vec<usize>,

    /// Smoothing spline penalty criteria to try.
    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        env = "SMOOTH_SS_CRITERION",
        default_values_t = vec![CvCriterion::LeaveOneOut, CvCriterion::Generalized]
    )]
    pub ss_criterion: Vec<CvCriterion>,

    /// Loess spans to try, each in (0, 1].
    #[arg(long, value_delimiter = ',', env = "SMOOTH_LOESS_SPAN", default_values_t = DEFAULT_LOESS_SPANS.to_vec())]
    pub loess_span: Vec<f64>,

    /// Loess local polynomial degree (0, 1 or 2).
    #[arg(long, env = "SMOOTH_LOESS_DEGREE", default_value_t = DEFAULT_LOESS_DEGREE)]
    pub loess_degree: usize,

    /// Kernel bandwidths to try, as fractions of the time index standard deviation.
    #[arg(
        long,
        value_delimiter = ',',
        env = "SMOOTH_KERNEL_FRACTION",
        default_values_t = DEFAULT_KERNEL_FRACTIONS.to_vec()
    )]
    pub kernel_fraction: Vec<f64>,

    /// Kernel local polynomial degree (0 to 3).
    #[arg(long, env = "SMOOTH_KERNEL_DEGREE", default_value_t = DEFAULT_KERNEL_DEGREE)]
    pub kernel_degree: usize,

    /// Do not add the plug-in bandwidth to the kernel grid.
    #[arg(long, env = "SMOOTH_NO_PLUG_IN")]
    pub no_plug_in: bool,

    /// Maximum effective degrees of freedom for the natural spline.
    #[arg(long, env = "SMOOTH_NS_MAX_EDF", default_value_t = DEFAULT_NS_MAX_EDF)]
    pub ns_max_edf: f64,

    /// Maximum effective degrees of freedom for the smoothing spline (default: none).
    #[arg(long, env = "SMOOTH_SS_MAX_EDF")]
    pub ss_max_edf: Option<f64>,

    /// Maximum effective degrees of freedom for loess.
    #[arg(long, env = "SMOOTH_LOESS_MAX_EDF", default_value_t = DEFAULT_LOESS_MAX_EDF)]
    pub loess_max_edf: f64,

    /// Maximum effective degrees of freedom for kernel regression.
    #[arg(long, env = "SMOOTH_KERNEL_MAX_EDF", default_value_t = DEFAULT_KERNEL_MAX_EDF)]
    pub kernel_max_edf: f64,

    /// Ignore every complexity ceiling (pure minimum-MSE selection).
    #[arg(long, env = "SMOOTH_NO_CEILING")]
    pub no_ceiling: bool,

    /// Disable the terminal plot.
    #[arg(long, env = "SMOOTH_NO_PLOT")]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, env = "SMOOTH_WIDTH", default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, env = "SMOOTH_HEIGHT", default_value_t = 25)]
    pub height: usize,

    /// Export the comparison report and ranked tables to JSON.
    #[arg(long, value_name = "JSON", env = "SMOOTH_EXPORT_JSON")]
    pub export_json: Option<PathBuf>,

    /// Export observed values and selected curves to CSV.
    #[arg(long, value_name = "CSV", env = "SMOOTH_EXPORT_CSV")]
    pub export_csv: Option<PathBuf>,
}

/// Options for plotting a saved report.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Report JSON file produced by `smooth compare --export-json`.
    #[arg(long, value_name = "JSON")]
    pub report: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
