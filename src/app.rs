//! Command dispatch for the `smooth` binary.
//!
//! `src/main.rs` only maps the result to an exit code. Everything else happens
//! here: `.env` loading, argument parsing, log setup, loading the series,
//! running the pipeline, then printing and exporting the results.

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, PlotArgs, RunArgs};
use crate::data::Series;
use crate::domain::FamilyTag;
use crate::error::AppError;
use crate::fit::{GridSpec, SelectionPolicy, SelectionPolicySet};
use crate::io::{CsvSeriesSpec, ReportFile};

pub mod pipeline;

use pipeline::RunConfig;

/// Entry point for the `smooth` binary.
pub fn run() -> Result<(), AppError> {
    // Optional; a missing file is not an error.
    dotenvy::dotenv().ok();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::Compare(args) => handle_run(args, OutputMode::Full),
        Command::Rank(args) => handle_run(args, OutputMode::RankOnly),
        Command::Plot(args) => handle_plot(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn init_tracing(filter: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|e| AppError::new(2, format!("Invalid log level '{filter}': {e}")))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| AppError::new(4, format!("Failed to install log subscriber: {e}")))
}

fn handle_run(args: RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let series = load_series(&args)?;
    let config = run_config_from_args(&args);
    let run = pipeline::run_pipeline(&series, &config)?;

    if mode == OutputMode::Full {
        println!("{}", crate::report::format::format_run_summary(&series, &run.report));
    }

    for result in run.results.values() {
        println!("{}", crate::report::format::format_family_table(result));
    }

    if mode == OutputMode::Full && !args.no_plot {
        let plot = crate::plot::render_comparison_plot(&run.report, args.width, args.height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &args.export_csv {
        crate::io::write_comparison_csv(path, &run.report)?;
        info!(path = %path.display(), "wrote CSV export");
    }
    if let Some(path) = &args.export_json {
        crate::io::write_report_json(path, &ReportFile::new(&run.report, &run.results))?;
        info!(path = %path.display(), "wrote JSON export");
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_report_json(&args.report)?;
    let plot = crate::plot::render_comparison_plot(&file.report, args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn load_series(args: &RunArgs) -> Result<Series, AppError> {
    match &args.data {
        Some(path) => crate::io::load_series_csv(&CsvSeriesSpec {
            path: path.clone(),
            column: args.column.clone(),
            start: args.start,
        }),
        None => {
            if args.column.is_some() || args.start.is_some() {
                warn!("--column and --start only apply to --data; using the embedded series");
            }
            Ok(Series::uk_driver_deaths())
        }
    }
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    let grid = GridSpec {
        ns_df: args.ns_df.clone(),
        ss_criteria: args.ss_criterion.clone(),
        loess_spans: args.loess_span.clone(),
        loess_degree: args.loess_degree,
        kernel_fractions: args.kernel_fraction.clone(),
        kernel_degree: args.kernel_degree,
        kernel_plug_in: !args.no_plug_in,
    };

    let mut policies = SelectionPolicySet::new();
    if !args.no_ceiling {
        let ceilings = [
            (FamilyTag::NaturalSpline, Some(args.ns_max_edf)),
            (FamilyTag::SmoothingSpline, args.ss_max_edf),
            (FamilyTag::Loess, Some(args.loess_max_edf)),
            (FamilyTag::Kernel, Some(args.kernel_max_edf)),
        ];
        for (family, ceiling) in ceilings {
            policies.set(
                family,
                SelectionPolicy {
                    ceiling,
                    preferred: None,
                },
            );
        }
    }

    RunConfig {
        families: args.families.clone(),
        grid,
        policies,
    }
}

/// Rewrite argv so `smooth` defaults to `smooth compare`.
///
/// Rules:
/// - `smooth`                      -> `smooth compare`
/// - `smooth --family loess ...`   -> `smooth compare --family loess ...`
/// - `smooth --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("compare".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "compare" | "rank" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "compare flags".
    if arg1.starts_with('-') {
        argv.insert(1, "compare".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_compare() {
        assert_eq!(rewrite_args(argv(&["smooth"])), argv(&["smooth", "compare"]));
        assert_eq!(
            rewrite_args(argv(&["smooth", "--no-plot"])),
            argv(&["smooth", "compare", "--no-plot"])
        );
        assert_eq!(rewrite_args(argv(&["smooth", "--help"])), argv(&["smooth", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["smooth", "rank"])),
            argv(&["smooth", "rank"])
        );
    }

    #[test]
    fn args_become_run_config() {
        let cli = Cli::try_parse_from(["smooth", "compare", "--ns-max-edf", "6", "--no-plug-in"]).unwrap();
        let Command::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        let config = run_config_from_args(&args);
        assert_eq!(config.policies.get(FamilyTag::NaturalSpline).ceiling, Some(6.0));
        assert_eq!(config.policies.get(FamilyTag::SmoothingSpline).ceiling, None);
        assert!(!config.grid.kernel_plug_in);
        assert_eq!(config.families, FamilyTag::ALL.to_vec());
    }

    #[test]
    fn no_ceiling_clears_policies() {
        let cli = Cli::try_parse_from(["smooth", "rank", "--no-ceiling"]).unwrap();
        let Command::Rank(args) = cli.command else {
            panic!("expected rank");
        };
        let config = run_config_from_args(&args);
        for family in FamilyTag::ALL {
            assert_eq!(config.policies.get(family), SelectionPolicy::default());
        }
    }
}
