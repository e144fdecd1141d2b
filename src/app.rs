//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - installs logging
//! - loads settings and builds sources
//! - runs lookups or dashboard refreshes
//! - prints reports and writes optional exports

use std::time::Duration as StdDuration;

use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::pipeline::{Pipeline, RefreshRequest, source_for};
use crate::cli::{Command, DashboardArgs, LookupArgs, RangeArgs, SeriesArgs};
use crate::config::Settings;
use crate::domain::{Provider, Unit, Window};
use crate::error::{AppError, EXIT_SOURCE};
use crate::resolve::Resolver;

pub mod pipeline;

/// Entry point for the `asof` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_tracing(cli.verbose);

    let mut settings = Settings::from_env()?;
    if let Some(secs) = cli.cache_ttl {
        settings.cache_ttl = StdDuration::from_secs(secs);
    }

    match cli.command {
        Command::Dashboard(args) => handle_dashboard(args, &settings),
        Command::Lookup(args) => handle_lookup(args, &settings),
        Command::Range(args) => handle_range(args, &settings),
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn handle_dashboard(args: DashboardArgs, settings: &Settings) -> Result<(), AppError> {
    if args.no_stock && args.start.is_none() {
        return Err(AppError::usage("--no-stock requires --start (YYYY-MM-DD)."));
    }
    let pipeline = Pipeline::from_settings(settings)?;

    loop {
        let request = RefreshRequest {
            ticker: (!args.no_stock).then(|| args.ticker.clone()),
            period: args.period,
            start: args.start,
            end: args.end.unwrap_or_else(today),
        };

        match pipeline.refresh(&request) {
            Ok(dashboard) => {
                println!("{}", crate::report::format_dashboard(&dashboard));
                if let Some(path) = &args.export {
                    crate::io::write_dashboard_json(path, &dashboard)?;
                }
                if args.watch.is_none() && dashboard.failed_rows() > 0 {
                    return Err(AppError::new(
                        EXIT_SOURCE,
                        format!("{} indicator(s) failed to resolve.", dashboard.failed_rows()),
                    ));
                }
            }
            // A single run reports the failure; watch mode keeps going.
            Err(err) if args.watch.is_some() => {
                tracing::error!(error = %err, "refresh failed");
                eprintln!("{err}");
            }
            Err(err) => return Err(err.into()),
        }

        let Some(secs) = args.watch else {
            return Ok(());
        };
        std::thread::sleep(StdDuration::from_secs(secs.max(1)));
    }
}

fn handle_lookup(args: LookupArgs, settings: &Settings) -> Result<(), AppError> {
    let resolver = resolver_for(args.series.provider, settings)?;
    let date = args.date.unwrap_or_else(today);
    let id = args.series.series.as_str();

    let resolution = if args.series.yoy {
        resolver.year_over_year(id, date)?
    } else {
        resolver.resolve_at(id, date, window_from(&args.series)?)?
    };

    println!(
        "{id} as of {date}: {}",
        crate::report::format_resolution(&resolution, unit_for(&args.series))
    );
    Ok(())
}

fn handle_range(args: RangeArgs, settings: &Settings) -> Result<(), AppError> {
    let resolver = resolver_for(args.series.provider, settings)?;
    let end = args.end.unwrap_or_else(today);
    let id = args.series.series.as_str();

    let range = if args.series.yoy {
        resolver.year_over_year_range(id, args.start, end)?
    } else {
        resolver.resolve_range(id, args.start, end, window_from(&args.series)?)?
    };

    println!(
        "{id} {} → {end}: {}",
        args.start,
        crate::report::format_range(&range, unit_for(&args.series))
    );
    Ok(())
}

fn resolver_for(provider: Provider, settings: &Settings) -> Result<Resolver<pipeline::SharedSource>, AppError> {
    Ok(Resolver::new(source_for(provider, settings)?))
}

fn window_from(args: &SeriesArgs) -> Result<Window, AppError> {
    Ok(Window::new(
        Duration::days(args.window_before),
        Duration::days(args.window_after),
    )?)
}

/// Single lookups print raw levels; YoY output is a percentage.
fn unit_for(args: &SeriesArgs) -> Unit {
    if args.yoy { Unit::Percent } else { Unit::Level }
}

/// Rewrite argv so `asof` defaults to `asof dashboard`.
///
/// Rules:
/// - `asof`                     -> `asof dashboard`
/// - `asof -t MSFT ...`         -> `asof dashboard -t MSFT ...`
/// - `asof -v lookup UNRATE`    -> unchanged (global flags may precede the subcommand)
/// - `asof --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = first_non_global(&argv);
    let Some(arg) = argv.get(first).cloned() else {
        argv.push("dashboard".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg.as_str(), "dashboard" | "lookup" | "range");
    if is_subcommand {
        return argv;
    }

    // A leading flag is a dashboard flag.
    if arg.starts_with('-') {
        argv.insert(first, "dashboard".to_string());
        return argv;
    }

    argv
}

/// Index of the first argument that is not a global flag (or a global flag's value).
fn first_non_global(argv: &[String]) -> usize {
    let mut i = 1;
    while let Some(arg) = argv.get(i) {
        match arg.as_str() {
            "-v" | "--verbose" => i += 1,
            "--cache-ttl" => i += 2,
            a if a.starts_with("--cache-ttl=") => i += 1,
            _ => break,
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_dashboard() {
        assert_eq!(rewrite_args(args(&["asof"])), args(&["asof", "dashboard"]));
        assert_eq!(
            rewrite_args(args(&["asof", "-t", "MSFT"])),
            args(&["asof", "dashboard", "-t", "MSFT"])
        );
    }

    #[test]
    fn global_flags_may_precede_any_subcommand() {
        for list in [
            &["asof", "-v", "lookup", "UNRATE"][..],
            &["asof", "--cache-ttl", "60", "range", "UNRATE", "--start", "2023-01-15"][..],
            &["asof", "--verbose", "--cache-ttl=60", "dashboard"][..],
        ] {
            let argv = rewrite_args(args(list));
            assert_eq!(argv, args(list));
            assert!(crate::cli::Cli::try_parse_from(argv).is_ok());
        }
    }

    #[test]
    fn global_flags_alone_still_default_to_dashboard() {
        assert_eq!(rewrite_args(args(&["asof", "-v"])), args(&["asof", "-v", "dashboard"]));
        assert_eq!(
            rewrite_args(args(&["asof", "--cache-ttl", "60", "-t", "MSFT"])),
            args(&["asof", "--cache-ttl", "60", "dashboard", "-t", "MSFT"])
        );
        assert!(crate::cli::Cli::try_parse_from(rewrite_args(args(&["asof", "-v", "-t", "MSFT"]))).is_ok());
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for list in [
            &["asof", "lookup", "UNRATE"][..],
            &["asof", "--help"][..],
            &["asof", "-V"][..],
        ] {
            assert_eq!(rewrite_args(args(list)), args(list));
        }
    }

    #[test]
    fn negative_window_is_a_usage_error() {
        let series = SeriesArgs {
            series: "UNRATE".to_string(),
            provider: Provider::Fred,
            window_before: -1,
            window_after: 30,
            yoy: false,
        };
        assert_eq!(window_from(&series).unwrap_err().exit_code(), crate::error::EXIT_USAGE);
    }
}
