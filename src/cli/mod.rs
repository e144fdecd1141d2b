//! Command-line parsing for the `asof` binary.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! resolver and pipeline code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_WINDOW_DAYS, Period, Provider};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "asof", version, about = "Point-in-time macro and market indicator lookups")]
pub struct Cli {
    /// Log progress to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Cache fetched windows for this many seconds (0 disables; overrides ASOF_CACHE_TTL_SECS).
    #[arg(long, global = true, value_name = "SECS")]
    pub cache_ttl: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stock performance plus the macro panel over a start → end range.
    Dashboard(DashboardArgs),
    /// Resolve one series as of a date.
    Lookup(LookupArgs),
    /// Resolve one series at a start and an end date.
    Range(RangeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    /// Ticker for the stock block.
    #[arg(short, long, default_value = "AAPL")]
    pub ticker: String,

    /// Skip the stock block (requires --start).
    #[arg(long)]
    pub no_stock: bool,

    /// Stock lookback period.
    #[arg(short, long, value_enum, default_value_t = Period::OneMonth)]
    pub period: Period,

    /// Macro range start (YYYY-MM-DD). Defaults to the first price date.
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Macro range end (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Write the dashboard as JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    /// Refresh every N seconds until interrupted.
    #[arg(long, value_name = "SECS")]
    pub watch: Option<u64>,
}

/// Series selection shared by `lookup` and `range`.
#[derive(Debug, Args, Clone)]
pub struct SeriesArgs {
    /// Series id (FRED id, World Bank indicator, or ticker).
    pub series: String,

    /// Data source serving the series.
    #[arg(long, value_enum, default_value_t = Provider::Fred)]
    pub provider: Provider,

    /// Days fetched before each target date.
    #[arg(long, default_value_t = i64::from(DEFAULT_WINDOW_DAYS))]
    pub window_before: i64,

    /// Days fetched after each target date.
    #[arg(long, default_value_t = i64::from(DEFAULT_WINDOW_DAYS))]
    pub window_after: i64,

    /// Report the year-over-year percent change instead of the level.
    #[arg(long)]
    pub yoy: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LookupArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Target date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub end: Option<NaiveDate>,
}
