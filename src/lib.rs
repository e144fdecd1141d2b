//! `macro-asof` library crate.
//!
//! Point-in-time ("as-of") lookups over economic and market time series:
//!
//! - `resolve`: latest value on or before a date, start/end ranges, year-over-year change
//! - `data`: FRED, World Bank and Yahoo Finance sources behind one trait, plus a TTL cache
//! - `app`: the dashboard refresh pipeline driving the `asof` binary
//!
//! The binary (`asof`) is a thin wrapper around this library so the core logic
//! is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod resolve;
