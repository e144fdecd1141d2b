//! Time-series data sources.
//!
//! Every source implements [`SeriesSource`]: a blocking
//! `fetch(series_id, start, end)` returning the observations dated inside
//! `[start, end]`. Sources never fold a failed fetch into an empty series.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::domain::TimeSeries;
use crate::error::ResolveError;

pub mod cache;
pub mod fred;
pub mod memory;
pub mod world_bank;
pub mod yahoo;

pub use cache::CachedSource;
pub use fred::FredClient;
pub use memory::MemorySource;
pub use world_bank::WorldBankClient;
pub use yahoo::YahooClient;

/// A provider of dated observations for named series.
pub trait SeriesSource: Send + Sync {
    /// Short provider name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Observations of `series_id` with dates in `[start, end]`, ascending.
    ///
    /// An unknown series is `InvalidInput`; transport or payload failures are
    /// `SourceUnavailable`. An empty series means the source answered with no data.
    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError>;
}

impl<S: SeriesSource + ?Sized> SeriesSource for &S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        (**self).fetch(series_id, start, end)
    }
}

impl<S: SeriesSource + ?Sized> SeriesSource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        (**self).fetch(series_id, start, end)
    }
}

impl<S: SeriesSource + ?Sized> SeriesSource for Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        (**self).fetch(series_id, start, end)
    }
}

/// Shared blocking HTTP client for the network sources.
pub fn http_client(timeout: Duration) -> Result<Client, ResolveError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("macro-asof/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ResolveError::unavailable("http", format!("failed to build HTTP client: {e}")))
}

/// Parse a provider's numeric field; missing markers and non-finite values are `None`.
pub(crate) fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

pub(crate) fn ensure_series_id(series_id: &str) -> Result<(), ResolveError> {
    if series_id.trim().is_empty() {
        return Err(ResolveError::invalid("series id is blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_skips_missing_markers() {
        assert_eq!(parse_value("3.40"), Some(3.4));
        assert_eq!(parse_value(" 5 "), Some(5.0));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn blank_series_id_is_invalid_input() {
        assert!(matches!(ensure_series_id("  "), Err(ResolveError::InvalidInput(_))));
        assert!(ensure_series_id("UNRATE").is_ok());
    }
}
