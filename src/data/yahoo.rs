//! Yahoo Finance chart API (v8), daily bars. The series id is the ticker.

use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::Settings;
use crate::data::{SeriesSource, ensure_series_id, http_client};
use crate::domain::{Observation, TimeSeries};
use crate::error::{AppError, ResolveError};

pub const BASE_URL: &str = "https://query1.finance.yahoo.com";
const PROVIDER: &str = "yahoo";

pub struct YahooClient {
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let client = http_client(settings.http_timeout)?;
        Ok(Self::new(client, settings.yahoo_base_url.clone()))
    }
}

impl SeriesSource for YahooClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        ensure_series_id(ticker)?;
        // period2 is exclusive, so ask up to the following midnight.
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end
            .succ_opt()
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        let period1 = period1.to_string();
        let period2 = period2.to_string();
        tracing::debug!(ticker, %start, %end, "fetching Yahoo chart");

        let url = format!("{}/v8/finance/chart/{}", self.base_url.trim_end_matches('/'), ticker.trim());
        let resp = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
                ("events", "history"),
                ("includeAdjustedClose", "true"),
            ])
            .send()
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("request failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("failed to read response: {e}")))?;

        // Unknown tickers come back as HTTP 404 with a chart error in the body.
        match parse_chart(ticker, &text) {
            Ok(series) if status.is_success() => Ok(series.between(start, end)),
            Ok(_) => Err(ResolveError::unavailable(PROVIDER, format!("HTTP {status}"))),
            Err(err @ ResolveError::InvalidInput(_)) => Err(err),
            Err(err) if status.is_success() => Err(err),
            Err(_) => Err(ResolveError::unavailable(PROVIDER, format!("HTTP {status}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
    #[serde(default)]
    adjclose: Vec<AdjCloseBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseBlock {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Decode a chart body into adjusted closes (falling back to raw closes).
///
/// Bars are dated in exchange-local time (`meta.gmtoffset`); null bars are skipped.
pub(crate) fn parse_chart(ticker: &str, body: &str) -> Result<TimeSeries, ResolveError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ResolveError::unavailable(PROVIDER, format!("failed to parse response: {e}")))?;

    if let Some(err) = envelope.chart.error {
        return Err(if err.code.eq_ignore_ascii_case("Not Found") {
            ResolveError::invalid(format!("unknown ticker '{ticker}': {}", err.description))
        } else {
            ResolveError::unavailable(PROVIDER, format!("{}: {}", err.code, err.description))
        });
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(TimeSeries::empty(ticker));
    };

    let adjusted = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|b| b.adjclose)
        .filter(|v| !v.is_empty());
    let closes = match adjusted {
        Some(values) => values,
        None => result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default(),
    };

    let mut out = Vec::with_capacity(result.timestamp.len());
    for (ts, close) in result.timestamp.iter().zip(closes) {
        let Some(value) = close.filter(|v| v.is_finite()) else {
            continue;
        };
        let date = ts
            .checked_add(result.meta.gmtoffset)
            .and_then(|local| DateTime::from_timestamp(local, 0))
            .ok_or_else(|| ResolveError::unavailable(PROVIDER, format!("invalid timestamp {ts}")))?
            .date_naive();
        out.push(Observation::new(date, value));
    }

    Ok(TimeSeries::new(ticker, out))
}
