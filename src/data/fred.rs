//! FRED API integration (`fred/series/observations`).

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::Settings;
use crate::data::{SeriesSource, ensure_series_id, http_client, parse_value};
use crate::domain::{Observation, TimeSeries};
use crate::error::{AppError, ResolveError};

pub const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const OBS_LIMIT: usize = 100_000;
const PROVIDER: &str = "fred";

pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredClient {
    pub fn new(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let api_key = settings.require_fred_api_key()?;
        let client = http_client(settings.http_timeout)?;
        Ok(Self::new(client, api_key, settings.fred_base_url.clone()))
    }
}

impl SeriesSource for FredClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        ensure_series_id(series_id)?;
        tracing::debug!(series_id, %start, %end, "fetching FRED observations");

        let start_s = start.to_string();
        let end_s = end.to_string();
        let limit_s = OBS_LIMIT.to_string();
        // The key travels in the query string, so errors are reported without the URL.
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", start_s.as_str()),
                ("observation_end", end_s.as_str()),
                ("limit", limit_s.as_str()),
            ])
            .send()
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("request failed: {}", e.without_url())))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_error(series_id, status, &text));
        }

        parse_observations(series_id, &text)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

/// Decode an observations body. Missing values (`"."`) are skipped.
pub(crate) fn parse_observations(series_id: &str, body: &str) -> Result<TimeSeries, ResolveError> {
    let parsed: ObservationsResponse = serde_json::from_str(body)
        .map_err(|e| ResolveError::unavailable(PROVIDER, format!("failed to parse response: {e}")))?;

    let mut out = Vec::with_capacity(parsed.observations.len());
    for obs in parsed.observations {
        let Some(value) = parse_value(&obs.value) else {
            continue;
        };
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("invalid date '{}': {e}", obs.date)))?;
        out.push(Observation::new(date, value));
    }

    tracing::debug!(series_id, n = out.len(), "parsed FRED observations");
    Ok(TimeSeries::new(series_id, out))
}

/// FRED answers a bad series id with HTTP 400; so does a bad API key, which is
/// an availability problem rather than bad input.
fn classify_error(series_id: &str, status: StatusCode, body: &str) -> ResolveError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error_message)
        .unwrap_or_else(|_| format!("HTTP {status}"));

    if status == StatusCode::BAD_REQUEST && !message.contains("api_key") {
        return ResolveError::invalid(format!("FRED rejected series '{series_id}': {message}"));
    }
    ResolveError::unavailable(PROVIDER, format!("HTTP {status}: {message}"))
}
