//! World Bank indicators API (v2), one country per client.
//!
//! The API answers with a two-element array: a paging header and the rows.
//! Errors come back as a single-element array holding a `message` list.

use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Settings;
use crate::data::{SeriesSource, ensure_series_id, http_client};
use crate::domain::{Observation, TimeSeries};
use crate::error::{AppError, ResolveError};

pub const BASE_URL: &str = "https://api.worldbank.org/v2";
const PER_PAGE: usize = 1000;
const PROVIDER: &str = "world_bank";

pub struct WorldBankClient {
    client: Client,
    base_url: String,
    country: String,
}

impl WorldBankClient {
    pub fn new(client: Client, base_url: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            country: country.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        let client = http_client(settings.http_timeout)?;
        Ok(Self::new(
            client,
            settings.world_bank_base_url.clone(),
            settings.world_bank_country.clone(),
        ))
    }

    fn url(&self, indicator: &str) -> String {
        format!(
            "{}/country/{}/indicator/{}",
            self.base_url.trim_end_matches('/'),
            self.country,
            indicator
        )
    }
}

impl SeriesSource for WorldBankClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        ensure_series_id(series_id)?;
        let years = format!("{}:{}", start.year(), end.year());
        let per_page = PER_PAGE.to_string();
        tracing::debug!(series_id, country = %self.country, %years, "fetching World Bank indicator");

        let resp = self
            .client
            .get(self.url(series_id))
            .query(&[("format", "json"), ("date", years.as_str()), ("per_page", per_page.as_str())])
            .send()
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResolveError::unavailable(PROVIDER, format!("HTTP {status}")));
        }
        let text = resp
            .text()
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("failed to read response: {e}")))?;

        let series = parse_rows(series_id, &text)?;
        Ok(series.between(start, end))
    }
}

#[derive(Debug, Deserialize)]
struct Row {
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
}

/// Decode an indicator body. Annual rows are dated January 1st of their year.
pub(crate) fn parse_rows(series_id: &str, body: &str) -> Result<TimeSeries, ResolveError> {
    let parts: Vec<Value> = serde_json::from_str(body)
        .map_err(|e| ResolveError::unavailable(PROVIDER, format!("failed to parse response: {e}")))?;

    if let Some(messages) = parts.first().and_then(|header| header.get("message")) {
        let messages: Vec<ApiMessage> = serde_json::from_value(messages.clone()).unwrap_or_default();
        let detail = messages
            .iter()
            .map(|m| format!("{}: {}", m.key, m.value))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(ResolveError::invalid(format!(
            "World Bank rejected indicator '{series_id}': {detail}"
        )));
    }

    // No data for the requested years comes back as `[header, null]`.
    let rows: Vec<Row> = match parts.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(rows) => serde_json::from_value(rows.clone())
            .map_err(|e| ResolveError::unavailable(PROVIDER, format!("unexpected row shape: {e}")))?,
    };

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(value) = row.value.filter(|v| v.is_finite()) else {
            continue;
        };
        let date = row
            .date
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .ok_or_else(|| ResolveError::unavailable(PROVIDER, format!("invalid year '{}'", row.date)))?;
        out.push(Observation::new(date, value));
    }

    Ok(TimeSeries::new(series_id, out))
}
