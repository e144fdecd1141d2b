//! Runtime settings from the environment (and `.env`).

use std::time::Duration;

use crate::data::{fred, world_bank, yahoo};
use crate::error::AppError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_COUNTRY: &str = "US";

#[derive(Debug, Clone)]
pub struct Settings {
    pub fred_api_key: Option<String>,
    pub fred_base_url: String,
    pub world_bank_base_url: String,
    pub world_bank_country: String,
    pub yahoo_base_url: String,
    pub http_timeout: Duration,
    /// Zero disables the fetch cache.
    pub cache_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            fred_base_url: fred::BASE_URL.to_string(),
            world_bank_base_url: world_bank::BASE_URL.to_string(),
            world_bank_country: DEFAULT_COUNTRY.to_string(),
            yahoo_base_url: yahoo::BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::ZERO,
        }
    }
}

impl Settings {
    /// Load `.env` (if present) and read settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            fred_api_key: var("FRED_API_KEY"),
            fred_base_url: var("FRED_BASE_URL").unwrap_or(defaults.fred_base_url),
            world_bank_base_url: var("WORLD_BANK_BASE_URL").unwrap_or(defaults.world_bank_base_url),
            world_bank_country: var("WORLD_BANK_COUNTRY").unwrap_or(defaults.world_bank_country),
            yahoo_base_url: var("YAHOO_BASE_URL").unwrap_or(defaults.yahoo_base_url),
            http_timeout: parse_secs("ASOF_HTTP_TIMEOUT_SECS", var("ASOF_HTTP_TIMEOUT_SECS"))?
                .unwrap_or(defaults.http_timeout),
            cache_ttl: parse_secs("ASOF_CACHE_TTL_SECS", var("ASOF_CACHE_TTL_SECS"))?
                .unwrap_or(defaults.cache_ttl),
        })
    }

    pub fn require_fred_api_key(&self) -> Result<&str, AppError> {
        self.fred_api_key
            .as_deref()
            .ok_or_else(|| AppError::usage("Missing FRED_API_KEY in environment (.env)."))
    }
}

fn parse_secs(key: &str, raw: Option<String>) -> Result<Option<Duration>, AppError> {
    raw.map(|v| {
        v.parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::usage(format!("{key} must be a whole number of seconds, got '{v}'.")))
    })
    .transpose()
}
