//! Time-bounded cache in front of any [`SeriesSource`].
//!
//! Entries are keyed by the exact fetch range and live at most `ttl`, so a
//! cached answer is never staler than that. Failed fetches are not cached.

use std::time::Duration;

use chrono::NaiveDate;
use moka::sync::Cache;

use crate::data::SeriesSource;
use crate::domain::TimeSeries;
use crate::error::ResolveError;

const MAX_ENTRIES: u64 = 1_024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FetchKey {
    series_id: String,
    start: NaiveDate,
    end: NaiveDate,
}

pub struct CachedSource<S> {
    inner: S,
    cache: Option<Cache<FetchKey, TimeSeries>>,
}

impl<S: SeriesSource> CachedSource<S> {
    /// Wrap `inner`; a zero `ttl` disables caching.
    pub fn new(inner: S, ttl: Duration) -> Self {
        let cache = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_live(ttl)
                .build()
        });
        Self { inner, cache }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SeriesSource> SeriesSource for CachedSource<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        let Some(cache) = &self.cache else {
            return self.inner.fetch(series_id, start, end);
        };

        let key = FetchKey {
            series_id: series_id.to_string(),
            start,
            end,
        };
        if let Some(hit) = cache.get(&key) {
            tracing::trace!(provider = self.inner.name(), series_id, %start, %end, "cache hit");
            return Ok(hit);
        }

        let series = self.inner.fetch(series_id, start, end)?;
        cache.insert(key, series.clone());
        Ok(series)
    }
}
