//! In-process source backed by fixed series (tests and offline runs).

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;

use crate::data::{SeriesSource, ensure_series_id};
use crate::domain::{Observation, TimeSeries};
use crate::error::ResolveError;

#[derive(Debug, Default)]
pub struct MemorySource {
    name: &'static str,
    series: HashMap<String, TimeSeries>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Register (or replace) a series built from `(date, value)` pairs.
    pub fn with_series(mut self, series_id: &str, points: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let observations = points.into_iter().map(|(d, v)| Observation::new(d, v)).collect();
        self.series
            .insert(series_id.to_string(), TimeSeries::new(series_id, observations));
        self
    }

    /// Number of `fetch` calls served so far, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SeriesSource for MemorySource {
    fn name(&self) -> &'static str {
        if self.name.is_empty() { "memory" } else { self.name }
    }

    fn fetch(&self, series_id: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, ResolveError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        ensure_series_id(series_id)?;
        let series = self
            .series
            .get(series_id)
            .ok_or_else(|| ResolveError::invalid(format!("unknown series '{series_id}'")))?;
        Ok(series.between(start, end))
    }
}
