//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed between the resolver and the dashboard pipeline
//! - rendered by the text report
//! - exported to JSON

use chrono::{Datelike, Duration, Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Display precision applied to resolved values.
pub const DISPLAY_DECIMALS: i32 = 2;

/// Default half-width of the fetch window around a target date.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// A single dated value of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Observations of one named series, ascending by date with no duplicate dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    series_id: String,
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from observations in any order.
    ///
    /// Observations are sorted by date; when a date repeats, the value that came
    /// last in the input wins.
    pub fn new(series_id: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        // Stable sort keeps input order among equal dates, so "last wins" below is well-defined.
        observations.sort_by_key(|o| o.date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(prev) if prev.date == obs.date => *prev = obs,
                _ => deduped.push(obs),
            }
        }
        Self {
            series_id: series_id.into(),
            observations: deduped,
        }
    }

    pub fn empty(series_id: impl Into<String>) -> Self {
        Self::new(series_id, Vec::new())
    }

    pub fn series_id(&self) -> &str {
        &self.series_id
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// Latest observation dated on or before `date`.
    pub fn as_of(&self, date: NaiveDate) -> Option<&Observation> {
        let idx = self.observations.partition_point(|o| o.date <= date);
        idx.checked_sub(1).map(|i| &self.observations[i])
    }

    /// Sub-series with dates inside `[start, end]` (inclusive).
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let observations = self
            .observations
            .iter()
            .filter(|o| o.date >= start && o.date <= end)
            .copied()
            .collect();
        TimeSeries {
            series_id: self.series_id.clone(),
            observations,
        }
    }
}

/// How far around a target date to fetch.
///
/// The window bounds the *fetch*, not the search: an observation older than
/// `target - before` is never seen, so the lookup reports `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    before: Duration,
    after: Duration,
}

impl Window {
    pub fn new(before: Duration, after: Duration) -> Result<Self, ResolveError> {
        if before < Duration::zero() || after < Duration::zero() {
            return Err(ResolveError::invalid(format!(
                "window must be non-negative (before={}d, after={}d)",
                before.num_days(),
                after.num_days()
            )));
        }
        Ok(Self { before, after })
    }

    /// Symmetric window of `days` on each side.
    pub fn days(days: u32) -> Self {
        Self::days_around(days, days)
    }

    /// Whole-day window; unsigned counts keep it non-negative.
    pub fn days_around(before: u32, after: u32) -> Self {
        Self {
            before: Duration::days(i64::from(before)),
            after: Duration::days(i64::from(after)),
        }
    }

    /// Absolute fetch range `[target - before, target + after]`.
    pub fn bounds(&self, target: NaiveDate) -> Result<(NaiveDate, NaiveDate), ResolveError> {
        let start = target
            .checked_sub_signed(self.before)
            .ok_or_else(|| ResolveError::invalid(format!("window start before {target} is out of range")))?;
        let end = target
            .checked_add_signed(self.after)
            .ok_or_else(|| ResolveError::invalid(format!("window end after {target} is out of range")))?;
        Ok((start, end))
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::days(DEFAULT_WINDOW_DAYS)
    }
}

/// One point-in-time lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub series_id: String,
    pub target_date: NaiveDate,
    pub window: Window,
}

impl ResolutionRequest {
    pub fn new(series_id: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            series_id: series_id.into(),
            target_date,
            window: Window::default(),
        }
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }
}

/// Outcome of an as-of lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Found {
        value: f64,
        observation_date: NaiveDate,
    },
    /// The fetch succeeded but nothing is dated on or before the target inside the window.
    NotFound,
}

impl Resolution {
    /// `Found` for `obs`, with the value rounded to display precision.
    pub fn found(obs: &Observation) -> Self {
        Resolution::Found {
            value: round2(obs.value),
            observation_date: obs.date,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Resolution::Found { value, .. } => Some(*value),
            Resolution::NotFound => None,
        }
    }

    pub fn observation_date(&self) -> Option<NaiveDate> {
        match self {
            Resolution::Found { observation_date, .. } => Some(*observation_date),
            Resolution::NotFound => None,
        }
    }

    /// Apply `f` to a found value (re-rounded); `NotFound` passes through.
    pub fn map_value(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Resolution::Found {
                value,
                observation_date,
            } => Resolution::Found {
                value: round2(f(value)),
                observation_date,
            },
            Resolution::NotFound => Resolution::NotFound,
        }
    }
}

/// Before/after pair produced by the range resolver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeResolution {
    pub start: Resolution,
    pub end: Resolution,
}

impl RangeResolution {
    pub fn map_value(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            start: self.start.map_value(&f),
            end: self.end.map_value(&f),
        }
    }
}

/// Round to `DISPLAY_DECIMALS` places.
pub fn round2(value: f64) -> f64 {
    let scale = 10f64.powi(DISPLAY_DECIMALS);
    (value * scale).round() / scale
}

/// Lookback period for the stock price block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum Period {
    #[serde(rename = "1mo")]
    #[value(name = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    #[value(name = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    #[value(name = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    #[value(name = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    #[value(name = "5y")]
    FiveYears,
    #[serde(rename = "ytd")]
    #[value(name = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    #[value(name = "max")]
    Max,
}

impl Period {
    pub fn label(self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::FiveYears => "5y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// First calendar date covered by this period when it ends at `end`.
    pub fn start_date(self, end: NaiveDate) -> Result<NaiveDate, ResolveError> {
        let months = match self {
            Period::OneMonth => Some(1),
            Period::ThreeMonths => Some(3),
            Period::SixMonths => Some(6),
            Period::OneYear => Some(12),
            Period::FiveYears => Some(60),
            Period::YearToDate | Period::Max => None,
        };
        let start = match (self, months) {
            (_, Some(m)) => end.checked_sub_months(Months::new(m)),
            (Period::YearToDate, None) => NaiveDate::from_ymd_opt(end.year(), 1, 1),
            _ => NaiveDate::from_ymd_opt(1970, 1, 1),
        };
        start.ok_or_else(|| ResolveError::invalid(format!("period {} before {end} is out of range", self.label())))
    }
}
