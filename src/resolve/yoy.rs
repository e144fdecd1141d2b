//! Year-over-year percent change of an index series (e.g. CPI -> inflation).
//!
//! `yoy(D) = (value as-of D - value as-of D-365d) / value as-of D-365d * 100`
//!
//! The year-ago anchor is a fixed 365 days back, not the calendar anniversary,
//! so leap years shift it by a day. Both anchors come from a single fetch of
//! `[D - 400d, D + 30d]`; raw values are used and only the result is rounded.

use chrono::{Duration, NaiveDate};

use crate::data::SeriesSource;
use crate::domain::{RangeResolution, Resolution, TimeSeries, Window, round2};
use crate::error::ResolveError;
use crate::resolve::Resolver;

pub const YOY_OFFSET_DAYS: i64 = 365;
pub const YOY_LOOKBACK_DAYS: u32 = 400;
pub const YOY_LOOKAHEAD_DAYS: u32 = 30;

impl<S: SeriesSource> Resolver<S> {
    /// Year-over-year change at `target`, dated at the current observation.
    pub fn year_over_year(&self, series_id: &str, target: NaiveDate) -> Result<Resolution, ResolveError> {
        let window = Window::days_around(YOY_LOOKBACK_DAYS, YOY_LOOKAHEAD_DAYS);
        let series = self.fetch_window(series_id, target, window)?;
        let resolution = year_over_year_in(&series, target);
        tracing::debug!(
            provider = self.source().name(),
            series_id,
            %target,
            fetched = series.len(),
            found = resolution.is_found(),
            "resolved year-over-year change"
        );
        Ok(resolution)
    }

    pub fn year_over_year_range(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeResolution, ResolveError> {
        Ok(RangeResolution {
            start: self.year_over_year(series_id, start)?,
            end: self.year_over_year(series_id, end)?,
        })
    }
}

/// Year-over-year change computed inside an already fetched series.
pub fn year_over_year_in(series: &TimeSeries, target: NaiveDate) -> Resolution {
    let Some(current) = series.as_of(target) else {
        return Resolution::NotFound;
    };
    let Some(previous) = target
        .checked_sub_signed(Duration::days(YOY_OFFSET_DAYS))
        .and_then(|anchor| series.as_of(anchor))
    else {
        return Resolution::NotFound;
    };

    if previous.value == 0.0 {
        tracing::warn!(
            series_id = series.series_id(),
            date = %previous.date,
            "year-ago value is zero; percent change undefined"
        );
        return Resolution::NotFound;
    }

    Resolution::Found {
        value: round2((current.value - previous.value) / previous.value * 100.0),
        observation_date: current.date,
    }
}
