//! Point-in-time ("as-of") resolution of series values.
//!
//! The resolver fetches a bounded window around the target date, keeps only
//! observations dated on or before the target, and reports the latest one:
//!
//! ```text
//! fetch [target - before, target + after] -> filter date <= target -> max(date)
//! ```
//!
//! A window that holds nothing at-or-before the target is `NotFound`, even when
//! older data exists upstream. Fetch failures are errors, never `NotFound`.

use chrono::NaiveDate;

use crate::data::{SeriesSource, ensure_series_id};
use crate::domain::{RangeResolution, Resolution, ResolutionRequest, TimeSeries, Window};
use crate::error::ResolveError;

pub mod yoy;

pub use yoy::{YOY_LOOKAHEAD_DAYS, YOY_LOOKBACK_DAYS, YOY_OFFSET_DAYS, year_over_year_in};

pub struct Resolver<S> {
    source: S,
}

impl<S: SeriesSource> Resolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resolve(&self, request: &ResolutionRequest) -> Result<Resolution, ResolveError> {
        self.resolve_at(&request.series_id, request.target_date, request.window)
    }

    /// Latest value of `series_id` on or before `target`, rounded to display precision.
    pub fn resolve_at(&self, series_id: &str, target: NaiveDate, window: Window) -> Result<Resolution, ResolveError> {
        let series = self.fetch_window(series_id, target, window)?;
        let resolution = resolve_in(&series, target);
        tracing::debug!(
            provider = self.source.name(),
            series_id,
            %target,
            fetched = series.len(),
            found = resolution.is_found(),
            "resolved as-of value"
        );
        Ok(resolution)
    }

    /// Independent as-of lookups at `start` and `end` with the same window.
    ///
    /// No ordering check is made between the two dates.
    pub fn resolve_range(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        window: Window,
    ) -> Result<RangeResolution, ResolveError> {
        Ok(RangeResolution {
            start: self.resolve_at(series_id, start, window)?,
            end: self.resolve_at(series_id, end, window)?,
        })
    }

    pub(crate) fn fetch_window(
        &self,
        series_id: &str,
        target: NaiveDate,
        window: Window,
    ) -> Result<TimeSeries, ResolveError> {
        ensure_series_id(series_id)?;
        let (start, end) = window.bounds(target)?;
        self.source.fetch(series_id, start, end)
    }
}

/// As-of lookup inside an already fetched series.
pub fn resolve_in(series: &TimeSeries, target: NaiveDate) -> Resolution {
    match series.as_of(target) {
        Some(obs) => Resolution::found(obs),
        None => Resolution::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::data::MemorySource;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn unrate() -> Resolver<MemorySource> {
        Resolver::new(
            MemorySource::new("fred").with_series("UNRATE", [(d(2023, 1, 1), 3.4), (d(2023, 2, 1), 3.6)]),
        )
    }

    struct DownSource;

    impl SeriesSource for DownSource {
        fn name(&self) -> &'static str {
            "down"
        }

        fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<TimeSeries, ResolveError> {
            Err(ResolveError::unavailable("down", "connection refused"))
        }
    }

    #[test]
    fn picks_latest_observation_before_target() {
        let r = unrate();
        let res = r.resolve_at("UNRATE", d(2023, 1, 15), Window::days(30)).unwrap();
        assert_eq!(
            res,
            Resolution::Found {
                value: 3.4,
                observation_date: d(2023, 1, 1)
            }
        );
    }

    #[test]
    fn observation_on_target_date_counts() {
        let res = unrate().resolve_at("UNRATE", d(2023, 2, 1), Window::days(30)).unwrap();
        assert_eq!(res.observation_date(), Some(d(2023, 2, 1)));
        assert_eq!(res.value(), Some(3.6));
    }

    #[test]
    fn target_before_first_observation_is_not_found() {
        // The window reaches 2023-01-01 but only data after the target exists.
        let res = unrate().resolve_at("UNRATE", d(2022, 12, 31), Window::days(30)).unwrap();
        assert_eq!(res, Resolution::NotFound);
    }

    #[test]
    fn prior_value_outside_window_is_not_found() {
        let res = unrate().resolve_at("UNRATE", d(2023, 6, 1), Window::days(30)).unwrap();
        assert_eq!(res, Resolution::NotFound);
        // Widening the lookback finds it.
        let res = unrate().resolve_at("UNRATE", d(2023, 6, 1), Window::days(150)).unwrap();
        assert_eq!(res.observation_date(), Some(d(2023, 2, 1)));
    }

    #[test]
    fn zero_window_only_sees_the_target_day() {
        let r = unrate();
        assert!(r.resolve_at("UNRATE", d(2023, 2, 1), Window::days(0)).unwrap().is_found());
        assert!(!r.resolve_at("UNRATE", d(2023, 2, 2), Window::days(0)).unwrap().is_found());
    }

    #[test]
    fn found_value_is_rounded() {
        let r = Resolver::new(MemorySource::new("fred").with_series("DGS10", [(d(2024, 5, 1), 4.6349)]));
        let res = r.resolve_at("DGS10", d(2024, 5, 3), Window::default()).unwrap();
        assert_eq!(res.value(), Some(4.63));
    }

    #[test]
    fn source_failure_is_not_folded_into_not_found() {
        let r = Resolver::new(DownSource);
        let err = r.resolve_at("UNRATE", d(2023, 1, 15), Window::default()).unwrap_err();
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn blank_series_is_rejected_before_fetching() {
        let r = unrate();
        let err = r.resolve_at(" ", d(2023, 1, 15), Window::default()).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidInput(_)));
        assert_eq!(r.source().fetch_count(), 0);
    }

    #[test]
    fn resolve_request_matches_resolve_at() {
        let r = unrate();
        let req = ResolutionRequest::new("UNRATE", d(2023, 1, 15)).with_window(Window::days(30));
        assert_eq!(
            r.resolve(&req).unwrap(),
            r.resolve_at("UNRATE", d(2023, 1, 15), Window::days(30)).unwrap()
        );
    }

    #[test]
    fn range_equals_two_independent_resolutions() {
        let r = unrate();
        let w = Window::days(30);
        for (d1, d2) in [
            (d(2023, 1, 15), d(2023, 2, 15)),
            (d(2023, 2, 15), d(2023, 1, 15)),
            (d(2022, 12, 1), d(2023, 1, 15)),
            (d(2023, 1, 15), d(2023, 9, 1)),
        ] {
            let range = r.resolve_range("UNRATE", d1, d2, w).unwrap();
            assert_eq!(range.start, r.resolve_at("UNRATE", d1, w).unwrap());
            assert_eq!(range.end, r.resolve_at("UNRATE", d2, w).unwrap());
        }
    }

    #[test]
    fn range_halves_can_differ_in_status() {
        let range = unrate()
            .resolve_range("UNRATE", d(2022, 12, 1), d(2023, 2, 10), Window::days(30))
            .unwrap();
        assert_eq!(range.start, Resolution::NotFound);
        assert_eq!(range.end.value(), Some(3.6));
    }

    #[test]
    fn resolution_is_idempotent() {
        let r = unrate();
        let a = r.resolve_at("UNRATE", d(2023, 1, 15), Window::days(30)).unwrap();
        let b = r.resolve_at("UNRATE", d(2023, 1, 15), Window::days(30)).unwrap();
        assert_eq!(a, b);
        assert_eq!(r.source().fetch_count(), 2);
    }

    #[test]
    fn found_is_maximal_across_targets() {
        let dates = [d(2023, 1, 3), d(2023, 1, 10), d(2023, 1, 11), d(2023, 1, 20), d(2023, 2, 2)];
        let src = MemorySource::new("m").with_series("S", dates.iter().enumerate().map(|(i, d)| (*d, i as f64)));
        let r = Resolver::new(src);
        let mut target = d(2022, 12, 25);
        while target <= d(2023, 2, 10) {
            let res = r.resolve_at("S", target, Window::days(30)).unwrap();
            let expected = dates.iter().filter(|d| **d <= target && **d >= target - Duration::days(30)).max();
            assert_eq!(res.observation_date(), expected.copied(), "target {target}");
            target = target.succ_opt().unwrap();
        }
    }
}
