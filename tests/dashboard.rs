use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use macro_asof::app::pipeline::{Pipeline, RefreshRequest, RowOutcome, SharedSource};
use macro_asof::data::{MemorySource, SeriesSource};
use macro_asof::domain::{GDP_INDICATOR, MACRO_PANEL, Period, Resolution, TimeSeries};
use macro_asof::error::ResolveError;
use macro_asof::report::format_dashboard;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn monthly(start: NaiveDate, months: u32, base: f64, step: f64) -> Vec<(NaiveDate, f64)> {
    (0..months)
        .map(|i| (start + chrono::Months::new(i), base + step * i as f64))
        .collect()
}

fn fred() -> MemorySource {
    // 2021-01 .. 2023-12, so year-ago anchors exist from 2022 on.
    let start = d(2021, 1, 1);
    let mut src = MemorySource::new("fred");
    for (i, spec) in MACRO_PANEL.iter().filter(|s| s.series_id != GDP_INDICATOR).enumerate() {
        src = src.with_series(spec.series_id, monthly(start, 36, 1.0 + i as f64, 0.1));
    }
    src
}

fn world_bank() -> MemorySource {
    MemorySource::new("world_bank").with_series(
        GDP_INDICATOR,
        [(d(2021, 1, 1), 23.59e12), (d(2022, 1, 1), 25.74e12), (d(2023, 1, 1), 27.36e12)],
    )
}

fn prices() -> MemorySource {
    let start = d(2023, 11, 1);
    MemorySource::new("yahoo").with_series(
        "AAPL",
        (0..30).map(|i| (start + Duration::days(i), 170.0 + i as f64)),
    )
}

struct Down;

impl SeriesSource for Down {
    fn name(&self) -> &'static str {
        "down"
    }

    fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<TimeSeries, ResolveError> {
        Err(ResolveError::unavailable("down", "connection reset"))
    }
}

fn pipeline(world_bank: SharedSource) -> Pipeline {
    Pipeline::new(Arc::new(fred()), world_bank, Arc::new(prices()))
}

#[test]
fn refresh_defaults_macro_start_to_first_price_date() {
    let p = pipeline(Arc::new(world_bank()));
    let request = RefreshRequest {
        ticker: Some("AAPL".to_string()),
        period: Period::OneMonth,
        start: None,
        end: d(2023, 11, 30),
    };
    let dash = p.refresh(&request).unwrap();

    let stock = dash.stock.as_ref().unwrap();
    assert_eq!(stock.first_date, d(2023, 11, 1));
    assert_eq!(dash.start_date, stock.first_date);
    assert_eq!(stock.end_price, 199.0);
    assert_eq!(dash.rows.len(), MACRO_PANEL.len());
    assert_eq!(dash.failed_rows(), 0);

    // Rows come back in panel order.
    let keys: Vec<_> = dash.rows.iter().map(|r| r.spec.key).collect();
    let expected: Vec<_> = MACRO_PANEL.iter().map(|s| s.key).collect();
    assert_eq!(keys, expected);
}

#[test]
fn gdp_row_is_scaled_to_trillions() {
    let p = pipeline(Arc::new(world_bank()));
    let gdp = MACRO_PANEL.iter().find(|s| s.series_id == GDP_INDICATOR).unwrap();
    let range = p.resolve_indicator(gdp, d(2022, 6, 30), d(2023, 6, 30)).unwrap();
    assert_eq!(
        range.start,
        Resolution::Found {
            value: 25.74,
            observation_date: d(2022, 1, 1)
        }
    );
    assert_eq!(range.end.value(), Some(27.36));
}

#[test]
fn failing_source_only_fails_its_rows() {
    let p = pipeline(Arc::new(Down));
    let request = RefreshRequest {
        ticker: None,
        period: Period::OneMonth,
        start: Some(d(2022, 6, 15)),
        end: d(2023, 6, 15),
    };
    let dash = p.refresh(&request).unwrap();
    assert_eq!(dash.failed_rows(), 1);

    for row in &dash.rows {
        match (&row.outcome, row.spec.series_id == GDP_INDICATOR) {
            (RowOutcome::Failed { error }, true) => assert!(error.contains("down unavailable")),
            (RowOutcome::Resolved(range), false) => {
                assert!(range.start.is_found(), "{} start", row.spec.key);
                assert!(range.end.is_found(), "{} end", row.spec.key);
            }
            (outcome, _) => panic!("unexpected outcome for {}: {outcome:?}", row.spec.key),
        }
    }

    let text = format_dashboard(&dash);
    assert!(text.contains("US GDP:"));
    assert!(text.contains("error: down unavailable: connection reset"));
    assert!(text.contains("(as of 2022-06-01) →"));
}

#[test]
fn refresh_without_ticker_or_start_is_invalid() {
    let p = pipeline(Arc::new(world_bank()));
    let request = RefreshRequest {
        ticker: None,
        period: Period::OneMonth,
        start: None,
        end: d(2023, 6, 15),
    };
    assert!(matches!(p.refresh(&request), Err(ResolveError::InvalidInput(_))));
}

#[test]
fn unknown_ticker_aborts_refresh() {
    let p = pipeline(Arc::new(world_bank()));
    let request = RefreshRequest {
        ticker: Some("ZZZZ".to_string()),
        period: Period::OneMonth,
        start: None,
        end: d(2023, 11, 30),
    };
    assert!(matches!(p.refresh(&request), Err(ResolveError::InvalidInput(_))));
}

#[test]
fn empty_price_window_is_invalid_input() {
    let p = pipeline(Arc::new(world_bank()));
    let err = p.stock_performance("AAPL", Period::OneMonth, d(2020, 1, 31)).unwrap_err();
    assert!(matches!(err, ResolveError::InvalidInput(ref m) if m.contains("no price data")));
}
