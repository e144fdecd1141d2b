//! Reporting utilities: stock performance and formatted terminal output.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Period, TimeSeries, round2};

pub mod format;

pub use format::*;

/// Short moving-average length (trading days).
pub const MA_SHORT: usize = 50;
/// Long moving-average length (trading days).
pub const MA_LONG: usize = 200;

/// Start/end summary of a price series over a lookback period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockPerformance {
    pub ticker: String,
    pub period: Period,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    pub change: f64,
    /// `None` when the start price is zero.
    pub pct_change: Option<f64>,
    /// Trailing 50-bar mean at the last bar, when at least 50 bars exist.
    pub ma_short: Option<f64>,
    /// Trailing 200-bar mean at the last bar, when at least 200 bars exist.
    pub ma_long: Option<f64>,
}

/// Summarize a price series; `None` when it has no bars.
pub fn compute_performance(series: &TimeSeries, period: Period) -> Option<StockPerformance> {
    let first = series.first()?;
    let last = series.last()?;
    let change = last.value - first.value;
    let pct_change = (first.value != 0.0).then(|| round2(change / first.value * 100.0));
    let prices: Vec<f64> = series.observations().iter().map(|o| o.value).collect();

    Some(StockPerformance {
        ticker: series.series_id().to_string(),
        period,
        first_date: first.date,
        last_date: last.date,
        start_price: round2(first.value),
        end_price: round2(last.value),
        change: round2(change),
        pct_change,
        ma_short: trailing_mean(&prices, MA_SHORT).map(round2),
        ma_long: trailing_mean(&prices, MA_LONG).map(round2),
    })
}

/// Mean of the last `n` values; `None` when fewer than `n` exist.
fn trailing_mean(values: &[f64], n: usize) -> Option<f64> {
    if n == 0 || values.len() < n {
        return None;
    }
    let tail = &values[values.len() - n..];
    Some(tail.iter().sum::<f64>() / n as f64)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::Observation;

    fn series(prices: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let obs = prices
            .iter()
            .enumerate()
            .map(|(i, p)| Observation::new(start + Duration::days(i as i64), *p))
            .collect();
        TimeSeries::new("AAPL", obs)
    }

    #[test]
    fn start_end_change() {
        let perf = compute_performance(&series(&[100.0, 90.0, 125.0]), Period::OneMonth).unwrap();
        assert_eq!(perf.start_price, 100.0);
        assert_eq!(perf.end_price, 125.0);
        assert_eq!(perf.change, 25.0);
        assert_eq!(perf.pct_change, Some(25.0));
        assert_eq!(perf.first_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(perf.last_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(perf.ma_short, None);
    }

    #[test]
    fn empty_series_has_no_performance() {
        assert!(compute_performance(&TimeSeries::empty("AAPL"), Period::OneYear).is_none());
    }

    #[test]
    fn moving_averages_need_enough_bars() {
        let prices: Vec<f64> = (1..=60).map(|i| i as f64).collect();
        let perf = compute_performance(&series(&prices), Period::OneYear).unwrap();
        // Mean of 11..=60.
        assert_eq!(perf.ma_short, Some(35.5));
        assert_eq!(perf.ma_long, None);
    }

    #[test]
    fn zero_start_price_has_no_percent_change() {
        let perf = compute_performance(&series(&[0.0, 1.0]), Period::OneMonth).unwrap();
        assert_eq!(perf.pct_change, None);
        assert_eq!(perf.change, 1.0);
    }
}
