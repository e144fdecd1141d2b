//! The macro indicator panel shown by the dashboard.

use clap::ValueEnum;
use serde::Serialize;

use crate::domain::types::{DEFAULT_WINDOW_DAYS, Window};

/// Which external source serves a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// St. Louis Fed (FRED) economic series.
    Fred,
    /// World Bank indicators for the configured country.
    WorldBank,
    /// Yahoo Finance daily prices; the series id is a ticker.
    Yahoo,
}

/// How a row's value is derived from its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// The as-of value itself.
    Level,
    /// Percent change against the value 365 days earlier.
    YearOverYear,
}

/// Display unit of a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Plain number, no suffix.
    Level,
    Percent,
    Thousands,
    TrillionsUsd,
}

/// One row of the macro panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub provider: Provider,
    pub series_id: &'static str,
    pub transform: Transform,
    pub unit: Unit,
    /// Divisor applied to the raw value before display (e.g. dollars -> trillions).
    pub divisor: f64,
    pub window_before_days: u32,
    pub window_after_days: u32,
}

impl IndicatorSpec {
    const fn fred(key: &'static str, label: &'static str, series_id: &'static str, unit: Unit) -> Self {
        Self {
            key,
            label,
            provider: Provider::Fred,
            series_id,
            transform: Transform::Level,
            unit,
            divisor: 1.0,
            window_before_days: DEFAULT_WINDOW_DAYS,
            window_after_days: DEFAULT_WINDOW_DAYS,
        }
    }

    pub fn window(&self) -> Window {
        Window::days_around(self.window_before_days, self.window_after_days)
    }
}

/// Consumer price index; the inflation row is its year-over-year change.
pub const CPI_SERIES: &str = "CPIAUCSL";

/// World Bank GDP in current US dollars.
pub const GDP_INDICATOR: &str = "NY.GDP.MKTP.CD";

/// Panel rows in display order.
pub const MACRO_PANEL: &[IndicatorSpec] = &[
    IndicatorSpec::fred("fed_funds", "Fed Funds Rate", "FEDFUNDS", Unit::Percent),
    IndicatorSpec::fred("unemployment", "Unemployment Rate", "UNRATE", Unit::Percent),
    IndicatorSpec {
        transform: Transform::YearOverYear,
        ..IndicatorSpec::fred("inflation", "Inflation Rate (YoY)", CPI_SERIES, Unit::Percent)
    },
    IndicatorSpec::fred("treasury_1y", "1Y Treasury Yield", "DGS1", Unit::Percent),
    IndicatorSpec::fred("treasury_5y", "5Y Treasury Yield", "DGS5", Unit::Percent),
    IndicatorSpec::fred("treasury_10y", "10Y Treasury Yield", "DGS10", Unit::Percent),
    IndicatorSpec::fred("treasury_30y", "30Y Treasury Yield", "DGS30", Unit::Percent),
    IndicatorSpec::fred("nonfarm_payrolls", "Nonfarm Payrolls", "PAYEMS", Unit::Thousands),
    IndicatorSpec::fred("housing_starts", "Housing Starts", "HOUST", Unit::Thousands),
    // Annual cadence: look back five years, never ahead.
    IndicatorSpec {
        key: "gdp",
        label: "US GDP",
        provider: Provider::WorldBank,
        series_id: GDP_INDICATOR,
        transform: Transform::Level,
        unit: Unit::TrillionsUsd,
        divisor: 1e12,
        window_before_days: 5 * 366,
        window_after_days: 0,
    },
];
