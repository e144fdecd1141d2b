//! Formatted terminal output.
//!
//! We keep formatting code in one place so the resolver and pipeline stay free
//! of display concerns and output changes are localized.

use crate::app::pipeline::{Dashboard, IndicatorRow, RowOutcome};
use crate::domain::{RangeResolution, Resolution, Unit};
use crate::report::StockPerformance;

/// Placeholder for a half that resolved to `NotFound`.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Level => format!("{value}"),
        Unit::Percent => format!("{value}%"),
        Unit::Thousands => format!("{value}k"),
        Unit::TrillionsUsd => format!("${value} Trillion"),
    }
}

/// `3.4% (as of 2023-01-01)`, or `N/A`.
pub fn format_resolution(resolution: &Resolution, unit: Unit) -> String {
    match resolution {
        Resolution::Found {
            value,
            observation_date,
        } => format!("{} (as of {observation_date})", format_value(*value, unit)),
        Resolution::NotFound => NOT_AVAILABLE.to_string(),
    }
}

/// `before → after`; each half falls back to `N/A` on its own.
pub fn format_range(range: &RangeResolution, unit: Unit) -> String {
    format!(
        "{} → {}",
        format_resolution(&range.start, unit),
        format_resolution(&range.end, unit)
    )
}

pub fn format_row(row: &IndicatorRow, label_width: usize) -> String {
    let body = match &row.outcome {
        RowOutcome::Resolved(range) => format_range(range, row.spec.unit),
        RowOutcome::Failed { error } => format!("error: {error}"),
    };
    format!("{:<width$} {body}", format!("{}:", row.spec.label), width = label_width + 1)
}

pub fn format_stock(stock: &StockPerformance) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Stock: {} ({}) {} → {}\n",
        stock.ticker,
        stock.period.label(),
        stock.first_date,
        stock.last_date
    ));
    out.push_str(&format!("  Start: ${:.2}\n", stock.start_price));
    out.push_str(&format!("  End:   ${:.2}\n", stock.end_price));
    match stock.pct_change {
        Some(pct) => out.push_str(&format!("  Change: ${:.2} ({pct:.2}%)\n", stock.change)),
        None => out.push_str(&format!("  Change: ${:.2}\n", stock.change)),
    }
    out.push_str(&format!(
        "  50-day MA: {} | 200-day MA: {}\n",
        fmt_opt_price(stock.ma_short),
        fmt_opt_price(stock.ma_long)
    ));
    out
}

/// Format the full dashboard: header, stock block, then the macro panel.
pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    out.push_str("=== asof - Macro Dashboard ===\n");
    out.push_str(&format!(
        "Range: {} → {} (generated {})\n",
        dashboard.start_date,
        dashboard.end_date,
        dashboard.generated_at.format("%Y-%m-%d %H:%M:%S")
    ));

    if let Some(stock) = &dashboard.stock {
        out.push('\n');
        out.push_str(&format_stock(stock));
    }

    out.push_str("\nMacro Indicators:\n");
    let width = dashboard.rows.iter().map(|r| r.spec.label.len()).max().unwrap_or(0);
    for row in &dashboard.rows {
        out.push_str(&format_row(row, width));
        out.push('\n');
    }

    out
}

fn fmt_opt_price(v: Option<f64>) -> String {
    v.map(|p| format!("${p:.2}")).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
