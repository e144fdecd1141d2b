//! Export a refreshed dashboard to JSON.
//!
//! The export is meant to be easy to consume in notebooks or downstream scripts:
//! every row carries its indicator metadata plus both as-of halves.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::app::pipeline::Dashboard;
use crate::error::{AppError, EXIT_OUTPUT};

/// Write a dashboard JSON file.
pub fn write_dashboard_json(path: &Path, dashboard: &Dashboard) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(BufWriter::new(file), dashboard)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to write export JSON: {e}")))?;

    tracing::info!(path = %path.display(), rows = dashboard.rows.len(), "wrote dashboard export");
    Ok(())
}

/// Render a dashboard as pretty JSON.
pub fn dashboard_json(dashboard: &Dashboard) -> Result<String, AppError> {
    serde_json::to_string_pretty(dashboard)
        .map_err(|e| AppError::new(EXIT_OUTPUT, format!("Failed to encode dashboard: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate};
    use serde_json::Value;

    use super::*;
    use crate::app::pipeline::{IndicatorRow, RowOutcome};
    use crate::domain::{MACRO_PANEL, RangeResolution, Resolution};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rows_carry_spec_and_both_halves() {
        let dashboard = Dashboard {
            generated_at: Local::now(),
            start_date: d(2023, 1, 15),
            end_date: d(2023, 2, 15),
            stock: None,
            rows: vec![
                IndicatorRow {
                    spec: MACRO_PANEL[1],
                    outcome: RowOutcome::Resolved(RangeResolution {
                        start: Resolution::Found {
                            value: 3.4,
                            observation_date: d(2023, 1, 1),
                        },
                        end: Resolution::NotFound,
                    }),
                },
                IndicatorRow {
                    spec: MACRO_PANEL[0],
                    outcome: RowOutcome::Failed {
                        error: "fred unavailable: timeout".to_string(),
                    },
                },
            ],
        };

        let json: Value = serde_json::from_str(&dashboard_json(&dashboard).unwrap()).unwrap();
        assert_eq!(json["start_date"], "2023-01-15");
        assert!(json["stock"].is_null());

        let row = &json["rows"][0];
        assert_eq!(row["spec"]["series_id"], "UNRATE");
        assert_eq!(row["spec"]["provider"], "fred");
        assert_eq!(row["outcome"]["outcome"], "resolved");
        assert_eq!(row["outcome"]["start"]["status"], "found");
        assert_eq!(row["outcome"]["start"]["value"], 3.4);
        assert_eq!(row["outcome"]["end"]["status"], "not_found");

        let failed = &json["rows"][1]["outcome"];
        assert_eq!(failed["outcome"], "failed");
        assert_eq!(failed["error"], "fred unavailable: timeout");
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dashboard = Dashboard {
            generated_at: Local::now(),
            start_date: d(2023, 1, 15),
            end_date: d(2023, 2, 15),
            stock: None,
            rows: Vec::new(),
        };
        let path = std::env::temp_dir()
            .join(format!("asof-no-such-dir-{}", std::process::id()))
            .join("dashboard.json");

        let err = write_dashboard_json(&path, &dashboard).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_OUTPUT);
        assert!(err.to_string().contains("Failed to create export JSON"));
    }
}
