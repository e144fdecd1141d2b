//! Domain types used throughout the resolver and dashboard.
//!
//! This module defines:
//!
//! - series data (`Observation`, `TimeSeries`) and lookup inputs/outputs
//!   (`Window`, `ResolutionRequest`, `Resolution`, `RangeResolution`)
//! - the fixed macro indicator panel (`IndicatorSpec`, `MACRO_PANEL`)

pub mod indicators;
pub mod types;

pub use indicators::*;
pub use types::*;
