//! Input/output helpers.
//!
//! - dashboard JSON export (`export`)

pub mod export;

pub use export::*;
