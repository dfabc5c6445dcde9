//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - series data and styling (`Rgba`, `SeriesStyle`, `YAxis`)
//! - the finished chart description (`ChartSpec`)
//! - document bindings and the built-in layouts (`ChartBinding`, `ChartLayout`)
//! - upstream sentiment records (`QuarterRecord`)

pub mod layout;
pub mod types;

pub use layout::*;
pub use types::*;
