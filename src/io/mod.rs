//! Input/output helpers.
//!
//! - chart pages: produce from records, load for rendering (`page`)
//! - CSV export of chart data (`export`)
//! - style file loading (`style`)

pub mod export;
pub mod page;
pub mod style;

pub use export::*;
pub use page::*;
pub use style::*;
