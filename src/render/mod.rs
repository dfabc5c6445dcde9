//! Rendering engines.
//!
//! The adapter only knows the `RenderPort` trait. Each engine turns a finished
//! `ChartSpec` into output on its own kind of surface:
//!
//! - Chart.js configuration / standalone HTML (`chartjs`)
//! - SVG via Plotters (`svg`)
//! - fixed-grid terminal text (`ascii`)
//! - interactive terminal view (`crate::tui`)
//! - in-memory recording for tests (`RecordingRenderer`)

use std::path::PathBuf;

use crate::domain::ChartSpec;
use crate::error::ChartError;

pub mod ascii;
pub mod chartjs;
pub mod smooth;
pub mod svg;

pub use ascii::AsciiRenderer;
pub use chartjs::ChartJsRenderer;
pub use svg::SvgRenderer;

/// A chart engine the adapter delegates drawing to.
pub trait RenderPort {
    /// Draw `spec` onto the surface named `surface`.
    ///
    /// Called at most once per render attempt, and only with a fully validated spec.
    fn draw(&mut self, spec: &ChartSpec, surface: &str) -> Result<RenderHandle, ChartError>;
}

/// What a completed draw produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderHandle {
    pub surface: String,
    pub datasets: usize,
    pub points: usize,
    /// File written by the engine, if any.
    pub artifact: Option<PathBuf>,
}

impl RenderHandle {
    pub fn for_spec(spec: &ChartSpec, surface: &str) -> Self {
        Self {
            surface: surface.to_string(),
            datasets: spec.datasets.len(),
            points: spec.points_per_dataset(),
            artifact: None,
        }
    }

    pub fn with_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.artifact = Some(path.into());
        self
    }
}

/// Keeps every spec it is asked to draw instead of drawing it.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub drawn: Vec<(String, ChartSpec)>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&ChartSpec> {
        self.drawn.last().map(|(_, spec)| spec)
    }
}

impl RenderPort for RecordingRenderer {
    fn draw(&mut self, spec: &ChartSpec, surface: &str) -> Result<RenderHandle, ChartError> {
        self.drawn.push((surface.to_string(), spec.clone()));
        Ok(RenderHandle::for_spec(spec, surface))
    }
}
