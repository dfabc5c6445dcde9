//! Shared "load page -> bind -> render" logic used by every subcommand.
//!
//! The subcommands differ only in what they do with the chart: draw it, report on
//! it, or export it. Loading and binding live here once.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::adapter::ChartAdapter;
use crate::document::HtmlDocument;
use crate::domain::{ChartSpec, RenderConfig, RenderFormat, SourceConfig};
use crate::error::AppError;
use crate::render::chartjs::ChartJsOutput;
use crate::render::{AsciiRenderer, ChartJsRenderer, RenderHandle, SvgRenderer};
use crate::tui::TerminalRenderer;

const ASCII_SIZE: (u32, u32) = (80, 20);
const SVG_SIZE: (u32, u32) = (800, 400);

/// Read the page and build the adapter for its layout, style file and mismatch policy.
pub fn load_chart(config: &SourceConfig) -> Result<(HtmlDocument, ChartAdapter), AppError> {
    let doc = crate::io::load_page(&config.page)?;
    let layout = config.layout.resolve(&doc)?;

    let mut binding = layout.binding();
    if let Some(path) = &config.style {
        binding = binding.with_style_file(crate::io::load_style_file(path)?)?;
    }
    binding.options.mismatch = config.mismatch;

    debug!(
        page = %config.page.display(),
        elements = doc.len(),
        layout = ?layout,
        "loaded page"
    );
    Ok((doc, ChartAdapter::new(binding)))
}

/// Build the chart spec for a page without drawing it.
pub fn chart_spec(config: &SourceConfig) -> Result<ChartSpec, AppError> {
    let (doc, adapter) = load_chart(config)?;
    Ok(adapter.spec(&doc)?)
}

/// Quarterly report for a page.
///
/// Generated pages embed their records, which gives the labelled report. Other pages
/// are reported from the chart spec.
pub fn page_report(config: &SourceConfig) -> Result<String, AppError> {
    let doc = crate::io::load_page(&config.page)?;
    if let Some(records) = crate::io::embedded_records(&doc)? {
        debug!(records = records.len(), "reporting embedded records");
        return crate::report::format_records_report(&records);
    }
    Ok(crate::report::format_tone_report(&chart_spec(config)?))
}

/// Render a page with the configured engine.
///
/// Text engines render into memory first, so nothing is written when the render fails.
pub fn render(config: &RenderConfig) -> Result<RenderHandle, AppError> {
    let (doc, adapter) = load_chart(&config.source)?;

    match config.format {
        RenderFormat::Ascii => {
            let width = config.width.unwrap_or(ASCII_SIZE.0) as usize;
            let height = config.height.unwrap_or(ASCII_SIZE.1) as usize;
            let mut buf = Vec::new();
            let handle = adapter.render(&doc, &mut AsciiRenderer::new(&mut buf, width, height))?;
            emit(config.out.as_deref(), &buf, handle)
        }
        RenderFormat::Chartjs | RenderFormat::Html => {
            let output = if config.format == RenderFormat::Html {
                ChartJsOutput::Html
            } else {
                ChartJsOutput::Json
            };
            let mut buf = Vec::new();
            let handle = adapter.render(&doc, &mut ChartJsRenderer::new(&mut buf, output))?;
            emit(config.out.as_deref(), &buf, handle)
        }
        RenderFormat::Svg => {
            let Some(out) = &config.out else {
                return Err(AppError::new(2, "`--format svg` needs an output file (`--out chart.svg`)."));
            };
            let width = config.width.unwrap_or(SVG_SIZE.0);
            let height = config.height.unwrap_or(SVG_SIZE.1);
            Ok(adapter.render(&doc, &mut SvgRenderer::new(out, width, height))?)
        }
        RenderFormat::Tui => Ok(adapter.render(&doc, &mut TerminalRenderer::new())?),
    }
}

fn emit(path: Option<&Path>, bytes: &[u8], handle: RenderHandle) -> Result<RenderHandle, AppError> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| {
                        AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display()))
                    })?;
                }
            }
            fs::write(path, bytes)
                .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
            Ok(handle.with_artifact(path))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(bytes)
                .and_then(|()| stdout.flush())
                .map_err(|e| AppError::new(2, format!("Failed to write output: {e}")))?;
            Ok(handle)
        }
    }
}
