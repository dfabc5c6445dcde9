//! SVG output via Plotters.
//!
//! Labels are categorical: point `i` sits at x = `i`, and the x tick formatter
//! maps integer ticks back to label text. Smoothing (`tension`) is computed in
//! approximate pixel space so curves bend the same way regardless of the y range.

use std::error::Error;
use std::path::PathBuf;

use plotters::prelude::*;
use tracing::debug;

use crate::domain::{ChartSpec, Rgba};
use crate::error::ChartError;
use crate::render::smooth::smooth_path;
use crate::render::{RenderHandle, RenderPort};

/// Sub-segments per label interval when a series is smoothed.
const SMOOTH_STEPS: usize = 12;

/// Writes the chart to an SVG file.
pub struct SvgRenderer {
    path: PathBuf,
    width: u32,
    height: u32,
}

impl SvgRenderer {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
        }
    }
}

impl RenderPort for SvgRenderer {
    fn draw(&mut self, spec: &ChartSpec, surface: &str) -> Result<RenderHandle, ChartError> {
        let svg = render_svg(spec, self.width, self.height)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, svg)?;
        debug!(path = %self.path.display(), "wrote svg");
        Ok(RenderHandle::for_spec(spec, surface).with_artifact(&self.path))
    }
}

/// Render `spec` to an SVG document string.
pub fn render_svg(spec: &ChartSpec, width: u32, height: u32) -> Result<String, ChartError> {
    let mut svg = String::new();
    draw_chart(spec, &mut svg, width.max(200), height.max(150))
        .map_err(|e| ChartError::render(format!("svg: {e}")))?;
    Ok(svg)
}

fn draw_chart(spec: &ChartSpec, svg: &mut String, width: u32, height: u32) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::with_string(svg, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = spec.labels.len();
    let x0 = -0.5;
    let x1 = (n.max(1) as f64) - 0.5;
    let (y0, y1) = spec.y_bounds();

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 48)
        .set_label_area_size(LabelAreaPosition::Bottom, 36);
    if let Some(title) = &spec.options.title {
        builder.caption(title, ("sans-serif", 20));
    }
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    let fmt_x = |v: &f64| label_at(&spec.labels, *v);
    let fmt_y = |v: &f64| format!("{v:.1}");
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(n.clamp(2, 24))
            .y_labels(6)
            .x_label_formatter(&fmt_x)
            .y_label_formatter(&fmt_y)
            .light_line_style(&WHITE);
        if let Some(t) = &spec.options.x_title {
            mesh.x_desc(t.as_str());
        }
        if let Some(t) = &spec.options.y_axis.title {
            mesh.y_desc(t.as_str());
        }
        mesh.draw()?;
    }

    // Rough plot-area size, used only to make smoothing aspect-aware.
    let plot_w = (width.saturating_sub(72)).max(1) as f64;
    let plot_h = (height.saturating_sub(60)).max(1) as f64;
    let sx = plot_w / (x1 - x0);
    let sy = plot_h / (y1 - y0);

    for dataset in &spec.datasets {
        let style = &dataset.style;
        let line_color = color(style.border_color);
        let points: Vec<(f64, f64)> = dataset
            .data
            .iter()
            .enumerate()
            .map(|(i, &y)| (i as f64, y))
            .collect();

        let path = if style.tension > 0.0 {
            let px: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x * sx, y * sy)).collect();
            smooth_path(&px, style.tension, SMOOTH_STEPS)
                .into_iter()
                .map(|(x, y)| (x / sx, y / sy))
                .collect()
        } else {
            points.clone()
        };

        if style.fill && !path.is_empty() {
            chart.draw_series(AreaSeries::new(path.iter().copied(), y0, &color(style.area_color())))?;
        }

        chart
            .draw_series(LineSeries::new(path.iter().copied(), line_color.stroke_width(2)))?
            .label(style.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color.stroke_width(2)));

        chart.draw_series(points.iter().map(|&p| Circle::new(p, 3, line_color.filled())))?;
    }

    if spec.options.legend && !spec.datasets.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn color(c: Rgba) -> RGBAColor {
    RGBColor(c.r, c.g, c.b).mix(c.a)
}

/// Label text for an x tick, or empty when the tick is between categories.
pub(crate) fn label_at(labels: &[String], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}
