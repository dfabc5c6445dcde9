//! Plotters-powered sentiment chart widget for Ratatui.
//!
//! Plotters is used instead of Ratatui's built-in `Chart` widget so filled series
//! and category ticks draw the same way as in the SVG engine.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color as TuiColor, Style},
    widgets::Widget,
};

use crate::render::svg::label_at;

/// One drawable series, already smoothed and mapped to x = label index.
pub struct PlotSeries {
    pub path: Vec<(f64, f64)>,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub fill: bool,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call, so `render()`
/// only draws.
pub struct SentimentPlottersChart<'a> {
    pub series: &'a [PlotSeries],
    /// Category labels; tick `i` shows `labels[i]`.
    pub labels: &'a [String],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for SentimentPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(TuiColor::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let labels = self.labels;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(labels.len().clamp(2, 8))
                .y_labels(5)
                .x_label_formatter(&|v| label_at(labels, *v))
                .y_label_formatter(&|v| format!("{v:.2}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for s in self.series {
                if s.fill && !s.path.is_empty() {
                    chart.draw_series(AreaSeries::new(s.path.iter().copied(), y0, &s.color.mix(0.3)))?;
                }
                chart.draw_series(LineSeries::new(s.path.iter().copied(), &s.color))?;

                // `Pixel` markers: circle radii come out wrong through the ratatui backend.
                chart.draw_series(s.points.iter().map(|&p| Pixel::new(p, WHITE)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn filled_series_draws_into_the_buffer() {
        let series = [PlotSeries {
            path: vec![(0.0, 0.2), (0.5, 0.5), (1.0, 0.8)],
            points: vec![(0.0, 0.2), (1.0, 0.8)],
            color: RGBColor(75, 192, 192),
            fill: true,
        }];
        let labels = ["Q1".to_string(), "Q2".to_string()];
        let widget = SentimentPlottersChart {
            series: &series,
            labels: &labels,
            x_bounds: [-0.5, 1.5],
            y_bounds: [0.0, 1.0],
        };

        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(buffer_text(&buf).chars().any(|c| c != ' '));
    }

    #[test]
    fn tiny_areas_get_a_hint_instead_of_a_chart() {
        let widget = SentimentPlottersChart {
            series: &[],
            labels: &[],
            x_bounds: [-0.5, 0.5],
            y_bounds: [0.0, 1.0],
        };
        let area = Rect::new(0, 0, 45, 4);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        assert!(buffer_text(&buf).starts_with("Chart area too small"));
    }
}
