//! Ratatui-based terminal view.
//!
//! `TerminalRenderer` is a `RenderPort`: drawing a spec opens a full-screen view
//! of the chart and returns once the user quits. Number keys toggle series.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::domain::ChartSpec;
use crate::error::ChartError;
use crate::render::smooth::smooth_path;
use crate::render::{RenderHandle, RenderPort};

mod plotters_chart;

use plotters_chart::{PlotSeries, SentimentPlottersChart};

/// Smoothing resolution in the terminal; cells are coarse.
const SMOOTH_STEPS: usize = 6;

/// Interactive full-screen chart engine.
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl TerminalRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl RenderPort for TerminalRenderer {
    fn draw(&mut self, spec: &ChartSpec, surface: &str) -> Result<RenderHandle, ChartError> {
        let _guard = TerminalGuard::new()?;

        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)
            .map_err(|e| ChartError::render(format!("Failed to initialize terminal: {e}")))?;

        let mut app = App::new(spec, surface);
        app.event_loop(&mut terminal)?;
        Ok(RenderHandle::for_spec(spec, surface))
    }
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, ChartError> {
        enable_raw_mode().map_err(|e| ChartError::render(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(ChartError::render(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<'a> {
    spec: &'a ChartSpec,
    surface: &'a str,
    visible: Vec<bool>,
    status: String,
}

impl<'a> App<'a> {
    fn new(spec: &'a ChartSpec, surface: &'a str) -> Self {
        let status = if spec.out_of_range > 0 {
            format!("{} value(s) outside [0, 1]", spec.out_of_range)
        } else {
            "ready".to_string()
        };
        Self {
            spec,
            surface,
            visible: vec![true; spec.datasets.len()],
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), ChartError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| ChartError::render(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| ChartError::render(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| ChartError::render(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the view should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(c @ '1'..='9') => {
                let idx = (c as usize) - ('1' as usize);
                if let Some(v) = self.visible.get_mut(idx) {
                    *v = !*v;
                    let label = self.spec.datasets[idx].label();
                    self.status = format!("{label}: {}", if *v { "shown" } else { "hidden" });
                }
            }
            KeyCode::Char('a') => {
                self.visible.iter_mut().for_each(|v| *v = true);
                self.status = "all series shown".to_string();
            }
            _ => {}
        }
        false
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = self.spec.options.title.as_deref().unwrap_or("Sentiment");
        let (y0, y1) = self.spec.y_bounds();

        let mut legend: Vec<Span> = Vec::new();
        for (i, d) in self.spec.datasets.iter().enumerate() {
            let c = d.style.border_color;
            let mut style = Style::default().fg(Color::Rgb(c.r, c.g, c.b));
            if !self.visible[i] {
                style = style.add_modifier(Modifier::CROSSED_OUT);
            }
            legend.push(Span::styled(format!("[{}] {}", i + 1, d.label()), style));
            legend.push(Span::raw("  "));
        }

        let lines = vec![
            Line::from(vec![
                Span::styled(title, Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!(
                        " | #{} | n={} | y=[{y0:.2}, {y1:.2}]",
                        self.surface,
                        self.spec.points_per_dataset()
                    ),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(legend),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Sentiment").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.spec.labels.is_empty() {
            let msg = Paragraph::new("No data points.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let (series, x_bounds, y_bounds) = chart_series(self.spec, &self.visible);
        let (chart_rect, insets) = chart_layout(inner);
        let widget = SentimentPlottersChart {
            series: &series,
            labels: &self.spec.labels,
            x_bounds,
            y_bounds,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            let y_title = self.spec.options.y_axis.title.as_deref().unwrap_or("score");
            let x_title = self.spec.options.x_title.as_deref().unwrap_or("");
            draw_axis_titles(frame, inner, chart_rect, insets, x_title, y_title);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "1-9 toggle series  a show all  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Build plot series for the visible datasets.
fn chart_series(spec: &ChartSpec, visible: &[bool]) -> (Vec<PlotSeries>, [f64; 2], [f64; 2]) {
    let n = spec.labels.len();
    let x_bounds = [-0.5, n.max(1) as f64 - 0.5];
    let (y0, y1) = spec.y_bounds();

    // Terminal aspect: roughly 4 columns of width per unit height is close enough.
    let sx = 4.0;
    let sy = (n.max(2) as f64) / (y1 - y0);

    let series = spec
        .datasets
        .iter()
        .zip(visible)
        .filter(|(_, v)| **v)
        .map(|(d, _)| {
            let points: Vec<(f64, f64)> = d.data.iter().enumerate().map(|(i, &y)| (i as f64, y)).collect();
            let scaled: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x * sx, y * sy)).collect();
            let path = smooth_path(&scaled, d.style.tension, SMOOTH_STEPS)
                .into_iter()
                .map(|(x, y)| (x / sx, y / sy))
                .collect();
            let c = d.style.border_color;
            PlotSeries {
                path,
                points,
                color: RGBColor(c.r, c.g, c.b),
                fill: d.style.fill,
            }
        })
        .collect();

    (series, x_bounds, [y0, y1])
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 2,
        right: 1,
        top: 1,
        bottom: 1,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

fn draw_axis_titles(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_title: &str,
    y_title: &str,
) {
    if !x_title.is_empty() {
        let x_label = Paragraph::new(x_title.to_string())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        let x_rect = Rect {
            x: chart.x,
            y: chart.y + chart.height,
            width: chart.width,
            height: 1,
        };
        if x_rect.y < inner.y + inner.height {
            frame.render_widget(x_label, x_rect);
        }
    }

    let y_label = Paragraph::new(y_title.to_string())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.saturating_sub(insets.right),
        height: insets.top,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartLayout, Dataset};

    fn spec() -> ChartSpec {
        let binding = ChartLayout::Comparison.binding();
        ChartSpec {
            labels: vec!["Q1".into(), "Q2".into(), "Q3".into()],
            datasets: binding
                .series
                .iter()
                .map(|b| Dataset { style: b.style.clone(), data: vec![0.2, 0.6, 0.4] })
                .collect(),
            options: binding.options,
            out_of_range: 0,
        }
    }

    #[test]
    fn hidden_series_are_not_plotted() {
        let spec = spec();
        let (series, x_bounds, y_bounds) = chart_series(&spec, &[true, false]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].color, RGBColor(75, 192, 192));
        assert_eq!(x_bounds, [-0.5, 2.5]);
        assert_eq!(y_bounds, [0.0, 1.0]);
        assert_eq!(series[0].points, [(0.0, 0.2), (1.0, 0.6), (2.0, 0.4)]);
        // Smoothed path passes through first and last points.
        let path = &series[0].path;
        assert_eq!(path.len(), 2 * SMOOTH_STEPS + 1);
        assert!((path[0].1 - 0.2).abs() < 1e-9);
        assert!((path[path.len() - 1].1 - 0.4).abs() < 1e-9);
    }

    #[test]
    fn number_keys_toggle_series() {
        let spec = spec();
        let mut app = App::new(&spec, "sentimentChart");
        assert!(!app.handle_key(KeyCode::Char('2')));
        assert_eq!(app.visible, [true, false]);
        assert_eq!(app.status, "Q&A Sentiment: hidden");
        assert!(!app.handle_key(KeyCode::Char('9')));
        assert!(!app.handle_key(KeyCode::Char('a')));
        assert_eq!(app.visible, [true, true]);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn small_areas_fall_back_to_full_inner_rect() {
        let inner = Rect { x: 0, y: 0, width: 12, height: 6 };
        let (rect, insets) = chart_layout(inner);
        assert_eq!(rect, inner);
        assert!(insets.is_none());
    }
}
