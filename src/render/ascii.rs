//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - one glyph per series at each labelled point (`*`, `+`, `x`, `o`, `#`)
//! - `.` segments connecting consecutive points of a series
//! - x labels under their columns (skipped when they would overlap)
//!
//! Values outside the y range are pinned to the top/bottom row.

use std::io::Write;

use crate::domain::ChartSpec;
use crate::error::ChartError;
use crate::render::{RenderHandle, RenderPort};

const GLYPHS: [char; 5] = ['*', '+', 'x', 'o', '#'];

/// Writes a text plot to any `Write` sink (stdout in the CLI).
pub struct AsciiRenderer<W: Write> {
    width: usize,
    height: usize,
    out: W,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self { width, height, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderPort for AsciiRenderer<W> {
    fn draw(&mut self, spec: &ChartSpec, surface: &str) -> Result<RenderHandle, ChartError> {
        let text = render_ascii_chart(spec, self.width, self.height);
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(RenderHandle::for_spec(spec, surface))
    }
}

/// Render `spec` as a fixed-size text plot.
pub fn render_ascii_chart(spec: &ChartSpec, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let n = spec.labels.len();
    let (y_min, y_max) = spec.y_bounds();

    let mut grid = vec![vec![' '; width]; height];

    // Connecting segments first, so glyphs overlay them.
    for dataset in &spec.datasets {
        let cells: Vec<(usize, usize)> = dataset
            .data
            .iter()
            .enumerate()
            .map(|(i, &y)| (map_x(i, n, width), map_y(y, y_min, y_max, height)))
            .collect();
        for pair in cells.windows(2) {
            draw_line(&mut grid, pair[0], pair[1], '.');
        }
    }

    for (k, dataset) in spec.datasets.iter().enumerate() {
        let glyph = GLYPHS[k % GLYPHS.len()];
        for (i, &y) in dataset.data.iter().enumerate() {
            grid[map_y(y, y_min, y_max, height)][map_x(i, n, width)] = glyph;
        }
    }

    let mut out = String::new();
    if let Some(title) = &spec.options.title {
        out.push_str(title);
        out.push('\n');
    }
    out.push_str(&format!(
        "Plot: {n} points x {} series | y=[{y_min:.2}, {y_max:.2}]\n",
        spec.datasets.len()
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str(label_row(&spec.labels, width).trim_end());
    out.push('\n');

    if spec.options.legend && !spec.datasets.is_empty() {
        let entries: Vec<String> = spec
            .datasets
            .iter()
            .enumerate()
            .map(|(k, d)| format!("{} {}", GLYPHS[k % GLYPHS.len()], d.label()))
            .collect();
        out.push_str(&format!("Legend: {}\n", entries.join("  ")));
    }

    out
}

fn label_row(labels: &[String], width: usize) -> String {
    let mut row = vec![' '; width];
    let mut next_free = 0usize;
    for (i, label) in labels.iter().enumerate() {
        let chars: Vec<char> = label.chars().collect();
        if chars.is_empty() || chars.len() > width {
            continue;
        }
        let col = map_x(i, labels.len(), width);
        let start = col.saturating_sub(chars.len() / 2).min(width - chars.len());
        if start < next_free {
            continue;
        }
        row[start..start + chars.len()].copy_from_slice(&chars);
        next_free = start + chars.len() + 1;
    }
    row.into_iter().collect()
}

fn map_x(i: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return (width - 1) / 2;
    }
    let u = i as f64 / (n as f64 - 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only fills empty cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut x0, mut y0) = (from.0 as isize, from.1 as isize);
    let (x1, y1) = (to.0 as isize, to.1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartOptions, Dataset, Rgba, SeriesStyle, YAxis};

    fn spec(labels: &[&str], series: &[(&str, &[f64])], options: ChartOptions) -> ChartSpec {
        ChartSpec {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            datasets: series
                .iter()
                .map(|(name, data)| Dataset {
                    style: SeriesStyle::new(*name, Rgba::new(0, 0, 0, 1.0)),
                    data: data.to_vec(),
                })
                .collect(),
            options,
            out_of_range: 0,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let spec = spec(
            &["Q1", "Q2", "Q3"],
            &[("Management Sentiment Score", &[0.0, 0.5, 1.0])],
            ChartOptions::default(),
        );

        let txt = render_ascii_chart(&spec, 11, 5);
        let expected = concat!(
            "Plot: 3 points x 1 series | y=[0.00, 1.00]\n",
            "         .*\n",
            "       ..  \n",
            "    .*.    \n",
            "  ..       \n",
            "*.         \n",
            "Q1  Q2   Q3\n",
            "Legend: * Management Sentiment Score\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn second_series_gets_its_own_glyph_and_title_leads() {
        let options = ChartOptions {
            title: Some("Sentiment Scores Over Time".into()),
            y_axis: YAxis::suggested_unit(),
            ..ChartOptions::default()
        };
        let spec = spec(&["Q1", "Q2"], &[("Mgmt", &[0.0, 0.0]), ("Q&A", &[1.0, 1.0])], options);

        let txt = render_ascii_chart(&spec, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Sentiment Scores Over Time");
        assert_eq!(lines[2], "+........+");
        assert_eq!(lines[6], "*........*");
        assert_eq!(lines[7], "Q1      Q2");
        assert_eq!(lines[8], "Legend: * Mgmt  + Q&A");
    }

    #[test]
    fn out_of_range_values_pin_to_edges() {
        let spec = spec(&["a", "b"], &[("s", &[-3.0, 7.0])], ChartOptions::default());
        let txt = render_ascii_chart(&spec, 10, 5);
        let lines: Vec<&str> = txt.lines().collect();
        assert!(lines[1].ends_with('*'));
        assert!(lines[5].starts_with('*'));
    }

    #[test]
    fn renderer_writes_to_sink() {
        let spec = spec(&["Q1"], &[("s", &[0.5])], ChartOptions::default());
        let mut r = AsciiRenderer::new(Vec::new(), 10, 5);
        let handle = r.draw(&spec, "sentimentChart").unwrap();
        assert_eq!(handle.points, 1);
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.starts_with("Plot: 1 points x 1 series"));
        assert!(text.contains("    *     \n"));
    }
}
