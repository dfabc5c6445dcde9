//! Chart.js output.
//!
//! Produces the configuration object a browser-side Chart.js line chart takes:
//!
//! ```text
//! { type: "line",
//!   data: { labels, datasets: [{ label, data, borderColor, backgroundColor?, tension, fill }] },
//!   options: { responsive, plugins: { title?, legend }, scales: { x?, y } } }
//! ```
//!
//! Fixed y bounds become `min`/`max`, suggested ones `suggestedMin`/`suggestedMax`,
//! and a zero-based end becomes `beginAtZero`.

use std::io::Write;

use serde_json::{Map, Value, json};

use crate::domain::{Bound, ChartSpec};
use crate::error::ChartError;
use crate::render::{RenderHandle, RenderPort};

/// Where the CDN build of Chart.js is loaded from in generated pages.
pub const CHARTJS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Build the Chart.js configuration for `spec`.
pub fn chartjs_config(spec: &ChartSpec) -> Value {
    let datasets: Vec<Value> = spec
        .datasets
        .iter()
        .map(|d| {
            let mut ds = Map::new();
            ds.insert("label".into(), json!(d.style.label));
            ds.insert("data".into(), json!(d.data));
            ds.insert("borderColor".into(), json!(d.style.border_color.to_string()));
            if d.style.fill || d.style.background_color.is_some() {
                ds.insert("backgroundColor".into(), json!(d.style.area_color().to_string()));
            }
            ds.insert("tension".into(), json!(d.style.tension));
            ds.insert("fill".into(), json!(d.style.fill));
            Value::Object(ds)
        })
        .collect();

    let opts = &spec.options;

    let mut y = Map::new();
    match opts.y_axis.min {
        Bound::Fixed(v) => y.insert("min".into(), json!(v)),
        Bound::Suggested(v) => y.insert("suggestedMin".into(), json!(v)),
        Bound::BeginAtZero => y.insert("beginAtZero".into(), json!(true)),
    };
    match opts.y_axis.max {
        Bound::Fixed(v) => y.insert("max".into(), json!(v)),
        Bound::Suggested(v) => y.insert("suggestedMax".into(), json!(v)),
        Bound::BeginAtZero => y.insert("beginAtZero".into(), json!(true)),
    };
    if let Some(title) = &opts.y_axis.title {
        y.insert("title".into(), json!({ "display": true, "text": title }));
    }

    let mut scales = Map::new();
    if let Some(title) = &opts.x_title {
        scales.insert("x".into(), json!({ "title": { "display": true, "text": title } }));
    }
    scales.insert("y".into(), Value::Object(y));

    let mut plugins = Map::new();
    if let Some(title) = &opts.title {
        plugins.insert("title".into(), json!({ "display": true, "text": title }));
    }
    plugins.insert("legend".into(), json!({ "display": opts.legend }));

    json!({
        "type": "line",
        "data": {
            "labels": spec.labels,
            "datasets": datasets,
        },
        "options": {
            "responsive": opts.responsive,
            "plugins": plugins,
            "scales": scales,
        },
    })
}

/// Make JSON safe to place inside a `<script>` element.
pub fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parts of a generated page.
pub struct HtmlPage<'a> {
    pub title: &'a str,
    pub surface: &'a str,
    /// Chart.js configuration JSON.
    pub config: &'a str,
    /// Extra markup placed before the drawing surface (e.g., data elements).
    pub head_elements: &'a str,
    /// RFC 3339 timestamp for `<meta name="generated">`.
    pub generated: Option<&'a str>,
}

impl HtmlPage<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str("  <meta charset=\"utf-8\">\n");
        if let Some(ts) = self.generated {
            out.push_str(&format!("  <meta name=\"generated\" content=\"{}\">\n", escape_html(ts)));
        }
        out.push_str(&format!("  <title>{}</title>\n", escape_html(self.title)));
        out.push_str(&format!("  <script src=\"{CHARTJS_CDN}\"></script>\n"));
        out.push_str("</head>\n<body>\n");
        out.push_str(self.head_elements);
        out.push_str(&format!("  <canvas id=\"{}\"></canvas>\n", escape_html(self.surface)));
        // Inside <script> entities are not decoded: the id goes in as a JS string literal.
        let surface_js = Value::String(self.surface.to_string()).to_string();
        out.push_str("  <script>\n");
        out.push_str(&format!(
            "    new Chart(document.getElementById({}), {});\n",
            script_safe(&surface_js),
            script_safe(self.config)
        ));
        out.push_str("  </script>\n</body>\n</html>\n");
        out
    }
}

/// What the Chart.js engine writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartJsOutput {
    /// The configuration object, pretty-printed.
    Json,
    /// A standalone page that loads Chart.js and draws the chart.
    Html,
}

/// Emits Chart.js configuration (or a page around it) to a sink.
pub struct ChartJsRenderer<W: Write> {
    out: W,
    output: ChartJsOutput,
}

impl<W: Write> ChartJsRenderer<W> {
    pub fn new(out: W, output: ChartJsOutput) -> Self {
        Self { out, output }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderPort for ChartJsRenderer<W> {
    fn draw(&mut self, spec: &ChartSpec, surface: &str) -> Result<RenderHandle, ChartError> {
        let config = serde_json::to_string_pretty(&chartjs_config(spec))
            .map_err(|e| ChartError::render(format!("failed to serialize Chart.js config: {e}")))?;

        match self.output {
            ChartJsOutput::Json => {
                self.out.write_all(config.as_bytes())?;
                self.out.write_all(b"\n")?;
            }
            ChartJsOutput::Html => {
                let page = HtmlPage {
                    title: spec.options.title.as_deref().unwrap_or("Sentiment"),
                    surface,
                    config: &config,
                    head_elements: "",
                    generated: None,
                };
                self.out.write_all(page.render().as_bytes())?;
            }
        }
        self.out.flush()?;
        Ok(RenderHandle::for_spec(spec, surface))
    }
}
