//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built from embedded document data by the adapter
//! - overridden from a JSON style file
//! - handed to any rendering engine as a finished `ChartSpec`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::LayoutChoice;
use crate::error::ChartError;

/// An sRGB colour with straight alpha, written the way CSS writes it.
///
/// Accepted text forms: `rgba(r, g, b, a)`, `rgb(r, g, b)`, `#rrggbb`, `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ChartError::InvalidStyle {
            reason: format!("unrecognized colour '{s}'"),
        };

        if let Some(hex) = s.strip_prefix('#') {
            if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
                return Err(invalid());
            }
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            let a = if hex.len() == 8 { byte(6)? as f64 / 255.0 } else { 1.0 };
            return Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, a));
        }

        let (body, want) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, 4)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, 3)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != want {
            return Err(invalid());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        let a = if want == 4 {
            let a: f64 = parts[3].parse().map_err(|_| invalid())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(invalid());
            }
            a
        } else {
            1.0
        };

        Ok(Rgba::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, a))
    }
}

impl TryFrom<String> for Rgba {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

/// Styling for one line series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// Display name (legend entry).
    pub label: String,
    /// Line colour.
    pub border_color: Rgba,
    /// Area colour under the line; defaults to the line colour at 20% alpha.
    #[serde(default)]
    pub background_color: Option<Rgba>,
    /// Fill the area between the line and the x axis.
    #[serde(default)]
    pub fill: bool,
    /// Curve smoothing, 0 (straight segments) to 1.
    #[serde(default)]
    pub tension: f64,
}

impl SeriesStyle {
    pub fn new(label: impl Into<String>, border_color: Rgba) -> Self {
        Self {
            label: label.into(),
            border_color,
            background_color: None,
            fill: false,
            tension: 0.0,
        }
    }

    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    /// Effective fill colour.
    pub fn area_color(&self) -> Rgba {
        self.background_color
            .unwrap_or_else(|| self.border_color.with_alpha(0.2))
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if !(self.tension.is_finite() && (0.0..=1.0).contains(&self.tension)) {
            return Err(ChartError::InvalidStyle {
                reason: format!(
                    "tension for '{}' must be within [0, 1], got {}",
                    self.label, self.tension
                ),
            });
        }
        Ok(())
    }
}

/// One end of the y axis.
///
/// `Fixed` pins the end; `Suggested` is a hint the axis widens past when data does.
/// `BeginAtZero` is a suggestion of zero (Chart.js `beginAtZero`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Fixed(f64),
    Suggested(f64),
    #[serde(rename = "begin_at_zero")]
    BeginAtZero,
}

impl Bound {
    pub fn value(self) -> f64 {
        match self {
            Bound::Fixed(v) | Bound::Suggested(v) => v,
            Bound::BeginAtZero => 0.0,
        }
    }

    /// Whether the axis may move past this end to fit the data.
    pub fn widens(self) -> bool {
        !matches!(self, Bound::Fixed(_))
    }
}

/// Y-axis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YAxis {
    pub min: Bound,
    pub max: Bound,
    #[serde(default)]
    pub title: Option<String>,
}

impl YAxis {
    /// `[0, 1]`, pinned.
    pub fn fixed_unit() -> Self {
        Self {
            min: Bound::Fixed(0.0),
            max: Bound::Fixed(1.0),
            title: None,
        }
    }

    /// Starts at zero (lower if the data does), capped at 1.
    pub fn zero_based_unit() -> Self {
        Self {
            min: Bound::BeginAtZero,
            max: Bound::Fixed(1.0),
            title: None,
        }
    }

    /// `[0, 1]` as a suggestion.
    pub fn suggested_unit() -> Self {
        Self {
            min: Bound::Suggested(0.0),
            max: Bound::Suggested(1.0),
            title: None,
        }
    }

    /// Concrete display range given the data extent (if any).
    ///
    /// Fixed ends never move; suggested ends widen to include the data.
    pub fn resolve(&self, data: Option<(f64, f64)>) -> (f64, f64) {
        let mut lo = self.min.value();
        let mut hi = self.max.value();
        if let Some((d_lo, d_hi)) = data {
            if self.min.widens() {
                lo = lo.min(d_lo);
            }
            if self.max.widens() {
                hi = hi.max(d_hi);
            }
        }
        if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
            return (0.0, 1.0);
        }
        (lo, hi)
    }
}

/// What to do when a score series is not index-aligned with the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Fail the render with `ChartError::ShapeMismatch`.
    #[default]
    Reject,
    /// Cut labels and every series to the shortest length.
    Truncate,
}

/// Chart-level options.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: Option<String>,
    pub x_title: Option<String>,
    pub y_axis: YAxis,
    pub legend: bool,
    pub responsive: bool,
    pub mismatch: MismatchPolicy,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: None,
            x_title: None,
            y_axis: YAxis::fixed_unit(),
            legend: true,
            responsive: true,
            mismatch: MismatchPolicy::Reject,
        }
    }
}

/// One configured series: its values plus styling.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub style: SeriesStyle,
    pub data: Vec<f64>,
}

impl Dataset {
    pub fn label(&self) -> &str {
        &self.style.label
    }
}

/// The finished, engine-independent chart description.
///
/// Built once per render call; `data` of every dataset has exactly `labels.len()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
    /// Count of score values outside `[0, 1]` (kept, not clamped).
    pub out_of_range: usize,
}

impl ChartSpec {
    pub fn points_per_dataset(&self) -> usize {
        self.labels.len()
    }

    /// Min/max over every value of every dataset.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in self.datasets.iter().flat_map(|d| d.data.iter().copied()) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
    }

    /// Resolved y display range.
    pub fn y_bounds(&self) -> (f64, f64) {
        self.options.y_axis.resolve(self.value_range())
    }
}

/// Output engine selection for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    /// Fixed-grid text plot on stdout.
    Ascii,
    /// SVG image (requires `--out`).
    Svg,
    /// Chart.js configuration JSON.
    Chartjs,
    /// Standalone HTML page drawing the chart with Chart.js.
    Html,
    /// Interactive terminal view.
    Tui,
}

/// Optional overrides loaded from a JSON style file.
///
/// Example:
///
/// ```json
/// { "title": "NVDA tone", "series": [{ "label": "Mgmt", "border_color": "#4bc0c0", "tension": 0.4 }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleFile {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub x_title: Option<String>,
    #[serde(default)]
    pub y_axis: Option<YAxis>,
    #[serde(default)]
    pub legend: Option<bool>,
    /// Replaces series styles positionally; extra entries are ignored.
    #[serde(default)]
    pub series: Vec<SeriesStyle>,
}

/// Sentiment for one transcript section, as produced upstream.
///
/// Either `{ "label": "POSITIVE", "score": 0.85 }` or a bare label string whose
/// score sits on the enclosing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionSentiment {
    Scored { label: String, score: f64 },
    Label(String),
}

impl SectionSentiment {
    pub fn label(&self) -> &str {
        match self {
            SectionSentiment::Scored { label, .. } | SectionSentiment::Label(label) => label,
        }
    }
}

/// One quarter of upstream sentiment output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterRecord {
    pub year: serde_json::Value,
    pub quarter: String,
    pub management_sentiment: SectionSentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qna_sentiment: Option<SectionSentiment>,
    /// Management score when `management_sentiment` is a bare label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Strategic themes emphasized in the quarter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
}

impl QuarterRecord {
    /// `"{year} {quarter}"`; string years are used verbatim.
    pub fn period(&self) -> String {
        match &self.year {
            serde_json::Value::String(y) => format!("{y} {}", self.quarter),
            other => format!("{other} {}", self.quarter),
        }
    }

    /// Management label and score, if a score is available.
    pub fn management(&self) -> Option<(&str, f64)> {
        match &self.management_sentiment {
            SectionSentiment::Scored { label, score } => Some((label, *score)),
            SectionSentiment::Label(label) => self.score.map(|s| (label.as_str(), s)),
        }
    }

    /// Q&A label and score; bare Q&A labels carry no score.
    pub fn qna(&self) -> Option<(&str, f64)> {
        match self.qna_sentiment.as_ref()? {
            SectionSentiment::Scored { label, score } => Some((label, *score)),
            SectionSentiment::Label(_) => None,
        }
    }
}

/// Where chart data comes from and how it is bound.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub page: PathBuf,
    pub layout: LayoutChoice,
    pub style: Option<PathBuf>,
    pub mismatch: MismatchPolicy,
}

/// Resolved settings for one `render` run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub source: SourceConfig,
    pub format: RenderFormat,
    /// Output file; stdout when `None` (not allowed for SVG).
    pub out: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_parses_css_forms() {
        let c: Rgba = "rgba(75, 192, 192, 0.2)".parse().unwrap();
        assert_eq!(c, Rgba::new(75, 192, 192, 0.2));
        assert_eq!(c.to_string(), "rgba(75, 192, 192, 0.2)");

        let c: Rgba = "rgb(255,99,132)".parse().unwrap();
        assert_eq!(c.to_string(), "rgba(255, 99, 132, 1)");

        let c: Rgba = "#4bc0c0".parse().unwrap();
        assert_eq!(c, Rgba::new(75, 192, 192, 1.0));

        assert!("hsl(1, 2, 3)".parse::<Rgba>().is_err());
        assert!("rgba(1, 2, 3, 1.5)".parse::<Rgba>().is_err());
        assert!("#12345".parse::<Rgba>().is_err());
    }

    #[test]
    fn tension_outside_unit_interval_is_rejected() {
        let style = SeriesStyle::new("m", Rgba::new(0, 0, 0, 1.0)).with_tension(1.5);
        assert!(matches!(style.validate(), Err(ChartError::InvalidStyle { .. })));
        assert!(style.with_tension(0.3).validate().is_ok());
    }

    #[test]
    fn suggested_bounds_widen_fixed_bounds_do_not() {
        let data = Some((-0.2, 1.4));
        assert_eq!(YAxis::fixed_unit().resolve(data), (0.0, 1.0));
        assert_eq!(YAxis::suggested_unit().resolve(data), (-0.2, 1.4));
        assert_eq!(YAxis::suggested_unit().resolve(Some((0.3, 0.6))), (0.0, 1.0));
        assert_eq!(YAxis::suggested_unit().resolve(None), (0.0, 1.0));
    }

    #[test]
    fn begin_at_zero_extends_below_zero_only_for_negative_data() {
        let axis = YAxis::zero_based_unit();
        assert_eq!(axis.resolve(Some((-0.2, 1.4))), (-0.2, 1.0));
        assert_eq!(axis.resolve(Some((0.3, 0.6))), (0.0, 1.0));

        let y: YAxis = serde_json::from_str(r#"{ "min": "begin_at_zero", "max": { "fixed": 1.0 } }"#).unwrap();
        assert_eq!(y, axis);
    }

    #[test]
    fn style_file_deserializes_partial_overrides() {
        let json = r#"{
            "title": "Tone",
            "y_axis": { "min": { "fixed": 0.0 }, "max": { "suggested": 1.0 } },
            "series": [{ "label": "Mgmt", "border_color": "rgb(1, 2, 3)", "fill": true }]
        }"#;
        let file: StyleFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.title.as_deref(), Some("Tone"));
        let y = file.y_axis.unwrap();
        assert_eq!(y.min, Bound::Fixed(0.0));
        assert_eq!(y.max, Bound::Suggested(1.0));
        assert_eq!(file.series[0].border_color, Rgba::new(1, 2, 3, 1.0));
        assert!(file.series[0].fill);
        assert_eq!(file.series[0].tension, 0.0);
    }

    #[test]
    fn quarter_record_accepts_both_upstream_shapes() {
        let scored: QuarterRecord = serde_json::from_str(
            r#"{"year": "2025", "quarter": "Q1",
                "management_sentiment": {"label": "POSITIVE", "score": 0.85},
                "qna_sentiment": {"label": "NEUTRAL", "score": 0.4}}"#,
        )
        .unwrap();
        assert!(matches!(scored.management_sentiment, SectionSentiment::Scored { score, .. } if score == 0.85));

        let flat: QuarterRecord = serde_json::from_str(
            r#"{"year": 2024, "quarter": "Q4", "management_sentiment": "Neutral", "score": 0.5}"#,
        )
        .unwrap();
        assert_eq!(flat.score, Some(0.5));
        assert!(flat.qna_sentiment.is_none());
        assert!(flat.themes.is_empty());
        assert_eq!(flat.period(), "2024 Q4");
        assert_eq!(flat.management(), Some(("Neutral", 0.5)));
        assert_eq!(flat.qna(), None);
    }

    #[test]
    fn quarter_record_keeps_labels_and_themes() {
        let r: QuarterRecord = serde_json::from_str(
            r#"{"year": "2025", "quarter": "Q1",
                "management_sentiment": {"label": "POSITIVE", "score": 0.85},
                "qna_sentiment": {"label": "NEUTRAL", "score": 0.4},
                "themes": ["AI", "Blackwell"]}"#,
        )
        .unwrap();
        assert_eq!(r.period(), "2025 Q1");
        assert_eq!(r.management(), Some(("POSITIVE", 0.85)));
        assert_eq!(r.qna(), Some(("NEUTRAL", 0.4)));
        assert_eq!(r.themes, ["AI", "Blackwell"]);

        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains(r#""themes":["AI","Blackwell"]"#));
        assert!(!json.contains("\"score\":null"));
        let back: QuarterRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
