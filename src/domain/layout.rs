//! Chart layouts: which document elements feed which series, and how they look.
//!
//! The two presets reproduce the pages the sentiment dashboard has always shipped:
//! a filled single-series management chart and a management vs Q&A comparison.

use clap::ValueEnum;

use crate::document::Document;
use crate::domain::{ChartOptions, Rgba, SeriesStyle, StyleFile, YAxis};
use crate::error::ChartError;

/// Id of the drawing surface element.
pub const SURFACE_ID: &str = "sentimentChart";
/// Id of the label series element.
pub const LABELS_ID: &str = "labels-data";
/// Id of the single-layout score series element.
pub const SCORES_ID: &str = "scores-data";
pub const MANAGEMENT_SCORES_ID: &str = "management-scores-data";
pub const QNA_SCORES_ID: &str = "qna-scores-data";
/// Id of the element holding the full quarter records a page was built from.
pub const RECORDS_ID: &str = "records-data";

const TEAL: Rgba = Rgba::new(75, 192, 192, 1.0);
const PINK: Rgba = Rgba::new(255, 99, 132, 1.0);

/// Built-in layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartLayout {
    /// One filled management series, y from zero (or below) up to 1.
    Single,
    /// Management and Q&A lines, y suggested at `[0, 1]`, titled.
    Comparison,
}

/// Layout as requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LayoutChoice {
    /// Pick from the data elements the document carries.
    #[default]
    Auto,
    Single,
    Comparison,
}

impl LayoutChoice {
    /// The concrete layout for `doc`.
    ///
    /// `Auto` picks `Comparison` when the management element exists and `Single`
    /// when the plain scores element does; with neither, the scores element is missing.
    pub fn resolve<D: Document + ?Sized>(self, doc: &D) -> Result<ChartLayout, ChartError> {
        match self {
            LayoutChoice::Single => Ok(ChartLayout::Single),
            LayoutChoice::Comparison => Ok(ChartLayout::Comparison),
            LayoutChoice::Auto if doc.has_element(MANAGEMENT_SCORES_ID) => Ok(ChartLayout::Comparison),
            LayoutChoice::Auto if doc.has_element(SCORES_ID) => Ok(ChartLayout::Single),
            LayoutChoice::Auto => Err(ChartError::MissingElement {
                id: SCORES_ID.to_string(),
            }),
        }
    }
}

/// Binds one document element to one series style.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesBinding {
    pub element_id: String,
    pub style: SeriesStyle,
}

impl SeriesBinding {
    pub fn new(element_id: impl Into<String>, style: SeriesStyle) -> Self {
        Self {
            element_id: element_id.into(),
            style,
        }
    }
}

/// The full document contract for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBinding {
    pub surface_id: String,
    pub labels_id: String,
    pub series: Vec<SeriesBinding>,
    pub options: ChartOptions,
}

impl ChartBinding {
    /// Apply a style file on top of this binding.
    pub fn with_style_file(mut self, file: StyleFile) -> Result<Self, ChartError> {
        for (binding, style) in self.series.iter_mut().zip(file.series) {
            style.validate()?;
            binding.style = style;
        }
        if let Some(title) = file.title {
            self.options.title = Some(title);
        }
        if let Some(x_title) = file.x_title {
            self.options.x_title = Some(x_title);
        }
        if let Some(y_axis) = file.y_axis {
            self.options.y_axis = y_axis;
        }
        if let Some(legend) = file.legend {
            self.options.legend = legend;
        }
        Ok(self)
    }
}

impl ChartLayout {
    pub fn binding(self) -> ChartBinding {
        match self {
            ChartLayout::Single => ChartBinding {
                surface_id: SURFACE_ID.to_string(),
                labels_id: LABELS_ID.to_string(),
                series: vec![SeriesBinding::new(
                    SCORES_ID,
                    SeriesStyle::new("Management Sentiment Score", TEAL)
                        .with_background(TEAL.with_alpha(0.2))
                        .with_tension(0.2)
                        .with_fill(true),
                )],
                options: ChartOptions {
                    y_axis: YAxis::zero_based_unit(),
                    ..ChartOptions::default()
                },
            },
            ChartLayout::Comparison => ChartBinding {
                surface_id: SURFACE_ID.to_string(),
                labels_id: LABELS_ID.to_string(),
                series: vec![
                    SeriesBinding::new(
                        MANAGEMENT_SCORES_ID,
                        SeriesStyle::new("Management Sentiment", TEAL).with_tension(0.3),
                    ),
                    SeriesBinding::new(
                        QNA_SCORES_ID,
                        SeriesStyle::new("Q&A Sentiment", PINK).with_tension(0.3),
                    ),
                ],
                options: ChartOptions {
                    title: Some("Sentiment Scores Over Time".to_string()),
                    y_axis: YAxis::suggested_unit(),
                    ..ChartOptions::default()
                },
            },
        }
    }
}
