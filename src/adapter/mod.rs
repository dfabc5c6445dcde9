//! The chart renderer adapter.
//!
//! One linear pipeline, run once per call:
//! read embedded element text -> parse -> validate alignment -> build `ChartSpec`
//! -> hand it to a `RenderPort`.
//!
//! Any failure aborts before the port is called, so a broken data contract never
//! produces a partial chart.

use tracing::{debug, info, warn};

use crate::document::Document;
use crate::domain::{ChartBinding, ChartOptions, ChartSpec, Dataset, MismatchPolicy, SeriesStyle};
use crate::error::ChartError;
use crate::render::{RenderHandle, RenderPort};

pub mod parse;

pub use parse::{parse_labels, parse_scores};

/// Serialized text for one score series plus the style it should be drawn with.
#[derive(Debug, Clone, Copy)]
pub struct RawSeries<'a> {
    /// Where the text came from (element id), used in error messages.
    pub id: &'a str,
    pub style: &'a SeriesStyle,
    pub text: &'a str,
}

/// Build a chart spec from serialized label and score arrays.
///
/// Guarantees on success: every dataset has exactly one value per label, in label
/// order. Scores outside `[0, 1]` are kept as-is and counted in `out_of_range`.
pub fn build_chart_spec(
    labels_id: &str,
    labels_text: &str,
    series: &[RawSeries<'_>],
    options: &ChartOptions,
) -> Result<ChartSpec, ChartError> {
    let mut labels = parse_labels(labels_id, labels_text)?;

    let mut datasets = Vec::with_capacity(series.len());
    for raw in series {
        raw.style.validate()?;
        let data = parse_scores(raw.id, raw.text)?;
        datasets.push(Dataset {
            style: raw.style.clone(),
            data,
        });
    }

    match options.mismatch {
        MismatchPolicy::Reject => {
            if let Some(bad) = datasets.iter().find(|d| d.data.len() != labels.len()) {
                return Err(ChartError::ShapeMismatch {
                    series: bad.label().to_string(),
                    labels: labels.len(),
                    scores: bad.data.len(),
                });
            }
        }
        MismatchPolicy::Truncate => {
            let n = datasets
                .iter()
                .map(|d| d.data.len())
                .fold(labels.len(), usize::min);
            if labels.len() != n || datasets.iter().any(|d| d.data.len() != n) {
                warn!(
                    labels = labels.len(),
                    kept = n,
                    "label/score lengths differ; truncating to the shortest series"
                );
            }
            labels.truncate(n);
            for d in &mut datasets {
                d.data.truncate(n);
            }
        }
    }

    let out_of_range = datasets
        .iter()
        .flat_map(|d| d.data.iter())
        .filter(|v| !(0.0..=1.0).contains(*v))
        .count();
    if out_of_range > 0 {
        warn!(out_of_range, "scores outside [0, 1] will extend past or clip at the y axis");
    }

    debug!(labels = labels.len(), datasets = datasets.len(), "chart spec built");

    Ok(ChartSpec {
        labels,
        datasets,
        options: options.clone(),
        out_of_range,
    })
}

/// Reads a document according to a `ChartBinding` and renders it.
#[derive(Debug, Clone)]
pub struct ChartAdapter {
    binding: ChartBinding,
}

impl ChartAdapter {
    pub fn new(binding: ChartBinding) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &ChartBinding {
        &self.binding
    }

    /// Build the spec from the document without drawing anything.
    pub fn spec<D: Document + ?Sized>(&self, doc: &D) -> Result<ChartSpec, ChartError> {
        let b = &self.binding;
        let labels_text = lookup(doc, &b.labels_id)?;

        let mut raw = Vec::with_capacity(b.series.len());
        for s in &b.series {
            raw.push(RawSeries {
                id: &s.element_id,
                style: &s.style,
                text: lookup(doc, &s.element_id)?,
            });
        }

        build_chart_spec(&b.labels_id, labels_text, &raw, &b.options)
    }

    /// Build the spec, check the drawing surface exists, then draw exactly once.
    pub fn render<D, P>(&self, doc: &D, port: &mut P) -> Result<RenderHandle, ChartError>
    where
        D: Document + ?Sized,
        P: RenderPort + ?Sized,
    {
        let spec = self.spec(doc)?;

        let surface = &self.binding.surface_id;
        if !doc.has_element(surface) {
            return Err(ChartError::MissingElement { id: surface.clone() });
        }

        let handle = port.draw(&spec, surface)?;
        info!(
            surface = %handle.surface,
            datasets = handle.datasets,
            points = handle.points,
            "chart rendered"
        );
        Ok(handle)
    }
}

/// Render the sentiment chart described by `binding` from `doc` onto `port`.
pub fn render_sentiment_chart<D, P>(
    doc: &D,
    binding: &ChartBinding,
    port: &mut P,
) -> Result<RenderHandle, ChartError>
where
    D: Document + ?Sized,
    P: RenderPort + ?Sized,
{
    ChartAdapter::new(binding.clone()).render(doc, port)
}

fn lookup<'d, D: Document + ?Sized>(doc: &'d D, id: &str) -> Result<&'d str, ChartError> {
    doc.element_text(id)
        .ok_or_else(|| ChartError::MissingElement { id: id.to_string() })
}
