//! Quarter-over-quarter tone report.
//!
//! `format_tone_report` works on a finished `ChartSpec`, so anything the adapter can
//! read can be reported on. `format_records_report` works on the upstream records and
//! also prints sentiment labels and strategic themes.

use std::fmt;

use crate::domain::{ChartSpec, QuarterRecord, SectionSentiment};
use crate::error::AppError;

/// Direction of a score change between consecutive points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneChange {
    Stable,
    SlightlyMorePositive,
    MorePositive,
    SlightlyMoreNegative,
    MoreNegative,
}

/// Changes smaller than this are "slight".
pub const SLIGHT_CHANGE: f64 = 0.1;

impl ToneChange {
    pub fn classify(delta: f64) -> Self {
        if delta == 0.0 {
            ToneChange::Stable
        } else if delta > 0.0 {
            if delta < SLIGHT_CHANGE {
                ToneChange::SlightlyMorePositive
            } else {
                ToneChange::MorePositive
            }
        } else if delta > -SLIGHT_CHANGE {
            ToneChange::SlightlyMoreNegative
        } else {
            ToneChange::MoreNegative
        }
    }
}

impl fmt::Display for ToneChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ToneChange::Stable => "Stable",
            ToneChange::SlightlyMorePositive => "Slightly more positive",
            ToneChange::MorePositive => "More positive",
            ToneChange::SlightlyMoreNegative => "Slightly more negative",
            ToneChange::MoreNegative => "More negative",
        };
        f.write_str(s)
    }
}

/// Change of one series between point `index - 1` and point `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesChange {
    pub series: String,
    pub delta: f64,
    pub change: ToneChange,
}

/// All series changes for one label against the label before it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterChange {
    pub label: String,
    pub previous: String,
    pub changes: Vec<SeriesChange>,
}

/// Compute changes for every consecutive pair of labels.
pub fn tone_changes(spec: &ChartSpec) -> Vec<QuarterChange> {
    (1..spec.labels.len())
        .map(|i| QuarterChange {
            label: spec.labels[i].clone(),
            previous: spec.labels[i - 1].clone(),
            changes: spec
                .datasets
                .iter()
                .map(|d| {
                    let delta = d.data[i] - d.data[i - 1];
                    SeriesChange {
                        series: short_name(d.label()).to_string(),
                        delta,
                        change: ToneChange::classify(delta),
                    }
                })
                .collect(),
        })
        .collect()
}

/// "Management Sentiment Score" -> "Management", "Q&A Sentiment" -> "Q&A".
fn short_name(label: &str) -> &str {
    let s = label.strip_suffix(" Score").unwrap_or(label);
    s.strip_suffix(" Sentiment").unwrap_or(s)
}

/// Format the per-quarter scores followed by tone changes against the previous quarter.
pub fn format_tone_report(spec: &ChartSpec) -> String {
    let mut out = String::new();
    out.push_str("Quarterly Analysis:\n");

    let changes = tone_changes(spec);
    for (i, label) in spec.labels.iter().enumerate() {
        out.push_str(&format!("\n{label}:\n"));
        for d in &spec.datasets {
            out.push_str(&format!("  {}: {:.2}\n", d.label(), d.data[i]));
        }

        if i == 0 {
            continue;
        }
        let q = &changes[i - 1];
        out.push_str(&format!("  Tone Change (vs {}):\n", q.previous));
        for c in &q.changes {
            out.push_str(&format!("    {}: {} ({:.2})\n", c.series, c.change, c.delta));
        }
    }

    if spec.out_of_range > 0 {
        out.push_str(&format!(
            "\nNote: {} value(s) outside [0, 1].\n",
            spec.out_of_range
        ));
    }

    out
}

/// Format records with their labels, scores, themes and tone changes.
///
/// Every record needs a management score. Q&A changes are printed only when both
/// quarters carry a Q&A score.
pub fn format_records_report(records: &[QuarterRecord]) -> Result<String, AppError> {
    let mut out = String::new();
    out.push_str("Quarterly Analysis:\n");

    let mut prev: Option<&QuarterRecord> = None;
    for r in records {
        let period = r.period();
        let (label, score) = r
            .management()
            .ok_or_else(|| AppError::new(3, format!("Record {period} has no management score.")))?;

        out.push_str(&format!("\n{period}:\n"));
        out.push_str(&format!("  Management Sentiment: {label} (Score: {score:.2})\n"));
        match &r.qna_sentiment {
            Some(SectionSentiment::Scored { label, score }) => {
                out.push_str(&format!("  Q&A Sentiment: {label} (Score: {score:.2})\n"));
            }
            Some(SectionSentiment::Label(label)) => out.push_str(&format!("  Q&A Sentiment: {label}\n")),
            None => {}
        }
        if !r.themes.is_empty() {
            out.push_str(&format!("  Strategic Themes: {}\n", r.themes.join(", ")));
        }

        if let Some(p) = prev {
            out.push_str(&format!("  Tone Change (vs {}):\n", p.period()));
            // `p` already passed the management check above.
            if let Some((_, before)) = p.management() {
                push_change(&mut out, "Management", score - before);
            }
            if let (Some((_, now)), Some((_, before))) = (r.qna(), p.qna()) {
                push_change(&mut out, "Q&A", now - before);
            }
        }
        prev = Some(r);
    }

    Ok(out)
}

fn push_change(out: &mut String, series: &str, delta: f64) {
    out.push_str(&format!("    {series}: {} ({delta:.2})\n", ToneChange::classify(delta)));
}
