//! Produce chart pages from quarterly sentiment records.
//!
//! A page carries everything the adapter needs: one `<script type="application/json">`
//! element per series (plus the labels), a `<canvas>` drawing surface, and a Chart.js
//! init script. The full records (labels, themes) ride along in `records-data` for
//! the report. The init script is generated by running the adapter over the same
//! data, so a page that renders in the browser also round-trips through `sentchart render`.

use std::fs::{self, File};
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::adapter::ChartAdapter;
use crate::document::{Document, EmbeddedDocument, HtmlDocument};
use crate::domain::{ChartBinding, ChartLayout, QuarterRecord, RECORDS_ID};
use crate::error::AppError;
use crate::render::chartjs::{ChartJsOutput, HtmlPage, escape_html, script_safe};
use crate::render::ChartJsRenderer;

/// Series extracted from records, index-aligned with `labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageData {
    pub labels: Vec<String>,
    pub management: Vec<f64>,
    /// Present only when every record carries a scored Q&A section.
    pub qna: Option<Vec<f64>>,
}

impl PageData {
    /// Comparison when Q&A scores exist, single otherwise.
    pub fn layout(&self) -> ChartLayout {
        if self.qna.is_some() {
            ChartLayout::Comparison
        } else {
            ChartLayout::Single
        }
    }

    /// `(element id, serialized array)` pairs in the binding's order, labels first.
    fn elements(&self, binding: &ChartBinding) -> Result<Vec<(String, String)>, AppError> {
        let mut out = vec![(binding.labels_id.clone(), to_json(&self.labels)?)];
        let mut series = vec![&self.management];
        if let Some(qna) = &self.qna {
            series.push(qna);
        }
        for (b, data) in binding.series.iter().zip(series) {
            out.push((b.element_id.clone(), to_json(data)?));
        }
        Ok(out)
    }
}

/// Turn records into labels and score series, keeping record order.
pub fn page_data(records: &[QuarterRecord]) -> Result<PageData, AppError> {
    let mut labels = Vec::with_capacity(records.len());
    let mut management = Vec::with_capacity(records.len());

    for r in records {
        let label = r.period();
        let (_, score) = r
            .management()
            .ok_or_else(|| AppError::new(3, format!("Record {label} has no management score.")))?;
        labels.push(label);
        management.push(score);
    }

    let with_qna = records.iter().filter(|r| r.qna_sentiment.is_some()).count();
    let qna = if with_qna == 0 {
        None
    } else {
        let mut scores = Vec::with_capacity(records.len());
        for (r, label) in records.iter().zip(&labels) {
            let (_, score) = r.qna().ok_or_else(|| {
                AppError::new(3, format!("Record {label} has no Q&A score (other records do)."))
            })?;
            scores.push(score);
        }
        Some(scores)
    };

    Ok(PageData {
        labels,
        management,
        qna,
    })
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::new(3, format!("Failed to serialize page data: {e}")))
}

/// Build a complete HTML page for `records`.
///
/// `title` overrides the layout's chart title. `generated` is stamped into
/// `<meta name="generated">` when given.
pub fn build_page(records: &[QuarterRecord], title: Option<&str>, generated: Option<&str>) -> Result<String, AppError> {
    let data = page_data(records)?;
    let mut binding = data.layout().binding();
    if let Some(t) = title {
        binding.options.title = Some(t.to_string());
    }

    let mut elements = data.elements(&binding)?;
    let mut doc = EmbeddedDocument::new().with_surface(binding.surface_id.clone());
    for (id, json) in &elements {
        doc.insert(id.clone(), json.clone());
    }

    let adapter = ChartAdapter::new(binding);
    let mut engine = ChartJsRenderer::new(Vec::new(), ChartJsOutput::Json);
    adapter.render(&doc, &mut engine)?;
    let config = String::from_utf8(engine.into_inner())
        .map_err(|e| AppError::new(4, format!("Chart.js config is not UTF-8: {e}")))?;

    elements.push((RECORDS_ID.to_string(), to_json(records)?));
    let mut head = String::new();
    for (id, json) in &elements {
        head.push_str(&format!(
            "  <script type=\"application/json\" id=\"{}\">{}</script>\n",
            escape_html(id),
            script_safe(json)
        ));
    }

    let binding = adapter.binding();
    let page_title = binding.options.title.as_deref().unwrap_or("Sentiment");
    debug!(records = records.len(), layout = ?data.layout(), "built page");

    Ok(HtmlPage {
        title: page_title,
        surface: &binding.surface_id,
        config: config.trim_end(),
        head_elements: &head,
        generated,
    }
    .render())
}

/// Current time as stamped into generated pages.
pub fn generated_stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Write a page, creating parent directories as needed.
pub fn write_page(path: &Path, html: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display()))
            })?;
        }
    }
    fs::write(path, html).map_err(|e| AppError::new(2, format!("Failed to write page '{}': {e}", path.display())))?;
    info!(path = %path.display(), "wrote page");
    Ok(())
}

/// Read a JSON array of quarter records.
pub fn load_records(path: &Path) -> Result<Vec<QuarterRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open records JSON '{}': {e}", path.display())))?;
    let records: Vec<QuarterRecord> =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid records JSON: {e}")))?;
    Ok(records)
}

/// Records embedded in a generated page, if it carries them.
pub fn embedded_records<D: Document + ?Sized>(doc: &D) -> Result<Option<Vec<QuarterRecord>>, AppError> {
    let Some(text) = doc.element_text(RECORDS_ID) else {
        return Ok(None);
    };
    let records = serde_json::from_str(text)
        .map_err(|e| AppError::new(3, format!("Invalid records in '{RECORDS_ID}': {e}")))?;
    Ok(Some(records))
}

/// Read and scan an HTML page.
pub fn load_page(path: &Path) -> Result<HtmlDocument, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read page '{}': {e}", path.display())))?;
    Ok(HtmlDocument::parse(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LABELS_ID, QNA_SCORES_ID, SCORES_ID, SURFACE_ID};
    use crate::render::RecordingRenderer;

    fn records(json: &str) -> Vec<QuarterRecord> {
        serde_json::from_str(json).unwrap()
    }

    fn comparison_records() -> Vec<QuarterRecord> {
        records(
            r#"[
                {"year": "2024", "quarter": "Q4",
                 "management_sentiment": {"label": "POSITIVE", "score": 0.8},
                 "qna_sentiment": {"label": "NEUTRAL", "score": 0.5}},
                {"year": "2025", "quarter": "Q1",
                 "management_sentiment": {"label": "POSITIVE", "score": 0.85},
                 "qna_sentiment": {"label": "NEGATIVE", "score": 0.3}}
            ]"#,
        )
    }

    #[test]
    fn flat_records_give_single_layout() {
        let data = page_data(&records(
            r#"[{"year": 2024, "quarter": "Q3", "management_sentiment": "Positive", "score": 0.7},
                {"year": 2024, "quarter": "Q4", "management_sentiment": "Neutral", "score": 0.5}]"#,
        ))
        .unwrap();
        assert_eq!(data.labels, ["2024 Q3", "2024 Q4"]);
        assert_eq!(data.management, [0.7, 0.5]);
        assert_eq!(data.qna, None);
        assert_eq!(data.layout(), ChartLayout::Single);
    }

    #[test]
    fn missing_scores_are_reported() {
        let err = page_data(&records(
            r#"[{"year": "2025", "quarter": "Q1", "management_sentiment": "Positive"}]"#,
        ))
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("2025 Q1"));

        let mut recs = comparison_records();
        recs[1].qna_sentiment = None;
        let err = page_data(&recs).unwrap_err();
        assert!(err.to_string().contains("Q&A"));
    }

    #[test]
    fn generated_page_round_trips_through_the_adapter() {
        let html = build_page(&comparison_records(), None, Some("2025-06-01T00:00:00Z")).unwrap();
        assert!(html.contains("<meta name=\"generated\" content=\"2025-06-01T00:00:00Z\">"));
        assert!(html.contains("<title>Sentiment Scores Over Time</title>"));

        let doc = HtmlDocument::parse(&html);
        assert!(doc.has_element(SURFACE_ID));
        assert_eq!(doc.element_text(LABELS_ID), Some(r#"["2024 Q4","2025 Q1"]"#));
        assert_eq!(doc.element_text(QNA_SCORES_ID), Some("[0.5,0.3]"));

        let mut port = RecordingRenderer::new();
        ChartAdapter::new(ChartLayout::Comparison.binding()).render(&doc, &mut port).unwrap();
        let spec = port.last().unwrap();
        assert_eq!(spec.labels, ["2024 Q4", "2025 Q1"]);
        assert_eq!(spec.datasets[0].data, [0.8, 0.85]);
        assert_eq!(spec.datasets[1].data, [0.5, 0.3]);
    }

    #[test]
    fn pages_carry_labels_and_themes() {
        let mut recs = comparison_records();
        recs[1].themes = vec!["AI demand".into(), "</script> supply".into()];
        let html = build_page(&recs, None, None).unwrap();
        assert!(html.contains(r#""themes":["AI demand","<\/script> supply"]"#));

        let doc = HtmlDocument::parse(&html);
        let back = embedded_records(&doc).unwrap().unwrap();
        assert_eq!(back, recs);
        assert_eq!(back[0].management(), Some(("POSITIVE", 0.8)));
        assert_eq!(back[1].qna(), Some(("NEGATIVE", 0.3)));

        let bare = EmbeddedDocument::new().with_element(RECORDS_ID, "{");
        assert_eq!(embedded_records(&bare).unwrap_err().exit_code(), 3);
        assert!(embedded_records(&EmbeddedDocument::new()).unwrap().is_none());
    }

    #[test]
    fn title_override_and_script_escaping() {
        let recs = records(
            r#"[{"year": "2025", "quarter": "</script>", "management_sentiment": {"label": "P", "score": 0.6}}]"#,
        );
        let html = build_page(&recs, Some("NVDA tone"), None).unwrap();
        assert!(html.contains("<title>NVDA tone</title>"));
        assert!(!html.contains("generated"));

        let doc = HtmlDocument::parse(&html);
        assert_eq!(doc.element_text(SCORES_ID), Some("[0.6]"));
        let labels = doc.element_text(LABELS_ID).unwrap();
        assert_eq!(labels, r#"["2025 <\/script>"]"#);
        let parsed: Vec<String> = serde_json::from_str(labels).unwrap();
        assert_eq!(parsed, ["2025 </script>"]);
    }

    #[test]
    fn pages_are_written_and_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site").join("nvda.html");
        let html = build_page(&comparison_records(), None, None).unwrap();
        write_page(&path, &html).unwrap();

        let doc = load_page(&path).unwrap();
        assert!(doc.has_element(SURFACE_ID));

        let records_path = dir.path().join("records.json");
        fs::write(&records_path, "[]").unwrap();
        assert!(load_records(&records_path).unwrap().is_empty());
        assert_eq!(load_records(&dir.path().join("nope.json")).unwrap_err().exit_code(), 2);
    }
}
