//! Export chart data to CSV.
//!
//! One row per label, one column per series, in dataset order:
//!
//! ```text
//! label,Management Sentiment,Q&A Sentiment
//! 2024 Q4,0.8,0.5
//! ```

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::ChartSpec;
use crate::error::AppError;

/// Write `spec` as CSV to a file.
pub fn write_series_csv(path: &Path, spec: &ChartSpec) -> Result<(), AppError> {
    let writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_rows(writer, spec)?;
    info!(path = %path.display(), rows = spec.labels.len(), "wrote csv");
    Ok(())
}

/// Render `spec` as CSV text.
pub fn series_csv(spec: &ChartSpec) -> Result<String, AppError> {
    let mut buf = Vec::new();
    write_rows(csv::Writer::from_writer(&mut buf), spec)?;
    String::from_utf8(buf).map_err(|e| AppError::new(2, format!("Export CSV is not UTF-8: {e}")))
}

fn write_rows<W: Write>(mut writer: csv::Writer<W>, spec: &ChartSpec) -> Result<(), AppError> {
    let mut header = vec!["label".to_string()];
    header.extend(spec.datasets.iter().map(|d| d.label().to_string()));
    writer
        .write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (i, label) in spec.labels.iter().enumerate() {
        let mut row = vec![label.clone()];
        row.extend(spec.datasets.iter().map(|d| d.data[i].to_string()));
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChartLayout, Dataset};

    fn spec() -> ChartSpec {
        let binding = ChartLayout::Comparison.binding();
        ChartSpec {
            labels: vec!["2024 Q4".into(), "2025 Q1".into()],
            datasets: vec![
                Dataset { style: binding.series[0].style.clone(), data: vec![0.8, 0.85] },
                Dataset { style: binding.series[1].style.clone(), data: vec![0.5, 0.3] },
            ],
            options: binding.options,
            out_of_range: 0,
        }
    }

    #[test]
    fn csv_has_one_column_per_series() {
        let text = series_csv(&spec()).unwrap();
        let expected = concat!(
            "label,Management Sentiment,Q&A Sentiment\n",
            "2024 Q4,0.8,0.5\n",
            "2025 Q1,0.85,0.3\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn csv_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        write_series_csv(&path, &spec()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 3);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "2025 Q1");
    }
}
