//! Style file loading.

use std::fs::File;
use std::path::Path;

use crate::domain::StyleFile;
use crate::error::AppError;

/// Read a JSON style file.
pub fn load_style_file(path: &Path) -> Result<StyleFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open style file '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(3, format!("Invalid style file: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_colour_is_a_style_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.json");
        std::fs::write(&path, r#"{ "series": [{ "label": "m", "border_color": "blue" }] }"#).unwrap();
        assert_eq!(load_style_file(&path).unwrap_err().exit_code(), 3);

        std::fs::write(&path, r#"{ "title": "Tone", "legend": false }"#).unwrap();
        let style = load_style_file(&path).unwrap();
        assert_eq!(style.title.as_deref(), Some("Tone"));
        assert_eq!(style.legend, Some(false));
    }
}
