//! Host documents: where the adapter finds its embedded data and drawing surface.
//!
//! The adapter never touches a page directly; it asks a `Document` for element
//! text by id. That keeps the adapter testable with an in-memory document and
//! lets the CLI feed it real HTML pages.

use std::collections::HashMap;

pub mod html;

pub use html::HtmlDocument;

/// Read-only view of a document's elements.
pub trait Document {
    /// Text content of the element with this id, if it exists.
    fn element_text(&self, id: &str) -> Option<&str>;

    /// Whether an element with this id exists (e.g., the drawing surface).
    fn has_element(&self, id: &str) -> bool {
        self.element_text(id).is_some()
    }
}

/// In-memory document built by the host application.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedDocument {
    elements: HashMap<String, String>,
}

impl EmbeddedDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a data element with its serialized text.
    pub fn with_element(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.elements.insert(id.into(), text.into());
        self
    }

    /// Add an empty element to draw on.
    pub fn with_surface(self, id: impl Into<String>) -> Self {
        self.with_element(id, "")
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.elements.insert(id.into(), text.into());
    }
}

impl Document for EmbeddedDocument {
    fn element_text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_document_lookup() {
        let doc = EmbeddedDocument::new()
            .with_element("labels-data", r#"["Q1"]"#)
            .with_surface("sentimentChart");
        assert_eq!(doc.element_text("labels-data"), Some(r#"["Q1"]"#));
        assert!(doc.has_element("sentimentChart"));
        assert!(!doc.has_element("scores-data"));
    }
}
