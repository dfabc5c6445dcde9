//! Minimal HTML element scanner.
//!
//! This is intentionally not a full HTML parser. It finds start tags that carry
//! an `id` attribute and captures their text, which is all the adapter needs:
//!
//! - `<script>` / `<style>` content is raw text (no entity decoding), so JSON
//!   embedded in `<script type="application/json">` comes back verbatim
//! - other elements capture text up to the first matching end tag, with the
//!   common character entities decoded
//! - void and self-closing elements have empty text
//! - the first element with a given id wins, like `getElementById`

use std::collections::HashMap;

use crate::document::Document;

const RAW_TEXT_TAGS: [&str; 2] = ["script", "style"];
const VOID_TAGS: [&str; 8] = ["area", "br", "embed", "hr", "img", "input", "meta", "link"];

/// An element found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub text: String,
}

/// A parsed page, indexed by element id.
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    elements: HashMap<String, Element>,
}

impl HtmlDocument {
    pub fn parse(html: &str) -> Self {
        let lower = html.to_ascii_lowercase();
        let bytes = html.as_bytes();
        let mut elements: HashMap<String, Element> = HashMap::new();
        let mut pos = 0usize;

        while let Some(offset) = html[pos..].find('<') {
            let start = pos + offset;

            if lower[start..].starts_with("<!--") {
                pos = match lower[start + 4..].find("-->") {
                    Some(end) => start + 4 + end + 3,
                    None => break,
                };
                continue;
            }

            let next = bytes.get(start + 1).copied().unwrap_or(b' ');
            if !next.is_ascii_alphabetic() {
                // End tags, doctype, processing instructions, stray '<'.
                pos = match html[start + 1..].find('>') {
                    Some(end) if matches!(next, b'/' | b'!' | b'?') => start + 1 + end + 1,
                    _ => start + 1,
                };
                continue;
            }

            let Some(tag) = scan_start_tag(html, start) else {
                break;
            };
            pos = tag.end;

            if RAW_TEXT_TAGS.contains(&tag.name.as_str()) {
                let close = format!("</{}", tag.name);
                let text_end = lower[tag.end..].find(&close).map(|i| tag.end + i).unwrap_or(html.len());
                if let Some(id) = tag.id {
                    elements.entry(id).or_insert_with(|| Element {
                        tag: tag.name.clone(),
                        text: html[tag.end..text_end].to_string(),
                    });
                }
                pos = match html[text_end..].find('>') {
                    Some(i) => text_end + i + 1,
                    None => html.len(),
                };
                continue;
            }

            if let Some(id) = tag.id {
                let text = if tag.self_closing || VOID_TAGS.contains(&tag.name.as_str()) {
                    String::new()
                } else {
                    let close = format!("</{}", tag.name);
                    let text_end = lower[tag.end..].find(&close).map(|i| tag.end + i).unwrap_or(html.len());
                    decode_entities(&strip_tags(&html[tag.end..text_end]))
                };
                elements.entry(id).or_insert(Element { tag: tag.name, text });
            }
        }

        Self { elements }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Document for HtmlDocument {
    fn element_text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text.as_str())
    }
}

struct StartTag {
    name: String,
    id: Option<String>,
    self_closing: bool,
    /// Byte offset just past the closing `>`.
    end: usize,
}

fn scan_start_tag(html: &str, start: usize) -> Option<StartTag> {
    let bytes = html.as_bytes();
    let mut i = start + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let name = html[start + 1..i].to_ascii_lowercase();
    let mut id = None;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag { name, id, self_closing: false, end: i + 1 });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag { name, id, self_closing: true, end: i + 2 });
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let attr_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/') {
            i += 1;
        }
        let attr = html[attr_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i)? {
                q @ (b'"' | b'\'') => {
                    let quote = *q as char;
                    let close = html[i + 1..].find(quote)?;
                    value = html[i + 1..i + 1 + close].to_string();
                    i = i + 1 + close + 1;
                }
                _ => {
                    let v_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    value = html[v_start..i].to_string();
                }
            }
        }

        if attr == "id" && id.is_none() {
            id = Some(decode_entities(&value));
        }
    }
}

/// Drop nested markup, keeping only text.
fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <!-- <script id="labels-data">["commented out"]</script> -->
  <title>NVDA</title>
</head>
<body>
  <h1 id="headline">Tone &amp; Sentiment</h1>
  <canvas id="sentimentChart"></canvas>
  <script id="labels-data" type="application/json">["2025 Q1", "a &amp; b", "<\/script>"]</script>
  <SCRIPT type='application/json' ID=scores-data>[0.85, 0.5, 0.7]</SCRIPT>
  <div id="empty"/>
  <script id="labels-data">["duplicate"]</script>
</body>
</html>"#;

    #[test]
    fn finds_script_data_verbatim() {
        let doc = HtmlDocument::parse(PAGE);
        assert_eq!(
            doc.element_text("labels-data"),
            Some(r#"["2025 Q1", "a &amp; b", "<\/script>"]"#)
        );
        assert_eq!(doc.element_text("scores-data"), Some("[0.85, 0.5, 0.7]"));
        assert_eq!(doc.element("scores-data").unwrap().tag, "script");
    }

    #[test]
    fn finds_surface_and_decodes_text() {
        let doc = HtmlDocument::parse(PAGE);
        assert!(doc.has_element("sentimentChart"));
        assert_eq!(doc.element("sentimentChart").unwrap().tag, "canvas");
        assert_eq!(doc.element_text("headline"), Some("Tone & Sentiment"));
        assert_eq!(doc.element_text("empty"), Some(""));
        assert!(!doc.has_element("qna-scores-data"));
    }

    #[test]
    fn unterminated_markup_does_not_panic() {
        let doc = HtmlDocument::parse("<div id=\"a\">text <script id='s'>[1, 2");
        assert_eq!(doc.element_text("s"), Some("[1, 2"));
        assert_eq!(doc.element_text("a"), Some("text [1, 2"));

        let doc = HtmlDocument::parse("<p id=\"x");
        assert!(doc.is_empty());
    }

    #[test]
    fn numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;&unknown;&"), "AB&unknown;&");
    }
}
