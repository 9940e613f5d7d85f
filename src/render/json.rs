//! JSON rendering of the document model.

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON. Graphic payloads are left out.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Graphic, Paragraph, Section};

    fn sample() -> Document {
        let mut doc = Document::new("Test Case TC-1", "TC-1", "desc");
        let mut p = Paragraph::with_text("Hello");
        p.add_graphic(Graphic::new("a.png", "a.png", vec![7; 32]));
        doc.add_section(Section::new("Qualification Strategy").with_paragraphs(vec![p]));
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"title\": \"Test Case TC-1\""));
        assert!(json.contains("Qualification Strategy"));
        assert!(json.contains('\n'));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));

        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back.short_title, "TC-1");
        assert!(back.attachments()[0].data.is_empty());
    }
}
