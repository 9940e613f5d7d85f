//! Paragraph type.

use super::{Equation, Graphic};
use pulldown_cmark::{html, Parser};
use serde::{Deserialize, Serialize};

/// A paragraph of text content.
///
/// `text` is Markdown source: list items already carry their `- ` / `1. `
/// prefixes, and a run of consecutive list items is stored as one paragraph
/// whose lines are joined with `\n`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Markdown source text
    pub text: String,

    /// Rendered HTML for `text`, if any text is present
    pub html_text: Option<String>,

    /// Inline graphics in document order
    pub graphics: Vec<Graphic>,

    /// Inline equations in document order
    pub equations: Vec<Equation>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with Markdown text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.set_text(text);
        p
    }

    /// Replace the text, keeping the rendered markup in sync.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.html_text = if self.text.is_empty() {
            None
        } else {
            Some(markdown_to_html(&self.text))
        };
    }

    /// Add an inline graphic.
    pub fn add_graphic(&mut self, graphic: Graphic) {
        self.graphics.push(graphic);
    }

    /// Add an inline equation.
    pub fn add_equation(&mut self, equation: Equation) {
        self.equations.push(equation);
    }

    /// Rendered HTML markup of the paragraph text.
    pub fn markup(&self) -> String {
        match self.html_text {
            Some(ref html) => html.clone(),
            None => markdown_to_html(&self.text),
        }
    }

    /// Check if the paragraph carries no text, graphics or equations.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.graphics.is_empty() && self.equations.is_empty()
    }
}

/// Render Markdown source to an HTML fragment.
pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::with_capacity(text.len() + 16);
    html::push_html(&mut out, parser);
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_text_renders_markup() {
        let p = Paragraph::with_text("Hello *world*");
        assert_eq!(p.text, "Hello *world*");
        assert_eq!(p.html_text.as_deref(), Some("<p>Hello <em>world</em></p>"));
    }

    #[test]
    fn test_list_markup() {
        let p = Paragraph::with_text("- one\n- two");
        let html = p.markup();
        assert!(html.starts_with("<ul>"));
        assert!(html.contains("<li>two</li>"));
    }

    #[test]
    fn test_set_text_resyncs_markup() {
        let mut p = Paragraph::with_text("ID: free text");
        p.set_text("ID");
        assert_eq!(p.html_text.as_deref(), Some("<p>ID</p>"));

        p.set_text("");
        assert!(p.html_text.is_none());
    }

    #[test]
    fn test_is_empty() {
        assert!(Paragraph::new().is_empty());
        assert!(Paragraph::with_text("   ").is_empty());

        let mut p = Paragraph::new();
        p.add_graphic(Graphic::new("a.png", "a.png", vec![]));
        assert!(!p.is_empty());
    }
}
