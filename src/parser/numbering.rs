//! Numbering resolver.
//!
//! Recovers list kind and nesting depth of a paragraph from the document's
//! numbering definitions. Lookup failures never surface as errors: they
//! resolve to [`ListKind::None`] at level 0.

use crate::source::{NumberingDefinitions, NumberingLevel, RawParagraph};

/// Indentation (EMU) that corresponds to one list nesting step.
pub const EMU_PER_LEVEL: i64 = 500_000;

/// Format token marking a bulleted level.
const BULLET_FORMAT: &str = "bullet";

/// Kind of list a paragraph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    /// Not a list item
    #[default]
    None,
    /// Bulleted list item
    Bullet,
    /// Numbered list item (any non-bullet format)
    Numbered,
}

impl ListKind {
    /// Whether the paragraph is a list item.
    pub fn is_list(self) -> bool {
        self != ListKind::None
    }
}

/// Resolve list kind and nesting level of a paragraph.
pub fn list_kind_and_level(
    paragraph: &RawParagraph,
    numbering: Option<&NumberingDefinitions>,
) -> (ListKind, usize) {
    let Some(reference) = paragraph.numbering.as_ref() else {
        return (ListKind::None, 0);
    };
    match numbering.and_then(|defs| defs.level(reference)) {
        Some(level) => (kind_of(level), depth_of(level, &reference.level)),
        None => (ListKind::None, 0),
    }
}

/// Markdown list prefix for a paragraph (empty for non-list paragraphs).
pub fn list_prefix(kind: ListKind, level: usize) -> String {
    let marker = match kind {
        ListKind::None => return String::new(),
        ListKind::Bullet => "- ",
        ListKind::Numbered => "1. ",
    };
    format!("{}{}", "    ".repeat(level.saturating_sub(1)), marker)
}

/// Paragraph text with its list prefix applied.
pub fn prefixed_text(paragraph: &RawParagraph, numbering: Option<&NumberingDefinitions>) -> String {
    let (kind, level) = list_kind_and_level(paragraph, numbering);
    let mut text = list_prefix(kind, level);
    text.push_str(&paragraph.text());
    text
}

fn kind_of(level: &NumberingLevel) -> ListKind {
    match level.format.as_deref() {
        Some(BULLET_FORMAT) => ListKind::Bullet,
        Some(_) => ListKind::Numbered,
        None => ListKind::None,
    }
}

fn depth_of(level: &NumberingLevel, index: &str) -> usize {
    match level.indent {
        Some(indent) => indent
            .left
            .and_then(|left| usize::try_from(left.div_euclid(EMU_PER_LEVEL) + 1).ok())
            .unwrap_or(0),
        // Without explicit indentation the level index decides.
        None => index.trim().parse::<usize>().map_or(0, |i| i + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> NumberingDefinitions {
        NumberingDefinitions::new()
            .with_instance("1", "10")
            .with_instance("2", "20")
            .with_instance("3", "30")
            .with_level("10", "0", NumberingLevel::new("bullet").with_indent_left(457_200))
            .with_level("10", "1", NumberingLevel::new("bullet").with_indent_left(914_400))
            .with_level("20", "0", NumberingLevel::new("decimal"))
            .with_level("20", "2", NumberingLevel::new("lowerLetter"))
            .with_level("30", "0", NumberingLevel::default())
    }

    #[test]
    fn test_no_numbering_reference() {
        let defs = definitions();
        let p = RawParagraph::new("plain");
        assert_eq!(list_kind_and_level(&p, Some(&defs)), (ListKind::None, 0));
        assert_eq!(prefixed_text(&p, Some(&defs)), "plain");
    }

    #[test]
    fn test_missing_numbering_part() {
        let p = RawParagraph::new("item").with_numbering("1", "0");
        assert_eq!(list_kind_and_level(&p, None), (ListKind::None, 0));
    }

    #[test]
    fn test_unknown_definition() {
        let defs = definitions();
        let p = RawParagraph::new("item").with_numbering("99", "0");
        assert_eq!(list_kind_and_level(&p, Some(&defs)), (ListKind::None, 0));
        let p = RawParagraph::new("item").with_numbering("1", "5");
        assert_eq!(list_kind_and_level(&p, Some(&defs)), (ListKind::None, 0));
    }

    #[test]
    fn test_level_from_indentation() {
        let defs = definitions();
        let top = RawParagraph::new("a").with_numbering("1", "0");
        let nested = RawParagraph::new("b").with_numbering("1", "1");
        assert_eq!(list_kind_and_level(&top, Some(&defs)), (ListKind::Bullet, 1));
        assert_eq!(list_kind_and_level(&nested, Some(&defs)), (ListKind::Bullet, 2));
        assert_eq!(prefixed_text(&top, Some(&defs)), "- a");
        assert_eq!(prefixed_text(&nested, Some(&defs)), "    - b");
    }

    #[test]
    fn test_level_from_index() {
        let defs = definitions();
        let first = RawParagraph::new("one").with_numbering("2", "0");
        let third = RawParagraph::new("three").with_numbering("2", "2");
        assert_eq!(list_kind_and_level(&first, Some(&defs)), (ListKind::Numbered, 1));
        assert_eq!(list_kind_and_level(&third, Some(&defs)), (ListKind::Numbered, 3));
        assert_eq!(prefixed_text(&third, Some(&defs)), "        1. three");
    }

    #[test]
    fn test_level_without_format() {
        let defs = definitions();
        let p = RawParagraph::new("x").with_numbering("3", "0");
        assert_eq!(list_kind_and_level(&p, Some(&defs)).0, ListKind::None);
        assert_eq!(prefixed_text(&p, Some(&defs)), "x");
    }

    #[test]
    fn test_prefix_level_zero_has_no_indent() {
        assert_eq!(list_prefix(ListKind::Bullet, 0), "- ");
        assert_eq!(list_prefix(ListKind::Numbered, 1), "1. ");
        assert_eq!(list_prefix(ListKind::None, 3), "");
    }
}
