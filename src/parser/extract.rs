//! Attachment extraction and content extraction.
//!
//! Turns raw source paragraphs, cells and tables into model content:
//! list paragraphs are prefixed and collapsed, merged cells are collapsed
//! into one cell with a colspan, graphics and equations are attached to the
//! paragraphs they appear in.

use super::numbering::{self, ListKind};
use super::ParseOptions;
use crate::model::{Equation, Graphic, Paragraph, Table, TableCell, TableRow};
use crate::source::{DocumentSource, EquationTranscoder, RawCell, RawParagraph, RawTable};

/// How heading cells are recognised while extracting a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingRule {
    /// A cell is a heading cell when it has a background colour.
    Shading,
    /// No cell is a heading cell.
    Never,
}

/// Extracts model content from one [`DocumentSource`].
pub struct Extractor<'a> {
    source: &'a dyn DocumentSource,
    options: &'a ParseOptions,
    transcoder: &'a dyn EquationTranscoder,
}

impl<'a> Extractor<'a> {
    /// Create a new extractor.
    pub fn new(
        source: &'a dyn DocumentSource,
        options: &'a ParseOptions,
        transcoder: &'a dyn EquationTranscoder,
    ) -> Self {
        Self {
            source,
            options,
            transcoder,
        }
    }

    /// The underlying source.
    pub fn source(&self) -> &'a dyn DocumentSource {
        self.source
    }

    /// List kind of a paragraph.
    pub fn list_kind(&self, paragraph: &RawParagraph) -> ListKind {
        numbering::list_kind_and_level(paragraph, self.source.numbering()).0
    }

    /// Paragraph text with its list prefix applied.
    pub fn paragraph_text(&self, paragraph: &RawParagraph) -> String {
        numbering::prefixed_text(paragraph, self.source.numbering())
    }

    /// Embedded graphics of a paragraph, in document order.
    ///
    /// References whose media part is missing are skipped with a warning.
    pub fn graphics(&self, paragraph: &RawParagraph) -> Vec<Graphic> {
        if !self.options.extract_graphics {
            return Vec::new();
        }
        paragraph
            .media
            .iter()
            .filter_map(|id| match self.source.media(id) {
                Some(part) => Some(Graphic::new(
                    self.graphic_name(&part.name),
                    part.name.clone(),
                    part.data.clone(),
                )),
                None => {
                    log::warn!("Media part '{}' not found, skipping graphic", id);
                    None
                }
            })
            .collect()
    }

    fn graphic_name(&self, name: &str) -> String {
        if self.options.force_png {
            if let Some(stem) = name.strip_suffix(".emf") {
                return format!("{}.png", stem);
            }
        }
        name.to_string()
    }

    /// Embedded equations of a paragraph, transcoded to MathML.
    pub fn equations(&self, paragraph: &RawParagraph) -> Vec<Equation> {
        if !self.options.extract_equations {
            return Vec::new();
        }
        paragraph
            .equations
            .iter()
            .filter_map(|eq| {
                let mathml = self.transcoder.transcode(eq);
                if mathml.is_none() {
                    log::debug!("Equation could not be transcoded, skipping");
                }
                mathml.map(Equation::new)
            })
            .collect()
    }

    /// A single paragraph with its prefixed text, graphics and equations.
    pub fn paragraph(&self, paragraph: &RawParagraph) -> Paragraph {
        let mut p = Paragraph::with_text(self.paragraph_text(paragraph));
        p.graphics = self.graphics(paragraph);
        p.equations = self.equations(paragraph);
        p
    }

    /// Content of a paragraph sequence.
    ///
    /// Consecutive list paragraphs with text collapse into one paragraph of
    /// newline-joined prefixed lines, flushed before the next non-empty
    /// paragraph and at the end. Paragraphs without text, graphics or
    /// equations are dropped.
    pub fn paragraphs<'p>(
        &self,
        paragraphs: impl IntoIterator<Item = &'p RawParagraph>,
    ) -> Vec<Paragraph> {
        let mut contents = Vec::new();
        let mut list_lines: Vec<String> = Vec::new();

        for raw in paragraphs {
            let text = raw.text();
            if !text.is_empty() && self.list_kind(raw).is_list() {
                list_lines.push(self.paragraph_text(raw));
                continue;
            }

            let mut p = Paragraph::new();
            if !text.is_empty() {
                p.set_text(self.paragraph_text(raw));
            }
            p.graphics = self.graphics(raw);
            p.equations = self.equations(raw);

            if !text.is_empty() || !p.graphics.is_empty() || !p.equations.is_empty() {
                flush_list(&mut list_lines, &mut contents);
                contents.push(p);
            }
        }
        flush_list(&mut list_lines, &mut contents);
        contents
    }

    /// Content of a cell: its own paragraphs, then the content of every
    /// distinct cell of its nested tables.
    pub fn cell_contents(&self, cell: &RawCell) -> Vec<Paragraph> {
        let mut contents = self.paragraphs(&cell.paragraphs);
        for table in &cell.tables {
            for nested in table.unique_cells() {
                contents.extend(self.cell_contents(nested));
            }
        }
        contents
    }

    /// Text of a cell: prefixed paragraph text plus nested table text, trimmed.
    pub fn cell_text(&self, cell: &RawCell) -> String {
        let text = cell
            .paragraphs
            .iter()
            .map(|p| self.paragraph_text(p))
            .collect::<Vec<_>>()
            .join("\n");
        let nested = cell
            .tables
            .iter()
            .map(|t| self.table_text(t))
            .collect::<Vec<_>>()
            .join("\n");

        [text, nested]
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    fn table_text(&self, table: &RawTable) -> String {
        table
            .unique_cells()
            .into_iter()
            .map(|c| self.cell_text(c))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Convert a raw table into a model table.
    ///
    /// Runs of grid positions sharing one physical cell collapse into a
    /// single cell whose colspan is the run length.
    pub fn table(&self, raw: &RawTable, rule: HeadingRule) -> Table {
        let mut table = Table::new();
        for raw_row in &raw.rows {
            let mut cells = Vec::new();
            let mut grid = raw_row.cells.iter().peekable();
            while let Some(cell) = grid.next() {
                let mut span = 1;
                while grid.next_if(|next| next.id == cell.id).is_some() {
                    span += 1;
                }
                let mut model_cell = TableCell::with_content(self.cell_contents(cell)).colspan(span);
                model_cell.is_heading = match rule {
                    HeadingRule::Shading => cell.is_shaded(),
                    HeadingRule::Never => false,
                };
                cells.push(model_cell);
            }
            table.add_row(TableRow::new(cells));
        }
        table
    }
}

fn flush_list(lines: &mut Vec<String>, contents: &mut Vec<Paragraph>) {
    if !lines.is_empty() {
        contents.push(Paragraph::with_text(lines.join("\n")));
        lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        MediaPart, NoopTranscoder, NumberingDefinitions, NumberingLevel, RawEquation, RawRow,
        SourceDocument,
    };

    struct EchoTranscoder;

    impl EquationTranscoder for EchoTranscoder {
        fn transcode(&self, equation: &RawEquation) -> Option<String> {
            Some(format!("<math>{}</math>", equation.omml))
        }
    }

    fn source() -> SourceDocument {
        SourceDocument::new()
            .with_numbering(
                NumberingDefinitions::new()
                    .with_instance("1", "1")
                    .with_instance("2", "2")
                    .with_level("1", "0", NumberingLevel::new("decimal"))
                    .with_level("2", "0", NumberingLevel::new("bullet")),
            )
            .with_media("rId5", MediaPart::new("image1.emf", vec![1, 2, 3]))
            .with_media("rId6", MediaPart::new("image2.png", vec![4]))
    }

    #[test]
    fn test_numbered_list_collapses() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);

        let paragraphs = vec![
            RawParagraph::new("first").with_numbering("1", "0"),
            RawParagraph::new("second").with_numbering("1", "0"),
            RawParagraph::new("third").with_numbering("1", "0"),
        ];
        let contents = ex.paragraphs(&paragraphs);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].text, "1. first\n1. second\n1. third");
    }

    #[test]
    fn test_list_flushed_before_plain_paragraph() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);

        let paragraphs = vec![
            RawParagraph::new("Intro"),
            RawParagraph::new("a").with_numbering("2", "0"),
            RawParagraph::new("b").with_numbering("2", "0"),
            RawParagraph::new(""),
            RawParagraph::new("Outro"),
            RawParagraph::new("c").with_numbering("2", "0"),
        ];
        let texts: Vec<_> = ex
            .paragraphs(&paragraphs)
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(texts, vec!["Intro", "- a\n- b", "Outro", "- c"]);
    }

    #[test]
    fn test_graphics_renamed_when_forced() {
        let src = source();
        let options = ParseOptions::new().with_force_png(true);
        let ex = Extractor::new(&src, &options, &NoopTranscoder);

        let p = RawParagraph::new("").with_media("rId5").with_media("rId6");
        let graphics = ex.graphics(&p);
        assert_eq!(graphics.len(), 2);
        assert_eq!(graphics[0].name, "image1.png");
        assert_eq!(graphics[0].path, "image1.emf");
        assert_eq!(graphics[0].data, vec![1, 2, 3]);
        assert_eq!(graphics[1].name, "image2.png");
    }

    #[test]
    fn test_graphics_keep_emf_by_default() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);
        let p = RawParagraph::new("").with_media("rId5");
        assert_eq!(ex.graphics(&p)[0].name, "image1.emf");
    }

    #[test]
    fn test_missing_media_skipped() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);
        let p = RawParagraph::new("").with_media("rId404").with_media("rId6");
        let graphics = ex.graphics(&p);
        assert_eq!(graphics.len(), 1);
        assert_eq!(graphics[0].name, "image2.png");
    }

    #[test]
    fn test_graphic_only_paragraph_kept() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);
        let contents = ex.paragraphs(&[RawParagraph::new("").with_media("rId6")]);
        assert_eq!(contents.len(), 1);
        assert!(contents[0].text.is_empty());
        assert_eq!(contents[0].graphics.len(), 1);
    }

    #[test]
    fn test_equations_transcoded() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &EchoTranscoder);
        let p = RawParagraph::new("E").with_equation(RawEquation::new("x"));
        assert_eq!(ex.equations(&p), vec![Equation::new("<math>x</math>")]);

        let noop = Extractor::new(&src, &options, &NoopTranscoder);
        assert!(noop.equations(&p).is_empty());
    }

    #[test]
    fn test_merged_cells_collapse() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);

        let a = RawCell::text(1, "A").shaded("D9D9D9");
        let raw = RawTable::new(vec![RawRow::new(vec![a.clone(), a, RawCell::text(2, "B")])]);
        let table = ex.table(&raw, HeadingRule::Shading);

        let cells = &table.rows[0].cells;
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].colspan, 2);
        assert!(cells[0].is_heading);
        assert_eq!(cells[0].text(), "A");
        assert_eq!(cells[1].colspan, 1);
        assert!(!cells[1].is_heading);

        let never = ex.table(&raw, HeadingRule::Never);
        assert!(!never.rows[0].cells[0].is_heading);
    }

    #[test]
    fn test_nested_table_content() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);

        let nested = RawTable::from_text_rows(&[&["x", "y"]]);
        let cell = RawCell::text(1, "outer").with_table(nested);

        let texts: Vec<_> = ex.cell_contents(&cell).into_iter().map(|p| p.text).collect();
        assert_eq!(texts, vec!["outer", "x", "y"]);
        assert_eq!(ex.cell_text(&cell), "outer\nx\ny");
    }

    #[test]
    fn test_cell_text_is_trimmed() {
        let src = source();
        let options = ParseOptions::default();
        let ex = Extractor::new(&src, &options, &NoopTranscoder);
        let cell = RawCell::text(1, "  Name of the Test Case \n");
        assert_eq!(ex.cell_text(&cell), "Name of the Test Case");
    }
}
