//! Document Source abstraction layer.
//!
//! Converters never touch the Word package directly. They query a
//! [`DocumentSource`], an in-memory structural view over one input exposing
//! body paragraphs, body tables, numbering definitions and embedded media.
//! [`DocxReader`] materializes a `.docx` package into a [`SourceDocument`];
//! tests and other front-ends can build a [`SourceDocument`] by hand.

mod docx;
mod equation;

pub use docx::DocxReader;
pub use equation::{EquationTranscoder, NoopTranscoder, OmmlTranscoder};

use std::collections::HashMap;

/// Read-only structural view over one input document.
pub trait DocumentSource {
    /// Body-level paragraphs in document order.
    fn paragraphs(&self) -> &[RawParagraph];

    /// Body-level tables in document order.
    fn tables(&self) -> &[RawTable];

    /// Numbering definitions, if the document has a numbering part.
    fn numbering(&self) -> Option<&NumberingDefinitions>;

    /// Look up an embedded media part by its reference id.
    fn media(&self, id: &str) -> Option<&MediaPart>;
}

/// An in-memory [`DocumentSource`].
#[derive(Debug, Clone, Default)]
pub struct SourceDocument {
    paragraphs: Vec<RawParagraph>,
    tables: Vec<RawTable>,
    numbering: Option<NumberingDefinitions>,
    media: HashMap<String, MediaPart>,
}

impl SourceDocument {
    /// Create a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body paragraph.
    pub fn add_paragraph(&mut self, paragraph: RawParagraph) {
        self.paragraphs.push(paragraph);
    }

    /// Append a body table.
    pub fn add_table(&mut self, table: RawTable) {
        self.tables.push(table);
    }

    /// Append a body paragraph and return self.
    pub fn with_paragraph(mut self, paragraph: RawParagraph) -> Self {
        self.add_paragraph(paragraph);
        self
    }

    /// Append a body table and return self.
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.add_table(table);
        self
    }

    /// Set the numbering definitions and return self.
    pub fn with_numbering(mut self, numbering: NumberingDefinitions) -> Self {
        self.numbering = Some(numbering);
        self
    }

    /// Register a media part under `id`.
    pub fn add_media(&mut self, id: impl Into<String>, part: MediaPart) {
        self.media.insert(id.into(), part);
    }

    /// Register a media part under `id` and return self.
    pub fn with_media(mut self, id: impl Into<String>, part: MediaPart) -> Self {
        self.add_media(id, part);
        self
    }
}

impl DocumentSource for SourceDocument {
    fn paragraphs(&self) -> &[RawParagraph] {
        &self.paragraphs
    }

    fn tables(&self) -> &[RawTable] {
        &self.tables
    }

    fn numbering(&self) -> Option<&NumberingDefinitions> {
        self.numbering.as_ref()
    }

    fn media(&self, id: &str) -> Option<&MediaPart> {
        self.media.get(id)
    }
}

/// A run of text with its explicit bold flag (`None` = inherited).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRun {
    pub text: String,
    pub bold: Option<bool>,
}

impl RawRun {
    /// Create a run without explicit formatting.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: None,
        }
    }

    /// Create an explicitly bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: Some(true),
        }
    }
}

/// Reference from a paragraph to a numbering definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingRef {
    /// Numbering instance id (`w:numId`)
    pub num_id: String,
    /// Level index (`w:ilvl`)
    pub level: String,
}

/// An unresolved equation in its native (OMML) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEquation {
    /// Serialized `m:oMath` element
    pub omml: String,
}

impl RawEquation {
    /// Create a new equation from its OMML fragment.
    pub fn new(omml: impl Into<String>) -> Self {
        Self { omml: omml.into() }
    }
}

/// A body or cell paragraph as exposed by the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParagraph {
    /// Text runs
    pub runs: Vec<RawRun>,
    /// Numbering reference, if the paragraph is a list item
    pub numbering: Option<NumberingRef>,
    /// Embedded media reference ids in document order
    pub media: Vec<String>,
    /// Embedded equations in document order
    pub equations: Vec<RawEquation>,
}

impl RawParagraph {
    /// Create a paragraph with a single unformatted run.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            runs: vec![RawRun::new(text)],
            ..Self::default()
        }
    }

    /// Create a paragraph with a single bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            runs: vec![RawRun::bold(text)],
            ..Self::default()
        }
    }

    /// Create a paragraph from runs.
    pub fn from_runs(runs: Vec<RawRun>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    /// Attach a numbering reference and return self.
    pub fn with_numbering(mut self, num_id: impl Into<String>, level: impl Into<String>) -> Self {
        self.numbering = Some(NumberingRef {
            num_id: num_id.into(),
            level: level.into(),
        });
        self
    }

    /// Attach a media reference and return self.
    pub fn with_media(mut self, id: impl Into<String>) -> Self {
        self.media.push(id.into());
        self
    }

    /// Attach an equation and return self.
    pub fn with_equation(mut self, equation: RawEquation) -> Self {
        self.equations.push(equation);
        self
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// True when every run is explicitly bold (vacuously true without runs).
    pub fn is_bold(&self) -> bool {
        self.runs.iter().all(|r| r.bold == Some(true))
    }
}

/// A physical table cell.
///
/// A cell spanning several grid columns appears once per column with the
/// same `id`; the extractor collapses such repeats into one logical cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCell {
    /// Identity of the physical cell within its table
    pub id: usize,
    /// Paragraphs in the cell
    pub paragraphs: Vec<RawParagraph>,
    /// Tables nested in the cell
    pub tables: Vec<RawTable>,
    /// Background fill value (`w:shd/@w:fill`)
    pub shading: Option<String>,
}

impl RawCell {
    /// Create an empty cell.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Create a cell holding one plain paragraph per line of `text`.
    pub fn text(id: usize, text: &str) -> Self {
        let mut cell = Self::new(id);
        cell.paragraphs = text.split('\n').map(RawParagraph::new).collect();
        cell
    }

    /// Set the background fill and return self.
    pub fn shaded(mut self, fill: impl Into<String>) -> Self {
        self.shading = Some(fill.into());
        self
    }

    /// Add a paragraph and return self.
    pub fn with_paragraph(mut self, paragraph: RawParagraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }

    /// Add a nested table and return self.
    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Paragraph texts joined by newlines (no list prefixes, no nested tables).
    pub fn text_content(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when the cell has a background colour.
    pub fn is_shaded(&self) -> bool {
        matches!(self.shading.as_deref(), Some(fill) if !fill.is_empty() && fill != "auto")
    }
}

/// A table row as a sequence of grid positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
}

impl RawRow {
    /// Create a row from grid cells.
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self { cells }
    }
}

/// A table as exposed by the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Create a table from rows.
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Build a table of unmerged plain-text cells with distinct identities.
    pub fn from_text_rows(rows: &[&[&str]]) -> Self {
        let mut next_id = 0;
        let rows = rows
            .iter()
            .map(|row| {
                RawRow::new(
                    row.iter()
                        .map(|text| {
                            next_id += 1;
                            RawCell::text(next_id, text)
                        })
                        .collect(),
                )
            })
            .collect();
        Self { rows }
    }

    /// Shade every cell of the first row and return self.
    pub fn with_shaded_header(mut self, fill: &str) -> Self {
        if let Some(row) = self.rows.first_mut() {
            for cell in &mut row.cells {
                cell.shading = Some(fill.to_string());
            }
        }
        self
    }

    /// Cell at a grid position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&RawCell> {
        self.rows.get(row)?.cells.get(col)
    }

    /// Distinct physical cells in row-major order.
    pub fn unique_cells(&self) -> Vec<&RawCell> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter())
            .filter(|c| seen.insert(c.id))
            .collect()
    }
}

/// Numbering definitions (`word/numbering.xml`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingDefinitions {
    /// Numbering instance id → abstract numbering id
    pub instances: HashMap<String, String>,
    /// Abstract numbering id → level index → level definition
    pub abstracts: HashMap<String, HashMap<String, NumberingLevel>>,
}

impl NumberingDefinitions {
    /// Create empty definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a numbering instance to an abstract numbering and return self.
    pub fn with_instance(mut self, num_id: impl Into<String>, abstract_id: impl Into<String>) -> Self {
        self.instances.insert(num_id.into(), abstract_id.into());
        self
    }

    /// Define a level of an abstract numbering and return self.
    pub fn with_level(
        mut self,
        abstract_id: impl Into<String>,
        level: impl Into<String>,
        definition: NumberingLevel,
    ) -> Self {
        self.abstracts
            .entry(abstract_id.into())
            .or_default()
            .insert(level.into(), definition);
        self
    }

    /// Resolve the level definition referenced by a paragraph.
    pub fn level(&self, reference: &NumberingRef) -> Option<&NumberingLevel> {
        let abstract_id = self.instances.get(&reference.num_id)?;
        self.abstracts.get(abstract_id)?.get(&reference.level)
    }
}

/// One level of an abstract numbering definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingLevel {
    /// Format token (`w:numFmt`), e.g. `bullet` or `decimal`
    pub format: Option<String>,
    /// Indentation (`w:pPr/w:ind`), if the level declares one
    pub indent: Option<LevelIndent>,
}

impl NumberingLevel {
    /// Create a level with a format token.
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            indent: None,
        }
    }

    /// Set the left indentation (EMU) and return self.
    pub fn with_indent_left(mut self, left_emu: i64) -> Self {
        self.indent = Some(LevelIndent {
            left: Some(left_emu),
        });
        self
    }
}

/// Level indentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelIndent {
    /// Left indentation in EMU
    pub left: Option<i64>,
}

/// Binary payload of an embedded media part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPart {
    /// Suggested file name (base name of the part)
    pub name: String,
    /// Raw bytes
    pub data: Vec<u8>,
}

impl MediaPart {
    /// Create a new media part.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}
