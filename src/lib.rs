//! # htd2md
//!
//! Converts holistic test description (HTD) Word templates into Markdown
//! document trees.
//!
//! A `.docx` file written against one of the template families (Test Case with
//! its Test and Experiment Specifications, System Configuration, Control
//! Function) is read into an in-memory source view, classified, and turned
//! into a set of linked documents. Each document renders to a Markdown file
//! with YAML front matter, and its embedded graphics are written next to it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use htd2md::Htd2md;
//!
//! fn main() -> htd2md::Result<()> {
//!     let result = Htd2md::new().force_png(true).convert("test_case.docx")?;
//!     for markdown in result.to_markdown()? {
//!         println!("{}", markdown);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Template detection**: picks the converter from fixed table markers
//! - **Fuzzy headings**: tolerates typos and wording drift in table headings
//! - **Lists**: numbering definitions are resolved into nested Markdown lists
//! - **Document trees**: specifications are linked to their Test Case and
//!   written into nested folders
//! - **Batch mode**: folders (optionally recursive) converted in parallel with
//!   Rayon

pub mod batch;
pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod source;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchReport};
pub use convert::{convert_bytes, convert_file, Conversion, ConvertOptions};
pub use detect::{detect_kind, DocumentKind};
pub use error::{Error, Result};
pub use model::{
    Document, DocumentId, DocumentSet, Equation, Graphic, Paragraph, Section, Table, TableCell,
    TableRow,
};
pub use parser::ParseOptions;
pub use render::{JsonFormat, RenderOptions};
pub use source::{DocumentSource, DocxReader, EquationTranscoder, SourceDocument};

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Convert a `.docx` file and render every produced document to Markdown.
///
/// # Example
///
/// ```no_run
/// let pages = htd2md::to_markdown("control_function.docx").unwrap();
/// assert!(!pages.is_empty());
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    Htd2md::new().convert(path)?.to_markdown()
}

/// Convert a `.docx` file and dump every produced document as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<Vec<String>> {
    Htd2md::new().convert(path)?.to_json(format)
}

/// Builder for converting HTD documents.
///
/// # Example
///
/// ```no_run
/// use htd2md::Htd2md;
///
/// let written = Htd2md::new()
///     .force_png(true)
///     .without_frontmatter()
///     .convert("test_case.docx")?
///     .write_to("site/content")?;
/// # Ok::<(), htd2md::Error>(())
/// ```
pub struct Htd2md {
    convert_options: ConvertOptions,
    render_options: RenderOptions,
}

impl Htd2md {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            convert_options: ConvertOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Rename `.emf` graphics to `.png`.
    pub fn force_png(mut self, force: bool) -> Self {
        self.convert_options = self.convert_options.with_force_png(force);
        self
    }

    /// Extract text and tables only (no graphics, no equations).
    pub fn text_only(mut self) -> Self {
        let parse = self.convert_options.parse.clone().text_only();
        self.convert_options = self.convert_options.with_parse_options(parse);
        self
    }

    /// Use a different equation transcoder.
    pub fn with_transcoder(mut self, transcoder: Arc<dyn EquationTranscoder>) -> Self {
        self.convert_options = self.convert_options.with_transcoder(transcoder);
        self
    }

    /// Set rendering options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Fix the front matter date.
    pub fn with_date(mut self, date: chrono::NaiveDate) -> Self {
        self.render_options = self.render_options.with_date(date);
        self
    }

    /// Leave out the YAML front matter.
    pub fn without_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(false);
        self
    }

    /// Convert a `.docx` file.
    pub fn convert<P: AsRef<Path>>(self, path: P) -> Result<Htd2mdResult> {
        let conversion = convert::convert_file(path, &self.convert_options)?;
        Ok(self.wrap(conversion))
    }

    /// Convert an in-memory `.docx` package.
    pub fn convert_bytes(self, data: &[u8]) -> Result<Htd2mdResult> {
        let conversion = convert::convert_bytes(data, &self.convert_options)?;
        Ok(self.wrap(conversion))
    }

    /// Convert an already materialised source.
    pub fn convert_source(self, source: &dyn DocumentSource) -> Result<Htd2mdResult> {
        let conversion = convert::convert_source(source, &self.convert_options)
            .ok_or_else(|| Error::NoMatchingConverter(PathBuf::from("<source>")))?;
        Ok(self.wrap(conversion))
    }

    fn wrap(self, conversion: Conversion) -> Htd2mdResult {
        Htd2mdResult {
            conversion,
            render_options: self.render_options,
        }
    }
}

impl Default for Htd2md {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of converting one input.
pub struct Htd2mdResult {
    /// The conversion
    pub conversion: Conversion,
    render_options: RenderOptions,
}

impl Htd2mdResult {
    /// Template family of the input.
    pub fn kind(&self) -> DocumentKind {
        self.conversion.kind
    }

    /// The produced documents.
    pub fn documents(&self) -> &DocumentSet {
        &self.conversion.documents
    }

    /// Render every document to Markdown, in creation order.
    pub fn to_markdown(&self) -> Result<Vec<String>> {
        self.documents()
            .documents()
            .iter()
            .map(|doc| render::to_markdown(doc, &self.render_options))
            .collect()
    }

    /// Dump every document as JSON, in creation order.
    pub fn to_json(&self, format: JsonFormat) -> Result<Vec<String>> {
        self.documents()
            .documents()
            .iter()
            .map(|doc| render::to_json(doc, format))
            .collect()
    }

    /// Write `_index.md` files and attachments below `dir`.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let options = BatchOptions::new().with_render_options(self.render_options.clone());
        let (written, _) = batch::write_documents(self.documents(), dir.as_ref(), &options)?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawParagraph, RawTable};

    fn control_function_source() -> SourceDocument {
        SourceDocument::new()
            .with_table(RawTable::from_text_rows(&[&["Functional description", "Droop"]]))
            .with_table(
                RawTable::from_text_rows(&[
                    &["Control Function Identification", ""],
                    &["Control Function ID", "Name"],
                    &["CF-2", "Frequency support"],
                ])
                .with_shaded_header("BFBFBF"),
            )
    }

    #[test]
    fn test_builder_options() {
        let builder = Htd2md::new().force_png(true).text_only().without_frontmatter();
        assert!(builder.convert_options.parse.force_png);
        assert!(!builder.convert_options.parse.extract_graphics);
        assert!(!builder.render_options.include_frontmatter);
    }

    #[test]
    fn test_builder_default() {
        let builder = Htd2md::default();
        assert!(builder.render_options.include_frontmatter);
        assert!(!builder.convert_options.parse.force_png);
    }

    #[test]
    fn test_convert_source_without_match() {
        let source = SourceDocument::new().with_paragraph(RawParagraph::new("plain"));
        let result = Htd2md::new().convert_source(&source);
        assert!(matches!(result, Err(Error::NoMatchingConverter(_))));
    }

    #[test]
    fn test_convert_source_renders() {
        let date = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let result = Htd2md::new()
            .with_date(date)
            .convert_source(&control_function_source())
            .unwrap();
        assert_eq!(result.kind(), DocumentKind::ControlFunction);

        let pages = result.to_markdown().unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("title: 'Control Function CF-2'"));
        assert!(pages[0].contains("date: '2023-01-02'"));
        assert!(pages[0].contains("weight: 10"));

        let json = result.to_json(JsonFormat::Compact).unwrap();
        assert!(json[0].contains("\"is_extension\":true"));
    }

    #[test]
    fn test_convert_bytes_invalid() {
        assert!(Htd2md::new().convert_bytes(b"not a docx").is_err());
        assert!(Htd2md::new().convert_bytes(&[]).is_err());
    }
}
