//! Document conversion: template detection and dispatch to the converters.
//!
//! Every input is first classified into a [`DocumentKind`] by the converter
//! selector, then handed to exactly one converter:
//!
//! - Test Case documents go through [`TestCaseConverter`], which zips the
//!   headline paragraph stream with the definition tables.
//! - System Configuration and Control Function documents go through
//!   [`TableBasedConverter`] with their [`TableLayout`].
//!
//! # Example
//!
//! ```no_run
//! use htd2md::convert::{convert_file, ConvertOptions};
//!
//! fn main() -> htd2md::Result<()> {
//!     let conversion = convert_file("test_case.docx", &ConvertOptions::default())?;
//!     println!("{}: {} documents", conversion.kind, conversion.documents.len());
//!     Ok(())
//! }
//! ```

mod table_based;
mod test_case;

pub use table_based::{
    TableBasedConverter, TableLayout, TableRole, CONTROL_FUNCTION_LAYOUT,
    DEFAULT_SECTION_HEADING, SYSTEM_CONFIGURATION_LAYOUT,
};
pub use test_case::TestCaseConverter;

use crate::detect::{detect_kind, DocumentKind};
use crate::error::{Error, Result};
use crate::model::DocumentSet;
use crate::parser::{Extractor, ParseOptions};
use crate::source::{DocumentSource, DocxReader, EquationTranscoder, OmmlTranscoder};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options for document conversion.
#[derive(Clone)]
pub struct ConvertOptions {
    /// Content extraction options
    pub parse: ParseOptions,

    /// Transcoder for embedded equations
    pub transcoder: Arc<dyn EquationTranscoder>,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set extraction options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Rename `.emf` graphics to `.png`.
    pub fn with_force_png(mut self, force: bool) -> Self {
        self.parse = self.parse.with_force_png(force);
        self
    }

    /// Use a different equation transcoder.
    pub fn with_transcoder(mut self, transcoder: Arc<dyn EquationTranscoder>) -> Self {
        self.transcoder = transcoder;
        self
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            transcoder: Arc::new(OmmlTranscoder),
        }
    }
}

impl std::fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("parse", &self.parse)
            .finish_non_exhaustive()
    }
}

/// Result of converting one input.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Template family the input was recognised as
    pub kind: DocumentKind,

    /// Produced documents, linked by parent references
    pub documents: DocumentSet,
}

/// Convert a source of an already known template family.
pub fn convert_kind(
    source: &dyn DocumentSource,
    kind: DocumentKind,
    options: &ConvertOptions,
) -> DocumentSet {
    let extractor = Extractor::new(source, &options.parse, options.transcoder.as_ref());

    let mut documents = match kind {
        DocumentKind::TestCase => TestCaseConverter::new(&extractor).convert(),
        DocumentKind::SystemConfiguration => {
            TableBasedConverter::new(&extractor, &SYSTEM_CONFIGURATION_LAYOUT).convert()
        }
        DocumentKind::ControlFunction => {
            TableBasedConverter::new(&extractor, &CONTROL_FUNCTION_LAYOUT).convert()
        }
    };

    if kind.is_extension() {
        documents.mark_extension();
    }
    documents
}

/// Detect the template family of a source and convert it.
///
/// Returns `None` when no converter matches.
pub fn convert_source(source: &dyn DocumentSource, options: &ConvertOptions) -> Option<Conversion> {
    let kind = detect_kind(source)?;
    log::debug!("Detected {}", kind);
    Some(Conversion {
        kind,
        documents: convert_kind(source, kind, options),
    })
}

/// Read a `.docx` file and convert it.
///
/// Every produced document records `path` as its source file.
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<Conversion> {
    let path = path.as_ref();
    let source = DocxReader::open(path)?;
    let mut conversion = convert_source(&source, options)
        .ok_or_else(|| Error::NoMatchingConverter(path.to_path_buf()))?;

    log::info!("{} -> {}", path.display(), conversion.kind);
    conversion.documents.set_source_file(path);
    Ok(conversion)
}

/// Convert an in-memory `.docx` package.
pub fn convert_bytes(data: &[u8], options: &ConvertOptions) -> Result<Conversion> {
    let source = DocxReader::from_bytes(data)?;
    convert_source(&source, options)
        .ok_or_else(|| Error::NoMatchingConverter(PathBuf::from("<memory>")))
}
