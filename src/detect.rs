//! Package detection and converter selection.

use crate::error::{Error, Result};
use crate::source::{DocumentSource, RawTable};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Zip local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Extension of the packages the batch layer picks up.
pub const DOCX_EXTENSION: &str = "docx";

const TEST_CASE_MARKER: &str = "name of the test case";
const SYSTEM_CONFIGURATION_MARKER: &str = "system configuration identification";
const CONTROL_FUNCTION_MARKER: &str = "functional description";

/// Template family of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Test Case with its Test and Experiment Specifications
    TestCase,
    /// System Configuration
    SystemConfiguration,
    /// Control Function
    ControlFunction,
}

impl DocumentKind {
    /// Human readable name of the template family.
    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::TestCase => "Test Case",
            DocumentKind::SystemConfiguration => "System Configuration",
            DocumentKind::ControlFunction => "Control Functions",
        }
    }

    /// Whether documents of this kind are extension documents.
    pub fn is_extension(&self) -> bool {
        matches!(
            self,
            DocumentKind::SystemConfiguration | DocumentKind::ControlFunction
        )
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Select the template family of a document.
///
/// Looks at cell (0, 0) of every table. A Test Case marker anywhere wins over
/// a System Configuration marker, which wins over a Control Function marker.
pub fn detect_kind(source: &dyn DocumentSource) -> Option<DocumentKind> {
    let tables = source.tables();
    let has_marker = |marker: &str| tables.iter().any(|t| first_cell_is(t, marker));

    if has_marker(TEST_CASE_MARKER) {
        Some(DocumentKind::TestCase)
    } else if has_marker(SYSTEM_CONFIGURATION_MARKER) {
        Some(DocumentKind::SystemConfiguration)
    } else if has_marker(CONTROL_FUNCTION_MARKER) {
        Some(DocumentKind::ControlFunction)
    } else {
        None
    }
}

fn first_cell_is(table: &RawTable, marker: &str) -> bool {
    table
        .cell(0, 0)
        .is_some_and(|c| c.text_content().trim().to_lowercase() == marker)
}

/// Check a file header for the zip container signature.
///
/// # Returns
/// * `Ok(())` if the data starts with a zip local file header
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<()> {
    if data.starts_with(ZIP_MAGIC) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check a file on disk for the zip container signature.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 4];
    reader
        .read_exact(&mut header)
        .map_err(|_| Error::UnknownFormat)?;
    detect_format_from_bytes(&header)
}

/// Check if a path names a `.docx` file (by extension, case-insensitive).
pub fn has_docx_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCX_EXTENSION))
}

/// Check if bytes look like a `.docx` package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
