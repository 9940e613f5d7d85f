//! Error types for htd2md library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for htd2md operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading and converting documents.
///
/// Only failures that make a whole input unusable are represented here.
/// Missing fields, broken numbering definitions and unresolvable cross
/// references are recovered inside the converters and never surface as errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as a Word package.
    #[error("Unknown file format: not a valid .docx package")]
    UnknownFormat,

    /// The package opened but does not have the expected Word structure.
    #[error("Invalid .docx package: {0}")]
    InvalidDocx(String),

    /// A package part contains malformed XML.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// None of the known template layouts matched the document.
    #[error("No converter available for {}", .0.display())]
    NoMatchingConverter(PathBuf),

    /// Error during rendering (Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::InvalidDocx(err.to_string()),
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
