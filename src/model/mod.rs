//! Normalized document model produced by the converters.
//!
//! A conversion yields a [`DocumentSet`]: an arena of [`Document`]s linked by
//! non-owning parent references. Each document exclusively owns its tree of
//! [`Section`]s, which in turn own their paragraphs, tables and sub-sections.

mod document;
mod paragraph;
mod resource;
mod section;
mod table;

pub use document::{
    Document, DocumentId, DocumentSet, EXTENSION_WEIGHT, ORDINARY_WEIGHT,
};
pub use paragraph::{markdown_to_html, Paragraph};
pub use resource::{Equation, Graphic};
pub use section::Section;
pub use table::{Table, TableCell, TableRow};
