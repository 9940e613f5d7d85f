//! Structure recovery from raw source content.

mod extract;
pub mod fuzzy;
pub mod numbering;
mod options;

pub use extract::{Extractor, HeadingRule};
pub use numbering::{list_kind_and_level, list_prefix, ListKind};
pub use options::ParseOptions;
