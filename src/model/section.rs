//! Section type.

use super::{Graphic, Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A named node of a document's section tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading text
    pub heading: String,

    /// Nesting level; sections attached directly to a document are level 2
    pub level: u8,

    /// Paragraphs in document order
    pub paragraphs: Vec<Paragraph>,

    /// Tables in document order
    pub tables: Vec<Table>,

    /// Child sections
    pub sub_sections: Vec<Section>,
}

impl Section {
    /// Level of sections attached directly under a document.
    pub const ROOT_LEVEL: u8 = 2;

    /// Create a new root-level section.
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            level: Self::ROOT_LEVEL,
            paragraphs: Vec::new(),
            tables: Vec::new(),
            sub_sections: Vec::new(),
        }
    }

    /// Add a table and return self.
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Add paragraphs and return self.
    pub fn with_paragraphs(mut self, paragraphs: Vec<Paragraph>) -> Self {
        self.paragraphs.extend(paragraphs);
        self
    }

    /// Attach a child section one level below this one.
    pub fn add_sub_section(&mut self, mut section: Section) -> &mut Section {
        section.set_level(self.level + 1);
        self.sub_sections.push(section);
        let last = self.sub_sections.len() - 1;
        &mut self.sub_sections[last]
    }

    /// Set the level of this section, re-levelling its descendants.
    pub fn set_level(&mut self, level: u8) {
        self.level = level;
        for child in &mut self.sub_sections {
            child.set_level(level + 1);
        }
    }

    /// ATX heading marker for this level (`##`, `###`, ...).
    pub fn marker(&self) -> String {
        "#".repeat(self.level as usize)
    }

    /// Append this subtree's graphics in document order: own paragraphs,
    /// then table cells, then child sections.
    pub(crate) fn collect_graphics<'a>(&'a self, out: &mut Vec<&'a Graphic>) {
        for p in &self.paragraphs {
            out.extend(p.graphics.iter());
        }
        for table in &self.tables {
            for row in &table.rows {
                for cell in &row.cells {
                    for p in &cell.paragraphs {
                        out.extend(p.graphics.iter());
                    }
                }
            }
        }
        for child in &self.sub_sections {
            child.collect_graphics(out);
        }
    }
}
