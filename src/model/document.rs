//! Document-level types.

use super::{Graphic, Section};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output weight of ordinary (Test Case family) documents.
pub const ORDINARY_WEIGHT: u32 = 1;

/// Output weight of extension documents (System Configuration, Control Function).
pub const EXTENSION_WEIGHT: u32 = 10;

const FALLBACK_TITLE: &str = "Untitled Document";
const FALLBACK_SHORT_TITLE: &str = "Untitled";
const FALLBACK_DESCRIPTION: &str = "This document does not have a description";

/// Index of a document inside its [`DocumentSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub usize);

/// A converted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title
    pub title: String,

    /// Short title, used as link title and output folder name
    pub short_title: String,

    /// One-line description
    pub description: String,

    /// Top-level sections
    pub sections: Vec<Section>,

    /// Parent documents (non-owning, resolved through the owning [`DocumentSet`])
    pub parent_docs: Vec<DocumentId>,

    /// Whether the document is an extension document
    pub is_extension: bool,

    /// File the document was converted from
    pub source_file: Option<PathBuf>,
}

impl Document {
    /// Create a new document. Blank identity fields are replaced with fixed
    /// fallbacks so the document never carries empty required fields.
    pub fn new(
        title: impl Into<String>,
        short_title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: non_blank(title.into(), FALLBACK_TITLE),
            short_title: non_blank(short_title.into(), FALLBACK_SHORT_TITLE),
            description: non_blank(description.into(), FALLBACK_DESCRIPTION),
            sections: Vec::new(),
            parent_docs: Vec::new(),
            is_extension: false,
            source_file: None,
        }
    }

    /// Attach a top-level section (forced to level 2).
    pub fn add_section(&mut self, mut section: Section) -> &mut Section {
        section.set_level(Section::ROOT_LEVEL);
        self.sections.push(section);
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Graphics of this document's own section tree, depth-first in document
    /// order. Parent documents are never visited.
    pub fn attachments(&self) -> Vec<&Graphic> {
        let mut out = Vec::new();
        for section in &self.sections {
            section.collect_graphics(&mut out);
        }
        out
    }

    /// Output weight used to order sibling documents.
    pub fn weight(&self) -> u32 {
        if self.is_extension {
            EXTENSION_WEIGHT
        } else {
            ORDINARY_WEIGHT
        }
    }

    /// Find a top-level section by heading.
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

fn non_blank(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_string()
    }
}

/// The documents produced from one input, linked by parent references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    /// Create a new empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document and return its id.
    pub fn push(&mut self, document: Document) -> DocumentId {
        self.documents.push(document);
        DocumentId(self.documents.len() - 1)
    }

    /// Get a document by id.
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.0)
    }

    /// Get a document by id mutably.
    pub fn get_mut(&mut self, id: DocumentId) -> Option<&mut Document> {
        self.documents.get_mut(id.0)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents in creation order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Iterate over `(id, document)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (DocumentId, &Document)> {
        self.documents
            .iter()
            .enumerate()
            .map(|(i, d)| (DocumentId(i), d))
    }

    /// Find the first document with the given short title.
    pub fn find_by_short_title(&self, short_title: &str) -> Option<DocumentId> {
        self.iter()
            .find(|(_, d)| d.short_title == short_title)
            .map(|(id, _)| id)
    }

    /// Link `child` to `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either id is unknown, or if the link would make a document
    /// its own ancestor.
    pub fn add_parent(&mut self, child: DocumentId, parent: DocumentId) {
        assert!(
            child.0 < self.documents.len() && parent.0 < self.documents.len(),
            "unknown document id"
        );
        assert!(
            child != parent && !self.has_ancestor(parent, child),
            "document {child:?} cannot be its own ancestor"
        );
        self.documents[child.0].parent_docs.push(parent);
    }

    /// Parent documents of `id`.
    pub fn parents(&self, id: DocumentId) -> Vec<&Document> {
        self.get(id)
            .map(|d| d.parent_docs.iter().filter_map(|p| self.get(*p)).collect())
            .unwrap_or_default()
    }

    fn has_ancestor(&self, id: DocumentId, ancestor: DocumentId) -> bool {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(doc) = self.get(current) else {
                continue;
            };
            for parent in &doc.parent_docs {
                if *parent == ancestor {
                    return true;
                }
                stack.push(*parent);
            }
        }
        false
    }

    /// Chain from the most distant ancestor down to `id`, following each
    /// document's last (most specific) parent.
    pub fn lineage(&self, id: DocumentId) -> Vec<DocumentId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|d| d.parent_docs.last()) {
            chain.push(*parent);
            current = *parent;
        }
        chain.reverse();
        chain
    }

    /// Output directory of a document.
    ///
    /// Starts at `base`, optionally adds the source file's stem, then one
    /// segment per document along [`lineage`](Self::lineage) for every
    /// document that is an extension or has parents.
    pub fn output_dir(&self, id: DocumentId, base: &Path, prefix_source_stem: bool) -> PathBuf {
        let mut dir = base.to_path_buf();

        if prefix_source_stem {
            let stem = self
                .get(id)
                .and_then(|d| d.source_file.as_deref())
                .and_then(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned());
            if let Some(stem) = stem {
                dir.push(path_segment(&stem));
            }
        }

        for doc_id in self.lineage(id) {
            if let Some(doc) = self.get(doc_id) {
                if doc.is_extension || !doc.parent_docs.is_empty() {
                    dir.push(path_segment(&doc.short_title));
                }
            }
        }

        dir
    }

    /// Mark every document with its source file.
    pub fn set_source_file(&mut self, path: &Path) {
        for doc in &mut self.documents {
            doc.source_file = Some(path.to_path_buf());
        }
    }

    /// Mark every document as an extension document.
    pub fn mark_extension(&mut self) {
        for doc in &mut self.documents {
            doc.is_extension = true;
        }
    }

    /// Total number of attachments over all documents.
    pub fn attachment_count(&self) -> usize {
        self.documents.iter().map(|d| d.attachments().len()).sum()
    }
}

impl IntoIterator for DocumentSet {
    type Item = Document;
    type IntoIter = std::vec::IntoIter<Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}

/// Make a short title safe to use as a single path component.
fn path_segment(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}
