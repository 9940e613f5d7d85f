//! Paragraph-stream converter for the Test Case template family.
//!
//! A Test Case document carries one Test Case table followed by any number
//! of Test Specification and Experiment Specification tables. The identity
//! of each specification is only present in the bold headline paragraphs
//! between the tables, so the paragraph stream is scanned alongside the
//! table stream and both are zipped together positionally.

use crate::model::{Document, DocumentId, DocumentSet, Graphic, Paragraph, Section, Table};
use crate::parser::{Extractor, HeadingRule};
use crate::source::{RawParagraph, RawTable};
use regex::Regex;
use std::collections::HashMap;

const QUALIFICATION_STRATEGY: &str = "Qualification Strategy";
const MAPPING: &str = "Mapping to Research Infrastructure";

/// Headline patterns and field patterns of the template.
struct Patterns {
    test_case: Regex,
    test_specification: Regex,
    experiment_specification: Regex,
    author_version: Regex,
    project_date: Regex,
}

impl Patterns {
    fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Self {
            test_case: compile(r"^\s*Test\s+Case\s+(.*)"),
            test_specification: compile(r"^\s*Test\s+Specification\s+(.*)"),
            experiment_specification: compile(r"^\s*Experiment\s+Specification\s+(.*)"),
            author_version: compile(r"^Author:?\s+(.*)\s+Version:?\s+(.*)"),
            project_date: compile(r"^Project:?\s+(.*)\s+Date:?\s+(.*)"),
        }
    }
}

/// Bold headline paragraphs that drive the scans.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Headline {
    TestCase(String),
    TestSpecification(String),
    ExperimentSpecification(String),
    QualificationStrategy,
    Mapping,
}

/// Table kinds of the template, recognised by fixed-position probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableKind {
    TestCase,
    TestSpecification,
    ExperimentSpecification,
}

/// Specification identity found in the paragraph stream.
#[derive(Debug, Clone, Default)]
struct SpecRecord {
    id: String,
    mapping: Option<MappingBlock>,
}

/// Running "Mapping to Research Infrastructure" block of a Test Specification.
#[derive(Debug, Clone, Default)]
struct MappingBlock {
    text: String,
    graphics: Vec<Graphic>,
}

/// Header fields and the Qualification Strategy block of the Test Case.
#[derive(Debug, Default)]
struct TestCaseHeader<'p> {
    id: String,
    identification: Table,
    qualification: Vec<&'p RawParagraph>,
}

/// Converter for Test Case documents.
pub struct TestCaseConverter<'a> {
    extractor: &'a Extractor<'a>,
    patterns: Patterns,
}

impl<'a> TestCaseConverter<'a> {
    /// Create a new converter.
    pub fn new(extractor: &'a Extractor<'a>) -> Self {
        Self {
            extractor,
            patterns: Patterns::new(),
        }
    }

    /// Convert the source into a Test Case and its specifications.
    ///
    /// Produces nothing when the source has no Test Case table.
    pub fn convert(&self) -> DocumentSet {
        let source = self.extractor.source();
        let test_specs = self.scan_test_specifications();
        let experiment_specs = self.scan_experiment_specifications();

        let mut test_case_table: Option<&RawTable> = None;
        let mut ts_tables = Vec::new();
        let mut es_tables = Vec::new();
        for table in source.tables() {
            match table_kind(table) {
                Some(TableKind::TestCase) if test_case_table.is_none() => test_case_table = Some(table),
                Some(TableKind::TestCase) => log::warn!("Ignoring additional Test Case table"),
                Some(TableKind::TestSpecification) => ts_tables.push(table),
                Some(TableKind::ExperimentSpecification) => es_tables.push(table),
                None => {}
            }
        }

        let mut set = DocumentSet::new();
        let Some(tc_table) = test_case_table else {
            log::warn!("No Test Case table found");
            return set;
        };

        let tc_id = set.push(self.test_case(tc_table));

        let mut registry: HashMap<String, DocumentId> = HashMap::new();
        for (i, table) in ts_tables.into_iter().enumerate() {
            let (doc, key) = self.test_specification(table, test_specs.get(i));
            let id = set.push(doc);
            set.add_parent(id, tc_id);
            if let Some(key) = key {
                registry.insert(key, id);
            }
        }

        for (i, table) in es_tables.into_iter().enumerate() {
            let (doc, reference) = self.experiment_specification(table, experiment_specs.get(i));
            let id = set.push(doc);
            set.add_parent(id, tc_id);
            if let Some(reference) = reference {
                match registry.get(&reference) {
                    Some(ts_id) => set.add_parent(id, *ts_id),
                    None => log::warn!(
                        "Experiment Specification references unknown Test Specification '{}'",
                        reference
                    ),
                }
            }
        }

        set
    }

    fn headline(&self, paragraph: &RawParagraph) -> Option<Headline> {
        if !paragraph.is_bold() {
            return None;
        }
        let text = paragraph.text();
        let capture = |re: &Regex| {
            re.captures(&text)
                .map(|c| c.get(1).map_or("", |m| m.as_str()).trim().to_string())
        };

        if let Some(id) = capture(&self.patterns.test_case) {
            Some(Headline::TestCase(id))
        } else if let Some(id) = capture(&self.patterns.test_specification) {
            Some(Headline::TestSpecification(id))
        } else if let Some(id) = capture(&self.patterns.experiment_specification) {
            Some(Headline::ExperimentSpecification(id))
        } else if text.trim() == QUALIFICATION_STRATEGY {
            Some(Headline::QualificationStrategy)
        } else if text.trim() == MAPPING {
            Some(Headline::Mapping)
        } else {
            None
        }
    }

    /// Scan the stream up to the first Test Specification headline for the
    /// Test Case id, the author/version and project/date lines, and the
    /// Qualification Strategy block.
    fn scan_header(&self) -> TestCaseHeader<'a> {
        let mut header = TestCaseHeader::default();
        let mut in_qualification = false;

        for paragraph in self.extractor.source().paragraphs() {
            let text = paragraph.text();
            let headline = self.headline(paragraph);

            if let Some(Headline::TestCase(id)) = &headline {
                header.id = id.clone();
                header.identification.add_simple_row(["ID", id.as_str()], &[0]);
            }
            if let Some(c) = self.patterns.author_version.captures(&text) {
                header.identification.add_simple_row(["Author", c[1].trim()], &[0]);
                header.identification.add_simple_row(["Version", c[2].trim()], &[0]);
            }
            if let Some(c) = self.patterns.project_date.captures(&text) {
                header.identification.add_simple_row(["Project", c[1].trim()], &[0]);
                header.identification.add_simple_row(["Date", c[2].trim()], &[0]);
            }

            match headline {
                Some(Headline::TestSpecification(_)) => break,
                Some(Headline::QualificationStrategy) => {
                    in_qualification = true;
                    header.qualification.clear();
                }
                _ if in_qualification => header.qualification.push(paragraph),
                _ => {}
            }
        }
        header
    }

    /// Collect Test Specification ids and their mapping blocks, stopping at
    /// the first Experiment Specification headline.
    fn scan_test_specifications(&self) -> Vec<SpecRecord> {
        let mut records: Vec<SpecRecord> = Vec::new();
        let mut in_mapping = false;

        for paragraph in self.extractor.source().paragraphs() {
            match self.headline(paragraph) {
                Some(Headline::TestSpecification(id)) => {
                    records.push(SpecRecord { id, mapping: None });
                    in_mapping = false;
                }
                Some(Headline::ExperimentSpecification(_)) => break,
                Some(Headline::Mapping) => match records.last_mut() {
                    Some(record) => {
                        record.mapping = Some(MappingBlock::default());
                        in_mapping = true;
                    }
                    None => log::warn!("Mapping block before any Test Specification, ignoring"),
                },
                _ if in_mapping => {
                    if let Some(block) = records.last_mut().and_then(|r| r.mapping.as_mut()) {
                        let line = self.extractor.paragraph_text(paragraph);
                        if !block.text.is_empty() {
                            block.text.push('\n');
                        }
                        block.text.push_str(&line);
                        block.graphics.extend(self.extractor.graphics(paragraph));
                    }
                }
                _ => {}
            }
        }
        records
    }

    fn scan_experiment_specifications(&self) -> Vec<SpecRecord> {
        self.extractor
            .source()
            .paragraphs()
            .iter()
            .filter_map(|p| match self.headline(p) {
                Some(Headline::ExperimentSpecification(id)) => Some(SpecRecord { id, mapping: None }),
                _ => None,
            })
            .collect()
    }

    /// Extract a definition table and turn the first non-empty cell of every
    /// row into a short heading label.
    fn definition_table(&self, raw: &RawTable) -> Table {
        let mut table = self.extractor.table(raw, HeadingRule::Never);
        for row in &mut table.rows {
            let Some(cell) = row.cells.iter_mut().find(|c| !c.is_empty()) else {
                continue;
            };
            let first = cell.paragraphs.first().map(|p| p.text.as_str()).unwrap_or("");
            let label = first.split(':').next().unwrap_or("").trim().to_string();
            cell.set_text(label);
            cell.is_heading = true;
        }
        table
    }

    fn test_case(&self, raw: &RawTable) -> Document {
        let header = self.scan_header();
        let table = self.definition_table(raw);
        let description = non_empty(table.find_cell_text("Name of the Test Case", 1, 0));

        let mut doc = Document::new(
            format!("Test Case {}", header.id),
            non_blank_or(&header.id, "Test Case"),
            description.unwrap_or_else(|| "A Test Case".to_string()),
        );
        doc.add_section(Section::new("Identification").with_table(header.identification));
        doc.add_section(Section::new("Test Case Definition").with_table(table));
        doc.add_section(
            Section::new(QUALIFICATION_STRATEGY)
                .with_paragraphs(self.extractor.paragraphs(header.qualification)),
        );
        doc
    }

    /// Build a Test Specification; also returns the key it is registered under.
    fn test_specification(&self, raw: &RawTable, record: Option<&SpecRecord>) -> (Document, Option<String>) {
        let mut table = self.definition_table(raw);
        let id = record.map(|r| r.id.clone()).unwrap_or_default();
        if record.is_some() {
            table.insert_simple_row(0, ["ID", id.as_str()], &[0]);
        }
        let description = non_empty(table.find_cell_text("Title of Test", 1, 0));

        let mut doc = Document::new(
            format!("Test Specification {}", id),
            non_blank_or(&id, "Test Specification"),
            description.unwrap_or_else(|| "A Test Specification".to_string()),
        );
        doc.add_section(Section::new("Test Specification Definition").with_table(table));

        if let Some(mapping) = record.and_then(|r| r.mapping.as_ref()) {
            let mut paragraph = Paragraph::with_text(mapping.text.clone());
            paragraph.graphics = mapping.graphics.clone();
            doc.add_section(Section::new(MAPPING).with_paragraphs(vec![paragraph]));
        }

        let key = Some(id.trim().to_string()).filter(|k| !k.is_empty());
        (doc, key)
    }

    /// Build an Experiment Specification; also returns its Test Specification reference.
    fn experiment_specification(
        &self,
        raw: &RawTable,
        record: Option<&SpecRecord>,
    ) -> (Document, Option<String>) {
        let mut table = self.definition_table(raw);
        let id = record.map(|r| r.id.clone()).unwrap_or_default();
        if record.is_some() {
            table.insert_simple_row(0, ["ID", id.as_str()], &[0]);
        }
        let description = non_empty(table.find_cell_text("Title of Experiment", 1, 0));
        let reference = non_empty(table.find_cell_text("Reference to Test Specification", 1, 0));

        let mut doc = Document::new(
            format!("Experiment Specification {}", id),
            non_blank_or(&id, "Experiment Specification"),
            description.unwrap_or_else(|| "An Experiment Specification".to_string()),
        );
        doc.add_section(Section::new("Experiment Specification Definition").with_table(table));
        (doc, reference)
    }
}

fn table_kind(table: &RawTable) -> Option<TableKind> {
    let probe = |row: usize| {
        table
            .cell(row, 0)
            .map(|c| c.text_content().trim().to_lowercase())
    };
    if probe(0).as_deref() == Some("name of the test case") {
        Some(TableKind::TestCase)
    } else {
        match probe(1).as_deref() {
            Some("title of test") => Some(TableKind::TestSpecification),
            Some("title of experiment") => Some(TableKind::ExperimentSpecification),
            _ => None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
