//! Integration tests for the Test Case family converter.

use htd2md::convert::{convert_kind, convert_source, ConvertOptions};
use htd2md::source::{RawCell, RawParagraph, RawRow, RawTable, SourceDocument};
use htd2md::{DocumentKind, DocumentSet};
use std::path::{Path, PathBuf};

fn tc_table() -> RawTable {
    RawTable::from_text_rows(&[
        &["Name of the Test Case", "Islanding detection"],
        &["Narrative: a short story", "The grid is lost"],
        &["Target Metrics: KPIs", "Detection time"],
    ])
}

fn ts_table(title: &str) -> RawTable {
    RawTable::from_text_rows(&[
        &["Reference to Test Case", "TC-1"],
        &["Title of Test", title],
        &["Test Rationale: why", "coverage"],
    ])
}

fn es_table(reference: &str) -> RawTable {
    RawTable::from_text_rows(&[
        &["Reference to Test Case", "TC-1"],
        &["Title of Experiment", "Hardware in the loop"],
        &["Reference to Test Specification", reference],
    ])
}

fn convert(source: &SourceDocument) -> DocumentSet {
    let conversion = convert_source(source, &ConvertOptions::default()).unwrap();
    assert_eq!(conversion.kind, DocumentKind::TestCase);
    conversion.documents
}

fn standard_source(reference: &str) -> SourceDocument {
    SourceDocument::new()
        .with_paragraph(RawParagraph::bold("Test Case TC-1"))
        .with_paragraph(RawParagraph::bold("Test Specification TS-1.1"))
        .with_paragraph(RawParagraph::bold("Test Specification TS-1.2"))
        .with_paragraph(RawParagraph::bold("Experiment Specification ES-1.2.1"))
        .with_table(tc_table())
        .with_table(ts_table("Basic"))
        .with_table(ts_table("Extended"))
        .with_table(es_table(reference))
}

#[test]
fn test_experiment_links_to_referenced_specification() {
    let set = convert(&standard_source("TS-1.2"));
    assert_eq!(set.len(), 4);

    let tc = set.find_by_short_title("TC-1").unwrap();
    let ts2 = set.find_by_short_title("TS-1.2").unwrap();
    let es = set.find_by_short_title("ES-1.2.1").unwrap();

    let mut parents = set.get(es).unwrap().parent_docs.clone();
    parents.sort();
    assert_eq!(parents, vec![tc, ts2]);
}

#[test]
fn test_unknown_reference_keeps_test_case_parent() {
    let set = convert(&standard_source("TS-9.9"));
    let tc = set.find_by_short_title("TC-1").unwrap();
    let es = set.find_by_short_title("ES-1.2.1").unwrap();
    assert_eq!(set.get(es).unwrap().parent_docs, vec![tc]);
}

#[test]
fn test_output_paths_follow_specification() {
    let mut set = convert(&standard_source("TS-1.2"));
    set.set_source_file(Path::new("docs/islanding.docx"));
    let base = Path::new("site");

    let ts1 = set.find_by_short_title("TS-1.1").unwrap();
    let es = set.find_by_short_title("ES-1.2.1").unwrap();
    assert_eq!(set.output_dir(ts1, base, false), PathBuf::from("site/TS-1.1"));
    assert_eq!(
        set.output_dir(es, base, true),
        PathBuf::from("site/islanding/TS-1.2/ES-1.2.1")
    );
}

#[test]
fn test_definition_rows_get_short_labels() {
    let set = convert(&standard_source("TS-1.2"));
    let tc = &set.documents()[0];
    let table = &tc.section("Test Case Definition").unwrap().tables[0];

    let labels: Vec<_> = table.rows.iter().map(|r| r.cells[0].text()).collect();
    assert_eq!(labels, vec!["Name of the Test Case", "Narrative", "Target Metrics"]);
    assert!(table.rows.iter().all(|r| r.cells[0].is_heading));
    assert!(table.rows.iter().all(|r| !r.cells[1].is_heading));

    let ts = &set.documents()[1];
    let ts_rows = &ts.sections[0].tables[0].rows;
    assert_eq!(ts_rows[0].cells[0].text(), "ID");
    assert_eq!(ts_rows[0].cells[1].text(), "TS-1.1");
    assert_eq!(ts_rows[3].cells[0].text(), "Test Rationale");
}

#[test]
fn test_merged_label_cells_are_relabelled_once() {
    let merged = RawRow::new(vec![
        RawCell::text(50, "Purpose: long text"),
        RawCell::text(50, "Purpose: long text"),
        RawCell::text(51, "value"),
    ]);
    let mut table = tc_table();
    table.rows.push(merged);

    let source = SourceDocument::new()
        .with_paragraph(RawParagraph::bold("Test Case TC-2"))
        .with_table(table);
    let set = convert(&source);
    let row = &set.documents()[0].sections[1].tables[0].rows[3];
    assert_eq!(row.cells.len(), 2);
    assert_eq!(row.cells[0].colspan, 2);
    assert_eq!(row.cells[0].text(), "Purpose");
}

#[test]
fn test_defaults_without_headlines() {
    let source = SourceDocument::new().with_table(
        RawTable::from_text_rows(&[&["Name of the Test Case", ""]]),
    );
    let set = convert_kind(&source, DocumentKind::TestCase, &ConvertOptions::default());
    let tc = &set.documents()[0];
    assert_eq!(tc.title, "Test Case");
    assert_eq!(tc.short_title, "Test Case");
    assert_eq!(tc.description, "A Test Case");
    assert!(tc.section("Identification").unwrap().tables[0].is_empty());
    assert!(tc.section("Qualification Strategy").unwrap().paragraphs.is_empty());
}

#[test]
fn test_mapping_block_ends_at_next_specification() {
    let source = SourceDocument::new()
        .with_paragraph(RawParagraph::bold("Test Case TC-1"))
        .with_paragraph(RawParagraph::bold("Test Specification TS-1.1"))
        .with_paragraph(RawParagraph::bold("Mapping to Research Infrastructure"))
        .with_paragraph(RawParagraph::new("Smart grid lab"))
        .with_paragraph(RawParagraph::bold("Test Specification TS-1.2"))
        .with_paragraph(RawParagraph::new("Outside any block"))
        .with_table(tc_table())
        .with_table(ts_table("Basic"))
        .with_table(ts_table("Extended"));
    let set = convert(&source);

    let ts1 = &set.documents()[1];
    let mapping = ts1.section("Mapping to Research Infrastructure").unwrap();
    assert_eq!(mapping.paragraphs[0].text, "Smart grid lab");

    let ts2 = &set.documents()[2];
    assert!(ts2.section("Mapping to Research Infrastructure").is_none());
    assert_eq!(ts2.sections.len(), 1);
}
