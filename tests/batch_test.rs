//! Integration tests for batch conversion into a folder tree.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::NaiveDate;
use htd2md::batch::{self, BatchOptions, INDEX_FILE, INDEX_JSON_FILE};
use htd2md::{ConvertOptions, RenderOptions};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn docx(body: &str, media: Option<(&str, &[u8])>) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"
  xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buf);
        let options = SimpleFileOptions::default();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document.as_bytes()).unwrap();
        if let Some((name, data)) = media {
            let rels = format!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="image" Target="media/{name}"/></Relationships>"#
            );
            zip.start_file("word/_rels/document.xml.rels", options).unwrap();
            zip.write_all(rels.as_bytes()).unwrap();
            zip.start_file(format!("word/media/{name}"), options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buf.into_inner()
}

fn p(text: &str, bold: bool) -> String {
    let rpr = if bold { "<w:rPr><w:b/></w:rPr>" } else { "" };
    format!(r#"<w:p><w:r>{rpr}<w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#)
}

fn tbl(rows: &[[&str; 2]]) -> String {
    let rows: String = rows
        .iter()
        .map(|[a, b]| format!("<w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr>", p(a, false), p(b, false)))
        .collect();
    format!("<w:tbl>{rows}</w:tbl>")
}

fn test_case_docx() -> Vec<u8> {
    let figure = r#"<w:p><w:r><w:drawing><a:graphic><a:graphicData><a:blip r:embed="rId1"/></a:graphicData></a:graphic></w:drawing></w:r></w:p>"#;
    let body = [
        p("Test Case TC-3", true),
        tbl(&[["Name of the Test Case", "Ramp test"]]),
        p("Test Specification TS-3.1", true),
        tbl(&[["Ref", "TC-3"], ["Title of Test", "Ramp up"]]),
        p("Mapping to Research Infrastructure", true),
        figure.to_string(),
        p("Experiment Specification ES-3.1.1", true),
        tbl(&[
            ["Ref", "TC-3"],
            ["Title of Experiment", "Ramp at lab"],
            ["Reference to Test Specification", "TS-3.1"],
        ]),
    ]
    .concat();
    docx(&body, Some(("ramp.emf", b"EMF!")))
}

fn options() -> BatchOptions {
    BatchOptions::new()
        .with_parallel(false)
        .with_render_options(
            RenderOptions::new().with_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()),
        )
}

#[test]
fn test_single_file_tree() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("ramp.docx");
    fs::write(&input, test_case_docx()).unwrap();
    let out = tmp.path().join("site");

    let report = batch::run(&input, &out, &options()).unwrap();
    assert!(report.is_success());
    assert_eq!(report.documents_written(), 3);
    assert_eq!(report.attachments_written(), 1);

    let tc = fs::read_to_string(out.join(INDEX_FILE)).unwrap();
    assert!(tc.contains("title: 'Test Case TC-3'"));
    assert!(tc.contains("date: '2024-01-31'"));
    assert!(tc.contains("weight: 1\n"));

    let ts_dir = out.join("TS-3.1");
    assert!(ts_dir.join(INDEX_FILE).is_file());
    assert_eq!(fs::read(ts_dir.join("ramp.emf")).unwrap(), b"EMF!");
    let ts = fs::read_to_string(ts_dir.join(INDEX_FILE)).unwrap();
    assert!(ts.contains("![ramp.emf](ramp.emf)"));

    let es = out.join("TS-3.1").join("ES-3.1.1").join(INDEX_FILE);
    assert!(fs::read_to_string(es).unwrap().contains("description: 'Ramp at lab'"));
}

#[test]
fn test_create_folder_json_and_png() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("ramp.docx");
    fs::write(&input, test_case_docx()).unwrap();
    let out = tmp.path().join("site");

    let options = options()
        .with_create_folder(true)
        .with_json(true)
        .with_convert_options(ConvertOptions::new().with_force_png(true));
    let report = batch::run(&input, &out, &options).unwrap();
    assert!(report.is_success());

    let root = out.join("ramp");
    assert!(root.join(INDEX_FILE).is_file());
    assert!(root.join(INDEX_JSON_FILE).is_file());
    assert!(root.join("TS-3.1").join("ramp.png").is_file());
    assert!(!root.join("TS-3.1").join("ramp.emf").exists());
}

#[test]
fn test_recursive_folder_with_broken_input() {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir_all(docs.join("area")).unwrap();
    fs::write(docs.join("area").join("ramp.docx"), test_case_docx()).unwrap();
    fs::write(docs.join("broken.docx"), b"not a package").unwrap();
    let unknown = docx(&tbl(&[["Unrelated", "table"]]), None);
    fs::write(docs.join("unknown.docx"), unknown).unwrap();
    let out = tmp.path().join("site");

    let flat = batch::run(&docs, &out, &options()).unwrap();
    assert_eq!(flat.converted.len(), 0);
    assert_eq!(flat.failed.len(), 2);

    let deep = batch::run(&docs, &out, &options().with_recurse(true).with_parallel(true)).unwrap();
    assert_eq!(deep.converted.len(), 1);
    assert_eq!(deep.failed.len(), 2);
    assert!(out.join("area").join("TS-3.1").join(INDEX_FILE).is_file());
    assert!(!out.join("TS-3.1").exists());
}

#[test]
fn test_missing_input_is_an_error() {
    let tmp = TempDir::new().unwrap();
    assert!(batch::run(&tmp.path().join("nope"), Path::new("out"), &options()).is_err());
}
