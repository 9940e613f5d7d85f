//! `.docx` package reader.
//!
//! Materializes the parts of a Word package the converters query into a
//! [`SourceDocument`]: body paragraphs and tables, numbering definitions and
//! the media parts referenced from the body.

use super::{
    LevelIndent, MediaPart, NumberingDefinitions, NumberingLevel, NumberingRef, RawCell,
    RawEquation, RawParagraph, RawRow, RawRun, RawTable, SourceDocument,
};
use crate::error::{Error, Result};
use roxmltree::{Document as XmlDocument, Node};
use std::collections::{BTreeSet, HashMap};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const MATH_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";
const NUMBERING_PART: &str = "word/numbering.xml";

/// EMU per twip.
const EMU_PER_TWIP: i64 = 635;

/// Reader for `.docx` packages.
pub struct DocxReader;

impl DocxReader {
    /// Read a `.docx` file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SourceDocument> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Read a `.docx` package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<SourceDocument> {
        Self::from_reader(Cursor::new(data))
    }

    /// Read a `.docx` package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<SourceDocument> {
        let mut zip = ZipArchive::new(reader)?;

        let document_xml = read_zip_text(&mut zip, DOCUMENT_PART)
            .ok_or_else(|| Error::InvalidDocx(format!("missing {}", DOCUMENT_PART)))?;
        let xml = XmlDocument::parse(strip_bom(&document_xml))?;

        let relationships = read_relationships(&mut zip);
        let numbering = read_numbering(&mut zip)?;

        let mut ctx = BodyContext {
            text: strip_bom(&document_xml),
            media_ids: BTreeSet::new(),
            next_cell_id: 0,
        };

        let mut source = SourceDocument::new();
        if let Some(body) = xml.root_element().children().find(|n| is_wml(n, "body")) {
            for node in body.children() {
                if is_wml(&node, "p") {
                    source.add_paragraph(ctx.paragraph(&node));
                } else if is_wml(&node, "tbl") {
                    source.add_table(ctx.table(&node));
                }
            }
        }

        if let Some(numbering) = numbering {
            source = source.with_numbering(numbering);
        }

        for id in &ctx.media_ids {
            match load_media(&mut zip, &relationships, id) {
                Some(part) => source.add_media(id.clone(), part),
                None => log::warn!("Relationship '{}' does not resolve to a media part", id),
            }
        }

        log::debug!(
            "Read package: {} paragraphs, {} tables, {} media parts",
            source.paragraphs.len(),
            source.tables.len(),
            source.media.len()
        );
        Ok(source)
    }
}

struct BodyContext<'x> {
    text: &'x str,
    media_ids: BTreeSet<String>,
    next_cell_id: usize,
}

impl BodyContext<'_> {
    fn paragraph(&mut self, p: &Node) -> RawParagraph {
        let mut runs = Vec::new();
        collect_runs(p, &mut runs);

        let numbering = child(p, "pPr")
            .and_then(|ppr| child(&ppr, "numPr"))
            .and_then(|numpr| {
                let level = child(&numpr, "ilvl").and_then(|n| wml_attr(&n, "val"))?;
                let num_id = child(&numpr, "numId").and_then(|n| wml_attr(&n, "val"))?;
                Some(NumberingRef {
                    num_id: num_id.to_string(),
                    level: level.to_string(),
                })
            });

        let mut media = Vec::new();
        for drawing in p.descendants().filter(|n| is_wml(n, "drawing")) {
            let embed = drawing
                .descendants()
                .filter(|n| is_tag(n, "blip"))
                .find_map(|blip| blip.attribute((REL_NS, "embed")));
            if let Some(id) = embed {
                media.push(id.to_string());
            }
        }
        for imagedata in p.descendants().filter(|n| is_tag(n, "imagedata")) {
            if let Some(id) = imagedata.attribute((REL_NS, "id")) {
                media.push(id.to_string());
            }
        }
        self.media_ids.extend(media.iter().cloned());

        let equations = p
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().namespace() == Some(MATH_NS))
            .filter(|n| n.tag_name().name() == "oMath")
            .filter_map(|n| self.text.get(n.range()))
            .map(RawEquation::new)
            .collect();

        RawParagraph {
            runs,
            numbering,
            media,
            equations,
        }
    }

    fn table(&mut self, tbl: &Node) -> RawTable {
        let mut rows: Vec<RawRow> = Vec::new();
        for tr in children(tbl, "tr") {
            let mut cells: Vec<RawCell> = Vec::new();
            for tc in children(&tr, "tc") {
                let tc_pr = child(&tc, "tcPr");
                let span = tc_pr
                    .and_then(|pr| child(&pr, "gridSpan"))
                    .and_then(|n| wml_attr(&n, "val"))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .max(1);
                let continues = tc_pr
                    .and_then(|pr| child(&pr, "vMerge"))
                    .map(|n| wml_attr(&n, "val") != Some("restart"))
                    .unwrap_or(false);

                let above = rows.last().and_then(|r| r.cells.get(cells.len()));
                let cell = match above {
                    Some(above) if continues => above.clone(),
                    _ => self.cell(&tc),
                };
                for _ in 0..span {
                    cells.push(cell.clone());
                }
            }
            rows.push(RawRow::new(cells));
        }
        RawTable::new(rows)
    }

    fn cell(&mut self, tc: &Node) -> RawCell {
        self.next_cell_id += 1;
        let mut cell = RawCell::new(self.next_cell_id);
        for node in tc.children() {
            if is_wml(&node, "p") {
                cell.paragraphs.push(self.paragraph(&node));
            } else if is_wml(&node, "tbl") {
                cell.tables.push(self.table(&node));
            }
        }
        cell.shading = tc
            .descendants()
            .filter(|n| is_wml(n, "shd"))
            .find_map(|n| wml_attr(&n, "fill"))
            .map(str::to_string);
        cell
    }
}

fn collect_runs(node: &Node, out: &mut Vec<RawRun>) {
    for c in node.children().filter(|c| c.is_element()) {
        match c.tag_name().name() {
            "r" if is_wml(&c, "r") => out.push(run(&c)),
            "hyperlink" | "ins" | "smartTag" | "fldSimple" | "customXml" => collect_runs(&c, out),
            _ => {}
        }
    }
}

fn run(r: &Node) -> RawRun {
    let mut text = String::new();
    for c in r.children().filter(|c| c.is_element()) {
        match c.tag_name().name() {
            "t" => text.push_str(c.text().unwrap_or("")),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    let bold = child(r, "rPr")
        .and_then(|rpr| child(&rpr, "b"))
        .map(|b| read_on_off(&b));
    RawRun { text, bold }
}

fn read_on_off(node: &Node) -> bool {
    let value = wml_attr(node, "val").map(|v| v.to_ascii_lowercase());
    !matches!(value.as_deref(), Some("0") | Some("false") | Some("off"))
}

fn read_zip_text<R: Read + Seek>(zip: &mut ZipArchive<R>, path: &str) -> Option<String> {
    let mut file = zip.by_name(path).ok()?;
    let mut s = String::new();
    file.read_to_string(&mut s).ok()?;
    Some(s)
}

fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{FEFF}').unwrap_or(s)
}

/// Relationship id → package part path.
fn read_relationships<R: Read + Seek>(zip: &mut ZipArchive<R>) -> HashMap<String, String> {
    let Some(text) = read_zip_text(zip, DOCUMENT_RELS_PART) else {
        return HashMap::new();
    };
    let Ok(xml) = XmlDocument::parse(strip_bom(&text)) else {
        log::warn!("Malformed {}, ignoring relationships", DOCUMENT_RELS_PART);
        return HashMap::new();
    };

    xml.descendants()
        .filter(|n| is_tag(n, "Relationship"))
        .filter(|n| n.attribute("TargetMode") != Some("External"))
        .filter_map(|n| Some((n.attribute("Id")?, n.attribute("Target")?)))
        .map(|(id, target)| (id.to_string(), part_path(target)))
        .collect()
}

fn part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("word/{}", target.trim_start_matches("./")),
    }
}

fn load_media<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
    id: &str,
) -> Option<MediaPart> {
    let path = relationships.get(id)?;
    let mut file = zip.by_name(path).ok()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).ok()?;
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    Some(MediaPart::new(name, data))
}

fn read_numbering<R: Read + Seek>(zip: &mut ZipArchive<R>) -> Result<Option<NumberingDefinitions>> {
    let Some(text) = read_zip_text(zip, NUMBERING_PART) else {
        return Ok(None);
    };
    let xml = XmlDocument::parse(strip_bom(&text))?;
    let mut defs = NumberingDefinitions::new();

    for num in xml.descendants().filter(|n| is_wml(n, "num")) {
        let abstract_id = child(&num, "abstractNumId").and_then(|n| wml_attr(&n, "val"));
        if let (Some(num_id), Some(abstract_id)) = (wml_attr(&num, "numId"), abstract_id) {
            defs.instances.insert(num_id.to_string(), abstract_id.to_string());
        }
    }

    for abs in xml.descendants().filter(|n| is_wml(n, "abstractNum")) {
        let Some(abstract_id) = wml_attr(&abs, "abstractNumId") else {
            continue;
        };
        let levels = defs.abstracts.entry(abstract_id.to_string()).or_default();
        for lvl in children(&abs, "lvl") {
            let Some(ilvl) = wml_attr(&lvl, "ilvl") else {
                continue;
            };
            let format = child(&lvl, "numFmt")
                .and_then(|n| wml_attr(&n, "val"))
                .map(str::to_string);
            let indent = child(&lvl, "pPr")
                .and_then(|ppr| child(&ppr, "ind"))
                .map(|ind| LevelIndent {
                    left: wml_attr(&ind, "left")
                        .or_else(|| wml_attr(&ind, "start"))
                        .and_then(|v| v.parse::<i64>().ok())
                        .map(|twips| twips * EMU_PER_TWIP),
                });
            levels.insert(ilvl.to_string(), NumberingLevel { format, indent });
        }
    }

    Ok(Some(defs))
}

fn is_tag(node: &Node, local: &str) -> bool {
    node.is_element() && node.tag_name().name() == local
}

fn is_wml(node: &Node, local: &str) -> bool {
    is_tag(node, local) && node.tag_name().namespace() == Some(WML_NS)
}

fn wml_attr<'a>(node: &Node<'a, '_>, local: &str) -> Option<&'a str> {
    node.attribute((WML_NS, local))
}

fn child<'a, 'input>(node: &Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_wml(n, local))
}

fn children<'a, 'input: 'a>(
    node: &Node<'a, 'input>,
    local: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |n| is_wml(n, local))
}
