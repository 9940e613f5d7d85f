//! Markdown rendering for converted documents.

use crate::error::Result;
use crate::model::{Document, Paragraph, Section, Table, TableCell, TableRow};

use super::RenderOptions;

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(self, doc: &Document) -> Result<String> {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&self.frontmatter(doc));
        }

        for section in &doc.sections {
            self.render_section(&mut output, section);
        }

        let mut output = output.trim_end().to_string();
        output.push('\n');
        Ok(output)
    }

    /// YAML front matter block: title, linkTitle, date, description, weight.
    pub fn frontmatter(&self, doc: &Document) -> String {
        let date = self.options.resolved_date().format("%Y-%m-%d").to_string();
        let lines = [
            "---".to_string(),
            format!("title: '{}'", escape_yaml(&doc.title)),
            format!("linkTitle: '{}'", escape_yaml(&doc.short_title)),
            format!("date: '{}'", date),
            format!("description: '{}'", escape_yaml(&doc.description)),
            format!("weight: {}", doc.weight()),
            "---".to_string(),
        ];
        let mut out = lines.join("\n");
        out.push_str("\n\n");
        out
    }

    fn render_section(&self, output: &mut String, section: &Section) {
        output.push_str(&section.marker());
        output.push(' ');
        output.push_str(section.heading.trim());
        output.push_str("\n\n");

        for para in &section.paragraphs {
            self.render_paragraph(output, para);
        }
        for table in &section.tables {
            self.render_table(output, table);
        }
        for child in &section.sub_sections {
            self.render_section(output, child);
        }
    }

    fn render_paragraph(&self, output: &mut String, para: &Paragraph) {
        if para.is_empty() {
            return;
        }

        if !para.text.trim().is_empty() {
            output.push_str(para.text.trim_end());
            output.push_str("\n\n");
        }
        for graphic in &para.graphics {
            self.render_image(output, &graphic.name);
        }
        for equation in &para.equations {
            output.push_str(&equation.mathml);
            output.push_str("\n\n");
        }
    }

    fn render_table(&self, output: &mut String, table: &Table) {
        if table.is_empty() {
            return;
        }

        output.push_str("<table>\n");
        for row in &table.rows {
            self.render_html_row(output, row);
        }
        output.push_str("</table>\n\n");
    }

    fn render_html_row(&self, output: &mut String, row: &TableRow) {
        output.push_str("<tr>");
        for cell in &row.cells {
            let tag = if cell.is_heading { "th" } else { "td" };
            let attrs = if cell.colspan > 1 {
                format!(" colspan=\"{}\"", cell.colspan)
            } else {
                String::new()
            };
            output.push_str(&format!("<{}{}>", tag, attrs));
            output.push_str(&self.cell_content(cell));
            output.push_str(&format!("</{}>", tag));
        }
        output.push_str("</tr>\n");
    }

    fn cell_content(&self, cell: &TableCell) -> String {
        let mut parts = Vec::new();
        for para in &cell.paragraphs {
            if !para.text.trim().is_empty() {
                parts.push(para.markup());
            }
            for graphic in &para.graphics {
                parts.push(format!(
                    "<img src=\"{}{}\" alt=\"{}\"/>",
                    self.options.image_path_prefix,
                    escape_html(&graphic.name),
                    escape_html(&graphic.name)
                ));
            }
            for equation in &para.equations {
                parts.push(equation.mathml.clone());
            }
        }
        // Blank lines inside a cell would end the HTML block in Markdown.
        parts.join("").replace("\n\n", "\n")
    }

    fn render_image(&self, output: &mut String, name: &str) {
        let path = format!("{}{}", self.options.image_path_prefix, name);
        output.push_str(&format!("![{}]({})\n\n", name, path));
    }
}

/// Escape a value for a single-quoted YAML scalar.
fn escape_yaml(s: &str) -> String {
    s.replace('\'', "''").replace('\n', " ")
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
