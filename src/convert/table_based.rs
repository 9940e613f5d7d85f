//! Table-based structural converter.
//!
//! Used for template families that are a flat sequence of tables (System
//! Configuration, Control Function). Each table is classified by its shaded
//! heading cell and either grouped under a shared section, mined for the
//! document's identity, rewritten as code, or attached as a section of its own.

use crate::model::{Document, DocumentSet, Section, Table};
use crate::parser::{fuzzy, Extractor, HeadingRule};

/// Heading of a table section whose table has no heading cell.
pub const DEFAULT_SECTION_HEADING: &str = "Additional Information";

/// Role a table can play in a table-based layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// Table becomes a child section of a lazily created grouping section.
    Group {
        /// Heading label the table is recognised by
        label: &'static str,
        /// Heading of the grouping section
        section: &'static str,
        /// Label whose right neighbour names the child section
        heading_label: &'static str,
    },
    /// Table holds the document identity and is not rendered.
    Identification {
        label: &'static str,
        /// Label whose lower neighbour holds the identifier
        id_label: &'static str,
        /// Label whose lower neighbour holds the description
        description_label: &'static str,
    },
    /// Non-heading cells are rewritten as indented code blocks.
    CodeBlock { label: &'static str },
}

impl TableRole {
    /// Heading label the role is recognised by.
    pub fn label(&self) -> &'static str {
        match self {
            TableRole::Group { label, .. }
            | TableRole::Identification { label, .. }
            | TableRole::CodeBlock { label } => label,
        }
    }
}

/// Table roles and identity defaults of one template family.
#[derive(Debug, Clone, Copy)]
pub struct TableLayout {
    /// Roles in classification order
    pub roles: &'static [TableRole],
    /// Title (and short title) used when no identifier is found
    pub default_title: &'static str,
    /// Description used when none is found
    pub default_description: &'static str,
}

/// System Configuration template.
pub const SYSTEM_CONFIGURATION_LAYOUT: TableLayout = TableLayout {
    roles: &[
        TableRole::Group {
            label: "Component description",
            section: "Component descriptions",
            heading_label: "Class ID",
        },
        TableRole::Identification {
            label: "System Configuration Identification",
            id_label: "System configuration ID",
            description_label: "Name",
        },
    ],
    default_title: "System Configuration",
    default_description: "This system configuration does not have a description",
};

/// Control Function template.
pub const CONTROL_FUNCTION_LAYOUT: TableLayout = TableLayout {
    roles: &[
        TableRole::Group {
            label: "Control Function Input",
            section: "Inputs",
            heading_label: "Name",
        },
        TableRole::Group {
            label: "Control Function Output",
            section: "Outputs",
            heading_label: "Name",
        },
        TableRole::Group {
            label: "Use Case Example",
            section: "Use Cases",
            heading_label: "Use Case Example",
        },
        TableRole::Identification {
            label: "Control Function Identification",
            id_label: "Control Function ID",
            description_label: "Name",
        },
        TableRole::CodeBlock {
            label: "Algorithms",
        },
    ],
    default_title: "Control Function",
    default_description: "This control function does not have a description",
};

/// Per-conversion state: the sections built so far, the grouping sections
/// created on first use, and the identity fields found.
struct BuildContext {
    sections: Vec<Section>,
    /// Index into `sections` of each role's grouping section
    groups: Vec<Option<usize>>,
    id: Option<String>,
    description: Option<String>,
}

impl BuildContext {
    fn new(role_count: usize) -> Self {
        Self {
            sections: Vec::new(),
            groups: vec![None; role_count],
            id: None,
            description: None,
        }
    }

    fn group(&mut self, role: usize, heading: &str) -> &mut Section {
        let index = match self.groups[role] {
            Some(index) => index,
            None => {
                self.sections.push(Section::new(heading));
                let index = self.sections.len() - 1;
                self.groups[role] = Some(index);
                index
            }
        };
        &mut self.sections[index]
    }
}

/// Converter for table-based template families.
pub struct TableBasedConverter<'a> {
    extractor: &'a Extractor<'a>,
    layout: &'a TableLayout,
}

impl<'a> TableBasedConverter<'a> {
    /// Create a converter for a layout.
    pub fn new(extractor: &'a Extractor<'a>, layout: &'a TableLayout) -> Self {
        Self { extractor, layout }
    }

    /// Convert every table of the source into one document.
    pub fn convert(&self) -> DocumentSet {
        let labels: Vec<&str> = self.layout.roles.iter().map(TableRole::label).collect();
        let mut ctx = BuildContext::new(labels.len());

        for raw in self.extractor.source().tables() {
            let table = self.extractor.table(raw, HeadingRule::Shading);
            let heading = table.heading();
            let role = heading
                .as_deref()
                .and_then(|h| fuzzy::classify(h, &labels));

            match role {
                Some(index) => self.apply_role(&mut ctx, index, table, heading),
                None => push_table_section(&mut ctx, table, heading),
            }
        }

        let document = self.build_document(ctx);
        let mut set = DocumentSet::new();
        set.push(document);
        set
    }

    fn apply_role(&self, ctx: &mut BuildContext, index: usize, mut table: Table, heading: Option<String>) {
        match self.layout.roles[index] {
            TableRole::Group {
                section,
                heading_label,
                ..
            } => {
                let child_heading = table
                    .find_cell_text(heading_label, 1, 0)
                    .filter(|h| !h.is_empty())
                    .or(heading)
                    .unwrap_or_else(|| DEFAULT_SECTION_HEADING.to_string());
                table.remove_first_row();
                ctx.group(index, section)
                    .add_sub_section(Section::new(child_heading).with_table(table));
            }
            TableRole::Identification {
                id_label,
                description_label,
                ..
            } => {
                if let Some(id) = non_empty(table.find_cell_text(id_label, 0, 1)) {
                    ctx.id = Some(id);
                }
                if let Some(description) = non_empty(table.find_cell_text(description_label, 0, 1)) {
                    ctx.description = Some(description);
                }
            }
            TableRole::CodeBlock { .. } => {
                for cell in table.cells_mut().filter(|c| !c.is_heading) {
                    let code = cell
                        .text()
                        .split('\n')
                        .map(|line| format!("    {}", line))
                        .collect::<Vec<_>>()
                        .join("\n");
                    cell.set_text(code);
                }
                push_table_section(ctx, table, heading);
            }
        }
    }

    fn build_document(&self, ctx: BuildContext) -> Document {
        let (title, short_title) = match ctx.id {
            Some(ref id) => (format!("{} {}", self.layout.default_title, id), id.clone()),
            None => (
                self.layout.default_title.to_string(),
                self.layout.default_title.to_string(),
            ),
        };
        let description = ctx
            .description
            .unwrap_or_else(|| self.layout.default_description.to_string());

        let mut document = Document::new(title, short_title, description);
        for section in ctx.sections {
            document.add_section(section);
        }
        document
    }
}

fn push_table_section(ctx: &mut BuildContext, table: Table, heading: Option<String>) {
    let heading = heading.unwrap_or_else(|| DEFAULT_SECTION_HEADING.to_string());
    ctx.sections.push(Section::new(heading).with_table(table));
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
