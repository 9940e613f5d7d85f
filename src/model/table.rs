//! Table types.

use super::Paragraph;
use crate::parser::fuzzy;
use serde::{Deserialize, Serialize};

/// A table structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Append a row of single-paragraph cells; columns listed in
    /// `heading_cols` become heading cells.
    pub fn add_simple_row<S: Into<String>>(
        &mut self,
        values: impl IntoIterator<Item = S>,
        heading_cols: &[usize],
    ) {
        self.rows.push(TableRow::from_strings(values, heading_cols));
    }

    /// Insert a row of single-paragraph cells at `index` (appends when out of range).
    pub fn insert_simple_row<S: Into<String>>(
        &mut self,
        index: usize,
        values: impl IntoIterator<Item = S>,
        heading_cols: &[usize],
    ) {
        let row = TableRow::from_strings(values, heading_cols);
        if index < self.rows.len() {
            self.rows.insert(index, row);
        } else {
            self.rows.push(row);
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Heading of the table: the text of cell (0, 0) when it is a heading cell.
    pub fn heading(&self) -> Option<String> {
        let first = self.rows.first()?.cells.first()?;
        if first.is_heading {
            Some(first.text())
        } else {
            None
        }
    }

    /// Remove and return the first row.
    pub fn remove_first_row(&mut self) -> Option<TableRow> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.remove(0))
        }
    }

    /// Look up a value relative to a labelled cell.
    ///
    /// Scans cells in row-major order for the first whose text fuzzily matches
    /// `label` and returns the text of the cell at
    /// `(row + row_offset, col + col_offset)`, or `None` when that position
    /// does not exist.
    pub fn find_cell_text(
        &self,
        label: &str,
        col_offset: isize,
        row_offset: isize,
    ) -> Option<String> {
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.cells.iter().enumerate() {
                if !fuzzy::strings_equal(&cell.text(), label) {
                    continue;
                }
                let target = offset(r, row_offset)
                    .zip(offset(c, col_offset))
                    .and_then(|(tr, tc)| self.rows.get(tr)?.cells.get(tc));
                if let Some(cell) = target {
                    return Some(cell.text());
                }
            }
        }
        None
    }

    /// Iterate over every cell of the table mutably.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.rows.iter_mut().flat_map(|r| r.cells.iter_mut())
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn offset(index: usize, delta: isize) -> Option<usize> {
    index.checked_add_signed(delta)
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(
        values: impl IntoIterator<Item = S>,
        heading_cols: &[usize],
    ) -> Self {
        let cells = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let cell = TableCell::from_text(v);
                if heading_cols.contains(&i) {
                    cell.heading()
                } else {
                    cell
                }
            })
            .collect();
        Self::new(cells)
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
///
/// Horizontally merged source cells collapse into one cell whose `colspan`
/// carries the merge count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell content (paragraphs)
    pub paragraphs: Vec<Paragraph>,

    /// Whether the cell is a heading cell
    pub is_heading: bool,

    /// Number of columns this cell spans
    pub colspan: u32,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::with_content(vec![Paragraph::with_text(text)])
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::with_content(Vec::new())
    }

    /// Create a cell with multiple paragraphs.
    pub fn with_content(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            is_heading: false,
            colspan: 1,
        }
    }

    /// Mark the cell as a heading cell and return self.
    pub fn heading(mut self) -> Self {
        self.is_heading = true;
        self
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u32) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Text of the cell: its paragraphs' text joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace the content with a single paragraph.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.paragraphs = vec![Paragraph::with_text(text)];
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.text().trim().is_empty()
    }
}

impl Default for TableCell {
    fn default() -> Self {
        Self::empty()
    }
}
