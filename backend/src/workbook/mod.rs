//! In-memory workbook model.
//!
//! Both pipelines read a file into this model, edit it with 1-based
//! `(row, column)` addressing, and hand it to a writer. The model carries
//! values and the declarative [`style::CellStyle`] only; anything else an
//! input file had (merges, fonts, conditional formats) is not loaded.
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │ .xls / .xlsx │────▶│  Workbook   │────▶│ styled .xlsx │
//! │   (reader)   │     │ (edit here) │     │   (writer)   │
//! └──────────────┘     └─────────────┘     └──────────────┘
//! ```

pub mod dates;
pub mod reader;
pub mod style;
pub mod writer;

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use style::CellStyle;

/// A cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text shown for the value when rendered in a cell.
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => dates::format_dmy(dt),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A cell: value plus style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

/// Maximal occupied row and column of a sheet (0 when empty).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extent {
    pub rows: u32,
    pub cols: u32,
}

/// A named grid of cells, addressed 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    column_widths: BTreeMap<u32, f64>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a sheet from row-major values starting at A1.
    pub fn from_rows<V: Into<CellValue>>(name: impl Into<String>, rows: Vec<Vec<V>>) -> Self {
        let mut sheet = Self::new(name);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                sheet.set_value(r as u32 + 1, c as u32 + 1, value.into());
            }
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of allocated rows (may exceed the occupied extent).
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cell(row, col).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(col as usize - 1))
    }

    /// Mutable cell, growing the grid as needed.
    ///
    /// # Panics
    /// When `row` or `col` is 0.
    pub fn cell_mut(&mut self, row: u32, col: u32) -> &mut Cell {
        assert!(row > 0 && col > 0, "cell addresses are 1-based");
        let (r, c) = (row as usize - 1, col as usize - 1);
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut self.rows[r];
        if cells.len() <= c {
            cells.resize_with(c + 1, Cell::default);
        }
        &mut cells[c]
    }

    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() && self.cell(row, col).is_none() {
            return;
        }
        self.cell_mut(row, col).value = value;
    }

    pub fn clear_value(&mut self, row: u32, col: u32) {
        self.set_value(row, col, CellValue::Empty);
    }

    /// Values of columns `1..=cols` of `row`.
    pub fn row_values(&self, row: u32, cols: u32) -> Vec<CellValue> {
        (1..=cols).map(|c| self.value(row, c).clone()).collect()
    }

    /// Maximal occupied row and column; styled-but-empty cells do not count.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::default();
        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if !cell.value.is_empty() {
                    extent.rows = extent.rows.max(r as u32 + 1);
                    extent.cols = extent.cols.max(c as u32 + 1);
                }
            }
        }
        extent
    }

    /// Insert an empty column before `col`, shifting the rest right.
    pub fn insert_column(&mut self, col: u32) {
        let at = col.max(1) as usize - 1;
        for row in &mut self.rows {
            if row.len() > at {
                row.insert(at, Cell::default());
            }
        }
        self.column_widths = std::mem::take(&mut self.column_widths)
            .into_iter()
            .map(|(c, w)| if c >= col { (c + 1, w) } else { (c, w) })
            .collect();
    }

    /// Delete column `col`, shifting the rest left.
    pub fn delete_column(&mut self, col: u32) {
        let at = col.max(1) as usize - 1;
        for row in &mut self.rows {
            if row.len() > at {
                row.remove(at);
            }
        }
        self.column_widths = std::mem::take(&mut self.column_widths)
            .into_iter()
            .filter(|(c, _)| *c != col)
            .map(|(c, w)| if c > col { (c - 1, w) } else { (c, w) })
            .collect();
    }

    /// Ensure at least `count` rows are allocated.
    pub fn ensure_rows(&mut self, count: u32) {
        if self.rows.len() < count as usize {
            self.rows.resize_with(count as usize, Vec::new);
        }
    }

    /// Delete `row`, shifting the rows below up.
    pub fn delete_row(&mut self, row: u32) {
        let at = row.max(1) as usize - 1;
        if at < self.rows.len() {
            self.rows.remove(at);
        }
    }

    /// Drop every row after `last`.
    pub fn truncate_rows(&mut self, last: u32) {
        self.rows.truncate(last as usize);
    }

    /// Reset every cell style and column width.
    pub fn clear_formatting(&mut self) {
        for cell in self.rows.iter_mut().flatten() {
            cell.style = CellStyle::default();
        }
        self.column_widths.clear();
    }

    pub fn style_mut(&mut self, row: u32, col: u32) -> &mut CellStyle {
        &mut self.cell_mut(row, col).style
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn column_width(&self, col: u32) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn column_widths(&self) -> &BTreeMap<u32, f64> {
        &self.column_widths
    }

    /// Allocated cells as `(row, col, cell)`, 1-based.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, cell)| (r as u32 + 1, c as u32 + 1, cell))
        })
    }
}

/// Ordered collection of sheets; the first one is the active sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(Sheet::name).collect()
    }

    pub fn active(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    pub fn active_mut(&mut self) -> Option<&mut Sheet> {
        self.sheets.first_mut()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Sheet {
        Sheet::from_rows(
            "Hoja1",
            vec![
                vec!["a1", "b1", "c1"],
                vec!["a2", "b2", "c2"],
            ],
        )
    }

    #[test]
    fn test_extent_ignores_styled_empty_cells() {
        let mut sheet = grid();
        sheet.style_mut(10, 10).bold = true;
        assert_eq!(sheet.extent(), Extent { rows: 2, cols: 3 });
    }

    #[test]
    fn test_insert_column_shifts_right() {
        let mut sheet = grid();
        sheet.insert_column(1);
        assert!(sheet.value(1, 1).is_empty());
        assert_eq!(sheet.value(1, 2).as_text(), Some("a1"));
        assert_eq!(sheet.value(2, 4).as_text(), Some("c2"));
        assert_eq!(sheet.extent(), Extent { rows: 2, cols: 4 });
    }

    #[test]
    fn test_delete_column_keeps_left_columns() {
        let mut sheet = grid();
        sheet.delete_column(2);
        assert_eq!(sheet.value(1, 1).as_text(), Some("a1"));
        assert_eq!(sheet.value(1, 2).as_text(), Some("c1"));
        assert_eq!(sheet.extent().cols, 2);
    }

    #[test]
    fn test_row_edits() {
        let mut sheet = grid();
        sheet.ensure_rows(4);
        assert_eq!(sheet.row_count(), 4);
        sheet.delete_row(1);
        assert_eq!(sheet.value(1, 1).as_text(), Some("a2"));
        sheet.truncate_rows(0);
        assert_eq!(sheet.extent(), Extent::default());
    }

    #[test]
    fn test_set_empty_on_missing_cell_does_not_grow() {
        let mut sheet = grid();
        sheet.clear_value(50, 50);
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_column_widths_follow_structure() {
        let mut sheet = grid();
        sheet.set_column_width(2, 12.0);
        sheet.insert_column(1);
        assert_eq!(sheet.column_width(3), Some(12.0));
        sheet.delete_column(1);
        assert_eq!(sheet.column_width(2), Some(12.0));
    }

    #[test]
    fn test_render_numbers() {
        assert_eq!(CellValue::Number(1500.0).render(), "1500");
        assert_eq!(CellValue::Number(12.5).render(), "12.5");
    }
}
