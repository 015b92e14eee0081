//! Declarative cell styling.
//!
//! Styles are applied as `(Region, StyleRule)` pairs; the writer translates the
//! resulting [`CellStyle`] into the output library's formats.

use super::Sheet;

/// Border line weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderWeight {
    Thin,
    Medium,
}

/// Per-edge borders of a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Borders {
    pub top: Option<BorderWeight>,
    pub bottom: Option<BorderWeight>,
    pub left: Option<BorderWeight>,
    pub right: Option<BorderWeight>,
}

impl Borders {
    pub fn all(weight: BorderWeight) -> Self {
        Self {
            top: Some(weight),
            bottom: Some(weight),
            left: Some(weight),
            right: Some(weight),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Visual style of one cell. Colors are `0xRRGGBB`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStyle {
    pub bold: bool,
    pub font_color: Option<u32>,
    pub font_size: Option<f64>,
    pub fill: Option<u32>,
    pub center: bool,
    pub wrap: bool,
    pub borders: Borders,
    pub num_format: Option<String>,
}

impl CellStyle {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Inclusive, 1-based rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub first_row: u32,
    pub last_row: u32,
    pub first_col: u32,
    pub last_col: u32,
}

impl Region {
    pub fn new(first_row: u32, last_row: u32, first_col: u32, last_col: u32) -> Self {
        Self {
            first_row,
            last_row,
            first_col,
            last_col,
        }
    }

    pub fn row(row: u32, first_col: u32, last_col: u32) -> Self {
        Self::new(row, row, first_col, last_col)
    }

    pub fn column(col: u32, first_row: u32, last_row: u32) -> Self {
        Self::new(first_row, last_row, col, col)
    }

    pub fn is_empty(&self) -> bool {
        self.first_row == 0
            || self.first_col == 0
            || self.last_row < self.first_row
            || self.last_col < self.first_col
    }

    fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.first_row..=self.last_row)
            .flat_map(move |r| (self.first_col..=self.last_col).map(move |c| (r, c)))
    }
}

/// One styling instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleRule {
    Font {
        bold: bool,
        color: u32,
        size: f64,
    },
    SolidFill(u32),
    Alignment {
        center: bool,
        wrap: bool,
    },
    /// Same weight on every edge of every cell.
    Border(BorderWeight),
    /// `outer` on the rectangle's perimeter, `inner` on edges between cells.
    Grid {
        outer: BorderWeight,
        inner: BorderWeight,
    },
    NumberFormat(String),
}

/// Apply `rules` in order to every cell of `region`.
pub fn apply(sheet: &mut Sheet, region: Region, rules: &[StyleRule]) {
    if region.is_empty() {
        return;
    }
    for rule in rules {
        for (row, col) in region.cells() {
            let style = sheet.style_mut(row, col);
            apply_rule(style, &region, row, col, rule);
        }
    }
}

fn apply_rule(style: &mut CellStyle, region: &Region, row: u32, col: u32, rule: &StyleRule) {
    match rule {
        StyleRule::Font { bold, color, size } => {
            style.bold = *bold;
            style.font_color = Some(*color);
            style.font_size = Some(*size);
        }
        StyleRule::SolidFill(color) => style.fill = Some(*color),
        StyleRule::Alignment { center, wrap } => {
            style.center = *center;
            style.wrap = *wrap;
        }
        StyleRule::Border(weight) => style.borders = Borders::all(*weight),
        StyleRule::Grid { outer, inner } => {
            let edge = |on_perimeter: bool| Some(if on_perimeter { *outer } else { *inner });
            style.borders = Borders {
                top: edge(row == region.first_row),
                bottom: edge(row == region.last_row),
                left: edge(col == region.first_col),
                right: edge(col == region.last_col),
            };
        }
        StyleRule::NumberFormat(code) => style.num_format = Some(code.clone()),
    }
}
