//! Write the in-memory model to a styled `.xlsx` file.

use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook as XlsxWorkbook, Worksheet,
};
use std::path::Path;

use super::style::{BorderWeight, CellStyle};
use super::{dates, Cell, CellValue, Workbook};
use crate::error::WorkbookResult;

const DATE_FORMAT: &str = "dd/mm/yyyy";
const DATETIME_FORMAT: &str = "dd/mm/yyyy hh:mm";

/// Write every sheet of `workbook` to `path`.
pub fn write_workbook(path: &Path, workbook: &Workbook) -> WorkbookResult<()> {
    let mut out = XlsxWorkbook::new();

    for sheet in workbook.sheets() {
        let worksheet = out.add_worksheet();
        worksheet.set_name(sheet.name())?;

        for (row, col, cell) in sheet.cells() {
            write_cell(worksheet, row - 1, (col - 1) as u16, cell)?;
        }

        for (col, width) in sheet.column_widths() {
            worksheet.set_column_width((*col - 1) as u16, *width)?;
        }
    }

    out.save(path)?;
    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Cell) -> WorkbookResult<()> {
    match &cell.value {
        CellValue::Empty => {
            if !cell.style.is_default() {
                worksheet.write_blank(row, col, &to_format(&cell.style, None))?;
            }
        }
        CellValue::Text(s) => {
            worksheet.write_string_with_format(row, col, s, &to_format(&cell.style, None))?;
        }
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, &to_format(&cell.style, None))?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, &to_format(&cell.style, None))?;
        }
        CellValue::DateTime(dt) => {
            let serial = dates::to_serial(dt);
            let default = if serial.fract() == 0.0 { DATE_FORMAT } else { DATETIME_FORMAT };
            let format = to_format(&cell.style, Some(default));
            worksheet.write_number_with_format(row, col, serial, &format)?;
        }
    }
    Ok(())
}

/// Translate a [`CellStyle`]; `default_num` applies when the style has none.
fn to_format(style: &CellStyle, default_num: Option<&str>) -> Format {
    let mut format = Format::new();

    if style.bold {
        format = format.set_bold();
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(Color::RGB(color));
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    if let Some(fill) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(fill));
    }
    if style.center {
        format = format
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
    }
    if style.wrap {
        format = format.set_text_wrap();
    }

    let borders = style.borders;
    if let Some(weight) = borders.top {
        format = format.set_border_top(border(weight));
    }
    if let Some(weight) = borders.bottom {
        format = format.set_border_bottom(border(weight));
    }
    if let Some(weight) = borders.left {
        format = format.set_border_left(border(weight));
    }
    if let Some(weight) = borders.right {
        format = format.set_border_right(border(weight));
    }

    if let Some(code) = style.num_format.as_deref().or(default_num) {
        format = format.set_num_format(code);
    }
    format
}

fn border(weight: BorderWeight) -> FormatBorder {
    match weight {
        BorderWeight::Thin => FormatBorder::Thin,
        BorderWeight::Medium => FormatBorder::Medium,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::reader::read_workbook;
    use crate::workbook::Sheet;
    use tempfile::tempdir;

    #[test]
    fn test_written_values_read_back() {
        let mut sheet = Sheet::new("Datos");
        sheet.set_value(1, 1, "Cta".into());
        sheet.set_value(2, 1, 6101.0.into());
        sheet.set_value(2, 2, CellValue::Bool(true));
        sheet.style_mut(3, 3).bold = true;
        sheet.set_column_width(1, 12.0);

        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&path, &Workbook::new(vec![sheet])).unwrap();

        let restored = read_workbook(&path).unwrap();
        let datos = restored.sheet("Datos").unwrap();
        assert_eq!(datos.value(1, 1).as_text(), Some("Cta"));
        assert_eq!(datos.value(2, 1), &CellValue::Number(6101.0));
        assert_eq!(datos.value(2, 2), &CellValue::Bool(true));
        assert_eq!(datos.extent().rows, 2);
    }
}
