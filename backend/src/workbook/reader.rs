//! Load `.xls`, `.xlsx` and `.xlsm` files into the in-memory model.
//!
//! Cached values are read (formulas are not evaluated); styles and merged
//! ranges are not carried over.

use calamine::{open_workbook_auto, DataType, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

use super::{dates, CellValue, Sheet, Workbook};
use crate::error::{WorkbookError, WorkbookResult};

/// Read every sheet of the workbook at `path`, in workbook order.
pub fn read_workbook(path: &Path) -> WorkbookResult<Workbook> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_owned();
    if names.is_empty() {
        return Err(WorkbookError::NoSheets);
    }

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .ok_or_else(|| WorkbookError::MissingSheet(name.clone()))??;
        sheets.push(range_to_sheet(&name, &range));
    }
    Ok(Workbook::new(sheets))
}

/// Read one named sheet.
pub fn read_sheet(path: &Path, name: &str) -> WorkbookResult<Sheet> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range(name)
        .ok_or_else(|| WorkbookError::MissingSheet(name.to_string()))??;
    Ok(range_to_sheet(name, &range))
}

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> WorkbookResult<Vec<String>> {
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names().to_owned())
}

/// Ranges start at their first used cell; positions are made absolute here.
fn range_to_sheet(name: &str, range: &Range<DataType>) -> Sheet {
    let mut sheet = Sheet::new(name);
    let Some((row0, col0)) = range.start() else {
        return sheet;
    };

    for (r, row) in range.rows().enumerate() {
        for (c, data) in row.iter().enumerate() {
            let value = convert(data);
            if !value.is_empty() {
                sheet.set_value(row0 + r as u32 + 1, col0 + c as u32 + 1, value);
            }
        }
    }
    sheet
}

fn convert(data: &DataType) -> CellValue {
    match data {
        DataType::Empty => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Bool(b) => CellValue::Bool(*b),
        DataType::DateTime(serial) => dates::from_serial(*serial)
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Number(*serial)),
        other => {
            let text = other.to_string();
            parse_iso(&text)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Text(text))
        }
    }
}

fn parse_iso(text: &str) -> Option<NaiveDateTime> {
    text.parse::<NaiveDateTime>().ok().or_else(|| {
        text.parse::<NaiveDate>()
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert(&DataType::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert(&DataType::String("x".into())), CellValue::Text("x".into()));
        assert_eq!(convert(&DataType::Empty), CellValue::Empty);
    }

    #[test]
    fn test_convert_serial_date() {
        let value = convert(&DataType::DateTime(45000.0));
        match value {
            CellValue::DateTime(dt) => assert_eq!(dates::format_dmy(&dt), "15/03/2023"),
            other => panic!("expected a date, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_workbook(&dir.path().join("nope.xlsx")).is_err());
    }
}
