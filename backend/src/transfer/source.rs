//! Source table: an analysis sheet read with its header on row 6.

use std::path::Path;

use super::clean::{clean_date, clean_glosa, clean_number};
use super::mapping::{
    MappingEntry, ANALYSIS_PREFIX, DATE_COLUMN, GLOSA_COLUMN, MAPPING, SOURCE_HEADER_ROW,
};
use crate::error::{TransferError, TransferResult};
use crate::workbook::reader::{read_sheet, sheet_names};
use crate::workbook::{CellValue, Sheet};

/// Mapped columns of the source sheet, cleaned, one row per data row.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    /// `rows[idx][k]` is the value of `MAPPING[k]` in data row `idx`.
    rows: Vec<Vec<CellValue>>,
}

impl SourceTable {
    /// Read `sheet` from the workbook at `path`.
    pub fn load(path: &Path, sheet: &str) -> TransferResult<Self> {
        let sheet = read_sheet(path, sheet)?;
        Self::from_sheet(&sheet)
    }

    /// Locate every mapped column in the header row and clean the values.
    pub fn from_sheet(sheet: &Sheet) -> TransferResult<Self> {
        let extent = sheet.extent();
        let headers: Vec<String> = (1..=extent.cols)
            .map(|col| sheet.value(SOURCE_HEADER_ROW, col).render())
            .collect();

        let mut columns = Vec::with_capacity(MAPPING.len());
        let mut missing = Vec::new();
        for entry in &MAPPING {
            match headers.iter().position(|h| h == entry.source) {
                Some(i) => columns.push(i as u32 + 1),
                None => missing.push(entry.source.to_string()),
            }
        }
        if !missing.is_empty() {
            return Err(TransferError::MissingSourceColumns(missing));
        }

        let rows = (SOURCE_HEADER_ROW + 1..=extent.rows)
            .map(|row| {
                MAPPING
                    .iter()
                    .zip(&columns)
                    .map(|(entry, &col)| clean(entry, null_if_blank(sheet.value(row, col))))
                    .collect()
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn null_if_blank(value: &CellValue) -> CellValue {
    match value {
        CellValue::Text(s) if s.is_empty() => CellValue::Empty,
        other => other.clone(),
    }
}

fn clean(entry: &MappingEntry, value: CellValue) -> CellValue {
    if value.is_empty() {
        return value;
    }
    if entry.numeric {
        clean_number(value)
    } else if entry.source == GLOSA_COLUMN {
        clean_glosa(value)
    } else if entry.source == DATE_COLUMN {
        clean_date(value)
    } else {
        value
    }
}

/// Sheets of the workbook at `path` whose name starts with `Analisis`.
pub fn analysis_sheets(path: &Path) -> TransferResult<Vec<String>> {
    let sheets: Vec<String> = sheet_names(path)?
        .into_iter()
        .filter(|name| name.starts_with(ANALYSIS_PREFIX))
        .collect();

    if sheets.is_empty() {
        return Err(TransferError::NoAnalysisSheets(ANALYSIS_PREFIX.to_string()));
    }
    Ok(sheets)
}

/// The first analysis sheet, or `requested` when there is a choice to make.
pub fn choose_sheet(sheets: &[String], requested: Option<&str>) -> Option<String> {
    let first = sheets.first()?;
    match requested {
        Some(name) if sheets.len() > 1 && !name.is_empty() => Some(name.to_string()),
        _ => Some(first.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn analysis() -> Sheet {
        let mut rows: Vec<Vec<CellValue>> = vec![vec![]; 5];
        rows.push(vec![
            t("Cta"), t("Nro"), t("Suc - Tipo - Nro"), t("Fecha"), t("Org."),
            t("Nro CPago"), t("Glosa / Proveedor"), t("CC"), t("Debe"),
        ]);
        rows.push(vec![
            t("6101"), t("1"), t("S1"), t("2024-01-31"), t("O"),
            t("P"), t("LUZ -"), t("10"), t("S/ 25.5"),
        ]);
        rows.push(vec![]);
        let mut debit_only = vec![CellValue::Empty; 8];
        debit_only.push(CellValue::Number(3.0));
        rows.push(debit_only);
        Sheet::from_rows("Analisis 1", rows)
    }

    #[test]
    fn test_reads_and_cleans_mapped_columns() {
        let table = SourceTable::from_sheet(&analysis()).unwrap();
        assert_eq!(table.len(), 3);

        let first = &table.rows()[0];
        assert_eq!(first[0], t("6101"));
        assert!(matches!(first[2], CellValue::DateTime(_)));
        assert_eq!(first[3], t("LUZ"));
        assert_eq!(first[5], CellValue::Number(25.5));

        assert!(table.rows()[1].iter().all(CellValue::is_empty));
        assert_eq!(table.rows()[2][5], CellValue::Number(3.0));
    }

    #[test]
    fn test_missing_columns_are_named() {
        let mut sheet = analysis();
        sheet.set_value(6, 8, t("Centro"));
        sheet.set_value(6, 9, t("Importe"));
        match SourceTable::from_sheet(&sheet) {
            Err(TransferError::MissingSourceColumns(cols)) => assert_eq!(cols, vec!["CC", "Debe"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_choose_sheet() {
        let one = vec!["Analisis A".to_string()];
        let two = vec!["Analisis A".to_string(), "Analisis B".to_string()];
        assert_eq!(choose_sheet(&one, Some("Analisis B")).as_deref(), Some("Analisis A"));
        assert_eq!(choose_sheet(&two, Some("Analisis B")).as_deref(), Some("Analisis B"));
        assert_eq!(choose_sheet(&two, None).as_deref(), Some("Analisis A"));
        assert_eq!(choose_sheet(&[], None), None);
    }
}
