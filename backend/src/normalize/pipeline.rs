//! Column-insert normalizer.
//!
//! Turns a raw ledger export into a sorted, styled table:
//!
//! ```text
//! strip styles → insert group column → propagate groups → drop K:M
//!   → debit - credit → headers (row 6) → parse/sort dates → borders → widths
//! ```
//!
//! The output is written next to the input as
//! `procesado_<YYYYMMDD_HHMMSS>_<stem>.xlsx`; the input is never touched.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::dates::parse_entry_date;
use super::layout::*;
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{NormalizeError, NormalizeResult, WorkbookError};
use crate::workbook::reader::read_workbook;
use crate::workbook::style::{self, BorderWeight, Region, StyleRule};
use crate::workbook::writer::write_workbook;
use crate::workbook::{dates, CellValue, Sheet};

/// Result reported to callers: `(success, output file name, boundary rows)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeOutcome {
    pub success: bool,
    pub output: Option<String>,
    pub boundary_rows: usize,
}

impl NormalizeOutcome {
    pub fn failed() -> Self {
        Self {
            success: false,
            output: None,
            boundary_rows: 0,
        }
    }
}

/// What happened to the active sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetReport {
    pub boundary_rows: usize,
    pub dated_rows: usize,
    pub discarded_rows: usize,
}

/// A successful run.
#[derive(Debug, Clone)]
pub struct NormalizeReport {
    pub output_path: PathBuf,
    pub output_name: String,
    pub sheet: SheetReport,
}

/// A data row whose entry date parsed.
#[derive(Debug, Clone)]
struct DatedRow {
    date: NaiveDateTime,
    values: Vec<CellValue>,
}

/// Run the normalizer and fold every failure into [`NormalizeOutcome::failed`].
pub fn process_workbook(path: &Path) -> NormalizeOutcome {
    match normalize_file(path) {
        Ok(report) => NormalizeOutcome {
            success: true,
            output: Some(report.output_name),
            boundary_rows: report.sheet.boundary_rows,
        },
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "normalizer failed");
            log_error(format!("Error crítico al procesar: {}", e));
            NormalizeOutcome::failed()
        }
    }
}

/// Normalize the workbook at `path`, naming the output after the current time.
pub fn normalize_file(path: &Path) -> NormalizeResult<NormalizeReport> {
    normalize_file_at(path, Local::now().naive_local())
}

/// Normalize the workbook at `path`, naming the output after `at`.
pub fn normalize_file_at(path: &Path, at: NaiveDateTime) -> NormalizeResult<NormalizeReport> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| NormalizeError::InvalidPath(path.display().to_string()))?;

    log_info(format!("📖 Leyendo {}", path.display()));
    let mut workbook = read_workbook(path)?;
    let sheet = workbook.active_mut().ok_or(WorkbookError::NoSheets)?;

    let report = normalize_sheet(sheet);

    let output_name = output_file_name(stem, at);
    let output_path = path.with_file_name(&output_name);
    write_workbook(&output_path, &workbook)?;
    log_success(format!("💾 Archivo guardado como: {}", output_name));

    Ok(NormalizeReport {
        output_path,
        output_name,
        sheet: report,
    })
}

/// `procesado_<YYYYMMDD_HHMMSS>_<stem>.xlsx`
pub fn output_file_name(stem: &str, at: NaiveDateTime) -> String {
    format!("{}_{}_{}.xlsx", OUTPUT_PREFIX, at.format("%Y%m%d_%H%M%S"), stem)
}

/// Apply every normalization step to `sheet` in place.
pub fn normalize_sheet(sheet: &mut Sheet) -> SheetReport {
    sheet.clear_formatting();
    sheet.insert_column(GROUP_COLUMN);

    let extent = sheet.extent();
    let last_row = extent.rows;
    log_info(format!("📊 Filas: {}, Columnas: {}", extent.rows, extent.cols));

    let boundaries = find_boundary_rows(sheet, last_row);
    log_info(format!("🔍 Patrones encontrados: {}", boundaries.len()));
    propagate_groups(sheet, &boundaries, last_row);

    let last_col = drop_columns(sheet, extent.cols);
    log_info(format!("Columnas después de eliminar K, L, M: {}", last_col));

    if last_col >= CREDIT_COLUMN {
        subtract_credit(sheet, last_row);
    }

    write_headers(sheet, last_row, last_col);

    let (mut dated, discarded) = collect_dated_rows(sheet, last_row, last_col);
    for row in discarded.iter().rev() {
        sheet.delete_row(*row);
    }
    log_info(format!("Filas sin fecha válida eliminadas: {}", discarded.len()));

    dated.sort_by_key(|row| row.date);

    if dated.is_empty() {
        log_warning("No hay filas con fechas válidas para ordenar");
    } else {
        let last_data_row = rewrite_rows(sheet, &dated, last_col);
        style_table(sheet, last_data_row, last_col);
        autosize_columns(sheet);
        log_success(format!("{} filas ordenadas por fecha", dated.len()));
    }

    SheetReport {
        boundary_rows: boundaries.len(),
        dated_rows: dated.len(),
        discarded_rows: discarded.len(),
    }
}

/// Text designators starting with `6` whose leading digit run is longer than two.
pub fn is_boundary(value: &CellValue) -> bool {
    let Some(text) = value.as_text() else {
        return false;
    };
    let text = text.trim();
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    text.starts_with(BOUNDARY_PREFIX) && digits > BOUNDARY_MIN_DIGITS
}

fn find_boundary_rows(sheet: &Sheet, last_row: u32) -> Vec<u32> {
    (1..=last_row)
        .filter(|&row| is_boundary(sheet.value(row, DESIGNATOR_COLUMN)))
        .collect()
}

fn propagate_groups(sheet: &mut Sheet, boundaries: &[u32], last_row: u32) {
    for (i, &start) in boundaries.iter().enumerate() {
        let end = boundaries.get(i + 1).copied().unwrap_or(last_row + 1);
        let group = sheet.value(start, DESIGNATOR_COLUMN).clone();
        for row in start..end {
            sheet.set_value(row, GROUP_COLUMN, group.clone());
        }
    }
}

/// Remove the dropped columns inside the extent, highest first; returns the
/// new column extent.
fn drop_columns(sheet: &mut Sheet, last_col: u32) -> u32 {
    for col in DROPPED_COLUMNS.iter().rev().filter(|&&c| c <= last_col) {
        sheet.delete_column(*col);
    }
    sheet.extent().cols
}

/// Blank or non-numeric cells count as zero.
fn numeric_or_zero(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::Text(s) => s.trim().parse().unwrap_or(0.0),
        CellValue::Empty | CellValue::DateTime(_) => 0.0,
    }
}

fn subtract_credit(sheet: &mut Sheet, last_row: u32) {
    for row in FIRST_DATA_ROW..=last_row {
        let debit = numeric_or_zero(sheet.value(row, DEBIT_COLUMN));
        let credit = numeric_or_zero(sheet.value(row, CREDIT_COLUMN));
        sheet.set_value(row, DEBIT_COLUMN, CellValue::Number(debit - credit));
    }
}

fn write_headers(sheet: &mut Sheet, last_row: u32, last_col: u32) {
    if last_row < HEADER_ROW {
        sheet.ensure_rows(HEADER_ROW);
    }
    for (i, header) in HEADERS.iter().enumerate() {
        let col = i as u32 + 1;
        if col <= last_col {
            sheet.set_value(HEADER_ROW, col, (*header).into());
        }
    }
}

/// Split data rows into dated snapshots and row numbers to delete.
fn collect_dated_rows(sheet: &Sheet, last_row: u32, last_col: u32) -> (Vec<DatedRow>, Vec<u32>) {
    let mut dated = Vec::new();
    let mut discarded = Vec::new();

    for row in FIRST_DATA_ROW..=last_row {
        match parse_entry_date(sheet.value(row, DATE_COLUMN)) {
            Some(date) => {
                let mut values = sheet.row_values(row, last_col);
                if let Some(slot) = values.get_mut(DATE_COLUMN as usize - 1) {
                    *slot = CellValue::Text(dates::format_dmy(&date));
                }
                dated.push(DatedRow { date, values });
            }
            None => discarded.push(row),
        }
    }
    (dated, discarded)
}

/// Replace everything below the header with `rows`; returns the last row written.
fn rewrite_rows(sheet: &mut Sheet, rows: &[DatedRow], last_col: u32) -> u32 {
    sheet.truncate_rows(HEADER_ROW);

    let mut row_num = HEADER_ROW;
    for dated in rows {
        row_num += 1;
        for (i, value) in dated.values.iter().take(last_col as usize).enumerate() {
            sheet.set_value(row_num, i as u32 + 1, value.clone());
        }
    }

    style::apply(
        sheet,
        Region::column(DATE_COLUMN, FIRST_DATA_ROW, row_num),
        &[StyleRule::NumberFormat(DATE_NUMBER_FORMAT.to_string())],
    );
    row_num
}

fn style_table(sheet: &mut Sheet, last_data_row: u32, last_col: u32) {
    style::apply(
        sheet,
        Region::new(HEADER_ROW, last_data_row, 1, last_col),
        &[StyleRule::Grid {
            outer: BorderWeight::Medium,
            inner: BorderWeight::Thin,
        }],
    );

    style::apply(
        sheet,
        Region::row(HEADER_ROW, 1, last_col),
        &[
            StyleRule::Font {
                bold: true,
                color: HEADER_FONT_COLOR,
                size: HEADER_FONT_SIZE,
            },
            StyleRule::SolidFill(HEADER_FILL),
            StyleRule::Alignment {
                center: true,
                wrap: true,
            },
            StyleRule::Border(BorderWeight::Medium),
        ],
    );
}

/// Width of a value for auto-sizing; falsy values (blank, zero, false) do not count.
///
/// The debit column holds computed floats, measured with their fractional
/// part (`70.0`, not `70`).
fn display_width(value: &CellValue, col: u32) -> usize {
    match value {
        CellValue::Empty | CellValue::Bool(false) => 0,
        CellValue::Number(n) if *n == 0.0 => 0,
        CellValue::Number(n) if col == DEBIT_COLUMN => format!("{:?}", n).chars().count(),
        CellValue::DateTime(_) => DATE_WIDTH,
        other => other.render().chars().count(),
    }
}

fn autosize_columns(sheet: &mut Sheet) {
    let last_col = sheet
        .cells()
        .map(|(_, col, _)| col)
        .max()
        .unwrap_or(0);

    let mut widths = vec![0usize; last_col as usize];
    for (_, col, cell) in sheet.cells() {
        let slot = &mut widths[col as usize - 1];
        *slot = (*slot).max(display_width(&cell.value, col));
    }

    for (i, width) in widths.into_iter().enumerate() {
        let adjusted = (width + WIDTH_MARGIN).min(MAX_COLUMN_WIDTH);
        sheet.set_column_width(i as u32 + 1, adjusted as f64);
    }
}
