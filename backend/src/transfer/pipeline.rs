//! Sheet transfer: copy the mapped columns of an analysis sheet into `BD6`.
//!
//! ```text
//! password → source table (header row 6) → BD6 present → resolve columns
//!   → clear columns from row 6 → write rows → backup → save in place
//! ```
//!
//! The destination is edited in place, so every other sheet, style and
//! formula of that workbook survives.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use super::mapping::{
    resolve, source_columns, ResolvedEntry, DESTINATION_FIRST_ROW, DESTINATION_HEADER_ROW,
    DESTINATION_SHEET,
};
use super::source::SourceTable;
use crate::api::logs::{log_error, log_info, log_success};
use crate::auth::verify_password;
use crate::config::PasswordStore;
use crate::error::{AuthError, TransferError, TransferResult, WorkbookError};
use crate::workbook::{dates, CellValue};

const DATE_FORMAT: &str = "dd/mm/yyyy";

/// Summary of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummary {
    pub source_file: String,
    pub source_sheet: String,
    pub destination_file: String,
    pub rows_transferred: usize,
    pub columns: Vec<String>,
    pub backup_path: PathBuf,
}

/// `(success, message, summary, destination path)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub success: bool,
    pub message: String,
    pub summary: Option<TransferSummary>,
    pub destination: Option<PathBuf>,
}

impl TransferOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            summary: None,
            destination: None,
        }
    }
}

/// A request to copy `sheet` of `source` into `destination`.
#[derive(Debug, Clone, Copy)]
pub struct TransferRequest<'a> {
    pub source: &'a Path,
    pub destination: &'a Path,
    pub sheet: &'a str,
    pub password: Option<&'a str>,
}

/// Run the transfer and fold every failure into a [`TransferOutcome`].
pub fn run_transfer(store: &PasswordStore, request: &TransferRequest<'_>) -> TransferOutcome {
    if !verify_password(store, request.password) {
        return TransferOutcome::failed(AuthError::WrongPassword.to_string());
    }

    match transfer(request) {
        Ok(summary) => {
            log_success(format!(
                "Transferencia completada: {} filas",
                summary.rows_transferred
            ));
            TransferOutcome {
                success: true,
                message: "Transferencia completada exitosamente".to_string(),
                summary: Some(summary),
                destination: Some(request.destination.to_path_buf()),
            }
        }
        Err(e) => {
            tracing::error!(
                source = %request.source.display(),
                destination = %request.destination.display(),
                error = %e,
                "transfer failed"
            );
            log_error(format!("Error durante la transferencia: {}", e));
            TransferOutcome::failed(format!("Error durante la transferencia: {}", e))
        }
    }
}

/// Transfer without the password gate.
pub fn transfer(request: &TransferRequest<'_>) -> TransferResult<TransferSummary> {
    log_info(format!("📖 Leyendo hoja '{}'", request.sheet));
    let table = SourceTable::load(request.source, request.sheet)?;
    log_info(format!("Filas en origen: {}", table.len()));

    let mut book = umya_spreadsheet::reader::xlsx::read(request.destination)
        .map_err(|e| WorkbookError::Edit(e.to_string()))?;

    let rows_transferred = write_destination(&mut book, &table)?;

    let backup_path = backup_path(request.destination);
    fs::copy(request.destination, &backup_path).map_err(WorkbookError::from)?;
    log_info(format!("Respaldo creado: {}", backup_path.display()));

    umya_spreadsheet::writer::xlsx::write(&book, request.destination)
        .map_err(|e| WorkbookError::Edit(e.to_string()))?;

    Ok(TransferSummary {
        source_file: file_name(request.source),
        source_sheet: request.sheet.to_string(),
        destination_file: file_name(request.destination),
        rows_transferred,
        columns: source_columns(),
        backup_path,
    })
}

/// Resolve columns, clear them and write `table` into `BD6`; returns the
/// number of rows written.
pub fn write_destination(book: &mut Spreadsheet, table: &SourceTable) -> TransferResult<usize> {
    let sheet = book
        .get_sheet_by_name_mut(DESTINATION_SHEET)
        .ok_or_else(|| TransferError::MissingDestinationSheet(DESTINATION_SHEET.to_string()))?;

    let entries = resolve(|name| find_header(sheet, name))
        .map_err(TransferError::MissingDestinationColumns)?;

    let last_row = sheet.get_highest_row();
    for resolved in &entries {
        clear_column(sheet, resolved.destination_col, last_row);
    }

    let mut written = 0;
    for (idx, row) in table.rows().iter().enumerate() {
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        let dest_row = DESTINATION_FIRST_ROW + idx as u32;
        for (resolved, value) in entries.iter().zip(row) {
            write_value(sheet, resolved, dest_row, value);
        }
        written += 1;
    }
    Ok(written)
}

/// First column of the destination header row holding exactly `name`.
fn find_header(sheet: &Worksheet, name: &str) -> Option<u32> {
    (1..=sheet.get_highest_column())
        .find(|&col| sheet.get_value((col, DESTINATION_HEADER_ROW)) == name)
}

fn clear_column(sheet: &mut Worksheet, col: u32, last_row: u32) {
    for row in DESTINATION_FIRST_ROW..=last_row {
        if sheet.get_cell((col, row)).is_some() {
            sheet.get_cell_mut((col, row)).set_value("");
        }
    }
}

fn write_value(sheet: &mut Worksheet, resolved: &ResolvedEntry, row: u32, value: &CellValue) {
    let coordinate = (resolved.destination_col, row);
    match value {
        CellValue::Empty => {}
        CellValue::Number(n) => {
            sheet.get_cell_mut(coordinate).set_value_number(*n);
        }
        CellValue::Text(s) => {
            sheet.get_cell_mut(coordinate).set_value_string(s.as_str());
        }
        CellValue::Bool(b) if resolved.entry.numeric => {
            sheet.get_cell_mut(coordinate).set_value_number(f64::from(u8::from(*b)));
        }
        CellValue::Bool(b) => {
            sheet.get_cell_mut(coordinate).set_value_bool(*b);
        }
        CellValue::DateTime(dt) => {
            let cell = sheet.get_cell_mut(coordinate);
            cell.set_value_number(dates::to_serial(dt));
            cell.get_style_mut()
                .get_number_format_mut()
                .set_format_code(DATE_FORMAT);
        }
    }
}

/// `<stem>_backup<ext>` next to `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}_backup.{}", stem, ext.to_string_lossy()),
        None => format!("{}_backup", stem),
    };
    path.with_file_name(name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
