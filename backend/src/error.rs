//! Error types for the Planillas pipelines.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`WorkbookError`] - Reading and writing workbook files
//! - [`AuthError`] - Password store and password change errors
//! - [`NormalizeError`] - Column-insert normalizer errors
//! - [`TransferError`] - Sheet transfer errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Workbook I/O Errors
// =============================================================================

/// Errors while reading or writing workbook files.
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// Failed to read or copy a file.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Any reader failure (xls, xlsx, xlsm).
    #[error("No se pudo leer el libro: {0}")]
    Read(#[from] calamine::Error),

    /// Writer failure for generated workbooks.
    #[error("No se pudo escribir el libro: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    /// Failure from the in-place editor used on destination workbooks.
    #[error("No se pudo editar el libro: {0}")]
    Edit(String),

    /// The workbook has no sheet at all.
    #[error("El libro no contiene hojas")]
    NoSheets,

    /// A named sheet is absent.
    #[error("No se encontró la hoja '{0}'")]
    MissingSheet(String),
}

// =============================================================================
// Auth Errors
// =============================================================================

/// Errors from password verification and password change.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Submitted password does not match.
    #[error("Contraseña incorrecta")]
    WrongPassword,

    /// Current password does not match during a change.
    #[error("Contraseña actual incorrecta")]
    WrongCurrentPassword,

    /// A required field was left empty.
    #[error("Todos los campos son obligatorios")]
    MissingField,

    /// New password and confirmation differ.
    #[error("Las contraseñas no coinciden")]
    Mismatch,

    /// New password is too short.
    #[error("La contraseña debe tener al menos {0} caracteres")]
    TooShort(usize),

    /// Store could not be written.
    #[error("No se pudo guardar la configuración: {0}")]
    Io(#[from] std::io::Error),

    /// Store could not be serialized.
    #[error("Configuración inválida: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Normalizer Errors
// =============================================================================

/// Errors during the column-insert normalizer run.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Workbook could not be read or written.
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    /// Input path has no usable file name.
    #[error("Ruta de archivo inválida: {0}")]
    InvalidPath(String),
}

// =============================================================================
// Transfer Errors
// =============================================================================

/// Errors during the sheet transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Workbook could not be read, copied or saved.
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    /// Source sheet lacks mapped columns.
    #[error("Columnas no encontradas en origen: {0:?}")]
    MissingSourceColumns(Vec<String>),

    /// Destination workbook lacks the ledger sheet.
    #[error("No se encontró la hoja '{0}' en el archivo destino")]
    MissingDestinationSheet(String),

    /// Destination header row lacks mapped columns.
    #[error("Columnas no encontradas en destino: {0:?}")]
    MissingDestinationColumns(Vec<String>),

    /// No sheet in the source qualifies for transfer.
    #[error("No se encontraron hojas que comiencen con '{0}'")]
    NoAnalysisSheets(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid request.
    #[error("{0}")]
    BadRequest(String),

    /// No valid session.
    #[error("Sesión no iniciada")]
    Unauthorized,

    /// Requested file does not exist.
    #[error("Archivo no encontrado: {0}")]
    NotFound(String),

    /// Server internal error.
    #[error("Error interno: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for workbook operations.
pub type WorkbookResult<T> = Result<T, WorkbookError>;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type for normalizer operations.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // WorkbookError -> TransferError
        let wb_err = WorkbookError::MissingSheet("Analisis 1".into());
        let transfer_err: TransferError = wb_err.into();
        assert!(transfer_err.to_string().contains("Analisis 1"));

        // WorkbookError -> NormalizeError
        let normalize_err: NormalizeError = WorkbookError::NoSheets.into();
        assert_eq!(normalize_err.to_string(), WorkbookError::NoSheets.to_string());
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let err = TransferError::MissingSourceColumns(vec!["Cta".into(), "Debe".into()]);
        let msg = err.to_string();
        assert!(msg.contains("Cta"));
        assert!(msg.contains("Debe"));
    }

    #[test]
    fn test_missing_ledger_sheet_names_it() {
        let err = TransferError::MissingDestinationSheet("BD6".into());
        assert!(err.to_string().contains("BD6"));
    }
}
