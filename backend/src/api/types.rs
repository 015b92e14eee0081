//! REST API types and upload helpers.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

use crate::error::ServerError;
use crate::normalize::NormalizeOutcome;

/// Upload extensions accepted by both pipelines.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["xls", "xlsx", "xlsm"];

/// Rejection returned by handlers.
pub type ApiError = (StatusCode, Json<Value>);

/// Body of `POST /api/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// Plain success/failure notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }
}

/// Response of `POST /api/normalize`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeResponse {
    #[serde(flatten)]
    pub outcome: NormalizeOutcome,
    /// Download path of the generated workbook
    pub download_url: Option<String>,
}

impl From<NormalizeOutcome> for NormalizeResponse {
    fn from(outcome: NormalizeOutcome) -> Self {
        let download_url = outcome
            .output
            .as_ref()
            .map(|name| format!("/api/download/{}", name));
        Self { outcome, download_url }
    }
}

/// Response of `POST /api/sheets`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsResponse {
    pub sheets: Vec<String>,
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status plus JSON error body.
    pub fn into_api(self) -> ApiError {
        (self.status(), Json(error_response(&self.to_string())))
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "success": false,
        "error": error,
    })
}

/// Whether `filename` has an accepted spreadsheet extension (any case).
pub fn allowed_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Reduce an uploaded filename to a safe basename.
///
/// Keeps ASCII letters, digits, `_`, `.` and `-`; whitespace becomes `_`;
/// leading and trailing `.`/`_` are stripped. Returns `None` when nothing is left.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c == '_');
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_file() {
        assert!(allowed_file("mayor.xlsx"));
        assert!(allowed_file("MAYOR.XLS"));
        assert!(allowed_file("macro.Xlsm"));
        assert!(!allowed_file("datos.csv"));
        assert!(!allowed_file("xlsx"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(
            sanitize_filename("Libro Mayor 2024.xlsx").as_deref(),
            Some("Libro_Mayor_2024.xlsx")
        );
        assert_eq!(sanitize_filename("C:\\docs\\año.xlsx").as_deref(), Some("ao.xlsx"));
        assert_eq!(sanitize_filename("..."), None);
    }

    #[test]
    fn test_normalize_response_links_output() {
        let response = NormalizeResponse::from(NormalizeOutcome {
            success: true,
            output: Some("procesado_x.xlsx".into()),
            boundary_rows: 2,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["downloadUrl"], "/api/download/procesado_x.xlsx");
        assert_eq!(json["boundaryRows"], 2);
    }

    #[test]
    fn test_server_error_status() {
        let (status, Json(body)) = ServerError::Unauthorized.into_api();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }
}
