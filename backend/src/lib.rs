//! # Planillas - accounting workbook tools
//!
//! Two batch transforms over Excel workbooks, served over HTTP and the CLI:
//!
//! - the **normalizer** restructures a ledger export into a sorted, styled
//!   table with group designators in a new first column;
//! - the **transfer** copies the mapped columns of an `Analisis*` sheet into
//!   the `BD6` sheet of another workbook, after backing it up.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ .xls/.xlsx  │────▶│  normalize  │────▶│ procesado_* │
//! │   upload    │     │  (workbook) │     │    .xlsx    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Analisis *  │────▶│  transfer   │────▶│ BD6 + backup│
//! │   sheet     │     │ (password)  │     │  (in place) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Environment settings and the password store
//! - [`auth`] - Password digest, verification and change
//! - [`workbook`] - In-memory workbook model, reader, writer, styles
//! - [`normalize`] - Column-insert normalizer
//! - [`transfer`] - Sheet transfer into `BD6`
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;

// Password gate
pub mod auth;

// Workbook model
pub mod workbook;

// Pipelines
pub mod normalize;
pub mod transfer;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AuthError, NormalizeError, ServerError, TransferError, WorkbookError};

// =============================================================================
// Re-exports - Configuration and auth
// =============================================================================

pub use auth::{change_password, hash_password, verify_password, PasswordChange};
pub use config::{AppConfig, PasswordStore};

// =============================================================================
// Re-exports - Pipelines
// =============================================================================

pub use normalize::{process_workbook, NormalizeOutcome};
pub use transfer::{
    analysis_sheets, run_transfer, TransferOutcome, TransferRequest, TransferSummary,
};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
