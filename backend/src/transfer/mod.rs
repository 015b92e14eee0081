//! Sheet transfer.
//!
//! Copies the mapped columns of an `Analisis*` sheet into the `BD6` sheet of
//! a destination workbook, after backing the destination up.

pub mod clean;
pub mod mapping;
pub mod pipeline;
pub mod source;

pub use pipeline::{
    backup_path, run_transfer, transfer, write_destination, TransferOutcome, TransferRequest,
    TransferSummary,
};
pub use source::{analysis_sheets, choose_sheet, SourceTable};
