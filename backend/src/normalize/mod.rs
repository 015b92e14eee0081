//! Workbook normalizer.
//!
//! Reads a ledger export, inserts the group column, drops unused columns,
//! computes `debit - credit`, writes the standard headers, keeps only rows with
//! a parseable entry date sorted ascending, and writes a styled copy.

pub mod dates;
pub mod layout;
pub mod pipeline;

pub use pipeline::{
    is_boundary, normalize_file, normalize_file_at, normalize_sheet, output_file_name,
    process_workbook, NormalizeOutcome, NormalizeReport, SheetReport,
};
