//! Column layout of the ledger export after the group column is inserted.
//!
//! The input has no header validation; these positions are assumed.

/// Inserted column holding the group designator.
pub const GROUP_COLUMN: u32 = 1;
/// Designator scanned for group-boundary rows (original column A).
pub const DESIGNATOR_COLUMN: u32 = 2;
/// Entry date.
pub const DATE_COLUMN: u32 = 4;
/// Debit amount; receives `debit - credit`.
pub const DEBIT_COLUMN: u32 = 9;
/// Credit amount subtracted from the debit.
pub const CREDIT_COLUMN: u32 = 10;
/// Columns K, L and M, removed before the arithmetic.
pub const DROPPED_COLUMNS: [u32; 3] = [11, 12, 13];

pub const HEADER_ROW: u32 = 6;
pub const FIRST_DATA_ROW: u32 = 7;

/// Header texts for columns 1..=9.
pub const HEADERS: [&str; 9] = [
    "Cta",
    "Nro",
    "Suc - Tipo - Nro",
    "Fecha",
    "Org.",
    "Nro CPago - Tipo/Serie/ Numero/Fecha de Emision",
    "Glosa / Proveedor",
    "CC",
    "Debe",
];

/// Boundary designators start with this digit.
pub const BOUNDARY_PREFIX: char = '6';
/// Boundary designators need a leading digit run longer than this.
pub const BOUNDARY_MIN_DIGITS: usize = 2;

pub const DATE_NUMBER_FORMAT: &str = "dd/mm/yyyy";

pub const HEADER_FILL: u32 = 0xD9E1F2;
pub const HEADER_FONT_COLOR: u32 = 0x000000;
pub const HEADER_FONT_SIZE: f64 = 11.0;

/// Width counted for date values when auto-sizing.
pub const DATE_WIDTH: usize = 10;
pub const WIDTH_MARGIN: usize = 2;
pub const MAX_COLUMN_WIDTH: usize = 50;

/// Prefix of generated file names.
pub const OUTPUT_PREFIX: &str = "procesado";
