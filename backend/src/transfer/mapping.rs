//! Fixed column mapping from an analysis sheet to the `BD6` ledger sheet.

/// Sheet of the destination workbook that receives the data.
pub const DESTINATION_SHEET: &str = "BD6";
/// Source header row (1-based); data starts on the next row.
pub const SOURCE_HEADER_ROW: u32 = 6;
/// Destination header row scanned for unresolved column names.
pub const DESTINATION_HEADER_ROW: u32 = 5;
/// First destination row written; source data row `idx` lands on `6 + idx`.
pub const DESTINATION_FIRST_ROW: u32 = 6;
/// Source sheets eligible for transfer start with this prefix.
pub const ANALYSIS_PREFIX: &str = "Analisis";

pub const GLOSA_COLUMN: &str = "Glosa / Proveedor";
pub const DATE_COLUMN: &str = "Fecha";

/// One source column copied into one destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingEntry {
    /// Header text in the source sheet.
    pub source: &'static str,
    /// Header text in the destination header row.
    pub destination: &'static str,
    /// Position in the source layout, informational only.
    pub source_index: Option<u32>,
    /// Fixed destination column; `None` resolves by header lookup.
    pub destination_index: Option<u32>,
    /// Values are cleaned and written as numbers.
    pub numeric: bool,
}

impl MappingEntry {
    const fn new(
        source: &'static str,
        destination: &'static str,
        source_index: Option<u32>,
        destination_index: Option<u32>,
    ) -> Self {
        Self {
            source,
            destination,
            source_index,
            destination_index,
            numeric: false,
        }
    }

    const fn as_numeric(mut self) -> Self {
        self.numeric = true;
        self
    }
}

/// Mapping table, in transfer order.
pub const MAPPING: [MappingEntry; 6] = [
    MappingEntry::new("Cta", "CTA", None, None),
    MappingEntry::new("Suc - Tipo - Nro", "Suc - Tipo - Nro", Some(3), Some(5)),
    MappingEntry::new(DATE_COLUMN, "FECHA", Some(4), Some(6)),
    MappingEntry::new(GLOSA_COLUMN, "Glosa / Proveedor", Some(7), Some(9)),
    MappingEntry::new("CC", "CC", Some(8), Some(10)),
    MappingEntry::new("Debe", "Debe", Some(9), Some(12)).as_numeric(),
];

/// Source column names in mapping order.
pub fn source_columns() -> Vec<String> {
    MAPPING.iter().map(|m| m.source.to_string()).collect()
}

/// A mapping entry with its destination column fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub entry: MappingEntry,
    pub destination_col: u32,
}

/// Resolve every entry, using `lookup` for entries without a fixed index.
///
/// Returns the destination names that stayed unresolved on failure.
pub fn resolve<F>(lookup: F) -> Result<Vec<ResolvedEntry>, Vec<String>>
where
    F: Fn(&str) -> Option<u32>,
{
    let mut resolved = Vec::with_capacity(MAPPING.len());
    let mut missing = Vec::new();

    for entry in MAPPING {
        match entry.destination_index.or_else(|| lookup(entry.destination)) {
            Some(destination_col) => resolved.push(ResolvedEntry {
                entry,
                destination_col,
            }),
            None => missing.push(entry.destination.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(resolved)
    } else {
        Err(missing)
    }
}
