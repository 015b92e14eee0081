//! Entry-date parsing for the normalizer.
//!
//! Accepted, in order: `d/m/Y`, `d/m/y`, `d-m-Y`, `d-m-y`, `d.m.Y`, `d.m.y`,
//! ISO `Y-m-d`, then Excel serial numbers ≥ 1. Two-digit years pivot at 50.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::workbook::{dates, CellValue};

static DAY_FIRST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})([/.-])(\d{1,2})([/.-])(\d{4}|\d{2})$").unwrap());

static ISO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());

const SEPARATORS: [&str; 3] = ["/", "-", "."];

/// Parse an entry date; `None` means the row is discarded.
pub fn parse_entry_date(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(text) => parse_text(text.trim()),
        CellValue::Number(n) if *n >= 1.0 => dates::from_serial(*n),
        _ => None,
    }
}

fn parse_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = DAY_FIRST.captures(text) {
        let sep = &caps[2];
        if sep == &caps[4] && SEPARATORS.contains(&sep) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[3].parse().ok()?;
            let year_text = &caps[5];
            let mut year: i32 = year_text.parse().ok()?;
            if year_text.len() == 2 {
                year += if year >= 50 { 1900 } else { 2000 };
            }
            if let Some(dt) = midnight(year, month, day) {
                return Some(dt);
            }
        }
    }

    let caps = ISO.captures(text)?;
    midnight(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
}

fn midnight(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<String> {
        parse_entry_date(&CellValue::Text(s.to_string())).map(|d| dates::format_dmy(&d))
    }

    #[test]
    fn test_day_first_formats() {
        assert_eq!(text("31/01/2024").as_deref(), Some("31/01/2024"));
        assert_eq!(text("1-2-2024").as_deref(), Some("01/02/2024"));
        assert_eq!(text("05.06.2023").as_deref(), Some("05/06/2023"));
        assert_eq!(text("  31/01/2024  ").as_deref(), Some("31/01/2024"));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(text("01/01/24").as_deref(), Some("01/01/2024"));
        assert_eq!(text("01/01/49").as_deref(), Some("01/01/2049"));
        assert_eq!(text("01/01/50").as_deref(), Some("01/01/1950"));
        assert_eq!(text("15.08.99").as_deref(), Some("15/08/1999"));
    }

    #[test]
    fn test_iso_format() {
        assert_eq!(text("2024-01-31").as_deref(), Some("31/01/2024"));
    }

    #[test]
    fn test_rejects() {
        assert_eq!(text(""), None);
        assert_eq!(text("sin fecha"), None);
        assert_eq!(text("31/02/2024"), None);
        assert_eq!(text("01/02-2024"), None);
        assert_eq!(text("31/01/2024 10:00"), None);
        assert_eq!(parse_entry_date(&CellValue::Empty), None);
        assert_eq!(parse_entry_date(&CellValue::Bool(true)), None);
    }

    #[test]
    fn test_serial_numbers() {
        let parsed = parse_entry_date(&CellValue::Number(45000.0)).unwrap();
        let expected = dates::excel_epoch() + chrono::Duration::days(45000);
        assert_eq!(parsed, expected);
        assert_eq!(parse_entry_date(&CellValue::Number(0.5)), None);
    }
}
