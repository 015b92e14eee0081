//! Per-value cleanup of the source table before transfer.
//!
//! Nothing here fails: a value that cannot be cleaned passes through as is.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::workbook::CellValue;

/// Trailing dash patterns of the provider text, checked in order.
static GLOSA_SUFFIXES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"ESTABLE\s*-\s*$", "ESTABLE"),
        (r"CONTRATADO\s*-\s*$", "CONTRATADO"),
        (r"20530\s*-\s*$", "20530"),
        (r"\s*-\s*$", ""),
    ]
    .into_iter()
    .map(|(pattern, keep)| (Regex::new(pattern).unwrap(), keep))
    .collect()
});

/// Text date formats, first match wins.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%m-%d-%Y"];

/// Strip the first matching trailing dash pattern, then trim.
pub fn clean_glosa(value: CellValue) -> CellValue {
    let CellValue::Text(text) = value else {
        return value;
    };
    let mut text = text.trim().to_string();

    if let Some((re, keep)) = GLOSA_SUFFIXES.iter().find(|(re, _)| re.is_match(&text)) {
        text = re.replace(&text, *keep).into_owned();
    }
    CellValue::Text(text.trim().to_string())
}

/// Parse text dates; dates and anything unparseable pass through.
pub fn clean_date(value: CellValue) -> CellValue {
    let CellValue::Text(text) = &value else {
        return value;
    };
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(CellValue::DateTime)
        .unwrap_or(value)
}

/// Coerce amounts to numbers; text keeps only digits, `.` and `-`.
pub fn clean_number(value: CellValue) -> CellValue {
    match value {
        CellValue::Bool(b) => CellValue::Number(f64::from(u8::from(b))),
        CellValue::Text(ref text) => {
            let digits: String = text
                .trim()
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            if digits.is_empty() {
                return value;
            }
            digits.parse().map(CellValue::Number).unwrap_or(value)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_glosa_suffixes() {
        assert_eq!(clean_glosa(t("PERSONAL ESTABLE -")), t("PERSONAL ESTABLE"));
        assert_eq!(clean_glosa(t("PERSONAL CONTRATADO  - ")), t("PERSONAL CONTRATADO"));
        assert_eq!(clean_glosa(t("RUC 20530 -")), t("RUC 20530"));
        assert_eq!(clean_glosa(t("  LUZ DEL SUR - ")), t("LUZ DEL SUR"));
        assert_eq!(clean_glosa(t("AGUA - SEDAPAL")), t("AGUA - SEDAPAL"));
    }

    #[test]
    fn test_glosa_first_pattern_wins() {
        // Only the ESTABLE suffix goes; the earlier dash stays.
        assert_eq!(clean_glosa(t("A - ESTABLE -")), t("A - ESTABLE"));
    }

    #[test]
    fn test_glosa_non_text_passes() {
        assert_eq!(clean_glosa(CellValue::Number(3.0)), CellValue::Number(3.0));
        assert_eq!(clean_glosa(CellValue::Empty), CellValue::Empty);
    }

    #[test]
    fn test_date_formats_in_order() {
        let ymd = |y, m, d| {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            CellValue::DateTime(date.and_hms_opt(0, 0, 0).unwrap())
        };
        assert_eq!(clean_date(t("2024-01-31")), ymd(2024, 1, 31));
        // Day-first is tried before month-first
        assert_eq!(clean_date(t("02/03/2024")), ymd(2024, 3, 2));
        assert_eq!(clean_date(t("12/31/2024")), ymd(2024, 12, 31));
        assert_eq!(clean_date(t("31-01-2024")), ymd(2024, 1, 31));
        assert_eq!(clean_date(t("ayer")), t("ayer"));
        assert_eq!(clean_date(CellValue::Number(45000.0)), CellValue::Number(45000.0));
    }

    #[test]
    fn test_number_cleanup() {
        assert_eq!(clean_number(t("S/ 1,234.50")), CellValue::Number(1234.5));
        assert_eq!(clean_number(t("-80")), CellValue::Number(-80.0));
        assert_eq!(clean_number(t("n/a")), t("n/a"));
        assert_eq!(clean_number(t("1.2.3")), t("1.2.3"));
        assert_eq!(clean_number(CellValue::Number(7.0)), CellValue::Number(7.0));
        assert_eq!(clean_number(CellValue::Bool(true)), CellValue::Number(1.0));
    }
}
