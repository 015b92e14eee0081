//! Excel serial dates.
//!
//! Serial numbers count days from 1899-12-30 (the epoch that absorbs the
//! 1900 leap-year bug); the fractional part is the time of day.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn excel_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Epoch plus `serial` days, rounded to the millisecond.
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    excel_epoch().checked_add_signed(Duration::milliseconds(millis as i64))
}

pub fn to_serial(value: &NaiveDateTime) -> f64 {
    let delta = *value - excel_epoch();
    delta.num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// `dd/mm/yyyy`.
pub fn format_dmy(value: &NaiveDateTime) -> String {
    value.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_45000() {
        let dt = from_serial(45000.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2023, 3, 15).unwrap());
        assert_eq!(format_dmy(&dt), "15/03/2023");
    }

    #[test]
    fn test_fraction_is_time_of_day() {
        let dt = from_serial(45000.5).unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "12:00");
        assert!((to_serial(&dt) - 45000.5).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(from_serial(f64::NAN).is_none());
        assert!(from_serial(f64::INFINITY).is_none());
    }
}
