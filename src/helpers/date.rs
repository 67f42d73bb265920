//! Date helper functions

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt::Write;

/// Format a date with a strftime format string
///
/// Returns `None` when the format string contains an invalid specifier
/// instead of panicking the way `to_string()` on a chrono format would.
///
/// # Examples
/// ```ignore
/// format_date(&date, "%Y-%m-%d") // -> Some("2024-01-15")
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

/// Parse a timestamp given to the `date` template function
///
/// Accepts RFC 3339, the common `YYYY-MM-DD[ HH:MM[:SS]]` shapes and plain
/// dates. Naive values are read in local time.
pub fn parse_date(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&d.and_hms_opt(0, 0, 0)?).earliest();
        }
    }

    None
}

/// Convert a unix timestamp (seconds) into local time
pub fn from_timestamp(secs: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_format_date() {
        let date = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date, "%Y-%m-%d").as_deref(), Some("2024-01-15"));
        assert_eq!(format_date(&date, "%B %d, %Y").as_deref(), Some("January 15, 2024"));
    }

    #[test]
    fn test_invalid_format_does_not_panic() {
        let date = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date, "%Q"), None);
    }

    #[test]
    fn test_parse_date() {
        let dt = parse_date("2024-01-15").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 15));

        let dt = parse_date("2024-01-15 10:30:00").unwrap();
        assert_eq!(format_date(&dt, "%H:%M").as_deref(), Some("10:30"));

        assert!(parse_date("2024-01-15T10:30:00+02:00").is_some());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_from_timestamp() {
        let dt = from_timestamp(0).unwrap();
        assert_eq!(dt.with_timezone(&chrono::Utc).year(), 1970);
    }
}
