//! Lenient timestamp and flag parsing for imported rows.

use crate::error::{WatchError, WatchResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Format used when writing timestamps to a tabular export.
///
/// Fractional seconds are written only when present.
pub const EXPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse a timestamp cell.
///
/// RFC 3339 values are converted to their local wall-clock time by dropping
/// the offset. Date-only values mean midnight.
pub fn parse_timestamp(raw: &str) -> WatchResult<NaiveDateTime> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }

    Err(WatchError::Parse {
        value: raw.to_string(),
    })
}

/// Parse an `alert` cell. Returns `None` for text that is not a recognizable flag.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = ymd_hms(2024, 3, 5, 14, 30, 0);
        assert_eq!(parse_timestamp("2024-03-05 14:30").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-05 14:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-05T14:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-05T14:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("03/05/2024 14:30").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-05").unwrap(),
            ymd_hms(2024, 3, 5, 0, 0, 0)
        );
        assert_eq!(
            parse_timestamp(" 2024-03-05 14:30:15.250 ").unwrap().format(EXPORT_FORMAT).to_string(),
            "2024-03-05 14:30:15.250"
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(matches!(
            parse_timestamp("last tuesday"),
            Err(WatchError::Parse { .. })
        ));
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("2024-13-45").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("True"), Some(true));
        assert_eq!(parse_flag("no"), Some(false));
        assert_eq!(parse_flag(""), Some(false));
        assert_eq!(parse_flag("perhaps"), None);
    }
}
