//! External date-string handling
//!
//! Dates cross the boundary as ISO 8601 strings:
//! - `YYYY-MM-DD` (midnight UTC)
//! - `YYYY-MM-DDTHH:MM:SSZ`
//! - `YYYY-MM-DDTHH:MM:SS+HH:MM`
//!
//! Storage rows may also carry `YYYY-MM-DD HH:MM:SS` (read as UTC).
//! Output always uses the ATOM form, e.g. `2020-01-01T00:00:00+00:00`.

use std::fmt::Write;
use std::sync::OnceLock;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

/// ATOM date format used for every date rendered to the outside.
pub const ATOM_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

fn iso8601() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}(?:T\d{2}:\d{2}:\d{2}(?:Z|[-+]\d{2}:\d{2}))?$")
            .expect("static ISO 8601 pattern")
    })
}

/// Returns true if `value` is an ISO 8601 date or date-time naming a real instant.
pub fn is_iso8601(value: &str) -> bool {
    iso8601().is_match(value) && parse_external(value).is_some()
}

/// Parses an external ISO 8601 date string.
pub fn parse_external(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(utc(midnight))
}

/// Parses a date string as stored by a storage layer.
///
/// Accepts everything [`parse_external`] does plus `YYYY-MM-DD HH:MM:SS`.
pub fn parse_stored(value: &str) -> Option<DateTime<FixedOffset>> {
    parse_external(value).or_else(|| {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(utc)
    })
}

/// Returns true if every specifier in `format` is one chrono understands.
pub fn is_valid_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}

/// Renders a date in the given chrono format, falling back to ATOM if the
/// format cannot be rendered.
pub fn render(value: &DateTime<FixedOffset>, format: &str) -> String {
    let mut rendered = String::new();
    if write!(rendered, "{}", value.format(format)).is_err() {
        return render_atom(value);
    }
    rendered
}

/// Renders a date in the ATOM form.
pub fn render_atom(value: &DateTime<FixedOffset>) -> String {
    value.format(ATOM_FORMAT).to_string()
}

fn utc(naive: NaiveDateTime) -> DateTime<FixedOffset> {
    Utc.from_utc_datetime(&naive).fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_iso8601_forms() {
        assert!(is_iso8601("2020-01-01"));
        assert!(is_iso8601("2014-01-01T17:00:00Z"));
        assert!(is_iso8601("2014-01-01T17:00:00+01:00"));
        assert!(is_iso8601("2014-01-01T17:00:00-05:00"));
    }

    #[test]
    fn test_rejects_malformed_or_impossible_dates() {
        assert!(!is_iso8601("2020-13-01"));
        assert!(!is_iso8601("2020-02-30"));
        assert!(!is_iso8601("01/01/2020"));
        assert!(!is_iso8601("2020-01-01T17:00"));
        assert!(!is_iso8601("2020-01-01 17:00:00"));
        assert!(!is_iso8601(""));
    }

    #[test]
    fn test_date_only_is_midnight_utc() {
        let parsed = parse_external("2020-01-01").unwrap();
        assert_eq!(render_atom(&parsed), "2020-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_offset_is_preserved() {
        let parsed = parse_external("2014-01-01T17:00:00+01:00").unwrap();
        assert_eq!(render_atom(&parsed), "2014-01-01T17:00:00+01:00");
    }

    #[test]
    fn test_format_validity() {
        assert!(is_valid_format(ATOM_FORMAT));
        assert!(is_valid_format("%Y-%m-%d"));
        assert!(!is_valid_format("%Q"));
        assert!(!is_valid_format("%Y-%"));
    }

    #[test]
    fn test_unrenderable_format_falls_back_to_atom() {
        let parsed = parse_external("2020-01-01").unwrap();
        assert_eq!(render(&parsed, "%d/%m/%Y"), "01/01/2020");
        assert_eq!(render(&parsed, "%Q"), "2020-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_stored_sql_datetime() {
        let parsed = parse_stored("2020-06-15 08:30:00").unwrap();
        assert_eq!(render_atom(&parsed), "2020-06-15T08:30:00+00:00");
        assert!(parse_external("2020-06-15 08:30:00").is_none());
    }
}
