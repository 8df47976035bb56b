//! Date helper functions

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Parse an ISO 8601 date or date-time.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339 with an offset
/// (normalized to UTC).
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Short en-US date (like "Jan 5, 2024"); empty for missing or invalid dates
pub fn format_date(s: &str) -> String {
    parse_date(s)
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Relative label used in the updates list, measured from `now`.
///
/// Same day shows the time of day, one day shows "Yesterday", anything else
/// "N Days Ago". Distance is absolute, so future dates count the same way.
pub fn relative_time_from(s: &str, now: NaiveDateTime) -> String {
    let Some(date) = parse_date(s) else {
        return String::new();
    };

    let days = now.signed_duration_since(date).num_days().abs();
    match days {
        0 => date.format("%-I:%M %p").to_string(),
        1 => "Yesterday".to_string(),
        n => format!("{} Days Ago", n),
    }
}

/// Relative label measured from the current local time
pub fn relative_time(s: &str) -> String {
    relative_time_from(s, Local::now().naive_local())
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml(s: &str) -> String {
    parse_date(s)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(
            parse_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            parse_date("2024-01-15T10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(10, 30, 0)
        );
        assert_eq!(
            parse_date("2024-01-15T10:30:00+02:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(8, 30, 0)
        );
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-01-05"), "Jan 5, 2024");
        assert_eq!(format_date("2023-11-20T08:00:00Z"), "Nov 20, 2023");
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("garbage"), "");
    }

    #[test]
    fn test_relative_time() {
        let now = at("2024-03-10T18:00:00");
        assert_eq!(relative_time_from("2024-03-10T10:42:00", now), "10:42 AM");
        assert_eq!(relative_time_from("2024-03-09T12:00:00", now), "Yesterday");
        assert_eq!(relative_time_from("2024-03-01", now), "9 Days Ago");
        assert_eq!(relative_time_from("", now), "");
    }

    #[test]
    fn test_date_xml() {
        assert_eq!(date_xml("2024-01-05"), "2024-01-05T00:00:00");
    }
}
