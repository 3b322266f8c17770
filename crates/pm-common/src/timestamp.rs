//! Timezone-naive timestamp parsing and formatting.
//!
//! Event logs carry wall-clock instants without an offset. Anything that
//! names a timezone (`Z`, `+02:00`, `-0500`) is rejected rather than
//! silently converted.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Format used when writing event timestamps back to the raw record form.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Format of occupancy bin keys (`2024-01-01 00:00:00`).
pub const BIN_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the `created` field in discovery responses.
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp '{0}' carries a timezone")]
    HasTimezone(String),

    #[error("timestamp '{0}' is not ISO-8601")]
    NotIso(String),
}

/// Parse a timezone-naive ISO-8601 timestamp.
///
/// Accepts `YYYY-MM-DD` (midnight) and `YYYY-MM-DD[T ]HH:MM[:SS[.f]]`.
/// Surrounding whitespace is not allowed. A string is only reported as
/// carrying a timezone when it is otherwise a valid ISO-8601 datetime.
pub fn parse_naive(raw: &str) -> Result<NaiveDateTime, TimestampError> {
    // chrono skips whitespace before numeric fields.
    if raw.trim() != raw {
        return Err(TimestampError::NotIso(raw.to_string()));
    }
    if let Some(ts) = parse_datetime(raw) {
        return Ok(ts);
    }
    if let Some(ts) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(ts);
    }

    match split_offset(raw) {
        Some((local, offset)) if is_offset(offset) && parse_datetime(local).is_some() => {
            Err(TimestampError::HasTimezone(raw.to_string()))
        }
        _ => Err(TimestampError::NotIso(raw.to_string())),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Split `<local><offset>` where the offset is `Z` or starts at the last
/// sign after the date part.
fn split_offset(s: &str) -> Option<(&str, &str)> {
    if let Some(local) = s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        return Some((local, ""));
    }
    let time = s.get(10..)?;
    let sign = time.rfind(['+', '-'])? + 10;
    Some((&s[..sign], &s[sign + 1..]))
}

/// `HH`, `HHMM`, `HH:MM` or `HH:MM:SS`; empty for `Z`.
fn is_offset(offset: &str) -> bool {
    if offset.is_empty() {
        return true;
    }
    let digits: String = offset.chars().filter(|c| *c != ':').collect();
    digits.chars().all(|c| c.is_ascii_digit()) && matches!(digits.len(), 2 | 4 | 6)
}

/// Render a timestamp the way event logs are written back out.
pub fn format_event(ts: &NaiveDateTime) -> String {
    ts.format(EVENT_TIMESTAMP_FORMAT).to_string()
}

/// Render a bin start as an occupancy map key.
pub fn format_bin_key(ts: &NaiveDateTime) -> String {
    ts.format(BIN_KEY_FORMAT).to_string()
}

/// Seconds in a duration, with microsecond precision.
pub fn seconds(delta: Duration) -> f64 {
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1_000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_date_only_as_midnight() {
        assert_eq!(parse_naive("2024-01-02").unwrap(), ts(2024, 1, 2, 0, 0, 0));
    }

    #[test]
    fn parses_t_and_space_separators() {
        assert_eq!(
            parse_naive("2024-01-02T03:04:05").unwrap(),
            ts(2024, 1, 2, 3, 4, 5)
        );
        assert_eq!(
            parse_naive("2024-01-02 03:04:05").unwrap(),
            ts(2024, 1, 2, 3, 4, 5)
        );
        assert_eq!(parse_naive("2024-01-02T03:04").unwrap(), ts(2024, 1, 2, 3, 4, 0));
    }

    #[test]
    fn parses_fractional_seconds() {
        let parsed = parse_naive("2024-01-02T03:04:05.250").unwrap();
        assert_eq!(parsed - ts(2024, 1, 2, 3, 4, 5), Duration::milliseconds(250));
    }

    #[test]
    fn rejects_timezones() {
        for raw in ["2024-01-02T03:04:05Z", "2024-01-02T03:04:05+02:00", "2024-01-02 03:04:05-0500"] {
            assert!(matches!(
                parse_naive(raw),
                Err(TimestampError::HasTimezone(_))
            ));
        }
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["yesterday", "2024/01/02", "2024-13-01", ""] {
            assert!(matches!(parse_naive(raw), Err(TimestampError::NotIso(_))));
        }
    }

    #[test]
    fn invalid_text_with_sign_is_not_iso() {
        for raw in ["not a date+1", "2024-01-02T25:00:00+02:00", "2024-01-02T03:04:05+ab"] {
            assert!(
                matches!(parse_naive(raw), Err(TimestampError::NotIso(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn rejects_surrounding_whitespace() {
        for raw in [" 2024-01-01T10:00:00 ", "2024-01-01T10:00:00\n", " 2024-01-01"] {
            assert!(matches!(parse_naive(raw), Err(TimestampError::NotIso(_))));
        }
    }

    #[test]
    fn formats_keys_and_events() {
        let t = ts(2024, 1, 1, 0, 0, 0);
        assert_eq!(format_bin_key(&t), "2024-01-01 00:00:00");
        assert_eq!(format_event(&t), "2024-01-01T00:00:00");
    }

    #[test]
    fn seconds_of_day() {
        assert_eq!(seconds(Duration::days(1)), 86_400.0);
        assert_eq!(seconds(Duration::milliseconds(1500)), 1.5);
    }
}
