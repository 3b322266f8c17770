//! Shared helpers for unit and integration tests: fixtures under
//! `tests/fixtures`, a small event-log builder and a few assertion macros.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use pm_common::{Event, EventLog};
use std::path::PathBuf;

/// Unwrap an `Ok`, panicking with the error's `Debug` form otherwise.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        $crate::assert_ok!($result, "expected Ok")
    };
    ($result:expr, $label:expr) => {
        $result.unwrap_or_else(|err| panic!("{}: {:?}", $label, err))
    };
}

/// Assert a `Result` is `Err`.
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        $crate::assert_err!($result, "expected Err")
    };
    ($result:expr, $label:expr) => {
        if let Ok(value) = &$result {
            panic!("{}, got Ok({:?})", $label, value);
        }
    };
}

/// Compare two `f64`s within an absolute tolerance (default `1e-6`).
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr) => {
        $crate::assert_approx_eq!($left, $right, 1e-6)
    };
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right, tolerance): (f64, f64, f64) = ($left, $right, $tolerance);
        assert!(
            (left - right).abs() <= tolerance,
            "{left} and {right} differ by more than {tolerance}"
        );
    }};
}

pub fn fixture_path(name: &str) -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "fixtures", name]
        .iter()
        .collect()
}

pub fn load_fixture(name: &str) -> std::io::Result<String> {
    std::fs::read_to_string(fixture_path(name))
}

pub fn load_fixture_json<T: serde::de::DeserializeOwned>(name: &str) -> Result<T, String> {
    let text = load_fixture(name).map_err(|e| format!("{name}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("{name}: {e}"))
}

/// Midnight of the given day.
pub fn day(year: i32, month: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| panic!("invalid test date {year}-{month}-{d}"))
}

/// Builds a log case by case; each event of a case is one minute after the
/// previous one unless an explicit offset is given.
#[derive(Debug, Clone)]
pub struct LogBuilder {
    origin: NaiveDateTime,
    events: Vec<Event>,
}

impl LogBuilder {
    pub fn new(origin: NaiveDateTime) -> Self {
        Self {
            origin,
            events: Vec::new(),
        }
    }

    /// Append a case whose activities are spaced one minute apart.
    pub fn case(mut self, case_id: &str, activities: &[&str]) -> Self {
        for (i, activity) in activities.iter().enumerate() {
            let ts = self.origin + Duration::minutes(i as i64);
            self.events.push(Event::new(case_id, *activity, ts));
        }
        self
    }

    /// Append a case with explicit offsets in seconds from the origin.
    pub fn timed_case(mut self, case_id: &str, steps: &[(&str, i64)]) -> Self {
        for (activity, offset) in steps {
            let ts = self.origin + Duration::seconds(*offset);
            self.events.push(Event::new(case_id, *activity, ts));
        }
        self
    }

    /// Append `count` identical cases named `{prefix}{n}`.
    pub fn repeat(mut self, prefix: &str, count: usize, activities: &[&str]) -> Self {
        for n in 0..count {
            self = self.case(&format!("{prefix}{n}"), activities);
        }
        self
    }

    pub fn build(self) -> EventLog {
        EventLog::new(self.events)
    }
}

/// Two cases: T1 = A (Jan 1), B (Jan 2); T2 = A (Jan 1), C (Jan 3).
pub fn sample_log() -> EventLog {
    LogBuilder::new(day(2024, 1, 1))
        .timed_case("T1", &[("A", 0), ("B", 86_400)])
        .timed_case("T2", &[("A", 0), ("C", 172_800)])
        .build()
}
