//! Raw record validation and event-log loading.
//!
//! A raw record is the column-oriented form callers submit:
//!
//! ```json
//! {
//!   "concept:name":      {"0": "A", "1": "B"},
//!   "case:concept:name": {"0": "T1", "1": "T1"},
//!   "time:timestamp":    {"0": "2024-01-01T00:00:00", "1": "2024-01-02T00:00:00"}
//! }
//! ```
//!
//! Checks run in a fixed order and the first failure wins, so a record with
//! several problems always reports the same one.

use chrono::NaiveDateTime;
use pm_common::timestamp::{self, TimestampError};
use pm_common::{Error, Event, EventLog, Result};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

pub const ACTIVITY_KEY: &str = "concept:name";
pub const CASE_KEY: &str = "case:concept:name";
pub const TIMESTAMP_KEY: &str = "time:timestamp";

/// Column keys in the order they are reported and checked.
pub const EXPECTED_KEYS: [&str; 3] = [ACTIVITY_KEY, CASE_KEY, TIMESTAMP_KEY];

/// The three inner columns of a structurally valid record.
struct Columns<'a> {
    activities: &'a Map<String, Value>,
    cases: &'a Map<String, Value>,
    timestamps: &'a Map<String, Value>,
}

/// Validate a raw record without keeping the loaded log.
pub fn validate_record(record: &Value) -> Result<()> {
    parse_record(record).map(|_| ())
}

/// Validate a raw record and load it as an event log.
///
/// Events appear in the row order of the `concept:name` column.
pub fn parse_record(record: &Value) -> Result<EventLog> {
    let columns = check_columns(record)?;
    check_indices(&columns)?;
    let rows = check_values(&columns)?;
    let log: EventLog = rows.into_iter().collect();
    check_sorting(&log)?;
    Ok(log)
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InputValidation(message.into())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_columns(record: &Value) -> Result<Columns<'_>> {
    let outer = record.as_object().ok_or_else(|| {
        invalid(format!(
            "Record has the wrong data type. Expected object, got {}.",
            json_type_name(record)
        ))
    })?;

    if outer.len() != EXPECTED_KEYS.len() {
        return Err(invalid(format!(
            "Wrong number of keys. Expected 3, got {}.",
            outer.len()
        )));
    }
    for key in outer.keys() {
        if !EXPECTED_KEYS.contains(&key.as_str()) {
            return Err(invalid(format!(
                "Wrong key. Expected {}, got {}.",
                EXPECTED_KEYS.join(", "),
                key
            )));
        }
    }

    let column = |key: &str| -> Result<&Map<String, Value>> {
        let value = &outer[key];
        value.as_object().ok_or_else(|| {
            invalid(format!(
                "{} has the wrong data type. Expected object, got {}.",
                key,
                json_type_name(value)
            ))
        })
    };

    Ok(Columns {
        activities: column(ACTIVITY_KEY)?,
        cases: column(CASE_KEY)?,
        timestamps: column(TIMESTAMP_KEY)?,
    })
}

fn check_indices(columns: &Columns<'_>) -> Result<()> {
    let (a, c, t) = (
        columns.activities.len(),
        columns.cases.len(),
        columns.timestamps.len(),
    );
    if !(a == c && c == t) {
        return Err(invalid(format!(
            "Number of events, trace identifiers and timestamps do not match. \
             Got {a} events, {c} trace identifiers and {t} timestamps."
        )));
    }

    let activity_keys: HashSet<&str> = columns.activities.keys().map(String::as_str).collect();
    let same = |other: &Map<String, Value>| other.keys().all(|k| activity_keys.contains(k.as_str()));
    if !same(columns.cases) || !same(columns.timestamps) {
        return Err(invalid("Indices are not identical."));
    }
    Ok(())
}

fn expect_string<'a>(value: &'a Value, column: &str) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        invalid(format!(
            "{} in {} has the wrong type. Expected string, got {}.",
            value,
            column,
            json_type_name(value)
        ))
    })
}

fn check_values(columns: &Columns<'_>) -> Result<Vec<Event>> {
    for value in columns.activities.values() {
        expect_string(value, ACTIVITY_KEY)?;
    }
    for value in columns.cases.values() {
        expect_string(value, CASE_KEY)?;
    }

    let mut parsed: HashMap<&str, NaiveDateTime> = HashMap::with_capacity(columns.timestamps.len());
    for (index, value) in columns.timestamps {
        let raw = expect_string(value, TIMESTAMP_KEY)?;
        let ts = timestamp::parse_naive(raw).map_err(|e| match e {
            TimestampError::NotIso(v) => invalid(format!("{v} is not valid ISO8601.")),
            TimestampError::HasTimezone(v) => {
                invalid(format!("{v} should not contain a time zone."))
            }
        })?;
        parsed.insert(index.as_str(), ts);
    }

    let mut rows = Vec::with_capacity(columns.activities.len());
    for (index, activity) in columns.activities {
        let activity = expect_string(activity, ACTIVITY_KEY)?;
        let case_id = columns
            .cases
            .get(index)
            .map(|v| expect_string(v, CASE_KEY))
            .transpose()?;
        let ts = parsed.get(index.as_str()).copied();
        match (case_id, ts) {
            (Some(case_id), Some(ts)) => rows.push(Event::new(case_id, activity, ts)),
            _ => return Err(invalid("Indices are not identical.")),
        }
    }
    Ok(rows)
}

/// Timestamps must be non-decreasing within each case, in row order.
fn check_sorting(log: &EventLog) -> Result<()> {
    let mut last_seen: HashMap<&str, NaiveDateTime> = HashMap::new();
    for event in log {
        if let Some(previous) = last_seen.insert(event.case_id.as_str(), event.timestamp) {
            if event.timestamp < previous {
                return Err(invalid("Events are not sorted."));
            }
        }
    }
    Ok(())
}

/// Serialize a log back to the raw record form, with row indices `0..n`.
pub fn to_raw_record(log: &EventLog) -> Value {
    let mut activities = Map::with_capacity(log.len());
    let mut cases = Map::with_capacity(log.len());
    let mut timestamps = Map::with_capacity(log.len());

    for (row, event) in log.iter().enumerate() {
        let index = row.to_string();
        activities.insert(index.clone(), Value::String(event.activity.clone()));
        cases.insert(index.clone(), Value::String(event.case_id.clone()));
        timestamps.insert(index, Value::String(timestamp::format_event(&event.timestamp)));
    }

    let mut record = Map::with_capacity(3);
    record.insert(ACTIVITY_KEY.to_string(), Value::Object(activities));
    record.insert(CASE_KEY.to_string(), Value::Object(cases));
    record.insert(TIMESTAMP_KEY.to_string(), Value::Object(timestamps));
    Value::Object(record)
}
