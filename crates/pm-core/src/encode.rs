//! Activity relabeling.
//!
//! Two mutually exclusive modes make repeated behavior visible as distinct
//! graph nodes:
//!
//! - **Counting**: `A, B, A` becomes `A_1, B_1, A_2` (per case).
//! - **State tagging**: each label gets the running counts of the configured
//!   state-changing activities, concatenated in configuration order.
//!
//! [`strip_suffixes`] undoes either relabeling.

use pm_common::{Error, EventLog, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// How activity labels are rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingMode {
    Counting,
    StateTagging(Vec<String>),
}

impl EncodingMode {
    /// Build the mode from request options.
    ///
    /// An empty state list is the same as none. Requesting both modes is a
    /// [`Error::ConfigurationConflict`].
    pub fn from_options(add_counts: bool, states: Option<&[String]>) -> Result<Option<Self>> {
        let states = states.filter(|s| !s.is_empty());
        match (add_counts, states) {
            (true, Some(_)) => Err(Error::ConfigurationConflict(
                "cannot add states and counts at the same time".to_string(),
            )),
            (true, None) => Ok(Some(EncodingMode::Counting)),
            (false, Some(states)) => Ok(Some(EncodingMode::StateTagging(states.to_vec()))),
            (false, None) => Ok(None),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EncodingMode::Counting => "counting",
            EncodingMode::StateTagging(_) => "state_tagging",
        }
    }
}

/// Relabel a log with the given mode.
pub fn encode(log: &EventLog, mode: &EncodingMode) -> EventLog {
    match mode {
        EncodingMode::Counting => add_counts(log),
        EncodingMode::StateTagging(states) => add_states(log, states),
    }
}

/// Per-event running occurrence index of its activity within its case,
/// indexed by log position.
fn occurrence_indices(log: &EventLog) -> Vec<usize> {
    let mut indices = vec![0; log.len()];
    for case in log.cases() {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (&position, event) in case.positions.iter().zip(&case.events) {
            let count = seen.entry(event.activity.as_str()).or_insert(0);
            *count += 1;
            indices[position] = *count;
        }
    }
    indices
}

/// Append a 1-based per-case occurrence counter to every activity.
pub fn add_counts(log: &EventLog) -> EventLog {
    let indices = occurrence_indices(log);
    log.relabel(|position, event| format!("{}_{}", event.activity, indices[position]))
}

/// Append the state signature of each event to its activity.
///
/// The signature concatenates how often each distinct state-changing
/// activity has occurred in the case so far, this event included. Repeated
/// entries in `states` count once, at their first position. With more than one
/// state activity, the last event of each case gets a plain occurrence
/// counter instead, so cases do not fan out into many sink nodes.
pub fn add_states(log: &EventLog, states: &[String]) -> EventLog {
    let mut distinct: Vec<&str> = Vec::with_capacity(states.len());
    for state in states {
        if !distinct.contains(&state.as_str()) {
            distinct.push(state);
        }
    }
    let states = distinct;

    let mut signatures: Vec<String> = vec![String::new(); log.len()];
    let occurrences = if states.len() > 1 {
        Some(occurrence_indices(log))
    } else {
        None
    };

    for case in log.cases() {
        let mut counts = vec![0usize; states.len()];
        let last = case.positions.last().copied();
        for (&position, event) in case.positions.iter().zip(&case.events) {
            if let Some(slot) = states.iter().position(|s| *s == event.activity) {
                counts[slot] += 1;
            }
            signatures[position] = match (&occurrences, last) {
                (Some(occurrences), Some(last)) if last == position => {
                    occurrences[position].to_string()
                }
                _ => counts.iter().map(|c| c.to_string()).collect(),
            };
        }
    }

    log.relabel(|position, event| format!("{}_{}", event.activity, signatures[position]))
}

fn suffix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?P<base>.+)_\d+$").expect("suffix pattern is valid"))
}

/// Remove a trailing `_<digits>` from one label.
pub fn strip_suffix(label: &str) -> &str {
    suffix_pattern()
        .captures(label)
        .and_then(|caps| caps.name("base"))
        .map_or(label, |base| base.as_str())
}

/// Remove the counter or state suffix from every activity.
pub fn strip_suffixes(log: &EventLog) -> EventLog {
    log.relabel(|_, event| strip_suffix(&event.activity).to_string())
}
