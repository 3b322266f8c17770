//! Event log data model.
//!
//! An [`EventLog`] is a flat, ordered list of events. Cases are never
//! stored; [`EventLog::cases`] groups them on demand.

use chrono::{Duration, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One timestamped occurrence of an activity within a case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    pub case_id: String,
    pub activity: String,
    pub timestamp: NaiveDateTime,
}

impl Event {
    pub fn new(
        case_id: impl Into<String>,
        activity: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Event {
            case_id: case_id.into(),
            activity: activity.into(),
            timestamp,
        }
    }
}

/// Ordered collection of events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new(events: Vec<Event>) -> Self {
        EventLog { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Group events by case, in order of each case's first appearance.
    ///
    /// Within a case, events are ordered by timestamp; equal timestamps keep
    /// their log order.
    pub fn cases(&self) -> Vec<Case<'_>> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut cases: Vec<Case<'_>> = Vec::new();

        for (position, event) in self.events.iter().enumerate() {
            let slot = *index.entry(event.case_id.as_str()).or_insert_with(|| {
                cases.push(Case {
                    case_id: event.case_id.as_str(),
                    positions: Vec::new(),
                    events: Vec::new(),
                });
                cases.len() - 1
            });
            cases[slot].positions.push(position);
            cases[slot].events.push(event);
        }

        for case in &mut cases {
            case.sort_by_time();
        }
        cases
    }

    pub fn case_count(&self) -> usize {
        self.events
            .iter()
            .map(|e| e.case_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Keep only the events whose case satisfies `keep`.
    pub fn retain_cases<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&str) -> bool,
    {
        let events = self
            .events
            .into_iter()
            .filter(|e| keep(e.case_id.as_str()))
            .collect();
        EventLog { events }
    }

    /// Rewrite every activity label, preserving case ids, timestamps, and order.
    pub fn relabel<F>(&self, mut label: F) -> Self
    where
        F: FnMut(usize, &Event) -> String,
    {
        let events = self
            .events
            .iter()
            .enumerate()
            .map(|(position, e)| Event {
                case_id: e.case_id.clone(),
                activity: label(position, e),
                timestamp: e.timestamp,
            })
            .collect();
        EventLog { events }
    }
}

impl From<Vec<Event>> for EventLog {
    fn from(events: Vec<Event>) -> Self {
        EventLog::new(events)
    }
}

impl FromIterator<Event> for EventLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        EventLog::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Borrowed view of all events sharing a case id.
#[derive(Debug, Clone)]
pub struct Case<'a> {
    pub case_id: &'a str,
    /// Positions of the events in the parent log, in time order.
    pub positions: Vec<usize>,
    pub events: Vec<&'a Event>,
}

impl<'a> Case<'a> {
    fn sort_by_time(&mut self) {
        let mut paired: Vec<(usize, &'a Event)> = self
            .positions
            .iter()
            .copied()
            .zip(self.events.iter().copied())
            .collect();
        paired.sort_by_key(|(_, e)| e.timestamp);
        self.positions = paired.iter().map(|(p, _)| *p).collect();
        self.events = paired.into_iter().map(|(_, e)| e).collect();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The variant of this case: its activity sequence.
    pub fn variant(&self) -> Vec<&'a str> {
        self.events.iter().map(|e| e.activity.as_str()).collect()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.events.first().map(|e| e.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Last minus first timestamp; zero for single-event cases.
    pub fn duration(&self) -> Duration {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => last - first,
            _ => Duration::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn sample() -> EventLog {
        EventLog::new(vec![
            Event::new("T2", "A", day(1)),
            Event::new("T1", "A", day(1)),
            Event::new("T1", "B", day(2)),
            Event::new("T2", "C", day(3)),
        ])
    }

    #[test]
    fn cases_follow_first_appearance() {
        let log = sample();
        let cases = log.cases();
        let ids: Vec<&str> = cases.iter().map(|c| c.case_id).collect();
        assert_eq!(ids, vec!["T2", "T1"]);
        assert_eq!(cases[0].positions, vec![0, 3]);
        assert_eq!(cases[1].variant(), vec!["A", "B"]);
    }

    #[test]
    fn cases_sort_by_time_stably() {
        let log = EventLog::new(vec![
            Event::new("T1", "B", day(2)),
            Event::new("T1", "A", day(1)),
            Event::new("T1", "C", day(2)),
        ]);
        let cases = log.cases();
        assert_eq!(cases[0].variant(), vec!["A", "B", "C"]);
        assert_eq!(cases[0].positions, vec![1, 0, 2]);
    }

    #[test]
    fn case_duration() {
        let log = sample();
        let cases = log.cases();
        assert_eq!(cases[0].duration(), Duration::days(2));
        assert_eq!(cases[1].duration(), Duration::days(1));
    }

    #[test]
    fn single_event_case_has_zero_duration() {
        let log = EventLog::new(vec![Event::new("T1", "A", day(1))]);
        assert_eq!(log.cases()[0].duration(), Duration::zero());
    }

    #[test]
    fn case_count_counts_distinct_ids() {
        assert_eq!(sample().case_count(), 2);
        assert_eq!(EventLog::new(Vec::new()).case_count(), 0);
    }

    #[test]
    fn retain_cases_drops_events() {
        let log = sample().retain_cases(|id| id == "T1");
        assert_eq!(log.len(), 2);
        assert_eq!(log.case_count(), 1);
    }

    #[test]
    fn relabel_preserves_order() {
        let log = sample().relabel(|_, e| format!("{}!", e.activity));
        let labels: Vec<&str> = log.iter().map(|e| e.activity.as_str()).collect();
        assert_eq!(labels, vec!["A!", "A!", "B!", "C!"]);
    }
}
