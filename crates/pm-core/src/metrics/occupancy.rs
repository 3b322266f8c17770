//! Time-windowed occupancy ("active events") per calendar bin.
//!
//! Each series walks its bins with a running counter. For bin `i` spanning
//! `[start_i, end_i)`:
//!
//! ```text
//! running += positive events in [start_i, end_i)
//!          - negative events in [start_(i-1), start_i)
//! value_i  = running + singular events in [start_i, end_i)
//! ```
//!
//! The first bin looks back one day before its start; the last bin ends at
//! the caller-supplied horizon.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use pm_common::timestamp::format_bin_key;
use pm_common::EventLog;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::request::{ActiveEventParameters, ActivityClass};

/// Occupancy per bin start (`YYYY-MM-DD HH:MM:SS`) for each bin width.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActiveEvents {
    pub yearly: BTreeMap<String, i64>,
    pub monthly: BTreeMap<String, i64>,
    pub weekly: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinWidth {
    Weekly,
    Monthly,
    Yearly,
}

fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

impl BinWidth {
    /// Start of the bin containing `ts`.
    fn floor(self, ts: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = ts.date();
        let start = match self {
            BinWidth::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            BinWidth::Monthly => date.with_day(1)?,
            BinWidth::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
        };
        midnight(start)
    }

    fn next(self, start: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            BinWidth::Weekly => start.checked_add_signed(Duration::days(7)),
            BinWidth::Monthly => start.checked_add_months(Months::new(1)),
            BinWidth::Yearly => start.checked_add_months(Months::new(12)),
        }
    }
}

/// Bin starts from the bin covering `first` through the bin covering `last`.
pub fn bin_starts(width: BinWidth, first: NaiveDateTime, last: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut starts = Vec::new();
    let mut current = width.floor(first);
    while let Some(start) = current {
        if start > last {
            break;
        }
        starts.push(start);
        current = width.next(start);
    }
    starts
}

/// Sorted timestamps of one activity class.
#[derive(Debug, Default)]
struct Timeline(Vec<NaiveDateTime>);

impl Timeline {
    fn sorted(mut stamps: Vec<NaiveDateTime>) -> Self {
        stamps.sort_unstable();
        Timeline(stamps)
    }

    /// Events in `[from, to)`.
    fn count(&self, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
        if to <= from {
            return 0;
        }
        let lo = self.0.partition_point(|t| *t < from);
        let hi = self.0.partition_point(|t| *t < to);
        i64::try_from(hi - lo).unwrap_or(i64::MAX)
    }
}

struct Timelines {
    positive: Timeline,
    negative: Timeline,
    singular: Timeline,
}

impl Timelines {
    fn classify(log: &EventLog, params: Option<&ActiveEventParameters>) -> Self {
        let (mut positive, mut negative, mut singular) = (Vec::new(), Vec::new(), Vec::new());
        for event in log {
            let class = params
                .map(|p| p.classify(&event.activity))
                .unwrap_or(ActivityClass::Singular);
            match class {
                ActivityClass::Positive => positive.push(event.timestamp),
                ActivityClass::Negative => negative.push(event.timestamp),
                ActivityClass::Singular => singular.push(event.timestamp),
            }
        }
        Timelines {
            positive: Timeline::sorted(positive),
            negative: Timeline::sorted(negative),
            singular: Timeline::sorted(singular),
        }
    }

    fn series(&self, starts: &[NaiveDateTime], horizon: NaiveDateTime) -> BTreeMap<String, i64> {
        let mut values = BTreeMap::new();
        let mut running = 0i64;
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(horizon);
            let look_back = if i == 0 {
                start - Duration::days(1)
            } else {
                starts[i - 1]
            };
            running += self.positive.count(start, end) - self.negative.count(look_back, start);
            let value = running + self.singular.count(start, end);
            values.insert(format_bin_key(&start), value);
        }
        values
    }
}

/// Weekly, monthly, and yearly occupancy of a log.
///
/// Activities not named in `params` count as singular. Returns None for an
/// empty log.
pub fn active_events(
    log: &EventLog,
    params: Option<&ActiveEventParameters>,
    horizon: NaiveDateTime,
) -> Option<ActiveEvents> {
    let first = log.iter().map(|e| e.timestamp).min()?;
    let last = log.iter().map(|e| e.timestamp).max()?;
    let timelines = Timelines::classify(log, params);

    let series = |width| timelines.series(&bin_starts(width, first, last), horizon);
    Some(ActiveEvents {
        yearly: series(BinWidth::Yearly),
        monthly: series(BinWidth::Monthly),
        weekly: series(BinWidth::Weekly),
    })
}
