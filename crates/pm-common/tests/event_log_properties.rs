//! Property tests for case grouping.

use chrono::{NaiveDate, NaiveDateTime};
use pm_common::{Event, EventLog};
use proptest::prelude::*;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn arb_log() -> impl Strategy<Value = EventLog> {
    prop::collection::vec((0u8..6, 0u8..4, 0i64..10_000), 0..60).prop_map(|rows| {
        rows.into_iter()
            .map(|(case, activity, offset)| {
                Event::new(
                    format!("case-{case}"),
                    format!("act-{activity}"),
                    base() + chrono::Duration::minutes(offset),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn grouping_conserves_events(log in arb_log()) {
        let cases = log.cases();
        let total: usize = cases.iter().map(|c| c.len()).sum();
        prop_assert_eq!(total, log.len());
        prop_assert_eq!(cases.len(), log.case_count());
    }

    #[test]
    fn cases_are_time_ordered(log in arb_log()) {
        for case in log.cases() {
            for pair in case.events.windows(2) {
                prop_assert!(pair[0].timestamp <= pair[1].timestamp);
            }
            prop_assert!(case.duration() >= chrono::Duration::zero());
        }
    }

    #[test]
    fn positions_point_at_case_events(log in arb_log()) {
        for case in log.cases() {
            for (pos, event) in case.positions.iter().zip(case.events.iter()) {
                prop_assert_eq!(&log.events()[*pos], *event);
            }
        }
    }
}
