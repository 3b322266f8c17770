//! Complexity reduction by variant frequency.
//!
//! The most frequent variants are admitted one at a time until the number of
//! cases they cover strictly exceeds `retention × case_count`. The check runs
//! before each admission, so the most frequent variant is always kept and a
//! boundary that is hit exactly admits one more variant.

use pm_common::{Error, EventLog, Result};
use std::collections::HashSet;

use crate::variants::VariantIndex;

/// Outcome of a reduction, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReductionStats {
    pub cases_before: usize,
    pub cases_after: usize,
    pub variants_before: usize,
    pub variants_kept: usize,
}

/// Keep the cases of the dominant variants.
///
/// `retention` is the fraction of cases to cover, in [0, 1].
pub fn reduce(log: &EventLog, retention: f64) -> Result<EventLog> {
    reduce_with_stats(log, retention).map(|(log, _)| log)
}

pub fn reduce_with_stats(log: &EventLog, retention: f64) -> Result<(EventLog, ReductionStats)> {
    if !(0.0..=1.0).contains(&retention) {
        return Err(Error::InvalidArgument(format!(
            "retention fraction must lie in [0, 1], got {retention}"
        )));
    }

    let cases = log.cases();
    let index = VariantIndex::build(&cases);
    let target = retention * cases.len() as f64;

    let mut kept: HashSet<&str> = HashSet::new();
    let mut covered = 0usize;
    let mut variants_kept = 0usize;
    for variant in index.ranked() {
        if covered as f64 > target {
            break;
        }
        kept.extend(variant.cases.iter().map(|&i| cases[i].case_id));
        covered += variant.frequency();
        variants_kept += 1;
    }

    let stats = ReductionStats {
        cases_before: cases.len(),
        cases_after: covered,
        variants_before: index.len(),
        variants_kept,
    };
    let reduced = log.clone().retain_cases(|case_id| kept.contains(case_id));
    Ok((reduced, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pm_common::Event;

    /// A→B ×4, A→C ×2, A→D ×1.
    fn scenario() -> EventLog {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut events = Vec::new();
        let plan = [("B", 4), ("C", 2), ("D", 1)];
        let mut n = 0;
        for (second, count) in plan {
            for _ in 0..count {
                let case = format!("case-{n}");
                events.push(Event::new(case.as_str(), "A", base));
                events.push(Event::new(case.as_str(), second, base + Duration::hours(1)));
                n += 1;
            }
        }
        EventLog::new(events)
    }

    fn kept_variants(log: &EventLog) -> Vec<String> {
        let mut seconds: Vec<String> = log
            .cases()
            .iter()
            .map(|c| c.variant().join("->"))
            .collect();
        seconds.sort();
        seconds.dedup();
        seconds
    }

    #[test]
    fn test_low_retention_keeps_dominant_variant() {
        let reduced = reduce(&scenario(), 0.2).unwrap();
        assert_eq!(kept_variants(&reduced), vec!["A->B"]);
        assert_eq!(reduced.case_count(), 4);
    }

    #[test]
    fn test_mid_retention_keeps_two_variants() {
        let reduced = reduce(&scenario(), 0.8).unwrap();
        assert_eq!(kept_variants(&reduced), vec!["A->B", "A->C"]);
    }

    #[test]
    fn test_full_retention_is_identity() {
        let log = scenario();
        let reduced = reduce(&log, 1.0).unwrap();
        assert_eq!(reduced, log);
    }

    #[test]
    fn test_zero_retention_keeps_top_variant() {
        let (reduced, stats) = reduce_with_stats(&scenario(), 0.0).unwrap();
        assert_eq!(kept_variants(&reduced), vec!["A->B"]);
        assert_eq!(stats.variants_kept, 1);
        assert_eq!(stats.cases_after, 4);
        assert_eq!(stats.cases_before, 7);
    }

    #[test]
    fn test_exact_boundary_admits_next_variant() {
        // A->B ×2, A->C ×1, A->D ×1: A->B alone covers exactly half.
        let log = scenario()
            .retain_cases(|c| matches!(c, "case-0" | "case-1" | "case-4" | "case-6"));
        let reduced = reduce(&log, 0.5).unwrap();
        assert_eq!(kept_variants(&reduced), vec!["A->B", "A->C"]);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(
            reduce(&scenario(), 1.1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(reduce(&scenario(), -0.5).is_err());
        assert!(reduce(&scenario(), f64::NAN).is_err());
    }

    #[test]
    fn test_empty_log() {
        let reduced = reduce(&EventLog::default(), 0.5).unwrap();
        assert!(reduced.is_empty());
    }

    #[test]
    fn test_single_variant_returned_whole() {
        let log = scenario().retain_cases(|c| c == "case-0" || c == "case-1");
        assert_eq!(reduce(&log, 0.0).unwrap(), log);
    }
}
