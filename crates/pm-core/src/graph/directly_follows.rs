//! In-process directly-follows miner.

use pm_common::timestamp::seconds;
use pm_common::{EventLog, Result};
use pm_math::Summary;
use std::collections::BTreeMap;

use super::{Edge, FrequencyGraph, GraphMiner, PerformanceGraph};

/// Counts directly-follows pairs within each case and summarizes the time
/// between them.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectlyFollowsMiner;

#[derive(Default)]
struct Scan {
    durations: BTreeMap<Edge, Vec<f64>>,
    start_activities: BTreeMap<String, u64>,
    end_activities: BTreeMap<String, u64>,
}

impl DirectlyFollowsMiner {
    fn scan(&self, log: &EventLog) -> Scan {
        let mut scan = Scan::default();
        for case in log.cases() {
            let (Some(first), Some(last)) = (case.events.first(), case.events.last()) else {
                continue;
            };
            *scan.start_activities.entry(first.activity.clone()).or_insert(0) += 1;
            *scan.end_activities.entry(last.activity.clone()).or_insert(0) += 1;

            for pair in case.events.windows(2) {
                let (from, to) = (pair[0], pair[1]);
                scan.durations
                    .entry((from.activity.clone(), to.activity.clone()))
                    .or_default()
                    .push(seconds(to.timestamp - from.timestamp));
            }
        }
        scan
    }
}

impl GraphMiner for DirectlyFollowsMiner {
    fn name(&self) -> &str {
        "directly_follows"
    }

    fn discover_frequency(&self, log: &EventLog) -> Result<FrequencyGraph> {
        let scan = self.scan(log);
        Ok(FrequencyGraph {
            edges: scan
                .durations
                .into_iter()
                .map(|(edge, samples)| (edge, samples.len() as u64))
                .collect(),
            start_activities: scan.start_activities,
            end_activities: scan.end_activities,
        })
    }

    fn discover_performance(&self, log: &EventLog) -> Result<PerformanceGraph> {
        let scan = self.scan(log);
        Ok(PerformanceGraph {
            edges: scan
                .durations
                .into_iter()
                .filter_map(|(edge, samples)| Summary::from_samples(&samples).map(|s| (edge, s)))
                .collect(),
            start_activities: scan.start_activities,
            end_activities: scan.end_activities,
        })
    }
}
