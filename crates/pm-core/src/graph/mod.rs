//! Directly-follows graph discovery and wrapping.
//!
//! A [`GraphMiner`] produces two views of a log: edge frequencies and edge
//! timing statistics, each with start and end activity counts. [`wrap_graph`]
//! checks that the views agree and turns them into [`Connection`]s, adding
//! synthetic start and end nodes.

pub mod directly_follows;

pub use directly_follows::DirectlyFollowsMiner;

use pm_common::{Error, EventLog, Result};
use pm_math::{Summary, SENTINEL};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered activity pair `(from, to)`.
pub type Edge = (String, String);

/// Edge frequencies with start and end activity counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencyGraph {
    pub edges: BTreeMap<Edge, u64>,
    pub start_activities: BTreeMap<String, u64>,
    pub end_activities: BTreeMap<String, u64>,
}

/// Inter-event durations (seconds) per edge, with start and end counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceGraph {
    pub edges: BTreeMap<Edge, Summary>,
    pub start_activities: BTreeMap<String, u64>,
    pub end_activities: BTreeMap<String, u64>,
}

/// Graph discovery backend.
pub trait GraphMiner {
    /// Miner name used for logs.
    fn name(&self) -> &str;
    fn discover_frequency(&self, log: &EventLog) -> Result<FrequencyGraph>;
    fn discover_performance(&self, log: &EventLog) -> Result<PerformanceGraph>;
}

/// One edge of the result graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Connection {
    pub e1: String,
    pub e2: String,
    /// Number of times `e2` directly follows `e1`; -1 when not applicable.
    pub frequency: i64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub stdev: f64,
    pub sum: f64,
    pub mean: f64,
}

impl Connection {
    pub fn timed(e1: impl Into<String>, e2: impl Into<String>, frequency: i64, stats: &Summary) -> Self {
        Connection {
            e1: e1.into(),
            e2: e2.into(),
            frequency,
            median: stats.median,
            min: stats.min,
            max: stats.max,
            stdev: stats.stdev,
            sum: stats.sum,
            mean: stats.mean,
        }
    }

    /// Edge to or from a synthetic node: frequency only.
    pub fn synthetic(e1: impl Into<String>, e2: impl Into<String>, frequency: i64) -> Self {
        Connection::timed(e1, e2, frequency, &Summary::sentinel())
    }

    pub fn is_synthetic(&self) -> bool {
        self.median == SENTINEL && self.sum == SENTINEL
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Graph {
    pub connections: Vec<Connection>,
}

impl Graph {
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn find(&self, e1: &str, e2: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.e1 == e1 && c.e2 == e2)
    }
}

fn to_frequency(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Combine frequency and performance views into a graph.
///
/// Emits start edges, then activity edges, then end edges, each group
/// ordered by activity names.
pub fn wrap_graph(
    frequency: &FrequencyGraph,
    performance: &PerformanceGraph,
    start_node_name: &str,
    end_node_name: &str,
) -> Result<Graph> {
    if frequency.start_activities != performance.start_activities {
        return Err(Error::GraphMismatch(
            "start activities differ between frequency and performance graphs".to_string(),
        ));
    }
    if frequency.end_activities != performance.end_activities {
        return Err(Error::GraphMismatch(
            "end activities differ between frequency and performance graphs".to_string(),
        ));
    }
    if !frequency.edges.keys().eq(performance.edges.keys()) {
        return Err(Error::GraphMismatch(
            "edge sets differ between frequency and performance graphs".to_string(),
        ));
    }

    let mut connections = Vec::with_capacity(
        frequency.start_activities.len() + frequency.edges.len() + frequency.end_activities.len(),
    );
    for (activity, count) in &frequency.start_activities {
        connections.push(Connection::synthetic(
            start_node_name,
            activity.as_str(),
            to_frequency(*count),
        ));
    }
    for ((from, to), stats) in &performance.edges {
        let count = frequency
            .edges
            .get(&(from.clone(), to.clone()))
            .copied()
            .unwrap_or_default();
        connections.push(Connection::timed(
            from.as_str(),
            to.as_str(),
            to_frequency(count),
            stats,
        ));
    }
    for (activity, count) in &frequency.end_activities {
        connections.push(Connection::synthetic(
            activity.as_str(),
            end_node_name,
            to_frequency(*count),
        ));
    }
    Ok(Graph { connections })
}

/// Run both discoveries and wrap the result.
pub fn discover_graph(
    miner: &dyn GraphMiner,
    log: &EventLog,
    start_node_name: &str,
    end_node_name: &str,
) -> Result<Graph> {
    let performance = miner.discover_performance(log)?;
    let frequency = miner.discover_frequency(log)?;
    wrap_graph(&frequency, &performance, start_node_name, end_node_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pm_common::Event;

    fn sample_log() -> EventLog {
        let day = |d: u32| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        EventLog::new(vec![
            Event::new("T1", "A", day(1)),
            Event::new("T1", "B", day(2)),
            Event::new("T2", "A", day(1)),
            Event::new("T2", "C", day(3)),
        ])
    }

    /// Miner whose performance view is missing an edge.
    struct SkewedMiner;

    impl GraphMiner for SkewedMiner {
        fn name(&self) -> &str {
            "skewed"
        }

        fn discover_frequency(&self, log: &EventLog) -> Result<FrequencyGraph> {
            DirectlyFollowsMiner.discover_frequency(log)
        }

        fn discover_performance(&self, log: &EventLog) -> Result<PerformanceGraph> {
            let mut graph = DirectlyFollowsMiner.discover_performance(log)?;
            graph.edges.remove(&("A".to_string(), "C".to_string()));
            Ok(graph)
        }
    }

    #[test]
    fn test_wrap_sample_log() {
        let graph = discover_graph(&DirectlyFollowsMiner, &sample_log(), "START", "END").unwrap();
        let edges: Vec<(&str, &str, i64)> = graph
            .connections
            .iter()
            .map(|c| (c.e1.as_str(), c.e2.as_str(), c.frequency))
            .collect();
        assert_eq!(
            edges,
            vec![
                ("START", "A", 2),
                ("A", "B", 1),
                ("A", "C", 1),
                ("B", "END", 1),
                ("C", "END", 1),
            ]
        );
    }

    #[test]
    fn test_synthetic_edges_carry_sentinel() {
        let graph = discover_graph(&DirectlyFollowsMiner, &sample_log(), "s", "e").unwrap();
        let start = graph.find("s", "A").unwrap();
        assert!(start.is_synthetic());
        assert_eq!(start.stdev, -1.0);

        let ab = graph.find("A", "B").unwrap();
        assert!(!ab.is_synthetic());
        assert_eq!(ab.median, 86400.0);
        // One sample: sample stdev undefined.
        assert_eq!(ab.stdev, -1.0);
    }

    #[test]
    fn test_mismatched_views_rejected() {
        let err = discover_graph(&SkewedMiner, &sample_log(), "s", "e").unwrap_err();
        assert!(matches!(err, Error::GraphMismatch(_)));
    }

    #[test]
    fn test_empty_log_gives_empty_graph() {
        let graph = discover_graph(&DirectlyFollowsMiner, &EventLog::default(), "s", "e").unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_connection_json_shape() {
        let json = serde_json::to_value(Connection::synthetic("s", "A", 2)).unwrap();
        assert_eq!(json["e1"], "s");
        assert_eq!(json["frequency"], 2);
        assert_eq!(json["mean"], -1.0);
    }
}
