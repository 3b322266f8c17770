//! Counts, extremes, distributions, and variant statistics.

use pm_common::timestamp::seconds;
use pm_common::{EventLog, Result};
use std::collections::{BTreeMap, HashSet};

use super::{MetricContext, TopVariant};
use crate::graph::{Connection, GraphMiner};

pub(crate) fn case_count(ctx: &MetricContext<'_>) -> usize {
    ctx.cases.len()
}

pub(crate) fn event_count(ctx: &MetricContext<'_>) -> usize {
    ctx.log.len()
}

pub(crate) fn variant_count(ctx: &MetricContext<'_>) -> usize {
    ctx.variants.len()
}

fn case_duration_seconds(ctx: &MetricContext<'_>, case: usize) -> f64 {
    seconds(ctx.cases[case].duration())
}

pub(crate) fn top_variants(ctx: &MetricContext<'_>) -> Vec<TopVariant> {
    ctx.top
        .iter()
        .enumerate()
        .map(|(rank, variant)| {
            let durations: Vec<f64> = variant
                .cases
                .iter()
                .map(|&case| case_duration_seconds(ctx, case))
                .collect();
            TopVariant {
                rank,
                event_sequence: variant.sequence.iter().map(|a| a.to_string()).collect(),
                frequency: variant.frequency(),
                mean_duration: pm_math::mean(&durations).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Timing statistics of the directly-follows edges, restricted to cases of
/// the top variants. Frequencies are reported as -1.
pub(crate) fn time_between_events(
    ctx: &MetricContext<'_>,
    miner: &dyn GraphMiner,
) -> Result<Vec<Connection>> {
    let relevant: HashSet<&str> = ctx
        .top
        .iter()
        .flat_map(|variant| variant.cases.iter().map(|&case| ctx.cases[case].case_id))
        .collect();
    let restricted: EventLog = ctx
        .log
        .iter()
        .filter(|e| relevant.contains(e.case_id.as_str()))
        .cloned()
        .collect();

    let performance = miner.discover_performance(&restricted)?;
    Ok(performance
        .edges
        .iter()
        .map(|((from, to), stats)| Connection::timed(from.as_str(), to.as_str(), -1, stats))
        .collect())
}

pub(crate) fn min_trace_length(ctx: &MetricContext<'_>) -> Option<usize> {
    ctx.cases.iter().map(|c| c.len()).min()
}

pub(crate) fn max_trace_length(ctx: &MetricContext<'_>) -> Option<usize> {
    ctx.cases.iter().map(|c| c.len()).max()
}

fn durations<'a>(ctx: &'a MetricContext<'a>) -> impl Iterator<Item = f64> + 'a {
    ctx.cases.iter().map(|c| seconds(c.duration()))
}

pub(crate) fn min_trace_duration(ctx: &MetricContext<'_>) -> Option<f64> {
    durations(ctx).reduce(f64::min)
}

pub(crate) fn max_trace_duration(ctx: &MetricContext<'_>) -> Option<f64> {
    durations(ctx).reduce(f64::max)
}

/// Activity → number of events.
pub(crate) fn event_frequency_distribution(ctx: &MetricContext<'_>) -> BTreeMap<String, usize> {
    let mut distribution = BTreeMap::new();
    for event in ctx.log {
        *distribution.entry(event.activity.clone()).or_insert(0) += 1;
    }
    distribution
}

/// Case length → number of cases.
pub(crate) fn trace_length_distribution(ctx: &MetricContext<'_>) -> BTreeMap<usize, usize> {
    let mut distribution = BTreeMap::new();
    for case in ctx.cases {
        *distribution.entry(case.len()).or_insert(0) += 1;
    }
    distribution
}
