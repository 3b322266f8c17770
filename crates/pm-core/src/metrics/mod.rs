//! Metrics engine.
//!
//! Computes the statistics bundle for one log. The engine is a pure function
//! of the log, the request parameters, and the read-only [`MetricsConfig`]:
//! excluded metrics are left as `None` and never computed.

pub mod cardinal;
pub mod occupancy;

pub use occupancy::{ActiveEvents, BinWidth};

use chrono::NaiveDateTime;
use pm_common::{Case, Error, EventLog, Result};
use pm_config::{MetricName, MetricsConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::{Connection, GraphMiner};
use crate::request::ActiveEventParameters;
use crate::variants::{Variant, VariantIndex};

/// One of the most frequent variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TopVariant {
    /// 0 for the most frequent variant.
    pub rank: usize,
    pub event_sequence: Vec<String>,
    pub frequency: usize,
    /// Mean case duration in seconds over the cases of this variant.
    pub mean_duration: f64,
}

/// Every statistic the engine can report. Excluded metrics are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricsBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_variants: Option<Vec<TopVariant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_between_events: Option<Vec<Connection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_trace_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_trace_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_trace_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_trace_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_events: Option<ActiveEvents>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_frequency_distribution: Option<BTreeMap<String, usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_length_distribution: Option<BTreeMap<usize, usize>>,
}

impl MetricsBundle {
    /// Number of metrics present in the bundle.
    pub fn computed_count(&self) -> usize {
        [
            self.case_count.is_some(),
            self.event_count.is_some(),
            self.variant_count.is_some(),
            self.top_variants.is_some(),
            self.time_between_events.is_some(),
            self.min_trace_length.is_some(),
            self.max_trace_length.is_some(),
            self.min_trace_duration.is_some(),
            self.max_trace_duration.is_some(),
            self.active_events.is_some(),
            self.event_frequency_distribution.is_some(),
            self.trace_length_distribution.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Per-request inputs of the metrics engine.
#[derive(Debug, Clone)]
pub struct MetricsRequest<'a> {
    /// Occupancy classification; every activity is singular when absent.
    pub active_events: Option<&'a ActiveEventParameters>,
    pub n_top_variants: usize,
    /// End of the last occupancy bin.
    pub horizon: NaiveDateTime,
}

/// Precomputed grouping shared by the individual metrics.
pub(crate) struct MetricContext<'a> {
    pub log: &'a EventLog,
    pub cases: &'a [Case<'a>],
    pub variants: &'a VariantIndex<'a>,
    pub top: Vec<&'a Variant<'a>>,
}

pub struct MetricsEngine<'a> {
    config: &'a MetricsConfig,
    miner: &'a dyn GraphMiner,
}

impl<'a> MetricsEngine<'a> {
    pub fn new(config: &'a MetricsConfig, miner: &'a dyn GraphMiner) -> Self {
        MetricsEngine { config, miner }
    }

    fn wants(&self, metric: MetricName) -> bool {
        self.config.is_included(metric)
    }

    /// Compute every metric that is not excluded.
    ///
    /// Fails with [`Error::EmptyLog`] when the log has no events and at least
    /// one metric is requested.
    pub fn compute(&self, log: &EventLog, request: &MetricsRequest<'_>) -> Result<MetricsBundle> {
        let requested: Vec<MetricName> = MetricName::ALL
            .iter()
            .copied()
            .filter(|m| self.wants(*m))
            .collect();
        let Some(first) = requested.first() else {
            return Ok(MetricsBundle::default());
        };
        if log.is_empty() {
            return Err(Error::EmptyLog {
                metric: first.as_str().to_string(),
            });
        }

        let cases = log.cases();
        let variants = VariantIndex::build(&cases);
        let ctx = MetricContext {
            log,
            cases: &cases,
            variants: &variants,
            top: variants.top(request.n_top_variants),
        };

        let mut bundle = MetricsBundle::default();
        for metric in requested {
            match metric {
                MetricName::CaseCount => bundle.case_count = Some(cardinal::case_count(&ctx)),
                MetricName::EventCount => bundle.event_count = Some(cardinal::event_count(&ctx)),
                MetricName::VariantCount => {
                    bundle.variant_count = Some(cardinal::variant_count(&ctx))
                }
                MetricName::TopVariants => bundle.top_variants = Some(cardinal::top_variants(&ctx)),
                MetricName::TimeBetweenEvents => {
                    bundle.time_between_events =
                        Some(cardinal::time_between_events(&ctx, self.miner)?)
                }
                MetricName::MinTraceLength => {
                    bundle.min_trace_length = cardinal::min_trace_length(&ctx)
                }
                MetricName::MaxTraceLength => {
                    bundle.max_trace_length = cardinal::max_trace_length(&ctx)
                }
                MetricName::MinTraceDuration => {
                    bundle.min_trace_duration = cardinal::min_trace_duration(&ctx)
                }
                MetricName::MaxTraceDuration => {
                    bundle.max_trace_duration = cardinal::max_trace_duration(&ctx)
                }
                MetricName::ActiveEvents => {
                    bundle.active_events = occupancy::active_events(
                        log,
                        request.active_events,
                        request.horizon,
                    )
                }
                MetricName::EventFrequencyDistribution => {
                    bundle.event_frequency_distribution =
                        Some(cardinal::event_frequency_distribution(&ctx))
                }
                MetricName::TraceLengthDistribution => {
                    bundle.trace_length_distribution =
                        Some(cardinal::trace_length_distribution(&ctx))
                }
            }
        }
        Ok(bundle)
    }
}
