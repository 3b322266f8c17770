//! Names of the metrics a deployment can exclude.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A metric in the metrics bundle.
///
/// The short names of earlier deployments (`n_traces`, `tbe`, ...) are
/// accepted on input; the long names are always written.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    #[serde(alias = "n_traces")]
    CaseCount,
    #[serde(alias = "n_events")]
    EventCount,
    #[serde(alias = "n_variants")]
    VariantCount,
    TopVariants,
    #[serde(alias = "tbe")]
    TimeBetweenEvents,
    MinTraceLength,
    MaxTraceLength,
    MinTraceDuration,
    MaxTraceDuration,
    ActiveEvents,
    #[serde(alias = "event_frequency_distr")]
    EventFrequencyDistribution,
    #[serde(alias = "trace_length_distr")]
    TraceLengthDistribution,
}

impl MetricName {
    pub const ALL: [MetricName; 12] = [
        MetricName::CaseCount,
        MetricName::EventCount,
        MetricName::VariantCount,
        MetricName::TopVariants,
        MetricName::TimeBetweenEvents,
        MetricName::MinTraceLength,
        MetricName::MaxTraceLength,
        MetricName::MinTraceDuration,
        MetricName::MaxTraceDuration,
        MetricName::ActiveEvents,
        MetricName::EventFrequencyDistribution,
        MetricName::TraceLengthDistribution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::CaseCount => "case_count",
            MetricName::EventCount => "event_count",
            MetricName::VariantCount => "variant_count",
            MetricName::TopVariants => "top_variants",
            MetricName::TimeBetweenEvents => "time_between_events",
            MetricName::MinTraceLength => "min_trace_length",
            MetricName::MaxTraceLength => "max_trace_length",
            MetricName::MinTraceDuration => "min_trace_duration",
            MetricName::MaxTraceDuration => "max_trace_duration",
            MetricName::ActiveEvents => "active_events",
            MetricName::EventFrequencyDistribution => "event_frequency_distribution",
            MetricName::TraceLengthDistribution => "trace_length_distribution",
        }
    }

    fn alias(&self) -> Option<&'static str> {
        match self {
            MetricName::CaseCount => Some("n_traces"),
            MetricName::EventCount => Some("n_events"),
            MetricName::VariantCount => Some("n_variants"),
            MetricName::TimeBetweenEvents => Some("tbe"),
            MetricName::EventFrequencyDistribution => Some("event_frequency_distr"),
            MetricName::TraceLengthDistribution => Some("trace_length_distr"),
            _ => None,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s || m.alias() == Some(s))
            .ok_or_else(|| format!("unknown metric name '{s}'"))
    }
}
