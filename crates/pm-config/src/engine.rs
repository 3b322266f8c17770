//! Typed structure of config.yml.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::metric::MetricName;
use crate::validate::{ValidationError, ValidationResult};

/// Process-wide, read-only engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Metrics omitted from every bundle. `null` means none.
    #[serde(default)]
    pub exclude: Option<Vec<MetricName>>,

    #[serde(default)]
    pub delivery: DeliveryConfig,

    #[serde(default)]
    pub defaults: RequestDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Timeout for the single callback attempt.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Values used when a request leaves a parameter out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RequestDefaults {
    #[serde(default = "default_n_top_variants")]
    pub n_top_variants: usize,
    #[serde(default = "default_start_node_name")]
    pub start_node_name: String,
    #[serde(default = "default_end_node_name")]
    pub end_node_name: String,
}

/// The slice of configuration the metrics engine sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsConfig {
    excluded: BTreeSet<MetricName>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_n_top_variants() -> usize {
    10
}

fn default_start_node_name() -> String {
    "start_node".to_string()
}

fn default_end_node_name() -> String {
    "end_node".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            schema_version: default_schema_version(),
            exclude: None,
            delivery: DeliveryConfig::default(),
            defaults: RequestDefaults::default(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for RequestDefaults {
    fn default() -> Self {
        RequestDefaults {
            n_top_variants: default_n_top_variants(),
            start_node_name: default_start_node_name(),
            end_node_name: default_end_node_name(),
        }
    }
}

impl EngineConfig {
    /// Parse config.yml content. Does not run semantic validation.
    pub fn from_yaml_str(content: &str) -> ValidationResult<Self> {
        // An empty file is a valid, all-defaults config.
        if content.trim().is_empty() {
            return Ok(EngineConfig::default());
        }
        serde_yaml::from_str(content).map_err(|e| ValidationError::ParseError(e.to_string()))
    }

    /// Excluded metrics in file order.
    pub fn excluded(&self) -> &[MetricName] {
        self.exclude.as_deref().unwrap_or(&[])
    }

    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig::excluding(self.excluded().iter().copied())
    }
}

impl MetricsConfig {
    pub fn excluding<I>(metrics: I) -> Self
    where
        I: IntoIterator<Item = MetricName>,
    {
        MetricsConfig {
            excluded: metrics.into_iter().collect(),
        }
    }

    pub fn is_excluded(&self, metric: MetricName) -> bool {
        self.excluded.contains(&metric)
    }

    pub fn is_included(&self, metric: MetricName) -> bool {
        !self.is_excluded(metric)
    }

    pub fn excluded(&self) -> impl Iterator<Item = MetricName> + '_ {
        self.excluded.iter().copied()
    }
}
