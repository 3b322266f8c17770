//! Configuration snapshots for run logs and `config show`.
//!
//! A snapshot records which file was used, its content hash, and the
//! effective values, so two runs can be compared after the fact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::resolve::{compute_sha256, ConfigSource};

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// SHA-256 hash of the file content.
    #[serde(default)]
    pub hash: Option<String>,

    /// How the configuration was resolved.
    pub source: String,

    /// Hash of the effective values (stable across formatting changes).
    pub effective_hash: String,

    /// Key configuration values for quick reference.
    pub summary: ConfigSummary,
}

/// Summary of the effective configuration values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub excluded_metrics: Vec<String>,
    pub delivery_timeout_seconds: u64,
    pub n_top_variants: usize,
    pub start_node_name: String,
    pub end_node_name: String,
}

impl ConfigSnapshot {
    pub fn new(
        config: &EngineConfig,
        path: Option<String>,
        hash: Option<String>,
        source: ConfigSource,
    ) -> Self {
        let effective = serde_json::to_string(config).unwrap_or_default();

        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: config.schema_version.clone(),
            path,
            hash,
            source: source.to_string(),
            effective_hash: compute_sha256(&effective),
            summary: ConfigSummary {
                excluded_metrics: config.excluded().iter().map(|m| m.to_string()).collect(),
                delivery_timeout_seconds: config.delivery.timeout_seconds,
                n_top_variants: config.defaults.n_top_variants,
                start_node_name: config.defaults.start_node_name.clone(),
                end_node_name: config.defaults.end_node_name.clone(),
            },
        }
    }

    /// Return true if the configuration came from built-in defaults.
    pub fn is_default(&self) -> bool {
        self.path.is_none()
    }

    /// Return the snapshot as a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "snapshot_at": self.timestamp.to_rfc3339(),
            "schema_version": self.schema_version,
            "path": self.path,
            "hash": self.hash,
            "source": self.source,
            "effective_hash": self.effective_hash,
            "excluded_metrics": self.summary.excluded_metrics,
            "delivery": {
                "timeout_seconds": self.summary.delivery_timeout_seconds,
            },
            "defaults": {
                "n_top_variants": self.summary.n_top_variants,
                "start_node_name": self.summary.start_node_name,
                "end_node_name": self.summary.end_node_name,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricName;

    #[test]
    fn test_snapshot_from_defaults() {
        let config = EngineConfig::default();
        let snapshot = ConfigSnapshot::new(&config, None, None, ConfigSource::BuiltinDefault);

        assert!(snapshot.is_default());
        assert_eq!(snapshot.source, "builtin default");
        assert_eq!(snapshot.effective_hash.len(), 64);
        assert!(snapshot.summary.excluded_metrics.is_empty());
    }

    #[test]
    fn test_effective_hash_tracks_values() {
        let a = EngineConfig::default();
        let b = EngineConfig {
            exclude: Some(vec![MetricName::TopVariants]),
            ..EngineConfig::default()
        };
        let sa = ConfigSnapshot::new(&a, None, None, ConfigSource::BuiltinDefault);
        let sb = ConfigSnapshot::new(&b, None, None, ConfigSource::BuiltinDefault);
        assert_ne!(sa.effective_hash, sb.effective_hash);
        assert_eq!(sb.summary.excluded_metrics, vec!["top_variants"]);
    }

    #[test]
    fn test_snapshot_json() {
        let config = EngineConfig::default();
        let json = ConfigSnapshot::new(&config, None, None, ConfigSource::BuiltinDefault).to_json();

        assert!(json.get("snapshot_at").is_some());
        assert_eq!(json["delivery"]["timeout_seconds"], 30);
        assert_eq!(json["defaults"]["start_node_name"], "start_node");
    }
}
