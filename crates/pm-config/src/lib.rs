//! Process mining configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for config.yml (metric exclusions, delivery, defaults)
//! - Config resolution (CLI → env → config dir → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for run logs and `config show`

pub mod engine;
pub mod metric;
pub mod resolve;
pub mod snapshot;
pub mod validate;

pub use engine::{DeliveryConfig, EngineConfig, MetricsConfig, RequestDefaults};
pub use metric::MetricName;
pub use resolve::{load_config, resolve_config, ConfigPaths, ConfigSource, LoadedConfig};
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
