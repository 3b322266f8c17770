//! JSON Schema generation for request, response, and config types.
//!
//! # Usage
//!
//! ```bash
//! # List available schema types
//! pm-core schema --list
//!
//! # Generate schema for a specific type
//! pm-core schema DiscoveryRequest
//!
//! # Generate all schemas
//! pm-core schema --all
//! ```

use schemars::{schema_for, Schema};
use serde_json::Value;
use std::collections::BTreeMap;

pub use crate::graph::{Connection, Graph};
pub use crate::metrics::{ActiveEvents, MetricsBundle, TopVariant};
pub use crate::pipeline::DiscoveryResponse;
pub use crate::request::{ActiveEventParameters, DiscoveryParameters, DiscoveryRequest};
pub use pm_common::{Event, EventLog};
pub use pm_config::{DeliveryConfig, EngineConfig, MetricName, RequestDefaults};

type SchemaFn = fn() -> Schema;

/// Every exported type: name, one-line description, generator.
const SCHEMAS: &[(&str, &str, SchemaFn)] = &[
    (
        "DiscoveryRequest",
        "Raw event record, parameters, callback URL and correlation id",
        || schema_for!(DiscoveryRequest),
    ),
    ("DiscoveryParameters", "Per-request discovery options", || {
        schema_for!(DiscoveryParameters)
    }),
    (
        "ActiveEventParameters",
        "Positive, negative and singular activities for occupancy",
        || schema_for!(ActiveEventParameters),
    ),
    ("Event", "Single event: case id, activity, timestamp", || {
        schema_for!(Event)
    }),
    ("EventLog", "Ordered collection of events", || {
        schema_for!(EventLog)
    }),
    ("DiscoveryResponse", "Graph, metrics, creation time and id", || {
        schema_for!(DiscoveryResponse)
    }),
    (
        "Graph",
        "Directly-follows graph with synthetic start and end nodes",
        || schema_for!(Graph),
    ),
    (
        "Connection",
        "One graph edge with frequency and timing statistics",
        || schema_for!(Connection),
    ),
    ("MetricsBundle", "Every computed log statistic", || {
        schema_for!(MetricsBundle)
    }),
    ("TopVariant", "One of the most frequent variants", || {
        schema_for!(TopVariant)
    }),
    ("ActiveEvents", "Yearly, monthly and weekly occupancy", || {
        schema_for!(ActiveEvents)
    }),
    ("EngineConfig", "Engine configuration file (config.yml)", || {
        schema_for!(EngineConfig)
    }),
    ("DeliveryConfig", "Callback delivery settings", || {
        schema_for!(DeliveryConfig)
    }),
    ("RequestDefaults", "Defaults for omitted request parameters", || {
        schema_for!(RequestDefaults)
    }),
    ("MetricName", "Name of an excludable metric", || {
        schema_for!(MetricName)
    }),
];

/// `(name, description)` of every exported type, in listing order.
pub fn available_schemas() -> Vec<(&'static str, &'static str)> {
    SCHEMAS.iter().map(|(name, desc, _)| (*name, *desc)).collect()
}

/// Schema for `type_name`, or None when the name is not exported.
pub fn generate_schema(type_name: &str) -> Option<Value> {
    let (_, _, generate) = SCHEMAS.iter().find(|(name, _, _)| *name == type_name)?;
    serde_json::to_value(generate()).ok()
}

pub fn generate_all_schemas() -> BTreeMap<String, Value> {
    SCHEMAS
        .iter()
        .filter_map(|(name, _, _)| Some((name.to_string(), generate_schema(name)?)))
        .collect()
}

/// Schema output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

/// Format a schema value for output.
pub fn format_schema(schema: &Value, format: SchemaFormat) -> String {
    let rendered = match format {
        SchemaFormat::Json => serde_json::to_string_pretty(schema),
        SchemaFormat::JsonCompact => serde_json::to_string(schema),
    };
    rendered.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_schemas_generate() {
        for (name, _desc) in available_schemas() {
            let schema = generate_schema(name);
            assert!(schema.is_some(), "Schema for '{}' should generate", name);
        }
    }

    #[test]
    fn test_unknown_schema_returns_none() {
        assert!(generate_schema("UnknownType").is_none());
        assert!(generate_schema("").is_none());
    }

    #[test]
    fn test_schema_has_required_fields() {
        let schema = generate_schema("DiscoveryRequest").unwrap();
        assert!(
            schema.get("$schema").is_some() || schema.get("type").is_some(),
            "Schema should have $schema or type field"
        );
    }

    #[test]
    fn test_request_schema_names_fields() {
        let schema = generate_schema("DiscoveryRequest").unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("data"));
        assert!(properties.contains_key("parameters"));
        assert!(properties.contains_key("callback_url"));
    }

    #[test]
    fn test_generate_all_schemas() {
        let all = generate_all_schemas();
        assert_eq!(all.len(), available_schemas().len());
        assert!(all.contains_key("DiscoveryResponse"));
        assert!(all.contains_key("MetricsBundle"));
        assert!(all.contains_key("EngineConfig"));
    }

    #[test]
    fn test_format_schema() {
        let schema = generate_schema("MetricName").unwrap();

        let pretty = format_schema(&schema, SchemaFormat::Json);
        let compact = format_schema(&schema, SchemaFormat::JsonCompact);

        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
    }
}
