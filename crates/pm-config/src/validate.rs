//! Configuration validation errors and semantic validation.

use std::collections::HashSet;
use thiserror::Error;

use crate::engine::EngineConfig;

/// Upper bound for the callback timeout, in seconds.
pub const MAX_TIMEOUT_SECONDS: u64 = 600;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::VersionMismatch { .. } => 66,
        }
    }
}

/// Validate a parsed configuration semantically.
pub fn validate_config(config: &EngineConfig) -> ValidationResult<()> {
    // Major version must match; minor and patch may differ.
    let expected_major = major(crate::CONFIG_SCHEMA_VERSION);
    if major(&config.schema_version) != expected_major {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    let mut seen = HashSet::new();
    for metric in config.excluded() {
        if !seen.insert(*metric) {
            return Err(ValidationError::SemanticError(format!(
                "metric '{}' is excluded more than once",
                metric
            )));
        }
    }

    let timeout = config.delivery.timeout_seconds;
    if timeout == 0 || timeout > MAX_TIMEOUT_SECONDS {
        return Err(invalid(
            "delivery.timeout_seconds",
            format!("must be in (0, {MAX_TIMEOUT_SECONDS}], got {timeout}"),
        ));
    }

    let defaults = &config.defaults;
    if defaults.n_top_variants == 0 {
        return Err(invalid("defaults.n_top_variants", "must be at least 1"));
    }
    for (field, name) in [
        ("defaults.start_node_name", &defaults.start_node_name),
        ("defaults.end_node_name", &defaults.end_node_name),
    ] {
        if name.trim().is_empty() {
            return Err(invalid(field, "must not be blank"));
        }
    }
    if defaults.start_node_name == defaults.end_node_name {
        return Err(ValidationError::SemanticError(format!(
            "start and end node names must differ, both are '{}'",
            defaults.start_node_name
        )));
    }

    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

fn major(version: &str) -> Option<u64> {
    version.split('.').next().and_then(|m| m.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::MetricName;

    #[test]
    fn test_default_config_is_valid() {
        validate_config(&EngineConfig::default()).unwrap();
    }

    #[test]
    fn test_minor_version_drift_is_accepted() {
        let config = EngineConfig {
            schema_version: "1.4.0".to_string(),
            ..EngineConfig::default()
        };
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_major_version_mismatch() {
        let config = EngineConfig {
            schema_version: "2.0.0".to_string(),
            ..EngineConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_alias_duplicates_rejected() {
        let config = EngineConfig {
            exclude: Some(vec![MetricName::CaseCount, MetricName::CaseCount]),
            ..EngineConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::SemanticError(_))
        ));
    }

    #[test]
    fn test_timeout_bounds() {
        for bad in [0, MAX_TIMEOUT_SECONDS + 1] {
            let mut config = EngineConfig::default();
            config.delivery.timeout_seconds = bad;
            assert!(matches!(
                validate_config(&config),
                Err(ValidationError::InvalidValue { .. })
            ));
        }
        let mut config = EngineConfig::default();
        config.delivery.timeout_seconds = MAX_TIMEOUT_SECONDS;
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_node_names() {
        let mut config = EngineConfig::default();
        config.defaults.end_node_name = "start_node".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::SemanticError(_))
        ));

        let mut config = EngineConfig::default();
        config.defaults.start_node_name = " ".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ValidationError::ParseError("x".into()).code(), 61);
        assert_eq!(
            ValidationError::VersionMismatch {
                expected: "1".into(),
                actual: "2".into()
            }
            .code(),
            66
        );
    }
}
