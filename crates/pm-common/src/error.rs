//! Error type shared by every stage of a discovery request.
//!
//! Each variant has a stable numeric code (grouped by tens per category), a
//! headline and a remediation hint. Machines read [`StructuredError`]:
//!
//! ```json
//! {"code": 20, "category": "input", "message": "input validation failed: Events are not sorted.",
//!  "client_error": true, "recoverable": true}
//! ```
//!
//! People read [`format_error_human`]:
//!
//! ```text
//! ✗ Invalid Event Log
//!   Reason: input validation failed: Events are not sorted.
//!   Fix: Provide 'concept:name', ...
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Config file problems and mutually exclusive options.
    Config,
    /// The caller's log or parameters.
    Input,
    /// Reduction, encoding, metrics, graph.
    Computation,
    /// Posting the response to the callback URL.
    Delivery,
    /// Files and (de)serialization.
    Io,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Config => "config",
            ErrorCategory::Input => "input",
            ErrorCategory::Computation => "computation",
            ErrorCategory::Delivery => "delivery",
            ErrorCategory::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid configuration file: {0}")]
    InvalidConfig(String),

    /// Occurrence counters and state tags requested together.
    #[error("conflicting options: {0}")]
    ConfigurationConflict(String),

    #[error("input validation failed: {0}")]
    InputValidation(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("event log is empty: cannot compute {metric}")]
    EmptyLog { metric: String },

    /// Frequency and performance views disagree on the edge set.
    #[error("discovered graphs are not the same: {0}")]
    GraphMismatch(String),

    #[error("callback delivery to {url} failed: {reason}")]
    Delivery { url: String, reason: String },

    #[error("callback delivery to {url} timed out after {seconds}s")]
    DeliveryTimeout { url: String, seconds: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),
}

/// Static facts about a variant.
struct Profile {
    code: u32,
    category: ErrorCategory,
    headline: &'static str,
    remediation: &'static str,
    recoverable: bool,
}

const fn profile(
    code: u32,
    category: ErrorCategory,
    headline: &'static str,
    remediation: &'static str,
    recoverable: bool,
) -> Profile {
    Profile {
        code,
        category,
        headline,
        remediation,
        recoverable,
    }
}

impl Error {
    fn profile(&self) -> Profile {
        use ErrorCategory::*;
        match self {
            Error::InvalidConfig(_) => profile(
                11,
                Config,
                "Invalid Configuration",
                "Fix the reported field in config.yml. Each metric name may be excluded once.",
                true,
            ),
            Error::ConfigurationConflict(_) => profile(
                12,
                Config,
                "Conflicting Options",
                "Ask for occurrence counters or state tags, never both in one request.",
                true,
            ),
            Error::InputValidation(_) => profile(
                20,
                Input,
                "Invalid Event Log",
                "Provide 'concept:name', 'case:concept:name' and 'time:timestamp' with the same row keys, string values, timezone-naive ISO-8601 timestamps, and events sorted within each case.",
                true,
            ),
            Error::InvalidArgument(_) => profile(
                21,
                Input,
                "Invalid Argument",
                "Fractions lie in [0, 1], counts are positive, and the positive, negative and singular activity sets are disjoint.",
                true,
            ),
            Error::EmptyLog { .. } => profile(
                31,
                Computation,
                "Empty Event Log",
                "Submit at least one event, or reduce complexity less aggressively.",
                true,
            ),
            Error::GraphMismatch(_) => profile(
                32,
                Computation,
                "Inconsistent Graph",
                "The miner produced different edges for frequency and performance. Report it as a bug.",
                false,
            ),
            Error::Delivery { .. } => profile(
                40,
                Delivery,
                "Delivery Failed",
                "Check that the callback URL is reachable. The response was still printed on stdout.",
                true,
            ),
            Error::DeliveryTimeout { .. } => profile(
                41,
                Delivery,
                "Delivery Timeout",
                "The callback did not answer in time. Raise delivery.timeout_seconds or check the receiver.",
                true,
            ),
            Error::Io(_) => profile(
                60,
                Io,
                "I/O Error",
                "Check that the path exists and is readable.",
                true,
            ),
            Error::Json(_) => profile(
                61,
                Io,
                "JSON Parse Error",
                "Check the syntax with 'jq . <file>' and compare with 'pm-core schema DiscoveryRequest'.",
                true,
            ),
            Error::Yaml(_) => profile(
                62,
                Io,
                "YAML Parse Error",
                "Check indentation and list syntax in config.yml.",
                true,
            ),
        }
    }

    /// Stable code: 10s config, 20s input, 30s computation, 40s delivery, 60s I/O.
    pub fn code(&self) -> u32 {
        self.profile().code
    }

    pub fn category(&self) -> ErrorCategory {
        self.profile().category
    }

    /// Caused by what the caller sent; reported before any computation.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InputValidation(_)
                | Error::InvalidArgument(_)
                | Error::ConfigurationConflict(_)
                | Error::Json(_)
        )
    }

    /// Whether resubmitting after fixing the cause can succeed. Nothing here
    /// retries on its own.
    pub fn is_recoverable(&self) -> bool {
        self.profile().recoverable
    }

    pub fn headline(&self) -> &'static str {
        self.profile().headline
    }

    pub fn remediation(&self) -> &'static str {
        self.profile().remediation
    }

    /// Variant-specific fields worth surfacing next to the message.
    fn context(&self) -> BTreeMap<String, serde_json::Value> {
        let mut context = BTreeMap::new();
        match self {
            Error::EmptyLog { metric } => {
                context.insert("metric".into(), metric.as_str().into());
            }
            Error::Delivery { url, .. } => {
                context.insert("url".into(), url.as_str().into());
            }
            Error::DeliveryTimeout { url, seconds } => {
                context.insert("url".into(), url.as_str().into());
                context.insert("timeout_seconds".into(), (*seconds).into());
            }
            _ => {}
        }
        context
    }
}

/// Serializable form of an [`Error`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub client_error: bool,
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let profile = err.profile();
        StructuredError {
            code: profile.code,
            category: profile.category,
            message: err.to_string(),
            client_error: err.is_client_error(),
            recoverable: profile.recoverable,
            context: err.context(),
        }
    }
}

/// Three-line rendering for a terminal: headline, reason, fix.
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };
    format!(
        "{red}✗{reset} {}\n  Reason: {err}\n  {cyan}Fix:{reset} {}",
        err.headline(),
        err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout() -> Error {
        Error::DeliveryTimeout {
            url: "http://example.com/cb".into(),
            seconds: 30,
        }
    }

    #[test]
    fn codes_group_by_category() {
        let cases = [
            (Error::InvalidConfig("x".into()), ErrorCategory::Config),
            (Error::ConfigurationConflict("x".into()), ErrorCategory::Config),
            (Error::InputValidation("x".into()), ErrorCategory::Input),
            (Error::InvalidArgument("x".into()), ErrorCategory::Input),
            (Error::EmptyLog { metric: "case_count".into() }, ErrorCategory::Computation),
            (Error::GraphMismatch("x".into()), ErrorCategory::Computation),
            (timeout(), ErrorCategory::Delivery),
            (Error::Yaml("x".into()), ErrorCategory::Io),
        ];
        let first_digit = |c: ErrorCategory| -> u32 {
            match c {
                ErrorCategory::Config => 1,
                ErrorCategory::Input => 2,
                ErrorCategory::Computation => 3,
                ErrorCategory::Delivery => 4,
                ErrorCategory::Io => 6,
            }
        };
        for (err, category) in cases {
            assert_eq!(err.category(), category, "{err}");
            assert_eq!(err.code() / 10, first_digit(category), "{err}");
        }
    }

    #[test]
    fn exact_codes_are_stable() {
        assert_eq!(Error::InvalidConfig("x".into()).code(), 11);
        assert_eq!(Error::InputValidation("x".into()).code(), 20);
        assert_eq!(Error::EmptyLog { metric: "m".into() }.code(), 31);
        assert_eq!(timeout().code(), 41);
    }

    #[test]
    fn client_errors_and_recoverability() {
        assert!(Error::InputValidation("x".into()).is_client_error());
        assert!(Error::ConfigurationConflict("x".into()).is_client_error());
        assert!(!Error::EmptyLog { metric: "m".into() }.is_client_error());
        assert!(!timeout().is_client_error());

        assert!(Error::InputValidation("x".into()).is_recoverable());
        assert!(!Error::GraphMismatch("x".into()).is_recoverable());
    }

    #[test]
    fn structured_error_carries_context() {
        let structured = StructuredError::from(&timeout());
        assert_eq!(structured.code, 41);
        assert_eq!(structured.category, ErrorCategory::Delivery);
        assert_eq!(
            structured.context.get("timeout_seconds"),
            Some(&serde_json::json!(30))
        );

        let json = serde_json::to_value(StructuredError::from(&Error::InputValidation(
            "Events are not sorted.".into(),
        )))
        .unwrap();
        assert_eq!(json["category"], "input");
        assert_eq!(json["client_error"], true);
        assert!(json.get("context").is_none());
    }

    #[test]
    fn human_format_has_headline_and_fix() {
        let err = Error::ConfigurationConflict("cannot add states and counts at the same time".into());
        let text = format_error_human(&err, false);
        assert!(text.starts_with("✗ Conflicting Options"));
        assert!(text.contains("states and counts"));
        assert!(text.contains("Fix: Ask for occurrence counters"));
    }
}
