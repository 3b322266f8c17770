//! Run context and stage vocabulary carried by every log line.

use serde::Serialize;
use std::fmt;

/// Where in a discovery run a line was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Ingest,
    Reduce,
    Encode,
    Metrics,
    Graph,
    Deliver,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Ingest => "ingest",
            Stage::Reduce => "reduce",
            Stage::Encode => "encode",
            Stage::Metrics => "metrics",
            Stage::Graph => "graph",
            Stage::Deliver => "deliver",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event names, used as the tracing target of each line.
pub mod event_names {
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_ERROR: &str = "config.error";

    pub const INGEST_LOADED: &str = "ingest.loaded";
    pub const INGEST_REJECTED: &str = "ingest.rejected";
    pub const REDUCE_FINISHED: &str = "reduce.finished";
    pub const ENCODE_FINISHED: &str = "encode.finished";
    pub const GRAPH_FINISHED: &str = "graph.finished";
    pub const METRICS_FINISHED: &str = "metrics.finished";

    pub const DELIVER_ATTEMPTED: &str = "deliver.attempted";
    pub const DELIVER_RESULT: &str = "deliver.result";

    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Identifiers stamped on each line of one invocation.
///
/// `correlation_id` is the request's `id` once the request has been parsed.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub run_id: String,
    pub correlation_id: Option<String>,
    pub host_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
            correlation_id: None,
            host_id: host_id.into(),
        }
    }

    pub fn with_correlation_id(self, correlation_id: impl Into<String>) -> Self {
        LogContext {
            correlation_id: Some(correlation_id.into()),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_display_matches_serde() {
        for stage in [Stage::Init, Stage::Reduce, Stage::Deliver] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage));
        }
    }

    #[test]
    fn correlation_id_is_attached() {
        let ctx = LogContext::new("run-1", "host-1");
        assert!(ctx.correlation_id.is_none());
        let ctx = ctx.with_correlation_id("job-42");
        assert_eq!(ctx.correlation_id.as_deref(), Some("job-42"));
        assert_eq!(ctx.run_id, "run-1");
    }
}
