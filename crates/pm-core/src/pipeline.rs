//! The discovery pipeline: validate, load, reduce, encode, then compute the
//! graph and metrics.
//!
//! Every stage is a pure transform of the log. Nothing is retained between
//! requests except the borrowed, read-only [`EngineConfig`].

use chrono::NaiveDateTime;
use pm_common::timestamp::CREATED_FORMAT;
use pm_common::{EventLog, Result};
use pm_config::{EngineConfig, MetricsConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::encode;
use crate::graph::{discover_graph, Graph, GraphMiner};
use crate::ingest;
use crate::logging::{event_names, LogContext, Stage};
use crate::metrics::{MetricsBundle, MetricsEngine, MetricsRequest};
use crate::reduce;
use crate::request::{DiscoveryRequest, ResolvedParameters};

/// Result of one discovery request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveryResponse {
    pub graph: Graph,
    pub metrics: MetricsBundle,
    /// Local wall-clock time the response was built, `YYYY-MM-DD HH:MM:SS.ffffff`.
    pub created: String,
    /// Caller-supplied correlation id, echoed unchanged.
    pub id: Option<String>,
}

pub struct Pipeline<'a> {
    config: &'a EngineConfig,
    metrics_config: MetricsConfig,
    miner: &'a dyn GraphMiner,
    ctx: &'a LogContext,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a EngineConfig, miner: &'a dyn GraphMiner, ctx: &'a LogContext) -> Self {
        Pipeline {
            config,
            metrics_config: config.metrics_config(),
            miner,
            ctx,
        }
    }

    /// Run a request to completion. `now` closes the last occupancy bin and
    /// stamps the response.
    pub fn run(&self, request: &DiscoveryRequest, now: NaiveDateTime) -> Result<DiscoveryResponse> {
        request.validate_envelope()?;
        let params = request.parameters.resolve(&self.config.defaults)?;

        let log = match ingest::parse_record(&request.data) {
            Ok(log) => log,
            Err(e) => {
                crate::log_event!(
                    self.ctx,
                    WARN,
                    event_names::INGEST_REJECTED,
                    Stage::Ingest,
                    "Raw record rejected",
                    error = e.to_string()
                );
                return Err(e);
            }
        };
        crate::log_event!(
            self.ctx,
            INFO,
            event_names::INGEST_LOADED,
            Stage::Ingest,
            "Event log loaded",
            events = log.len(),
            cases = log.case_count()
        );

        let log = self.transform(log, &params)?;
        let graph = self.graph(&log, &params)?;
        let metrics = self.metrics(&log, &params, now)?;

        Ok(DiscoveryResponse {
            graph,
            metrics,
            created: now.format(CREATED_FORMAT).to_string(),
            id: request.id.clone(),
        })
    }

    /// Apply the optional reduction and encoding, in that order.
    pub fn transform(&self, log: EventLog, params: &ResolvedParameters) -> Result<EventLog> {
        let log = match params.retention {
            Some(retention) => {
                let (reduced, stats) = reduce::reduce_with_stats(&log, retention)?;
                crate::log_event!(
                    self.ctx,
                    INFO,
                    event_names::REDUCE_FINISHED,
                    Stage::Reduce,
                    "Complexity reduced",
                    retention = retention,
                    kept_cases = stats.cases_after,
                    dropped_cases = stats.cases_before - stats.cases_after,
                    kept_variants = stats.variants_kept
                );
                reduced
            }
            None => log,
        };

        let log = match &params.encoding {
            Some(mode) => {
                let encoded = encode::encode(&log, mode);
                crate::log_event!(
                    self.ctx,
                    INFO,
                    event_names::ENCODE_FINISHED,
                    Stage::Encode,
                    "Activities relabeled",
                    mode = mode.name()
                );
                encoded
            }
            None => log,
        };
        Ok(log)
    }

    fn graph(&self, log: &EventLog, params: &ResolvedParameters) -> Result<Graph> {
        let graph = discover_graph(
            self.miner,
            log,
            &params.start_node_name,
            &params.end_node_name,
        )?;
        crate::log_event!(
            self.ctx,
            INFO,
            event_names::GRAPH_FINISHED,
            Stage::Graph,
            "Graph discovered",
            miner = self.miner.name(),
            connections = graph.len()
        );
        Ok(graph)
    }

    fn metrics(
        &self,
        log: &EventLog,
        params: &ResolvedParameters,
        now: NaiveDateTime,
    ) -> Result<MetricsBundle> {
        let engine = MetricsEngine::new(&self.metrics_config, self.miner);
        let request = MetricsRequest {
            active_events: params.active_events.as_ref(),
            n_top_variants: params.n_top_variants,
            horizon: now,
        };
        let bundle = engine.compute(log, &request)?;
        crate::log_event!(
            self.ctx,
            INFO,
            event_names::METRICS_FINISHED,
            Stage::Metrics,
            "Metrics computed",
            computed = bundle.computed_count()
        );
        Ok(bundle)
    }
}
