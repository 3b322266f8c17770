//! Discovery request types and parameter resolution.

use pm_common::{Error, Result};
use pm_config::RequestDefaults;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::encode::EncodingMode;

/// A complete discovery request as submitted by a caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveryRequest {
    /// Raw record with `concept:name`, `case:concept:name`, `time:timestamp`.
    pub data: serde_json::Value,

    pub parameters: DiscoveryParameters,

    /// Where to POST the response once it is computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// Correlation id echoed back in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Caller-selected transforms and metric parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveryParameters {
    #[serde(default)]
    pub active_events: Option<ActiveEventParameters>,

    /// Number of top variants to report; config default when absent.
    #[serde(default)]
    pub n_top_variants: Option<usize>,

    /// Fraction of behavior to drop, in [0, 1]. Zero disables reduction.
    #[serde(default)]
    pub reduce_complexity_by: f64,

    #[serde(default)]
    pub add_counts: bool,

    #[serde(default)]
    pub state_changing_events: Option<Vec<String>>,

    #[serde(default)]
    pub start_node_name: Option<String>,

    #[serde(default)]
    pub end_node_name: Option<String>,
}

/// Activity classification used by the occupancy metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActiveEventParameters {
    /// Activities that open an occupancy interval.
    pub positive_events: Vec<String>,
    /// Activities that close one.
    pub negative_events: Vec<String>,
    /// Activities counted only in the bin they occur in.
    pub singular_events: Vec<String>,
}

/// How an activity contributes to occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityClass {
    Positive,
    Negative,
    Singular,
}

impl ActiveEventParameters {
    pub fn new<S: Into<String>>(
        positive: impl IntoIterator<Item = S>,
        negative: impl IntoIterator<Item = S>,
        singular: impl IntoIterator<Item = S>,
    ) -> Self {
        ActiveEventParameters {
            positive_events: positive.into_iter().map(Into::into).collect(),
            negative_events: negative.into_iter().map(Into::into).collect(),
            singular_events: singular.into_iter().map(Into::into).collect(),
        }
    }

    /// The three sets must be pairwise disjoint.
    pub fn validate(&self) -> Result<()> {
        let positive: HashSet<&str> = self.positive_events.iter().map(String::as_str).collect();
        let negative: HashSet<&str> = self.negative_events.iter().map(String::as_str).collect();
        let singular: HashSet<&str> = self.singular_events.iter().map(String::as_str).collect();

        let overlap = positive
            .intersection(&negative)
            .chain(positive.intersection(&singular))
            .chain(negative.intersection(&singular))
            .next();
        match overlap {
            Some(activity) => Err(Error::InvalidArgument(format!(
                "activity '{activity}' appears in more than one of positive_events, negative_events, singular_events"
            ))),
            None => Ok(()),
        }
    }

    /// Classify an activity. Unlisted activities are singular.
    pub fn classify(&self, activity: &str) -> ActivityClass {
        if self.positive_events.iter().any(|a| a == activity) {
            ActivityClass::Positive
        } else if self.negative_events.iter().any(|a| a == activity) {
            ActivityClass::Negative
        } else {
            ActivityClass::Singular
        }
    }
}

/// Parameters after validation, with configuration defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParameters {
    pub active_events: Option<ActiveEventParameters>,
    pub n_top_variants: usize,
    /// Fraction of cases' behavior to keep; `None` when reduction is off.
    pub retention: Option<f64>,
    pub encoding: Option<EncodingMode>,
    pub start_node_name: String,
    pub end_node_name: String,
}

impl DiscoveryParameters {
    /// Validate the parameters and fill in defaults.
    ///
    /// Conflicting encoder options are reported before anything else so no
    /// work is done for a request that can never succeed.
    pub fn resolve(&self, defaults: &RequestDefaults) -> Result<ResolvedParameters> {
        let encoding =
            EncodingMode::from_options(self.add_counts, self.state_changing_events.as_deref())?;

        if !(0.0..=1.0).contains(&self.reduce_complexity_by) {
            return Err(Error::InvalidArgument(format!(
                "reduce_complexity_by must lie in [0, 1], got {}",
                self.reduce_complexity_by
            )));
        }

        let n_top_variants = self.n_top_variants.unwrap_or(defaults.n_top_variants);
        if n_top_variants == 0 {
            return Err(Error::InvalidArgument(
                "n_top_variants must be at least 1".to_string(),
            ));
        }

        if let Some(active) = &self.active_events {
            active.validate()?;
        }

        let retention = if self.reduce_complexity_by > 0.0 {
            Some(1.0 - self.reduce_complexity_by)
        } else {
            None
        };

        Ok(ResolvedParameters {
            active_events: self.active_events.clone(),
            n_top_variants,
            retention,
            encoding,
            start_node_name: self
                .start_node_name
                .clone()
                .unwrap_or_else(|| defaults.start_node_name.clone()),
            end_node_name: self
                .end_node_name
                .clone()
                .unwrap_or_else(|| defaults.end_node_name.clone()),
        })
    }
}

impl DiscoveryRequest {
    /// Validate request-level fields that do not depend on the log.
    pub fn validate_envelope(&self) -> Result<()> {
        if let Some(url) = &self.callback_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::InvalidArgument(format!(
                    "callback_url must be an http or https URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }
}
