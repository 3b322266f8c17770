//! Callback delivery of discovery responses.
//!
//! A response is POSTed once as JSON to the request's `callback_url`. There
//! is no retry; a failed delivery is reported to the caller, which still
//! holds the computed response.

use pm_common::{Error, Result};
use serde::Serialize;
use std::io;
use std::time::Duration;

use crate::logging::{event_names, truncate_for_log, LogContext, Stage};

/// Outcome of a successful POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub status: u16,
}

/// Blocking JSON POST client with a whole-request timeout.
pub struct CallbackDelivery {
    agent: ureq::Agent,
    timeout_seconds: u64,
}

impl CallbackDelivery {
    pub fn new(timeout_seconds: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_seconds))
            .build();
        CallbackDelivery {
            agent,
            timeout_seconds,
        }
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// POST `body` to `url`. Any non-2xx status is a delivery failure.
    pub fn deliver<T: Serialize>(
        &self,
        ctx: &LogContext,
        url: &str,
        body: &T,
    ) -> Result<DeliveryReceipt> {
        let shown = truncate_for_log(url, 80);
        crate::log_event!(
            ctx,
            INFO,
            event_names::DELIVER_ATTEMPTED,
            Stage::Deliver,
            "Posting response to callback",
            url = shown.as_str(),
            timeout_seconds = self.timeout_seconds
        );

        let payload = serde_json::to_value(body)?;
        let outcome = self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_json(payload);

        match outcome {
            Ok(response) => {
                let status = response.status();
                crate::log_event!(
                    ctx,
                    INFO,
                    event_names::DELIVER_RESULT,
                    Stage::Deliver,
                    "Callback accepted response",
                    url = shown.as_str(),
                    status = status
                );
                Ok(DeliveryReceipt { status })
            }
            Err(err) => {
                let err = self.classify(url, err);
                crate::log_event!(
                    ctx,
                    WARN,
                    event_names::DELIVER_RESULT,
                    Stage::Deliver,
                    "Callback delivery failed",
                    url = shown.as_str(),
                    error = err.to_string()
                );
                Err(err)
            }
        }
    }

    fn classify(&self, url: &str, err: ureq::Error) -> Error {
        match err {
            ureq::Error::Status(code, _) => Error::Delivery {
                url: url.to_string(),
                reason: format!("callback answered HTTP {}", code),
            },
            ureq::Error::Transport(transport) => {
                if is_timeout(&transport) {
                    Error::DeliveryTimeout {
                        url: url.to_string(),
                        seconds: self.timeout_seconds,
                    }
                } else {
                    Error::Delivery {
                        url: url.to_string(),
                        reason: transport.to_string(),
                    }
                }
            }
        }
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    let mut source = std::error::Error::source(transport);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if matches!(io_err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) {
                return true;
            }
        }
        source = std::error::Error::source(err);
    }
    transport.to_string().contains("timed out")
}
