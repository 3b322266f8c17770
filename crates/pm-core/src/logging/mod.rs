//! Structured logging for discovery runs.
//!
//! Everything goes to stderr, either as compact console lines or as JSON
//! lines (see [`jsonl`]). Each line carries the run id, host id, pipeline
//! stage and, once a request is parsed, its `id` as `correlation_id`.
//!
//! ```ignore
//! use pm_core::logging::{event_names, init_logging, LogConfig, LogContext, Stage};
//!
//! init_logging(&LogConfig::from_env(None, None));
//! let ctx = LogContext::new(generate_run_id(), get_host_id()).with_correlation_id("job-42");
//! pm_core::log_event!(ctx, INFO, event_names::RUN_STARTED, Stage::Init, "Starting discovery");
//! ```

pub mod context;
pub mod jsonl;
pub mod settings;

pub use context::{event_names, LogContext, Stage};
pub use jsonl::JsonlLayer;
pub use settings::{parse_level, LogConfig, LogFormat};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let _ = match config.format {
        LogFormat::Human => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(config.color && std::io::stderr().is_terminal()),
            )
            .try_init(),
        LogFormat::Jsonl => registry.with(JsonlLayer::stderr()).try_init(),
    };
}

/// `run-` plus 12 random hex digits.
pub fn generate_run_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &hex[..12])
}

/// Short stable host tag from `/etc/machine-id`, else the hostname, else random.
pub fn get_host_id() -> String {
    let machine_id = std::fs::read_to_string("/etc/machine-id")
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| id.len() >= 8 && id.is_ascii());
    if let Some(id) = machine_id {
        return format!("host-{}", &id[..8]);
    }

    let tag = match std::env::var("HOSTNAME") {
        Ok(name) if !name.is_empty() => {
            use std::hash::{Hash, Hasher};
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            name.hash(&mut hasher);
            format!("{:016x}", hasher.finish())
        }
        _ => uuid::Uuid::new_v4().simple().to_string(),
    };
    format!("host-{}", &tag[..8])
}

/// Clip long caller-supplied text (callback URLs, activity labels) for logging.
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...(truncated)", &s[..cut]),
        None => s.to_string(),
    }
}

/// Emit one structured line tagged with a [`LogContext`] and [`Stage`].
///
/// ```ignore
/// log_event!(ctx, INFO, event_names::REDUCE_FINISHED, Stage::Reduce, "Complexity reduced",
///     kept_cases = 12, dropped_cases = 3);
/// ```
#[macro_export]
macro_rules! log_event {
    ($ctx:expr, $level:ident, $event:expr, $stage:expr, $msg:expr $(, $key:ident = $val:expr)* $(,)?) => {
        tracing::event!(
            target: $event,
            tracing::Level::$level,
            run_id = %$ctx.run_id,
            correlation_id = $ctx.correlation_id.as_deref().unwrap_or(""),
            host_id = %$ctx.host_id,
            stage = %$stage,
            message = $msg,
            $($key = $val,)*
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_ids_are_unique_and_shaped() {
        let a = generate_run_id();
        let b = generate_run_id();
        assert_ne!(a, b);
        assert!(a.starts_with("run-"));
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn host_id_has_prefix() {
        let id = get_host_id();
        assert!(id.starts_with("host-"));
        assert_eq!(id.len(), 13);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("exact", 5), "exact");
        assert_eq!(truncate_for_log("Prüfung_abgeschlossen", 3), "Prü...(truncated)");
        assert!(truncate_for_log("http://callback.example/very/long", 10)
            .starts_with("http://cal"));
    }
}
