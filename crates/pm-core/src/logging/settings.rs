//! Log settings.
//!
//! Verbosity comes from `PM_LOG` (a level name) or, failing that, `RUST_LOG`
//! (full filter directives, so `RUST_LOG=reduce.finished=debug` works since
//! event names are targets). `PM_LOG_FORMAT` picks the line format. The
//! global `-v`, `-q` and `--format` flags override both.

use std::str::FromStr;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact console lines.
    #[default]
    Human,
    /// One JSON object per line.
    Jsonl,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" | "text" => Ok(LogFormat::Human),
            "jsonl" | "json" => Ok(LogFormat::Jsonl),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Parse a level name. `warning` and `quiet` are accepted as aliases.
pub fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "warning" => Some(LevelFilter::WARN),
        "quiet" | "none" => Some(LevelFilter::OFF),
        other => other.parse().ok(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives.
    pub filter: String,
    pub color: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            filter: LevelFilter::INFO.to_string(),
            color: true,
        }
    }
}

impl LogConfig {
    pub fn from_env(cli_level: Option<LevelFilter>, cli_format: Option<LogFormat>) -> Self {
        let env = |key: &str| std::env::var(key).ok();
        Self::resolve(
            env("PM_LOG").as_deref(),
            env("RUST_LOG").as_deref(),
            env("PM_LOG_FORMAT").as_deref(),
            cli_level,
            cli_format,
        )
    }

    fn resolve(
        pm_log: Option<&str>,
        rust_log: Option<&str>,
        pm_log_format: Option<&str>,
        cli_level: Option<LevelFilter>,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let mut config = LogConfig::default();

        if let Some(level) = cli_level.or_else(|| pm_log.and_then(parse_level)) {
            config.filter = level.to_string();
        } else if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
            config.filter = directives.to_string();
        }

        config.format = cli_format
            .or_else(|| pm_log_format.and_then(|f| f.parse().ok()))
            .unwrap_or_default();
        config
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// `-q` wins over any number of `-v`. None leaves the environment in charge.
    pub fn level_from_flags(verbose: u8, quiet: bool) -> Option<LevelFilter> {
        match (quiet, verbose) {
            (true, _) => Some(LevelFilter::ERROR),
            (false, 0) => None,
            (false, 1) => Some(LevelFilter::DEBUG),
            (false, _) => Some(LevelFilter::TRACE),
        }
    }
}
