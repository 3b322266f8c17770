//! Output format selection for CLI payloads.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// What a command prints on stdout. Errors follow the same choice on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON envelope
    #[default]
    Json,
    /// Markdown tables
    Md,
    /// One line per command
    Summary,
    /// Nothing; only the exit code
    Exitcode,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}
