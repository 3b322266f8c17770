//! Locating and loading `config.yml`.
//!
//! The first hit wins: `--config`, then `PM_CONFIG`, then
//! `$PM_CONFIG_DIR/config.yml`, then `<XDG config>/process-mining/config.yml`.
//! With none of these the built-in defaults apply.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::engine::EngineConfig;
use crate::snapshot::ConfigSnapshot;
use crate::validate::{validate_config, ValidationError, ValidationResult};

pub const ENV_CONFIG_PATH: &str = "PM_CONFIG";
pub const ENV_CONFIG_DIR: &str = "PM_CONFIG_DIR";
pub const CONFIG_FILENAME: &str = "config.yml";
const APP_NAME: &str = "process-mining";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    CliArgument,
    /// `PM_CONFIG`.
    Environment,
    /// `PM_CONFIG_DIR`.
    ConfigDir,
    XdgConfig,
    #[default]
    BuiltinDefault,
}

impl ConfigSource {
    pub fn label(self) -> &'static str {
        match self {
            ConfigSource::CliArgument => "CLI argument",
            ConfigSource::Environment => "environment variable",
            ConfigSource::ConfigDir => "config directory",
            ConfigSource::XdgConfig => "XDG config",
            ConfigSource::BuiltinDefault => "builtin default",
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of resolution: a file to read (or none) and how it was chosen.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub config: Option<PathBuf>,
    pub source: ConfigSource,
}

impl ConfigPaths {
    fn found(path: PathBuf, source: ConfigSource) -> Self {
        ConfigPaths {
            config: Some(path),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: EngineConfig,
    pub snapshot: ConfigSnapshot,
}

/// Pick the config file. Explicitly named files (`--config`, `PM_CONFIG`)
/// are returned even if missing so that loading fails loudly; directory
/// candidates are skipped unless the file exists.
pub fn resolve_config(cli_path: Option<&Path>) -> ConfigPaths {
    if let Some(path) = cli_path {
        return ConfigPaths::found(path.to_path_buf(), ConfigSource::CliArgument);
    }
    if let Some(path) = std::env::var_os(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
        return ConfigPaths::found(PathBuf::from(path), ConfigSource::Environment);
    }

    let candidates = [
        (
            std::env::var_os(ENV_CONFIG_DIR).map(PathBuf::from),
            ConfigSource::ConfigDir,
        ),
        (xdg_config_dir(), ConfigSource::XdgConfig),
    ];
    candidates
        .into_iter()
        .filter_map(|(dir, source)| Some((dir?.join(CONFIG_FILENAME), source)))
        .find(|(path, _)| path.is_file())
        .map(|(path, source)| ConfigPaths::found(path, source))
        .unwrap_or_default()
}

/// Read, parse and validate the resolved file, or fall back to defaults.
pub fn load_config(paths: &ConfigPaths) -> ValidationResult<LoadedConfig> {
    let Some(path) = paths.config.as_deref() else {
        let config = EngineConfig::default();
        let snapshot = ConfigSnapshot::new(&config, None, None, ConfigSource::BuiltinDefault);
        return Ok(LoadedConfig { config, snapshot });
    };

    let shown = path.display();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ValidationError::IoError(format!("{shown}: {e}")))?;
    let config = EngineConfig::from_yaml_str(&content).map_err(|e| match e {
        ValidationError::ParseError(msg) => ValidationError::ParseError(format!("{shown}: {msg}")),
        other => other,
    })?;
    validate_config(&config)?;

    let snapshot = ConfigSnapshot::new(
        &config,
        Some(shown.to_string()),
        Some(compute_sha256(&content)),
        paths.source,
    );
    Ok(LoadedConfig { config, snapshot })
}

/// `<XDG config home>/process-mining`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Lowercase hex SHA-256 of `content`.
pub(crate) fn compute_sha256(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
