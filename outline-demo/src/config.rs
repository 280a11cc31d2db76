//! Demo configuration, read from `config.json`.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use outline::WidgetConfig;
use serde::{Deserialize, Serialize};

use crate::paths;

/// Errors loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The file is not valid JSON for [`DemoConfig`].
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    /// `log_level` is not a level name.
    #[error("Unknown log level: {0}")]
    LogLevel(String),
}

/// Settings for the scripted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Widget settings shared by the table and the tree.
    pub widget: WidgetConfig,

    /// Rows in the table.
    ///
    /// Default: 10000
    pub rows: usize,

    /// Rows requested per simulated scroll page.
    ///
    /// Default: 20
    pub page: usize,

    /// Children given to every tree folder when it expands.
    ///
    /// Default: 5
    pub children: usize,

    /// How many folder levels the session opens.
    ///
    /// Default: 3
    pub depth: usize,

    /// Log level name (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    ///
    /// Default: "debug"
    pub log_level: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            widget: WidgetConfig::on_demand(),
            rows: 10_000,
            page: 20,
            children: 5,
            depth: 3,
            log_level: "debug".to_string(),
        }
    }
}

impl DemoConfig {
    /// The configured log level.
    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level).map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

/// Load the config from `explicit`, or from the default location.
///
/// An explicit path must exist; a missing default file yields defaults.
pub fn load(explicit: Option<&Path>) -> Result<DemoConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match paths::config_file() {
            Some(path) if path.exists() => path,
            _ => return Ok(DemoConfig::default()),
        },
    };
    let display = path.display().to_string();
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    parse(&text).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })
}

/// Parse a config document.
pub fn parse(text: &str) -> Result<DemoConfig, serde_json::Error> {
    serde_json::from_str(text)
}
