//! YAML configuration for the `netreduce` command.
//!
//! ```yaml
//! limits:
//!   max_depth: 256
//!   max_branches: 100000
//! log_filter: "netreduce=debug"
//! normalize: true
//! ```
//!
//! Every field is optional; a missing file section falls back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::builder::BuildOptions;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceConfig {
    /// Search limits passed to every build.
    #[serde(default)]
    pub limits: BuildOptions,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Print normalized trees by default.
    #[serde(default)]
    pub normalize: bool,
}

fn default_log_filter() -> String { "warn".to_string() }

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            limits: BuildOptions::default(),
            log_filter: default_log_filter(),
            normalize: false,
        }
    }
}

impl ReduceConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}
