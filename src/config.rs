//! Graph configuration loaded from TOML.
//!
//! Every key is optional:
//!
//! ```toml
//! max_evaluation_depth = 1024
//! allow_placeholder_nodes = true
//! command_capacity = 1024
//! event_capacity = 256
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{DEFAULT_COMMAND_BUFFER_SIZE, DEFAULT_EVENT_BUFFER_SIZE};

/// Default limit on nested evaluation.
pub const DEFAULT_MAX_EVALUATION_DEPTH: usize = 1024;

/// Tunables for a [`GraphEditor`](crate::graph::GraphEditor) and its channels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// How many parameters an evaluation may nest through before giving up.
    pub max_evaluation_depth: usize,
    /// Whether scene import keeps nodes of unregistered types as placeholders.
    pub allow_placeholder_nodes: bool,
    /// Capacity of the producer-to-graph command queue.
    pub command_capacity: usize,
    /// Capacity of the graph-to-producer event queue.
    pub event_capacity: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_evaluation_depth: DEFAULT_MAX_EVALUATION_DEPTH,
            allow_placeholder_nodes: true,
            command_capacity: DEFAULT_COMMAND_BUFFER_SIZE,
            event_capacity: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

/// Errors from reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0} must be greater than zero")]
    Zero(&'static str),
}

impl GraphConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: GraphConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_evaluation_depth == 0 {
            return Err(ConfigError::Zero("max_evaluation_depth"));
        }
        if self.command_capacity == 0 {
            return Err(ConfigError::Zero("command_capacity"));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Zero("event_capacity"));
        }
        Ok(())
    }
}
