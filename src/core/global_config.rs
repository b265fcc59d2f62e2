//! Global configuration management
//!
//! Reads default settings from `config.toml` in the kiln config directory.
//! Command-line flags always take precedence over these defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::configuration::{BuildConfiguration, MessageLevel};
use crate::error::ConfigError;
use crate::infra::dirs::KilnDirs;

/// Global configuration for kiln
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Defaults applied to every build
    #[serde(default)]
    pub defaults: Defaults,
}

/// Per-build defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Logger identifier used when `-logger` is absent
    pub logger: Option<String>,

    /// Listeners registered before any `-listener`
    #[serde(default)]
    pub listeners: Vec<String>,

    /// Input handler identifier used when `-inputhandler` is absent
    pub input_handler: Option<String>,

    /// Enable emacs mode
    pub emacs: Option<bool>,

    /// Verbosity used when no verbosity toggle is given
    pub level: Option<MessageLevel>,

    /// Enable keep-going mode
    pub keep_going: Option<bool>,
}

impl GlobalConfig {
    /// Load global configuration from the config directory
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(dirs: &KilnDirs) -> Result<Self, ConfigError> {
        Self::load_from_path(&dirs.global_config_path())
    }

    /// Load global configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let error = |e: String| ConfigError::GlobalConfig {
            path: path.to_path_buf(),
            error: e,
        };
        let content = fs::read_to_string(path).map_err(|e| error(e.to_string()))?;
        toml::from_str(&content).map_err(|e| error(e.to_string()))
    }

    /// Fill in what the command line left unset
    ///
    /// Verbosity only applies when the command line kept the default.
    /// `-silent` keeps the default logger out.
    pub fn apply(&self, config: &BuildConfiguration) -> BuildConfiguration {
        let d = &self.defaults;
        let mut merged = config.clone();

        if merged.logger.is_none() && !merged.silent {
            merged.logger.clone_from(&d.logger);
        }
        if merged.input_handler.is_none() {
            merged.input_handler.clone_from(&d.input_handler);
        }
        merged.listeners = d
            .listeners
            .iter()
            .chain(config.listeners.iter())
            .cloned()
            .collect();
        merged.emacs |= d.emacs.unwrap_or(false);
        merged.keep_going |= d.keep_going.unwrap_or(false);
        if config.level == MessageLevel::default() {
            if let Some(level) = d.level {
                merged.level = level;
            }
        }
        merged
    }
}
