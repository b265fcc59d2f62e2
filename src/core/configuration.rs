//! Build configuration model
//!
//! The immutable result of interpreting the command line. Created once
//! per invocation by [`crate::cli::args`] and owned by the orchestrator.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Message priority / output verbosity
///
/// Lower values are more important. A message is shown when its level is
/// numerically less than or equal to the configured threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Verbose = 3,
    Debug = 4,
}

impl MessageLevel {
    /// Lowercase name used in build files and JSON output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Verbose => "verbose",
            Self::Debug => "debug",
        }
    }
}

impl Default for MessageLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" | "err" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "verbose" => Ok(Self::Verbose),
            "debug" => Ok(Self::Debug),
            other => Err(format!("unknown message level '{other}'")),
        }
    }
}

/// Everything the command line asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfiguration {
    /// Explicit `-buildfile` path
    pub build_file: Option<PathBuf>,
    /// Targets to run, in order; empty means the default target
    pub targets: Vec<String>,
    /// Listener identifiers, in registration order
    pub listeners: Vec<String>,
    /// Logger identifier
    pub logger: Option<String>,
    /// Input handler identifier
    pub input_handler: Option<String>,
    /// Verbosity threshold
    pub level: MessageLevel,
    pub emacs: bool,
    pub silent: bool,
    pub keep_going: bool,
    pub strict: bool,
    pub show_long_targets: bool,
    /// List targets instead of running them
    pub project_help: bool,
    /// `-logfile` destination
    pub log_file: Option<PathBuf>,
    /// `-propertyfile` paths, in order
    pub property_files: Vec<PathBuf>,
    /// Property files win over `-D` definitions
    pub property_file_override: bool,
    /// `-D` definitions; later definitions overwrite earlier ones
    pub user_properties: HashMap<String, String>,
    /// Filename searched for in parent directories (`-find`)
    pub search_for: Option<String>,
}

impl BuildConfiguration {
    /// Whether the verbosity threshold admits `level`
    pub fn admits(&self, level: MessageLevel) -> bool {
        level <= self.level
    }
}
