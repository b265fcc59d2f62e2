//! Error types for kiln
//!
//! Domain-specific error types using thiserror.

use std::backtrace::Backtrace;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
///
/// Raised before a build starts: bad command-line usage, a missing build
/// file, or a component that cannot be resolved. Always fatal, exit 1.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A valued flag was the last token
    #[error("You must specify a {what} when using the {flag} argument")]
    MissingValue { flag: String, what: &'static str },

    /// Unrecognised flag
    #[error("Unknown argument: {arg}")]
    UnknownArgument { arg: String },

    /// Option that may only be given once appeared twice
    #[error("Only one {option} may be specified.")]
    DuplicateOption { option: &'static str },

    /// `-Dname` without a value
    #[error("Missing value for property {name}")]
    MissingPropertyValue { name: String },

    /// Bare `-D` without a property name
    #[error("Missing property name after -D")]
    MissingPropertyName,

    /// Upward search reached the filesystem root
    #[error("Could not locate a build file! (no build file named '{name}' found)")]
    NoBuildFileFound { name: String },

    /// Resolved build file does not exist
    #[error("Buildfile: {path} does not exist!")]
    BuildFileNotFound { path: PathBuf },

    /// Resolved build file is a directory
    #[error("What? Buildfile: {path} is a dir!")]
    BuildFileIsDirectory { path: PathBuf },

    /// Component identifier could not be resolved
    #[error("Unable to instantiate specified {kind} '{id}': {reason}")]
    Component {
        id: String,
        kind: &'static str,
        reason: String,
    },

    /// Log file could not be opened
    #[error("Cannot write on the specified log file '{path}': {error}")]
    LogFile { path: PathBuf, error: String },

    /// Global configuration file is malformed
    #[error("Failed to load global config '{path}': {error}")]
    GlobalConfig { path: PathBuf, error: String },

    /// Working directory could not be determined
    #[error("Cannot determine the working directory: {error}")]
    WorkingDirectory { error: String },
}

/// Skeleton build-file generation errors
#[derive(Error, Debug)]
pub enum InitError {
    /// Target file already exists
    #[error("Cannot create {path}: file already exists")]
    AlreadyExists { path: PathBuf },

    /// IO error while writing the skeleton
    #[error("IO error for '{path}': {error}")]
    IoError { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Position inside a build file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Build file path
    pub file: PathBuf,
    /// 1-based line, when known
    pub line: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<PathBuf>, line: Option<usize>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}: ", self.file.display()),
            None => write!(f, "{}: ", self.file.display()),
        }
    }
}

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure raised by the execution engine while a build is running
///
/// Displays as `<location><message>`. A failure carrying an explicit
/// status asks the process to exit with that code.
#[derive(Debug)]
pub struct BuildFailure {
    message: String,
    location: Option<Location>,
    status: Option<i32>,
    cause: Option<Cause>,
    backtrace: Backtrace,
}

impl BuildFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            status: None,
            cause: None,
            backtrace: Backtrace::capture(),
        }
    }

    /// Failure that requests a specific process exit status
    pub fn with_status(message: impl Into<String>, status: i32) -> Self {
        Self {
            status: Some(status),
            ..Self::new(message)
        }
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn caused_by(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn status(&self) -> Option<i32> {
        self.status
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}")?;
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for BuildFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_build_failure_display_includes_location() {
        let failure = BuildFailure::new("boom").at(Location::new("build.toml", Some(7)));
        assert_eq!(failure.to_string(), "build.toml:7: boom");
    }

    #[test]
    fn test_build_failure_exposes_cause_as_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let failure = BuildFailure::new("Build failed: disk full").caused_by(inner);
        assert_eq!(failure.source().map(ToString::to_string).as_deref(), Some("disk full"));
    }

    #[test]
    fn test_build_failure_without_cause_has_no_source() {
        let failure = BuildFailure::new("boom");
        assert!(failure.source().is_none());
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(failure);
        assert_eq!(boxed.to_string(), "boom");
    }

    #[test]
    fn test_status_failure_keeps_code() {
        let failure = BuildFailure::with_status("stop", 3);
        assert_eq!(failure.status(), Some(3));
        assert_eq!(failure.message(), "stop");
    }

    #[test]
    fn test_config_error_names_flag() {
        let err = ConfigError::MissingValue {
            flag: "-buildfile".to_string(),
            what: "buildfile",
        };
        assert!(err.to_string().contains("-buildfile"));
    }
}
