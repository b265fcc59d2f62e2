//! Version information for kiln
//!
//! This module handles:
//! - The version line printed by `-version`
//! - Build metadata emitted by `build.rs`
//! - Checking a build file's `requires` constraint against the running kiln

use semver::{Version, VersionReq};
use thiserror::Error;

/// Current kiln version from Cargo.toml
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors related to version checking
#[derive(Error, Debug, PartialEq)]
pub enum VersionError {
    /// Running kiln doesn't satisfy the required constraint
    #[error("kiln version {current} does not satisfy requirement '{constraint}' from {origin}")]
    VersionMismatch {
        current: String,
        constraint: String,
        origin: String,
    },

    /// Invalid version constraint format
    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    /// Invalid version format
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },
}

/// Build metadata captured at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_sha: Option<&'static str>,
    pub git_dirty: bool,
    pub build_timestamp: Option<&'static str>,
    pub target_triple: Option<&'static str>,
    pub rustc: Option<&'static str>,
}

impl BuildInfo {
    /// Metadata of the running binary
    pub fn current() -> Self {
        Self {
            version: CURRENT_VERSION,
            git_sha: option_env!("VERGEN_GIT_SHA"),
            git_dirty: option_env!("VERGEN_GIT_DIRTY") == Some("true"),
            build_timestamp: option_env!("VERGEN_BUILD_TIMESTAMP"),
            target_triple: option_env!("VERGEN_CARGO_TARGET_TRIPLE"),
            rustc: option_env!("VERGEN_RUSTC_SEMVER"),
        }
    }

    /// `kiln version <ver> (<sha>, built <timestamp>)`
    pub fn version_line(&self) -> String {
        let mut sha = self.git_sha.map_or_else(|| "unknown".to_string(), short_sha);
        if self.git_dirty {
            sha.push_str("-dirty");
        }
        format!(
            "kiln version {} ({sha}, built {})",
            self.version,
            self.build_timestamp.unwrap_or("unknown")
        )
    }
}

fn short_sha(sha: &str) -> String {
    sha.chars().take(12).collect()
}

/// Check the running kiln against a version constraint
///
/// `origin` names where the constraint came from, for the error message.
pub fn check_kiln_version(constraint: &str, origin: &str) -> Result<(), VersionError> {
    check_version_constraint(CURRENT_VERSION, constraint, origin)
}

/// Check if a version satisfies a constraint
pub fn check_version_constraint(
    version: &str,
    constraint: &str,
    origin: &str,
) -> Result<(), VersionError> {
    let parsed_version = Version::parse(version).map_err(|e| VersionError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })?;

    let version_req =
        VersionReq::parse(constraint).map_err(|e| VersionError::InvalidConstraint {
            constraint: constraint.to_string(),
            reason: e.to_string(),
        })?;

    if version_req.matches(&parsed_version) {
        Ok(())
    } else {
        Err(VersionError::VersionMismatch {
            current: version.to_string(),
            constraint: constraint.to_string(),
            origin: origin.to_string(),
        })
    }
}
