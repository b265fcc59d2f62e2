//! Build file location
//!
//! Turns the command line's build-file request into a concrete, existing
//! file: an explicit `-buildfile`, an upward `-find` search, or the default
//! name in the working directory.

use std::path::{Path, PathBuf};

use crate::config::defaults::{DEFAULT_BUILD_FILE, DIST_SUFFIX};
use crate::core::configuration::BuildConfiguration;
use crate::error::ConfigError;

/// Resolve the build file for `config`, relative to `cwd`
///
/// The returned path is absolute and names an existing regular file.
pub fn locate(config: &BuildConfiguration, cwd: &Path) -> Result<PathBuf, ConfigError> {
    let candidate = match (&config.build_file, &config.search_for) {
        (Some(file), _) => cwd.join(file),
        (None, Some(name)) => find_upward(cwd, name)?,
        (None, None) => cwd.join(DEFAULT_BUILD_FILE),
    };
    verify(candidate)
}

/// Walk from `start` towards the root looking for `name`
pub fn find_upward(start: &Path, name: &str) -> Result<PathBuf, ConfigError> {
    tracing::debug!(start = %start.display(), name, "searching for build file");

    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(name);
        if candidate.exists() {
            tracing::debug!(found = %candidate.display(), "build file found");
            return Ok(candidate);
        }
        dir = current.parent();
    }

    Err(ConfigError::NoBuildFileFound {
        name: name.to_string(),
    })
}

/// Apply the `.dist` fallback and reject missing files and directories
fn verify(path: PathBuf) -> Result<PathBuf, ConfigError> {
    let path = if path.exists() {
        path
    } else {
        let dist = dist_sibling(&path);
        if !dist.exists() {
            return Err(ConfigError::BuildFileNotFound { path });
        }
        tracing::debug!(dist = %dist.display(), "using distribution build file");
        dist
    };

    if path.is_dir() {
        return Err(ConfigError::BuildFileIsDirectory { path });
    }
    Ok(path)
}

fn dist_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(DIST_SUFFIX);
    PathBuf::from(name)
}
