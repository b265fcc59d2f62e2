//! Skeleton build-file generation
//!
//! Writes a small, commented `build.toml` that runs as-is. The file is
//! never overwritten.

use std::path::{Path, PathBuf};

use crate::config::defaults::DEFAULT_BUILD_FILE;
use crate::error::{FilesystemError, InitError};
use crate::infra::filesystem;

/// Project name used when the directory has no usable name
const FALLBACK_PROJECT_NAME: &str = "my-project";

/// Where `-init` writes when no path is given
pub fn default_init_path(working_dir: &Path) -> PathBuf {
    working_dir.join(DEFAULT_BUILD_FILE)
}

/// Derive the project name from the directory holding the build file
pub fn derive_project_name(build_file: &Path) -> String {
    build_file
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map_or_else(|| FALLBACK_PROJECT_NAME.to_string(), str::to_string)
}

/// Generate the skeleton build file content
pub fn generate_build_file(project_name: &str) -> String {
    format!(
        r#"# kiln build file
#
# Run `kiln -projecthelp` to list targets, `kiln <target>` to run one.

[project]
name = "{project_name}"
default = "build"
description = "{project_name} build"
# requires = ">=0.1.0"

[properties]
"src.dir" = "src"
"out.dir" = "target"

[[target]]
name = "init"
[[target.task]]
type = "echo"
message = "Preparing ${{out.dir}}"

[[target]]
name = "build"
description = "Build the project"
depends = ["init"]
[[target.task]]
type = "echo"
message = "Building ${{src.dir}} into ${{out.dir}}"
"#
    )
}

/// Write the skeleton to `path`
///
/// Fails with [`InitError::AlreadyExists`] when anything is at `path`.
pub fn init_build_file(path: &Path) -> Result<PathBuf, InitError> {
    if path.exists() {
        return Err(InitError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }

    let content = generate_build_file(&derive_project_name(path));
    filesystem::write_new_file(path, &content).map_err(|e| match e {
        FilesystemError::CreateDir { path, error }
        | FilesystemError::WriteFile { path, error }
        | FilesystemError::ReadFile { path, error } => InitError::IoError { path, error },
    })?;
    tracing::debug!(path = %path.display(), "wrote skeleton build file");
    Ok(path.to_path_buf())
}
