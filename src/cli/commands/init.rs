//! CLI implementation for `kiln -init`

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{print_detail, print_success};
use crate::core::init::{default_init_path, init_build_file};

/// Write the skeleton build file
///
/// A relative `path` is resolved against `working_dir`.
pub fn execute(working_dir: &Path, path: Option<&Path>) -> Result<()> {
    let target = path.map_or_else(|| default_init_path(working_dir), |p| working_dir.join(p));
    let written = init_build_file(&target)?;

    print_success(&format!("Created {}", written.display()));
    print_detail("Run 'kiln -projecthelp' to list its targets");
    Ok(())
}
