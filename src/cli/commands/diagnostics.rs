//! CLI command for `kiln -diagnostics`
//!
//! Prints the environment report. Failed checks are reported but do not
//! change the exit status.

use std::path::Path;

use anyhow::Result;

use crate::cli::output::{print_success, print_warning};
use crate::core::components::ComponentRegistry;
use crate::core::diagnostics::run_diagnostics;
use crate::infra::dirs::KilnDirs;

pub fn execute(registry: &ComponentRegistry, working_dir: Option<&Path>) -> Result<()> {
    let report = run_diagnostics(&KilnDirs::new(), registry, working_dir);
    print!("{}", report.render());
    println!();

    let failed = report.failed_required();
    if failed.is_empty() {
        print_success("All required checks passed");
    } else {
        for check in failed {
            print_warning(&format!("Required check failed: {}", check.name));
        }
    }
    Ok(())
}
