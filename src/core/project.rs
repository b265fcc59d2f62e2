//! Execution-engine collaborator contracts
//!
//! The orchestrator never parses build files or runs tasks itself. A
//! [`ProjectConfigurator`] turns a build file into a [`Project`], and the
//! project executes targets, firing events through the [`EngineContext`].

use std::io;
use std::path::Path;

use crate::core::context::EngineContext;
use crate::infra::streams::OutputStream;

/// A target as shown by project help
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSummary {
    pub name: String,
    pub description: Option<String>,
    pub depends: Vec<String>,
}

/// A configured build, ready to execute targets
pub trait Project {
    fn name(&self) -> Option<&str>;

    fn description(&self) -> Option<&str>;

    /// Target run when none is requested
    fn default_target(&self) -> Option<&str>;

    fn targets(&self) -> Vec<TargetSummary>;

    /// Run `targets` in order, firing target, task and message events
    fn execute_targets(&mut self, targets: &[String], ctx: &mut EngineContext)
        -> anyhow::Result<()>;
}

/// Parses a build file into a [`Project`]
pub trait ProjectConfigurator {
    fn configure(&self, build_file: &Path, ctx: &mut EngineContext)
        -> anyhow::Result<Box<dyn Project>>;
}

/// Print the project's targets
///
/// Targets with a description are main targets. With `long`, each target
/// also lists what it depends on.
pub fn print_project_help(
    project: &dyn Project,
    long: bool,
    out: &OutputStream,
) -> io::Result<()> {
    if let Some(description) = project.description() {
        out.line(description)?;
    }

    let mut targets = project.targets();
    targets.retain(|t| !t.name.is_empty());
    targets.sort_by(|a, b| a.name.cmp(&b.name));
    let (main, other): (Vec<_>, Vec<_>) = targets.iter().partition(|t| t.description.is_some());

    let width = targets.iter().map(|t| t.name.len()).max().unwrap_or(0);
    print_section(out, "Main targets:", &main, width, long)?;
    if !other.is_empty() {
        print_section(out, "Other targets:", &other, width, long)?;
    }

    if let Some(default) = project.default_target() {
        out.line(&format!("Default target: {default}"))?;
    }
    out.flush()
}

fn print_section(
    out: &OutputStream,
    heading: &str,
    targets: &[&TargetSummary],
    width: usize,
    long: bool,
) -> io::Result<()> {
    out.line("")?;
    out.line(heading)?;
    out.line("")?;
    for target in targets {
        let mut line = format!(" {:width$}", target.name);
        if let Some(description) = &target.description {
            line.push_str("  ");
            line.push_str(description);
        }
        out.line(line.trim_end())?;
        if long && !target.depends.is_empty() {
            out.line(&format!("   depends on: {}", target.depends.join(", ")))?;
        }
    }
    if targets.is_empty() {
        out.line(" (none)")?;
    }
    out.line("")
}
